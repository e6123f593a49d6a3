use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{InteractionConfig, ViewportConfig};
use crate::geometry::Point;

/// Pan/zoom transform: screen = canvas * k + (x, y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn apply(&self, point: Point) -> Point {
        Point::new(point.x * self.k + self.x, point.y * self.k + self.y)
    }

    pub fn invert(&self, point: Point) -> Point {
        Point::new((point.x - self.x) / self.k, (point.y - self.y) / self.k)
    }
}

impl Default for ZoomTransform {
    fn default() -> Self {
        ZoomTransform::IDENTITY
    }
}

/// Who asked for a transform change. Only user gestures become the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformOrigin {
    User,
    Programmatic,
}

/// Session-persistent pan/zoom state of one view.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    current: ZoomTransform,
    baseline: Option<ZoomTransform>,
    min_zoom: f64,
    max_zoom: f64,
}

impl Viewport {
    pub fn new(config: &InteractionConfig) -> Self {
        Viewport {
            current: ZoomTransform::IDENTITY,
            baseline: None,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
        }
    }

    /// Starting transform for a tree of `node_count` nodes: more nodes start further out.
    pub fn initial_transform(node_count: usize, viewport: &ViewportConfig) -> ZoomTransform {
        let k = match node_count {
            0..20 => 1.0,
            20..50 => 0.85,
            50..150 => 0.7,
            150..500 => 0.5,
            _ => 0.35,
        };
        ZoomTransform {
            x: viewport.margin_left * k,
            y: viewport.height * (1.0 - k) / 2.0,
            k,
        }
    }

    /// Choose the transform for a new render pass. A transform the user already
    /// established is reused verbatim; otherwise the node-count default applies.
    pub fn establish(&mut self, node_count: usize, viewport: &ViewportConfig) -> ZoomTransform {
        let transform = match self.baseline {
            Some(baseline) => baseline,
            None => Self::initial_transform(node_count, viewport),
        };
        self.set_transform(transform, TransformOrigin::Programmatic);
        transform
    }

    pub fn set_transform(&mut self, transform: ZoomTransform, origin: TransformOrigin) {
        let transform = ZoomTransform {
            k: transform.k.clamp(self.min_zoom, self.max_zoom),
            ..transform
        };
        self.current = transform;
        if origin == TransformOrigin::User {
            self.baseline = Some(transform);
        }
    }

    pub fn pan(&mut self, delta: Point) {
        let next = ZoomTransform {
            x: self.current.x + delta.x,
            y: self.current.y + delta.y,
            k: self.current.k,
        };
        self.set_transform(next, TransformOrigin::User);
    }

    /// Scale by `factor` keeping the screen point `focus` fixed.
    pub fn zoom_at(&mut self, focus: Point, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let k = (self.current.k * factor).clamp(self.min_zoom, self.max_zoom);
        let anchor = self.current.invert(focus);
        let next = ZoomTransform {
            x: focus.x - anchor.x * k,
            y: focus.y - anchor.y * k,
            k,
        };
        debug!(k, "zoom");
        self.set_transform(next, TransformOrigin::User);
    }

    pub fn current(&self) -> ZoomTransform {
        self.current
    }

    pub fn baseline(&self) -> Option<ZoomTransform> {
        self.baseline
    }

    /// Factor applied to fixed-size overlays (badges, plus signs) so they keep
    /// their on-screen size at any zoom.
    pub fn overlay_scale(&self) -> f64 {
        1.0 / self.current.k
    }

    /// Forget the user's transform; the next render picks the default again.
    pub fn reset(&mut self) {
        self.baseline = None;
        self.current = ZoomTransform::IDENTITY;
    }
}
