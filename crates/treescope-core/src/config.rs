use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_VIEW_CONFIG_YAML: &str = include_str!("../config/view.default.yaml");

/// Settings for one tree view: canvas size, identity, interaction and transition timing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub viewport: ViewportConfig,
    pub transition: TransitionConfig,
    pub identity: IdentityConfig,
    pub interaction: InteractionConfig,
}

/// Layout canvas. Depth runs along the width, siblings along the height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        ViewportConfig {
            width: 1200.0,
            height: 800.0,
            margin_left: 80.0,
            margin_right: 160.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub duration_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        TransitionConfig {
            duration_ms: 2500,
            poll_interval_ms: 50,
        }
    }
}

impl TransitionConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Controls the structural fallback key used for nodes without an explicit id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// How many characters of the state string enter the key.
    pub state_prefix_len: usize,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        IdentityConfig {
            state_prefix_len: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Pointer travel (screen units) under which a drag resolves as a click.
    pub click_threshold: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        InteractionConfig {
            click_threshold: 3.0,
            min_zoom: 0.1,
            max_zoom: 4.0,
        }
    }
}

impl ViewConfig {
    /// Parse a view config from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ViewConfigError> {
        let config: ViewConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a view config from a YAML file path.
    pub fn from_yaml_path(path: impl AsRef<Path>) -> Result<Self, ViewConfigError> {
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Return the default YAML config included with this crate.
    pub fn default_yaml() -> &'static str {
        DEFAULT_VIEW_CONFIG_YAML
    }

    /// Parse the default YAML config included with this crate.
    pub fn from_default_yaml() -> Result<Self, ViewConfigError> {
        Self::from_yaml_str(Self::default_yaml())
    }

    pub fn validate(&self) -> Result<(), ViewConfigError> {
        let viewport = &self.viewport;
        if !viewport.width.is_finite() || viewport.width <= 0.0 {
            return Err(invalid("viewport.width must be finite and > 0"));
        }
        if !viewport.height.is_finite() || viewport.height <= 0.0 {
            return Err(invalid("viewport.height must be finite and > 0"));
        }
        if !viewport.margin_left.is_finite()
            || !viewport.margin_right.is_finite()
            || viewport.margin_left < 0.0
            || viewport.margin_right < 0.0
        {
            return Err(invalid("viewport margins must be finite and >= 0"));
        }
        if viewport.margin_left + viewport.margin_right >= viewport.width {
            return Err(invalid("viewport margins must leave room for the tree"));
        }
        if self.transition.duration_ms == 0 {
            return Err(invalid("transition.duration_ms must be greater than 0"));
        }
        if self.transition.poll_interval_ms == 0 {
            return Err(invalid("transition.poll_interval_ms must be greater than 0"));
        }
        if self.identity.state_prefix_len == 0 {
            return Err(invalid("identity.state_prefix_len must be greater than 0"));
        }
        let interaction = &self.interaction;
        if !interaction.click_threshold.is_finite() || interaction.click_threshold < 0.0 {
            return Err(invalid("interaction.click_threshold must be finite and >= 0"));
        }
        if !interaction.min_zoom.is_finite()
            || !interaction.max_zoom.is_finite()
            || interaction.min_zoom <= 0.0
            || interaction.min_zoom >= interaction.max_zoom
        {
            return Err(invalid(
                "interaction zoom bounds must be finite with 0 < min_zoom < max_zoom",
            ));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ViewConfigError {
    ViewConfigError::Invalid(message.to_string())
}

/// Error type for loading and validating `ViewConfig`.
#[derive(Debug, Error)]
pub enum ViewConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid view config: {0}")]
    Invalid(String),
}
