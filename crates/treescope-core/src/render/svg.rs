use std::fmt::{self, Display, Formatter};

use crate::render::scene::Scene;

/// Borrowed SVG serialization of a scene.
pub struct SvgDocument<'a> {
    scene: &'a Scene,
}

impl Scene {
    pub fn svg(&self) -> SvgDocument<'_> {
        SvgDocument { scene: self }
    }

    pub fn to_svg(&self) -> String {
        self.svg().to_string()
    }
}

/// Escape the five XML special characters.
struct Escaped<'a>(&'a str);

impl Display for Escaped<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for ch in self.0.chars() {
            match ch {
                '&' => f.write_str("&amp;")?,
                '<' => f.write_str("&lt;")?,
                '>' => f.write_str("&gt;")?,
                '"' => f.write_str("&quot;")?,
                '\'' => f.write_str("&apos;")?,
                other => write!(f, "{other}")?,
            }
        }
        Ok(())
    }
}

impl Display for SvgDocument<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let scene = self.scene;
        let t = scene.transform;
        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = scene.width,
            h = scene.height
        )?;
        writeln!(
            f,
            r#"<g transform="translate({:.2},{:.2}) scale({:.4})">"#,
            t.x, t.y, t.k
        )?;

        for edge in &scene.edges {
            writeln!(
                f,
                r#"<path class="{}" d="{}" fill="none" opacity="{:.3}"/>"#,
                edge.class, edge.d, edge.opacity
            )?;
        }

        for node in &scene.nodes {
            writeln!(
                f,
                r#"<g class="node {}" data-key="{}" transform="translate({:.2},{:.2})" opacity="{:.3}">"#,
                node.class,
                Escaped(node.key.as_str()),
                node.center.x,
                node.center.y,
                node.opacity
            )?;
            writeln!(f, r#"<circle r="{:.2}"/>"#, node.radius)?;
            writeln!(
                f,
                r#"<text x="{:.2}" dy="0.35em">{}</text>"#,
                node.radius + 4.0,
                Escaped(&node.label)
            )?;
            writeln!(f, "</g>")?;
        }

        for badge in &scene.badges {
            writeln!(
                f,
                r#"<text class="badge" transform="translate({:.2},{:.2}) scale({:.4})" text-anchor="middle">{}</text>"#,
                badge.at.x,
                badge.at.y,
                badge.scale,
                Escaped(&badge.text)
            )?;
        }

        for plus in &scene.plus_signs {
            writeln!(
                f,
                r#"<text class="plus-sign" transform="translate({:.2},{:.2}) scale({:.4})" text-anchor="middle" dy="0.35em">+</text>"#,
                plus.at.x, plus.at.y, plus.scale
            )?;
        }

        if let Some(arrow) = &scene.arrow {
            writeln!(
                f,
                r#"<line class="transition-arrow" x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}"/>"#,
                arrow.from.x, arrow.from.y, arrow.to.x, arrow.to.y
            )?;
        }
        if let Some(annotation) = &scene.annotation {
            writeln!(
                f,
                r#"<text class="transition-annotation" x="{:.2}" y="{:.2}" opacity="{:.3}">{}</text>"#,
                annotation.at.x,
                annotation.at.y,
                annotation.opacity,
                Escaped(&annotation.text)
            )?;
        }

        writeln!(f, "</g>")?;
        write!(f, "</svg>")
    }
}
