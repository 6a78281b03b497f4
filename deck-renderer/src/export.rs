//! Display list export to SVG.
//!
//! Shapes are projected through the [`StageTransform`] so the document is in
//! canvas pixels with the deck's y axis pointing up. Text is positioned
//! through the transform but never mirrored.

use std::fmt::Write;

use crate::display::DisplayList;
use crate::shape::{DrawCommand, Style};
use crate::stage::StageTransform;

const TRASH_BODY: &str = "#E0E0E0";
const TRASH_EDGE: &str = "#999";

/// Configuration for SVG export.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Background fill.
    pub background: String,
    /// Font family for labels.
    pub font_family: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            background: "white".to_string(),
            font_family: "sans-serif".to_string(),
        }
    }
}

/// Writes display lists as standalone SVG documents.
#[derive(Debug, Clone, Default)]
pub struct SvgExporter {
    config: ExportConfig,
}

impl SvgExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Render a display list to an SVG string.
    #[must_use]
    pub fn render_to_svg(&self, list: &DisplayList, stage: &StageTransform) -> String {
        let (width, height) = stage.canvas_size();
        let (width, height) = (num(width), num(height));

        let mut svg = String::with_capacity(4096 + list.len() * 96);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
        );
        let _ = write!(
            svg,
            "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
            escape_xml(&self.config.background),
        );

        for command in list.commands() {
            self.render_command(&mut svg, command, stage);
        }

        svg.push_str("</svg>");
        svg
    }

    fn render_command(&self, svg: &mut String, command: &DrawCommand, stage: &StageTransform) {
        match command {
            DrawCommand::Rect { rect, style, .. } => {
                let (x, y, w, h) = stage.screen_rect(*rect);
                let _ = write!(
                    svg,
                    "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{}/>",
                    num(x),
                    num(y),
                    num(w),
                    num(h),
                    style_attrs(style),
                );
            }
            DrawCommand::Circle {
                cx,
                cy,
                radius,
                style,
                ..
            } => {
                let (x, y) = stage.to_screen(*cx, *cy);
                let _ = write!(
                    svg,
                    "<circle cx=\"{}\" cy=\"{}\" r=\"{}\"{}/>",
                    num(x),
                    num(y),
                    num(stage.length(*radius)),
                    style_attrs(style),
                );
            }
            DrawCommand::Line { from, to, style } => {
                let (x1, y1) = stage.to_screen(from.0, from.1);
                let (x2, y2) = stage.to_screen(to.0, to.1);
                let _ = write!(
                    svg,
                    "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\"{}/>",
                    num(x1),
                    num(y1),
                    num(x2),
                    num(y2),
                    style_attrs(style),
                );
            }
            DrawCommand::Text {
                x,
                y,
                content,
                font_size,
                fill,
                centered,
            } => {
                let (px, py) = stage.to_screen(*x, *y);
                let placement = if *centered {
                    " text-anchor=\"middle\" dominant-baseline=\"middle\""
                } else {
                    " dominant-baseline=\"hanging\""
                };
                let _ = write!(
                    svg,
                    "<text x=\"{}\" y=\"{}\" font-size=\"{}\" fill=\"{}\" font-family=\"{}\"{placement}>{}</text>",
                    num(px),
                    num(py),
                    num(*font_size),
                    escape_xml(fill),
                    escape_xml(&self.config.font_family),
                    escape_xml(content),
                );
            }
            DrawCommand::TrashIcon { rect } => {
                let (x, y, w, h) = stage.screen_rect(*rect);
                let lid = h * 0.2;
                let inset = w * 0.15;
                let _ = write!(
                    svg,
                    "<g class=\"trash\"><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{TRASH_BODY}\" stroke=\"{TRASH_EDGE}\" stroke-width=\"1\"/><line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{TRASH_EDGE}\" stroke-width=\"2\"/></g>",
                    num(x + inset),
                    num(y + lid),
                    num(w - 2.0 * inset),
                    num(h - lid),
                    num(x),
                    num(y + lid),
                    num(x + w),
                    num(y + lid),
                );
            }
        }
    }
}

fn style_attrs(style: &Style) -> String {
    let mut attrs = format!(
        " fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"",
        escape_xml(&style.fill),
        escape_xml(&style.stroke),
        num(style.stroke_width),
    );
    if let Some([on, off]) = style.dash {
        let _ = write!(attrs, " stroke-dasharray=\"{} {}\"", num(on), num(off));
    }
    attrs
}

/// Format a coordinate with at most three decimals.
fn num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    // Avoid "-0" in the output.
    if rounded.abs() < f64::EPSILON {
        return "0".to_string();
    }
    format!("{rounded}")
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use deck_core::{Coordinate, DeckScene, DeckSurface, Rect, Resource, ResourceKind};

    use crate::view::EditorView;

    fn scene() -> DeckScene {
        let deck = Resource::new(
            "deck",
            ResourceKind::HamiltonDeck { num_rails: 30 },
            (1360.0, 653.5, 900.0),
        );
        let mut scene = DeckScene::with_root(deck);
        let root = scene.root().expect("root");
        let plate = Resource::new(
            "plate<1>",
            ResourceKind::Plate {
                num_items_x: 0,
                num_items_y: 0,
            },
            (127.0, 86.0, 14.5),
        )
        .with_location(Coordinate::planar(400.0, 300.0));
        scene.insert(plate, Some(root)).expect("plate");
        scene
    }

    fn stage() -> StageTransform {
        StageTransform::fit(775.0, 653.5, 775.0, 653.5).expect("stage")
    }

    #[test]
    fn test_document_frame() {
        let list = DisplayList::build(&scene(), &EditorView::default(), (775.0, 653.5))
            .expect("list");
        let svg = SvgExporter::with_defaults().render_to_svg(&list, &stage());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("width=\"775\""));
        assert!(svg.contains("height=\"653.5\""));
        assert!(svg.contains("fill=\"white\""));
    }

    #[test]
    fn test_plate_rect_is_flipped() {
        let list = DisplayList::build(&scene(), &EditorView::default(), (775.0, 653.5))
            .expect("list");
        let svg = SvgExporter::with_defaults().render_to_svg(&list, &stage());
        // Top edge of the plate is y = 386 in deck space.
        assert!(svg.contains(
            "<rect x=\"400\" y=\"267.5\" width=\"127\" height=\"86\" fill=\"#2B2D42\""
        ));
    }

    #[test]
    fn test_rail_labels_are_upright_text() {
        let list = DisplayList::build(&scene(), &EditorView::default(), (775.0, 653.5))
            .expect("list");
        let svg = SvgExporter::with_defaults().render_to_svg(&list, &stage());
        assert!(svg.contains(">30</text>"));
        assert!(svg.contains("dominant-baseline=\"hanging\""));
    }

    #[test]
    fn test_overlays_are_dashed() {
        let mut view = EditorView::default();
        view.show_snap_box(Rect::new(0.0, 0.0, 10.0, 10.0));
        view.set_trash_visible(true);
        let list = DisplayList::build(&scene(), &view, (775.0, 653.5)).expect("list");
        let svg = SvgExporter::with_defaults().render_to_svg(&list, &stage());
        assert!(svg.contains("stroke-dasharray=\"10 5\""));
        assert!(svg.contains("class=\"trash\""));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut view = EditorView::default();
        view.show_tooltip("plate<1> (Plate)", 463.5, 343.0);
        let list = DisplayList::build(&scene(), &view, (775.0, 653.5)).expect("list");
        let svg = SvgExporter::with_defaults().render_to_svg(&list, &stage());
        assert!(svg.contains("plate&lt;1&gt; (Plate)"));
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(100.0), "100");
        assert_eq!(num(0.123_456), "0.123");
        assert_eq!(num(-0.0001), "0");
    }
}
