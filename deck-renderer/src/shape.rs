//! Per-variant drawing primitives.
//!
//! Shapes are expressed in deck millimetres at absolute positions. The
//! [`StageTransform`](crate::StageTransform) turns them into pixels at
//! export time.

use deck_core::deck::{
    ot_site_rect, rail_x, HAMILTON_RAIL_HEIGHT_MM, HAMILTON_TOP_MARGIN_MM, OT_DECK_SITE_LOCATIONS,
};
use deck_core::{Coordinate, Rect, Resource, ResourceId, ResourceKind};
use serde::Serialize;

/// Outline color of every resource shape.
pub const OUTLINE: &str = "black";
/// Fill of resources without a dedicated shape.
pub const RESOURCE_FILL: &str = "#5B6D8F";
/// Fill of plates and tip racks.
pub const LABWARE_FILL: &str = "#2B2D42";
/// Fill of a tip spot holding a tip.
pub const TIP_FILL: &str = "#40CDA1";
/// Outline of the selected resource.
pub const SELECTION_STROKE: &str = "orange";
/// Stroke of snap boxes and guide lines.
pub const GUIDE_STROKE: &str = "red";

/// Height of the rail label row below the rail area.
const RAIL_LABEL_Y_MM: f64 = 50.0;
const RAIL_LABEL_EVERY: u32 = 5;
const RAIL_LABEL_SIZE: f64 = 12.0;
const SITE_LABEL_SIZE: f64 = 16.0;

/// Fill, stroke and dash pattern of a primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Style {
    /// Fill color, `none` for outlines.
    pub fill: String,
    /// Stroke color.
    pub stroke: String,
    /// Stroke width in pixels.
    pub stroke_width: f64,
    /// Dash pattern `[on, off]` in pixels, solid when absent.
    pub dash: Option<[f64; 2]>,
}

impl Style {
    /// Filled shape with the standard black outline.
    #[must_use]
    pub fn filled(fill: impl Into<String>) -> Self {
        Self {
            fill: fill.into(),
            stroke: OUTLINE.to_string(),
            stroke_width: 1.0,
            dash: None,
        }
    }

    /// Unfilled stroke.
    #[must_use]
    pub fn stroke(stroke: impl Into<String>, width: f64) -> Self {
        Self {
            fill: "none".to_string(),
            stroke: stroke.into(),
            stroke_width: width,
            dash: None,
        }
    }

    /// Replace the fill.
    #[must_use]
    pub fn with_fill(mut self, fill: impl Into<String>) -> Self {
        self.fill = fill.into();
        self
    }

    /// Dash the stroke.
    #[must_use]
    pub fn dashed(mut self, on: f64, off: f64) -> Self {
        self.dash = Some([on, off]);
        self
    }
}

/// One entry of a display list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Axis-aligned rectangle.
    Rect {
        /// Resource this shape belongs to, `None` for overlays.
        owner: Option<ResourceId>,
        /// Bounds in deck millimetres.
        rect: Rect,
        /// Appearance.
        style: Style,
    },
    /// Circle.
    Circle {
        /// Resource this shape belongs to.
        owner: Option<ResourceId>,
        /// Center x.
        cx: f64,
        /// Center y.
        cy: f64,
        /// Radius in millimetres.
        radius: f64,
        /// Appearance.
        style: Style,
    },
    /// Straight segment.
    Line {
        /// Start point.
        from: (f64, f64),
        /// End point.
        to: (f64, f64),
        /// Appearance.
        style: Style,
    },
    /// Upright text label.
    Text {
        /// Anchor x.
        x: f64,
        /// Anchor y; the top of the text, or its middle when centered.
        y: f64,
        /// Label.
        content: String,
        /// Font size in pixels.
        font_size: f64,
        /// Text color.
        fill: String,
        /// Center the text on the anchor.
        centered: bool,
    },
    /// The trash drop zone.
    TrashIcon {
        /// Zone bounds.
        rect: Rect,
    },
}

impl DrawCommand {
    /// Resource that owns this command, if any.
    #[must_use]
    pub fn owner(&self) -> Option<ResourceId> {
        match self {
            Self::Rect { owner, .. } | Self::Circle { owner, .. } => *owner,
            Self::Line { .. } | Self::Text { .. } | Self::TrashIcon { .. } => None,
        }
    }

    /// Change the stroke of a resource's main shape.
    pub(crate) fn outline_with(&mut self, color: &str) {
        if let Self::Rect { style, .. } | Self::Circle { style, .. } = self {
            color.clone_into(&mut style.stroke);
        }
    }
}

/// Fill of a well, opacity proportional to how full it is.
#[must_use]
pub fn well_fill(fraction: f64) -> String {
    format!("rgba(239, 35, 60, {})", fraction.clamp(0.0, 1.0))
}

/// Shapes of a single resource drawn with its origin at `origin`.
///
/// The first command is the main shape, the one selection outlines.
#[must_use]
pub fn resource_shapes(resource: &Resource, origin: Coordinate) -> Vec<DrawCommand> {
    let owner = Some(resource.id);
    match &resource.kind {
        ResourceKind::HamiltonDeck { num_rails } => hamilton_deck(resource, origin, *num_rails),
        ResourceKind::OTDeck => ot_deck(resource, origin),
        ResourceKind::Trash => Vec::new(),
        ResourceKind::Plate { .. } | ResourceKind::TipRack { .. } => vec![DrawCommand::Rect {
            owner,
            rect: footprint(resource, origin),
            style: Style::filled(LABWARE_FILL),
        }],
        ResourceKind::Well(state) => vec![circle(
            resource,
            origin,
            Style::filled(well_fill(state.fill_fraction())),
        )],
        ResourceKind::TipSpot(state) => {
            let fill = if state.has_tip { TIP_FILL } else { "white" };
            vec![circle(resource, origin, Style::filled(fill))]
        }
        _ => vec![DrawCommand::Rect {
            owner,
            rect: footprint(resource, origin),
            style: Style::filled(RESOURCE_FILL),
        }],
    }
}

fn footprint(resource: &Resource, origin: Coordinate) -> Rect {
    Rect::new(origin.x, origin.y, resource.size_x, resource.size_y)
}

fn circle(resource: &Resource, origin: Coordinate, style: Style) -> DrawCommand {
    DrawCommand::Circle {
        owner: Some(resource.id),
        cx: origin.x + resource.size_x / 2.0,
        cy: origin.y + resource.size_y / 2.0,
        radius: resource.size_x / 2.0,
        style,
    }
}

fn hamilton_deck(resource: &Resource, origin: Coordinate, num_rails: u32) -> Vec<DrawCommand> {
    let top = origin.y + HAMILTON_TOP_MARGIN_MM;
    let bottom = top + HAMILTON_RAIL_HEIGHT_MM;
    let mut commands = vec![DrawCommand::Rect {
        owner: Some(resource.id),
        rect: Rect::new(origin.x, top, resource.size_x, HAMILTON_RAIL_HEIGHT_MM),
        style: Style::filled("white"),
    }];

    for rail in 0..num_rails {
        let x = origin.x + rail_x(rail);
        commands.push(DrawCommand::Line {
            from: (x, top),
            to: (x, bottom),
            style: Style::stroke(OUTLINE, 1.0),
        });
        // Rails are numbered from 1.
        if (rail + 1) % RAIL_LABEL_EVERY == 0 {
            commands.push(DrawCommand::Text {
                x,
                y: origin.y + RAIL_LABEL_Y_MM,
                content: (rail + 1).to_string(),
                font_size: RAIL_LABEL_SIZE,
                fill: OUTLINE.to_string(),
                centered: false,
            });
        }
    }
    commands
}

fn ot_deck(resource: &Resource, origin: Coordinate) -> Vec<DrawCommand> {
    let mut commands = Vec::with_capacity(OT_DECK_SITE_LOCATIONS.len() * 2);
    for (index, site) in OT_DECK_SITE_LOCATIONS.iter().enumerate() {
        let rect = ot_site_rect(origin, *site);
        // Every site rectangle belongs to the deck so that any of them can
        // carry the selection outline.
        commands.push(DrawCommand::Rect {
            owner: Some(resource.id),
            rect,
            style: Style::filled("white"),
        });
        let (cx, cy) = rect.center();
        commands.push(DrawCommand::Text {
            x: cx,
            y: cy,
            content: (index + 1).to_string(),
            font_size: SITE_LABEL_SIZE,
            fill: OUTLINE.to_string(),
            centered: true,
        });
    }
    commands
}
