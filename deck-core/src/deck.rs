//! Vendor deck geometry.
//!
//! ```text
//! Hamilton deck (rails)              Opentrons deck (numbered grid)
//!
//!  y = 63 + 497 ┬──┬──┬──┬──┬─      ┌────┐ ┌────┐ ┌────┐
//!               │  │  │  │  │        │ 10 │ │ 11 │ │ 12 │
//!               │  │  │  │  │        └────┘ └────┘ └────┘
//!               │  │  │  │  │         ...    ...    ...
//!  y = 63       ┴──┴──┴──┴──┴─      ┌────┐ ┌────┐ ┌────┐
//!              100 +22.5 ...         │  1 │ │  2 │ │  3 │
//!                                    └────┘ └────┘ └────┘
//! ```

use crate::{Coordinate, Rect};

/// Distance between two Hamilton rails.
pub const RAIL_PITCH_MM: f64 = 22.5;

/// X position of the first Hamilton rail.
pub const RAIL_START_MM: f64 = 100.0;

/// Offset from the Hamilton deck origin to the rail area.
pub const HAMILTON_TOP_MARGIN_MM: f64 = 63.0;

/// Usable rail height on a Hamilton deck.
pub const HAMILTON_RAIL_HEIGHT_MM: f64 = 497.0;

/// Number of rails on a default Hamilton STAR deck.
pub const DEFAULT_NUM_RAILS: u32 = 30;

/// Site width on the Opentrons deck.
pub const OT_SITE_WIDTH_MM: f64 = 128.0;

/// Site depth on the Opentrons deck.
pub const OT_SITE_HEIGHT_MM: f64 = 86.0;

/// Fixed location of the Opentrons deck.
pub const OT_DECK_LOCATION: Coordinate = Coordinate::new(115.65, 68.03, 0.0);

/// Offsets of the 12 numbered Opentrons sites, relative to the deck.
pub const OT_DECK_SITE_LOCATIONS: [(f64, f64); 12] = [
    (0.0, 0.0),
    (132.5, 0.0),
    (265.0, 0.0),
    (0.0, 90.5),
    (132.5, 90.5),
    (265.0, 90.5),
    (0.0, 181.0),
    (132.5, 181.0),
    (265.0, 181.0),
    (0.0, 271.5),
    (132.5, 271.5),
    (265.0, 271.5),
];

/// Default snap margin.
pub const SNAP_MARGIN_MM: f64 = 5.0;

/// X position of a Hamilton rail (0-based).
#[must_use]
pub fn rail_x(rail: u32) -> f64 {
    RAIL_START_MM + RAIL_PITCH_MM * f64::from(rail)
}

/// Absolute rectangle of an Opentrons site given the deck's absolute location.
#[must_use]
pub fn ot_site_rect(deck_location: Coordinate, site: (f64, f64)) -> Rect {
    Rect::new(
        deck_location.x + site.0,
        deck_location.y + site.1,
        OT_SITE_WIDTH_MM,
        OT_SITE_HEIGHT_MM,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rail_positions() {
        assert!((rail_x(0) - 100.0).abs() < f64::EPSILON);
        assert!((rail_x(1) - 122.5).abs() < f64::EPSILON);
        assert!((rail_x(29) - 752.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ot_site_rect() {
        let rect = ot_site_rect(OT_DECK_LOCATION, OT_DECK_SITE_LOCATIONS[4]);
        assert!((rect.x - 248.15).abs() < 1e-9);
        assert!((rect.y - 158.53).abs() < 1e-9);
        assert!((rect.width - 128.0).abs() < f64::EPSILON);
    }
}
