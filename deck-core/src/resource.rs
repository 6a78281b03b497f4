//! Deck resources - the nodes of the layout tree.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::container::ContainerState;
use crate::deck::HAMILTON_RAIL_HEIGHT_MM;
use crate::tip::TipSpotState;
use crate::Coordinate;

/// Stable handle for a resource inside a [`crate::DeckScene`].
///
/// Parent/child links are stored as handles, never as references, so a
/// destroyed resource can only ever produce lookup misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(Uuid);

impl ResourceId {
    /// Create a new unique resource ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Variant tag of a resource, as written in layout records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum ResourceType {
    /// Generic resource without extra behaviour.
    Resource,
    /// Generic deck.
    Deck,
    /// Hamilton STAR deck with rails.
    HamiltonDeck,
    /// Opentrons deck with 12 numbered sites.
    OTDeck,
    /// Trash.
    Trash,
    /// Generic carrier.
    Carrier,
    /// Carrier holding plates.
    PlateCarrier,
    /// Carrier holding tip racks.
    TipCarrier,
    /// Slot within a carrier.
    CarrierSite,
    /// Microplate.
    Plate,
    /// Generic liquid container.
    Container,
    /// Well of a plate.
    Well,
    /// Tip rack.
    TipRack,
    /// Spot for a single tip in a tip rack.
    TipSpot,
}

impl ResourceType {
    /// Every known type, in declaration order.
    pub const ALL: [Self; 14] = [
        Self::Resource,
        Self::Deck,
        Self::HamiltonDeck,
        Self::OTDeck,
        Self::Trash,
        Self::Carrier,
        Self::PlateCarrier,
        Self::TipCarrier,
        Self::CarrierSite,
        Self::Plate,
        Self::Container,
        Self::Well,
        Self::TipRack,
        Self::TipSpot,
    ];

    /// Look up a type by its layout tag. Unknown tags map to [`ResourceType::Resource`].
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == tag)
            .unwrap_or(Self::Resource)
    }

    /// The layout tag of this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Resource => "Resource",
            Self::Deck => "Deck",
            Self::HamiltonDeck => "HamiltonDeck",
            Self::OTDeck => "OTDeck",
            Self::Trash => "Trash",
            Self::Carrier => "Carrier",
            Self::PlateCarrier => "PlateCarrier",
            Self::TipCarrier => "TipCarrier",
            Self::CarrierSite => "CarrierSite",
            Self::Plate => "Plate",
            Self::Container => "Container",
            Self::Well => "Well",
            Self::TipRack => "TipRack",
            Self::TipSpot => "TipSpot",
        }
    }

    /// Whether this is one of the deck (root) types.
    #[must_use]
    pub const fn is_deck(self) -> bool {
        matches!(self, Self::Deck | Self::HamiltonDeck | Self::OTDeck)
    }

    /// Whether this is one of the carrier types.
    #[must_use]
    pub const fn is_carrier(self) -> bool {
        matches!(self, Self::Carrier | Self::PlateCarrier | Self::TipCarrier)
    }

    /// Whether resources of this type can be picked up and dragged.
    #[must_use]
    pub const fn is_draggable(self) -> bool {
        !matches!(
            self,
            Self::Deck
                | Self::HamiltonDeck
                | Self::OTDeck
                | Self::CarrierSite
                | Self::Well
                | Self::TipSpot
        )
    }

    /// Whether resources of this type can be deleted by the user.
    #[must_use]
    pub const fn can_delete(self) -> bool {
        self.is_draggable()
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Variant-specific data of a resource.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceKind {
    /// Generic resource.
    Resource,
    /// Generic deck.
    Deck,
    /// Hamilton deck.
    HamiltonDeck {
        /// Number of rails.
        num_rails: u32,
    },
    /// Opentrons deck.
    OTDeck,
    /// Trash.
    Trash,
    /// Generic carrier.
    Carrier,
    /// Plate carrier.
    PlateCarrier,
    /// Tip carrier.
    TipCarrier,
    /// Carrier slot.
    CarrierSite {
        /// Index of the slot within its carrier.
        spot: u32,
    },
    /// Microplate.
    Plate {
        /// Columns of wells.
        num_items_x: u32,
        /// Rows of wells.
        num_items_y: u32,
    },
    /// Generic container.
    Container(ContainerState),
    /// Well.
    Well(ContainerState),
    /// Tip rack.
    TipRack {
        /// Columns of tip spots.
        num_items_x: u32,
        /// Rows of tip spots.
        num_items_y: u32,
    },
    /// Tip spot.
    TipSpot(TipSpotState),
}

impl ResourceKind {
    /// The variant tag.
    #[must_use]
    pub const fn resource_type(&self) -> ResourceType {
        match self {
            Self::Resource => ResourceType::Resource,
            Self::Deck => ResourceType::Deck,
            Self::HamiltonDeck { .. } => ResourceType::HamiltonDeck,
            Self::OTDeck => ResourceType::OTDeck,
            Self::Trash => ResourceType::Trash,
            Self::Carrier => ResourceType::Carrier,
            Self::PlateCarrier => ResourceType::PlateCarrier,
            Self::TipCarrier => ResourceType::TipCarrier,
            Self::CarrierSite { .. } => ResourceType::CarrierSite,
            Self::Plate { .. } => ResourceType::Plate,
            Self::Container(_) => ResourceType::Container,
            Self::Well(_) => ResourceType::Well,
            Self::TipRack { .. } => ResourceType::TipRack,
            Self::TipSpot(_) => ResourceType::TipSpot,
        }
    }

    /// Liquid state, for containers and wells.
    #[must_use]
    pub fn container(&self) -> Option<&ContainerState> {
        match self {
            Self::Container(state) | Self::Well(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable liquid state, for containers and wells.
    pub fn container_mut(&mut self) -> Option<&mut ContainerState> {
        match self {
            Self::Container(state) | Self::Well(state) => Some(state),
            _ => None,
        }
    }

    /// Tip state, for tip spots.
    #[must_use]
    pub fn tip_spot(&self) -> Option<&TipSpotState> {
        match self {
            Self::TipSpot(state) => Some(state),
            _ => None,
        }
    }

    /// Mutable tip state, for tip spots.
    pub fn tip_spot_mut(&mut self) -> Option<&mut TipSpotState> {
        match self {
            Self::TipSpot(state) => Some(state),
            _ => None,
        }
    }

    /// Item grid and child name infix for plates and tip racks.
    #[must_use]
    pub const fn item_grid(&self) -> Option<(u32, u32, &'static str)> {
        match self {
            Self::Plate {
                num_items_x,
                num_items_y,
            } => Some((*num_items_x, *num_items_y, "well")),
            Self::TipRack {
                num_items_x,
                num_items_y,
            } => Some((*num_items_x, *num_items_y, "tipspot")),
            _ => None,
        }
    }

    /// Usable rail height, for Hamilton decks.
    #[must_use]
    pub const fn rail_height(&self) -> Option<f64> {
        match self {
            Self::HamiltonDeck { .. } => Some(HAMILTON_RAIL_HEIGHT_MM),
            _ => None,
        }
    }
}

/// A node of the deck layout tree.
///
/// The location is relative to the parent; absolute positions are derived by
/// the scene on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    /// Handle of this resource.
    pub id: ResourceId,
    /// Unique name.
    pub name: String,
    /// Variant data.
    pub kind: ResourceKind,
    /// Offset relative to the parent, in millimetres.
    pub location: Coordinate,
    /// Extent along x.
    pub size_x: f64,
    /// Extent along y.
    pub size_y: f64,
    /// Extent along z.
    pub size_z: f64,
    pub(crate) parent: Option<ResourceId>,
    pub(crate) children: Vec<ResourceId>,
}

impl Resource {
    /// Create a detached resource.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ResourceKind, size: (f64, f64, f64)) -> Self {
        Self {
            id: ResourceId::new(),
            name: name.into(),
            kind,
            location: Coordinate::zero(),
            size_x: size.0,
            size_y: size.1,
            size_z: size.2,
            parent: None,
            children: Vec::new(),
        }
    }

    /// Set the location relative to the future parent.
    #[must_use]
    pub fn with_location(mut self, location: Coordinate) -> Self {
        self.location = location;
        self
    }

    /// The variant tag.
    #[must_use]
    pub fn resource_type(&self) -> ResourceType {
        self.kind.resource_type()
    }

    /// Parent handle, `None` for the root and for unrooted resources.
    #[must_use]
    pub fn parent(&self) -> Option<ResourceId> {
        self.parent
    }

    /// Children in z-order.
    #[must_use]
    pub fn children(&self) -> &[ResourceId] {
        &self.children
    }

    /// Variant name as written in layout records.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.resource_type().as_str()
    }

    /// Label shown when hovering the resource.
    #[must_use]
    pub fn tooltip_label(&self) -> String {
        format!("{} ({})", self.name, self.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags_round_trip() {
        for ty in ResourceType::ALL {
            assert_eq!(ResourceType::from_tag(ty.as_str()), ty);
        }
        assert_eq!(ResourceType::from_tag("Lid"), ResourceType::Resource);
    }

    #[test]
    fn test_draggable_types() {
        assert!(ResourceType::Plate.is_draggable());
        assert!(ResourceType::PlateCarrier.is_draggable());
        assert!(!ResourceType::HamiltonDeck.is_draggable());
        assert!(!ResourceType::Well.is_draggable());
        assert!(!ResourceType::CarrierSite.can_delete());
    }

    #[test]
    fn test_item_grid() {
        let plate = ResourceKind::Plate {
            num_items_x: 12,
            num_items_y: 8,
        };
        assert_eq!(plate.item_grid(), Some((12, 8, "well")));
        assert_eq!(ResourceKind::Carrier.item_grid(), None);
    }

    #[test]
    fn test_tooltip_label() {
        let plate = Resource::new(
            "plate_01",
            ResourceKind::Plate {
                num_items_x: 12,
                num_items_y: 8,
            },
            (127.0, 86.0, 14.5),
        );
        assert_eq!(plate.tooltip_label(), "plate_01 (Plate)");
    }
}
