//! Layout records: the persisted, tree-shaped description of a deck.
//!
//! Structure and state are kept apart. A [`ResourceRecord`] carries the type
//! tag, geometry, variant fields and children of a resource; a
//! [`StateRecord`] carries liquids or tip presence and is produced by the
//! separate [`DeckScene::serialize_state`] path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::container::{ContainerState, Liquid};
use crate::deck::{DEFAULT_NUM_RAILS, OT_DECK_LOCATION};
use crate::tip::TipSpotState;
use crate::{
    Coordinate, DeckError, DeckResult, DeckScene, Resource, ResourceId, ResourceKind,
    ResourceType,
};

/// Location as written in layout files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// X offset.
    pub x: f64,
    /// Y offset.
    pub y: f64,
    /// Z offset.
    #[serde(default)]
    pub z: f64,
    /// Always `"Coordinate"`.
    #[serde(rename = "type", default = "LocationRecord::coordinate_tag")]
    pub tag: String,
}

impl LocationRecord {
    fn coordinate_tag() -> String {
        "Coordinate".to_string()
    }
}

impl From<Coordinate> for LocationRecord {
    fn from(c: Coordinate) -> Self {
        Self {
            x: c.x,
            y: c.y,
            z: c.z,
            tag: Self::coordinate_tag(),
        }
    }
}

impl From<&LocationRecord> for Coordinate {
    fn from(record: &LocationRecord) -> Self {
        Self::new(record.x, record.y, record.z)
    }
}

/// Variant-specific fields, flattened into the resource record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantFields {
    /// Rail count of a Hamilton deck.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_rails: Option<u32>,
    /// Set on vendor decks; the trash is not part of their tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_trash: Option<bool>,
    /// Item columns of a plate or tip rack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_items_x: Option<u32>,
    /// Item rows of a plate or tip rack.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_items_y: Option<u32>,
    /// Maximum volume of a container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_volume: Option<f64>,
    /// Slot index of a carrier site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot: Option<u32>,
    /// Prototype tip of a tip spot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prototype_tip: Option<serde_json::Value>,
}

/// Serialized form of one resource and its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Unique name.
    pub name: String,
    /// Variant tag.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Location relative to the parent.
    pub location: LocationRecord,
    /// Extent along x.
    pub size_x: f64,
    /// Extent along y.
    pub size_y: f64,
    /// Extent along z.
    pub size_z: f64,
    /// Children in z-order.
    #[serde(default)]
    pub children: Vec<ResourceRecord>,
    /// Name of the parent, `None` for the root.
    #[serde(default)]
    pub parent_name: Option<String>,
    /// Variant fields.
    #[serde(flatten)]
    pub fields: VariantFields,
}

impl ResourceRecord {
    /// Parse a record from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is not a valid record.
    pub fn from_json(json: &str) -> DeckResult<Self> {
        serde_json::from_str(json).map_err(DeckError::Serialization)
    }

    /// Serialize the record to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> DeckResult<String> {
        serde_json::to_string_pretty(self).map_err(DeckError::Serialization)
    }

    /// Number of records in this subtree.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }
}

/// State of a stateful resource, kept outside the structural record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateRecord {
    /// Liquid stack of a container.
    Container {
        /// Committed liquids, bottom first.
        liquids: Vec<Liquid>,
        /// Liquids including pending operations.
        pending_liquids: Vec<Liquid>,
    },
    /// Tip presence of a tip spot.
    TipSpot {
        /// The tip held, if any.
        tip: Option<serde_json::Value>,
        /// The tip held including pending operations.
        pending_tip: Option<serde_json::Value>,
    },
}

/// Constructor registry: build the variant data for a record's type tag.
#[must_use]
pub fn kind_from_record(record: &ResourceRecord) -> ResourceKind {
    let fields = &record.fields;
    match ResourceType::from_tag(&record.resource_type) {
        ResourceType::Resource => ResourceKind::Resource,
        ResourceType::Deck => ResourceKind::Deck,
        ResourceType::HamiltonDeck => ResourceKind::HamiltonDeck {
            num_rails: fields.num_rails.unwrap_or(DEFAULT_NUM_RAILS),
        },
        ResourceType::OTDeck => ResourceKind::OTDeck,
        ResourceType::Trash => ResourceKind::Trash,
        ResourceType::Carrier => ResourceKind::Carrier,
        ResourceType::PlateCarrier => ResourceKind::PlateCarrier,
        ResourceType::TipCarrier => ResourceKind::TipCarrier,
        ResourceType::CarrierSite => ResourceKind::CarrierSite {
            spot: fields.spot.unwrap_or(0),
        },
        ResourceType::Plate => ResourceKind::Plate {
            num_items_x: fields.num_items_x.unwrap_or(0),
            num_items_y: fields.num_items_y.unwrap_or(0),
        },
        ResourceType::Container => {
            ResourceKind::Container(ContainerState::new(fields.max_volume.unwrap_or(0.0)))
        }
        ResourceType::Well => {
            ResourceKind::Well(ContainerState::new(fields.max_volume.unwrap_or(0.0)))
        }
        ResourceType::TipRack => ResourceKind::TipRack {
            num_items_x: fields.num_items_x.unwrap_or(0),
            num_items_y: fields.num_items_y.unwrap_or(0),
        },
        ResourceType::TipSpot => {
            ResourceKind::TipSpot(TipSpotState::new(fields.prototype_tip.clone()))
        }
    }
}

fn fields_for_kind(kind: &ResourceKind) -> VariantFields {
    match kind {
        ResourceKind::HamiltonDeck { num_rails } => VariantFields {
            num_rails: Some(*num_rails),
            no_trash: Some(true),
            ..VariantFields::default()
        },
        ResourceKind::OTDeck => VariantFields {
            no_trash: Some(true),
            ..VariantFields::default()
        },
        ResourceKind::CarrierSite { spot } => VariantFields {
            spot: Some(*spot),
            ..VariantFields::default()
        },
        ResourceKind::Plate {
            num_items_x,
            num_items_y,
        }
        | ResourceKind::TipRack {
            num_items_x,
            num_items_y,
        } => VariantFields {
            num_items_x: Some(*num_items_x),
            num_items_y: Some(*num_items_y),
            ..VariantFields::default()
        },
        ResourceKind::Container(state) | ResourceKind::Well(state) => VariantFields {
            max_volume: Some(state.max_volume),
            ..VariantFields::default()
        },
        ResourceKind::TipSpot(state) => VariantFields {
            prototype_tip: state.prototype_tip.clone(),
            ..VariantFields::default()
        },
        _ => VariantFields::default(),
    }
}

fn resource_from_record(record: &ResourceRecord) -> Resource {
    let kind = kind_from_record(record);
    let location = if matches!(kind, ResourceKind::OTDeck) {
        OT_DECK_LOCATION
    } else {
        Coordinate::from(&record.location)
    };
    Resource::new(
        record.name.clone(),
        kind,
        (record.size_x, record.size_y, record.size_z),
    )
    .with_location(location)
}

impl DeckScene {
    /// Build a scene from a root layout record.
    ///
    /// The scene is only returned once every record has been loaded, so a
    /// failing layout never yields a partial tree.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::DuplicateName`] if two records share a name.
    pub fn from_layout(record: &ResourceRecord) -> DeckResult<Self> {
        let mut scene = Self::new();
        scene.load_subtree(record, None)?;
        Ok(scene)
    }

    /// Parse a layout from JSON and build a scene.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or the layout is inconsistent.
    pub fn from_json(json: &str) -> DeckResult<Self> {
        Self::from_layout(&ResourceRecord::from_json(json)?)
    }

    /// Load a record whose parent is given by `parent_name`.
    ///
    /// A record without a parent becomes the root of an empty scene, or an
    /// unrooted resource otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::UnknownParent`] if the parent is not loaded and
    /// [`DeckError::DuplicateName`] if any name in the subtree is taken.
    pub fn load_resource(&mut self, record: &ResourceRecord) -> DeckResult<ResourceId> {
        let parent = match &record.parent_name {
            Some(name) => Some(
                self.id_of(name)
                    .ok_or_else(|| DeckError::UnknownParent(name.clone()))?,
            ),
            None => None,
        };

        let mut names = Vec::new();
        collect_names(record, &mut names);
        if let Some(taken) = names.into_iter().find(|n| self.contains_name(n)) {
            return Err(DeckError::DuplicateName(taken.to_string()));
        }
        let id = self.load_subtree(record, parent)?;
        if let Some(parent) = parent {
            self.update(parent);
        }
        Ok(id)
    }

    fn load_subtree(
        &mut self,
        record: &ResourceRecord,
        parent: Option<ResourceId>,
    ) -> DeckResult<ResourceId> {
        let resource = resource_from_record(record);
        let id = self.register(resource, parent)?;
        for child in &record.children {
            self.load_subtree(child, Some(id))?;
        }
        self.update(id);
        Ok(id)
    }

    fn register(&mut self, resource: Resource, parent: Option<ResourceId>) -> DeckResult<ResourceId> {
        match parent {
            // Child names are re-derived once per subtree in load_subtree.
            Some(parent) => {
                let id = self.register_detached(resource)?;
                self.link_child(parent, id);
                Ok(id)
            }
            None => self.insert(resource, None),
        }
    }

    /// Serialize the subtree rooted at `id`.
    #[must_use]
    pub fn serialize_resource(&self, id: ResourceId) -> Option<ResourceRecord> {
        let resource = self.get(id)?;
        let children = self
            .children(id)
            .iter()
            .filter_map(|&child| self.serialize_resource(child))
            .collect();
        Some(ResourceRecord {
            name: resource.name.clone(),
            resource_type: resource.resource_type().as_str().to_string(),
            location: LocationRecord::from(resource.location),
            size_x: resource.size_x,
            size_y: resource.size_y,
            size_z: resource.size_z,
            children,
            parent_name: resource
                .parent()
                .and_then(|p| self.get(p))
                .map(|p| p.name.clone()),
            fields: fields_for_kind(&resource.kind),
        })
    }

    /// Serialize the whole deck.
    #[must_use]
    pub fn to_layout(&self) -> Option<ResourceRecord> {
        self.root().and_then(|root| self.serialize_resource(root))
    }

    /// Serialize the whole deck to pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::InvalidOperation`] for a scene without a deck.
    pub fn to_json(&self) -> DeckResult<String> {
        self.to_layout()
            .ok_or_else(|| DeckError::InvalidOperation("scene has no deck".to_string()))?
            .to_json()
    }

    /// State records of every stateful resource in the deck, by name.
    #[must_use]
    pub fn serialize_state(&self) -> BTreeMap<String, StateRecord> {
        let mut state = BTreeMap::new();
        let Some(root) = self.root() else {
            return state;
        };
        for id in self.walk(root) {
            let Some(resource) = self.get(id) else {
                continue;
            };
            let record = match &resource.kind {
                ResourceKind::Container(c) | ResourceKind::Well(c) => StateRecord::Container {
                    liquids: c.liquids().to_vec(),
                    pending_liquids: c.liquids().to_vec(),
                },
                ResourceKind::TipSpot(spot) => StateRecord::TipSpot {
                    tip: spot.tip().cloned(),
                    pending_tip: spot.tip().cloned(),
                },
                _ => continue,
            };
            state.insert(resource.name.clone(), record);
        }
        state
    }

    /// Apply state records produced by [`DeckScene::serialize_state`].
    ///
    /// Names that are not in the scene, or that name a resource of a
    /// different kind, are skipped. Every record is checked before any is
    /// applied, so a failing load leaves the scene unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if a container record exceeds its maximum volume.
    pub fn load_state(&mut self, state: &BTreeMap<String, StateRecord>) -> DeckResult<()> {
        let mut staged = Vec::new();
        for (name, record) in state {
            let Some(id) = self.id_of(name) else {
                tracing::debug!("Skipping state for unknown resource {name}");
                continue;
            };
            let Some(resource) = self.get(id) else {
                continue;
            };
            let kind = match (record, &resource.kind) {
                (StateRecord::Container { liquids, .. }, ResourceKind::Container(c)) => {
                    let mut next = c.clone();
                    next.set_liquids(name, liquids.clone())?;
                    ResourceKind::Container(next)
                }
                (StateRecord::Container { liquids, .. }, ResourceKind::Well(c)) => {
                    let mut next = c.clone();
                    next.set_liquids(name, liquids.clone())?;
                    ResourceKind::Well(next)
                }
                (StateRecord::TipSpot { tip, .. }, ResourceKind::TipSpot(spot)) => {
                    ResourceKind::TipSpot(TipSpotState {
                        has_tip: tip.is_some(),
                        prototype_tip: spot.prototype_tip.clone().or_else(|| tip.clone()),
                    })
                }
                _ => {
                    tracing::warn!("State record for {name} does not match its resource type");
                    continue;
                }
            };
            staged.push((id, kind));
        }

        for (id, kind) in staged {
            if let Some(resource) = self.get_mut(id) {
                resource.kind = kind;
            }
        }
        Ok(())
    }
}

fn collect_names<'a>(record: &'a ResourceRecord, names: &mut Vec<&'a str>) {
    names.push(&record.name);
    for child in &record.children {
        collect_names(child, names);
    }
}
