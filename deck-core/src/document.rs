//! Canonical persisted form of an editing session.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::layout::{ResourceRecord, StateRecord};
use crate::{DeckError, DeckResult, DeckScene};

/// A layout together with its state projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    /// Session the layout belongs to.
    pub session_id: String,
    /// Structural layout, rooted at the deck.
    pub layout: ResourceRecord,
    /// Liquid and tip state by resource name.
    #[serde(default)]
    pub state: BTreeMap<String, StateRecord>,
    /// Timestamp in milliseconds.
    pub timestamp: u64,
}

impl LayoutDocument {
    /// Snapshot a scene.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::InvalidOperation`] if the scene has no deck.
    pub fn from_scene(
        session_id: impl Into<String>,
        scene: &DeckScene,
        timestamp: u64,
    ) -> DeckResult<Self> {
        let layout = scene
            .to_layout()
            .ok_or_else(|| DeckError::InvalidOperation("scene has no deck".into()))?;
        Ok(Self {
            session_id: session_id.into(),
            layout,
            state: scene.serialize_state(),
            timestamp,
        })
    }

    /// Rebuild the scene, state included.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout or state cannot be applied.
    pub fn to_scene(&self) -> DeckResult<DeckScene> {
        let mut scene = DeckScene::from_layout(&self.layout)?;
        scene.load_state(&self.state)?;
        Ok(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContainerState, Resource, ResourceKind};

    #[test]
    fn test_document_carries_state() {
        let mut scene = DeckScene::with_root(Resource::new(
            "deck",
            ResourceKind::Deck,
            (1000.0, 600.0, 0.0),
        ));
        let root = scene.root().expect("root");
        scene
            .insert(
                Resource::new(
                    "trough",
                    ResourceKind::Container(ContainerState::new(1000.0)),
                    (20.0, 80.0, 40.0),
                ),
                Some(root),
            )
            .expect("trough");
        scene
            .container_mut("trough")
            .expect("container")
            .dispense("trough", 250.0)
            .expect("dispense");

        let doc = LayoutDocument::from_scene("s1", &scene, 42).expect("document");
        let restored = doc.to_scene().expect("scene");

        let volume = restored.container("trough").expect("container").volume();
        assert!((volume - 250.0).abs() < 1e-9);
        assert_eq!(doc.timestamp, 42);
    }

    #[test]
    fn test_document_requires_deck() {
        let scene = DeckScene::new();
        assert!(LayoutDocument::from_scene("s1", &scene, 0).is_err());
    }
}
