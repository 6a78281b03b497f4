//! Deck scene: the resource tree and its name index.
//!
//! A [`DeckScene`] owns every live resource of one editing session. The tree
//! is stored as an arena keyed by [`ResourceId`]; the name index maps each
//! unique name to its handle.

use std::collections::HashMap;

use crate::container::ContainerState;
use crate::tip::TipSpotState;
use crate::{Coordinate, DeckError, DeckResult, Rect, Resource, ResourceId};

/// The resource tree of an editing session.
#[derive(Debug, Clone, Default)]
pub struct DeckScene {
    /// All resources, indexed by handle.
    resources: HashMap<ResourceId, Resource>,
    /// Unique name to handle.
    names: HashMap<String, ResourceId>,
    /// The deck.
    root: Option<ResourceId>,
}

impl DeckScene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scene rooted at the given deck.
    #[must_use]
    pub fn with_root(deck: Resource) -> Self {
        let mut scene = Self::new();
        let id = deck.id;
        scene.names.insert(deck.name.clone(), id);
        scene.resources.insert(
            id,
            Resource {
                parent: None,
                children: Vec::new(),
                ..deck
            },
        );
        scene.root = Some(id);
        scene
    }

    /// Register a resource and attach it under `parent`.
    ///
    /// With `parent == None` the resource becomes the root if the scene has
    /// none yet, otherwise it is registered unrooted until a drop attaches it.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::DuplicateName`] if the name is taken and
    /// [`DeckError::ResourceNotFound`] if the parent does not exist.
    pub fn insert(
        &mut self,
        resource: Resource,
        parent: Option<ResourceId>,
    ) -> DeckResult<ResourceId> {
        if let Some(parent_id) = parent {
            if !self.resources.contains_key(&parent_id) {
                return Err(DeckError::ResourceNotFound(parent_id.to_string()));
            }
        }
        let id = self.register_detached(resource)?;

        match parent {
            Some(parent_id) => {
                self.assign_child(parent_id, id);
            }
            None if self.root.is_none() => self.root = Some(id),
            None => tracing::debug!("Registered unrooted resource {}", self.name_of(id)),
        }
        Ok(id)
    }

    /// Register a resource in the arena and the name index without linking it.
    pub(crate) fn register_detached(&mut self, resource: Resource) -> DeckResult<ResourceId> {
        if self.names.contains_key(&resource.name) {
            return Err(DeckError::DuplicateName(resource.name));
        }
        let id = resource.id;
        self.names.insert(resource.name.clone(), id);
        self.resources.insert(
            id,
            Resource {
                parent: None,
                children: Vec::new(),
                ..resource
            },
        );
        Ok(id)
    }

    /// Handle of the root deck.
    #[must_use]
    pub fn root(&self) -> Option<ResourceId> {
        self.root
    }

    /// The root deck.
    #[must_use]
    pub fn deck(&self) -> Option<&Resource> {
        self.root.and_then(|id| self.resources.get(&id))
    }

    /// Get a resource by handle.
    #[must_use]
    pub fn get(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.get(&id)
    }

    /// Get a mutable resource by handle.
    ///
    /// Tree links are not reachable through this reference; use
    /// [`DeckScene::rename`] to change names.
    pub fn get_mut(&mut self, id: ResourceId) -> Option<&mut Resource> {
        self.resources.get_mut(&id)
    }

    /// Look up a handle by name.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<ResourceId> {
        self.names.get(name).copied()
    }

    /// Look up a resource by name.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&Resource> {
        self.id_of(name).and_then(|id| self.resources.get(&id))
    }

    /// Whether a name is registered.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Parent handle of a resource.
    #[must_use]
    pub fn parent(&self, id: ResourceId) -> Option<ResourceId> {
        self.resources.get(&id).and_then(|r| r.parent)
    }

    /// Children of a resource in z-order.
    #[must_use]
    pub fn children(&self, id: ResourceId) -> &[ResourceId] {
        self.resources
            .get(&id)
            .map(|r| r.children.as_slice())
            .unwrap_or(&[])
    }

    /// Number of registered resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the scene holds no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// All registered names, unordered.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    /// Whether `ancestor` is `id` or lies on its parent chain.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: ResourceId, id: ResourceId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Attach `child` as the last child of `parent`.
    ///
    /// Self-assignment, cycles and unknown handles are logged and ignored.
    /// A child that already has a parent is detached from it first.
    /// Returns whether the tree changed.
    pub fn assign_child(&mut self, parent: ResourceId, child: ResourceId) -> bool {
        if parent == child {
            tracing::error!("Cannot assign a resource to itself: {}", self.name_of(child));
            return false;
        }
        if !self.resources.contains_key(&parent) || !self.resources.contains_key(&child) {
            tracing::warn!("assign_child with unknown resource handle");
            return false;
        }
        if self.is_ancestor_or_self(child, parent) {
            tracing::error!(
                "Cannot assign {} below its own descendant {}",
                self.name_of(child),
                self.name_of(parent)
            );
            return false;
        }

        if let Some(old_parent) = self.parent(child) {
            self.unassign_child(old_parent, child);
        }
        self.link_child(parent, child);
        self.update(parent);
        true
    }

    /// Append `child` to `parent` without re-deriving names.
    pub(crate) fn link_child(&mut self, parent: ResourceId, child: ResourceId) {
        if let Some(node) = self.resources.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.resources.get_mut(&parent) {
            node.children.push(child);
        }
    }

    /// Detach `child` from `parent`. No-op if it is not a child of `parent`.
    ///
    /// Remaining children of a plate or tip rack are renamed to their new slots.
    pub fn unassign_child(&mut self, parent: ResourceId, child: ResourceId) {
        let Some(node) = self.resources.get_mut(&parent) else {
            return;
        };
        let Some(index) = node.children.iter().position(|&c| c == child) else {
            return;
        };
        node.children.remove(index);
        if let Some(child_node) = self.resources.get_mut(&child) {
            child_node.parent = None;
        }
        self.update(parent);
    }

    /// Absolute location: the sum of relative offsets up to the root.
    #[must_use]
    pub fn absolute_location(&self, id: ResourceId) -> Option<Coordinate> {
        let mut node = self.resources.get(&id)?;
        let mut location = node.location;
        while let Some(parent) = node.parent.and_then(|p| self.resources.get(&p)) {
            location = location + parent.location;
            node = parent;
        }
        Some(location)
    }

    /// Absolute footprint of a resource in the deck plane.
    #[must_use]
    pub fn absolute_rect(&self, id: ResourceId) -> Option<Rect> {
        let resource = self.resources.get(&id)?;
        let location = self.absolute_location(id)?;
        Some(Rect::new(
            location.x,
            location.y,
            resource.size_x,
            resource.size_y,
        ))
    }

    /// Destroy a resource and all its descendants.
    ///
    /// Descendants are unregistered before the resource itself, which is
    /// unregistered before it is detached from its parent. Returns the
    /// removed names, deepest first.
    pub fn destroy(&mut self, id: ResourceId) -> Vec<String> {
        let mut removed = Vec::new();
        self.destroy_into(id, &mut removed);
        removed
    }

    fn destroy_into(&mut self, id: ResourceId, removed: &mut Vec<String>) {
        let children = self.children(id).to_vec();
        for child in children.into_iter().rev() {
            self.destroy_into(child, removed);
        }

        let parent = self.parent(id);
        if let Some(resource) = self.resources.remove(&id) {
            self.names.remove(&resource.name);
            removed.push(resource.name);
        }
        if let Some(parent) = parent {
            self.unassign_child(parent, id);
        }
        if self.root == Some(id) {
            self.root = None;
        }
    }

    /// Rename a resource, keeping the name index consistent.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::DuplicateName`] if another resource has the name
    /// and [`DeckError::ResourceNotFound`] for an unknown handle.
    pub fn rename(&mut self, id: ResourceId, new_name: impl Into<String>) -> DeckResult<()> {
        let new_name = new_name.into();
        match self.names.get(&new_name) {
            Some(&existing) if existing == id => return Ok(()),
            Some(_) => return Err(DeckError::DuplicateName(new_name)),
            None => {}
        }
        let resource = self
            .resources
            .get_mut(&id)
            .ok_or_else(|| DeckError::ResourceNotFound(id.to_string()))?;
        let old_name = std::mem::replace(&mut resource.name, new_name.clone());
        self.names.remove(&old_name);
        self.names.insert(new_name, id);
        self.update(id);
        Ok(())
    }

    /// Re-derive deterministic child names of plates and tip racks.
    ///
    /// Child `i * num_items_y + j` is named `{name}_well_{i}_{j}` (plates) or
    /// `{name}_tipspot_{i}_{j}` (tip racks). Other resources are untouched.
    pub fn update(&mut self, id: ResourceId) {
        let Some(resource) = self.resources.get(&id) else {
            return;
        };
        let Some((num_x, num_y, infix)) = resource.kind.item_grid() else {
            return;
        };

        let mut renames = Vec::new();
        for i in 0..num_x {
            for j in 0..num_y {
                let index = (i * num_y + j) as usize;
                if let Some(&child) = resource.children.get(index) {
                    renames.push((child, format!("{}_{infix}_{i}_{j}", resource.name)));
                }
            }
        }

        // Release all old names first so that permutations cannot collide.
        for (child, _) in &renames {
            if let Some(node) = self.resources.get(child) {
                self.names.remove(&node.name);
            }
        }
        for (child, new_name) in renames {
            let Some(node) = self.resources.get_mut(&child) else {
                continue;
            };
            if self.names.contains_key(&new_name) {
                tracing::warn!("Cannot rename {} to {new_name}: name in use", node.name);
                self.names.insert(node.name.clone(), child);
                continue;
            }
            node.name.clone_from(&new_name);
            self.names.insert(new_name, child);
        }
    }

    /// Handles of the subtree rooted at `id`, in pre-order (z-order).
    #[must_use]
    pub fn walk(&self, id: ResourceId) -> Vec<ResourceId> {
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            if !self.resources.contains_key(&node) {
                continue;
            }
            order.push(node);
            stack.extend(self.children(node).iter().rev());
        }
        order
    }

    /// The top-most rooted resource whose footprint contains the point.
    ///
    /// Later siblings and descendants are drawn above earlier ones.
    #[must_use]
    pub fn resource_at(&self, x: f64, y: f64) -> Option<ResourceId> {
        let root = self.root?;
        self.walk(root)
            .into_iter()
            .filter(|&id| self.absolute_rect(id).is_some_and(|r| r.contains(x, y)))
            .last()
    }

    /// Liquid state of a container, by name.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::ResourceNotFound`] or [`DeckError::NotAContainer`].
    pub fn container(&self, name: &str) -> DeckResult<&ContainerState> {
        let resource = self
            .get_by_name(name)
            .ok_or_else(|| DeckError::ResourceNotFound(name.to_string()))?;
        resource
            .kind
            .container()
            .ok_or_else(|| DeckError::NotAContainer(name.to_string()))
    }

    /// Mutable liquid state of a container, by name.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::ResourceNotFound`] or [`DeckError::NotAContainer`].
    pub fn container_mut(&mut self, name: &str) -> DeckResult<&mut ContainerState> {
        let id = self
            .id_of(name)
            .ok_or_else(|| DeckError::ResourceNotFound(name.to_string()))?;
        self.resources
            .get_mut(&id)
            .and_then(|r| r.kind.container_mut())
            .ok_or_else(|| DeckError::NotAContainer(name.to_string()))
    }

    /// Tip state of a tip spot, by name.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::ResourceNotFound`] or [`DeckError::NotATipSpot`].
    pub fn tip_spot(&self, name: &str) -> DeckResult<&TipSpotState> {
        let resource = self
            .get_by_name(name)
            .ok_or_else(|| DeckError::ResourceNotFound(name.to_string()))?;
        resource
            .kind
            .tip_spot()
            .ok_or_else(|| DeckError::NotATipSpot(name.to_string()))
    }

    /// Mutable tip state of a tip spot, by name.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::ResourceNotFound`] or [`DeckError::NotATipSpot`].
    pub fn tip_spot_mut(&mut self, name: &str) -> DeckResult<&mut TipSpotState> {
        let id = self
            .id_of(name)
            .ok_or_else(|| DeckError::ResourceNotFound(name.to_string()))?;
        self.resources
            .get_mut(&id)
            .and_then(|r| r.kind.tip_spot_mut())
            .ok_or_else(|| DeckError::NotATipSpot(name.to_string()))
    }

    fn name_of(&self, id: ResourceId) -> &str {
        self.resources.get(&id).map_or("<unknown>", |r| r.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResourceKind;
    use proptest::prelude::*;

    fn deck() -> Resource {
        Resource::new("deck", ResourceKind::HamiltonDeck { num_rails: 30 }, (1360.0, 653.5, 900.0))
    }

    fn carrier(name: &str, x: f64) -> Resource {
        Resource::new(name, ResourceKind::PlateCarrier, (135.0, 497.0, 130.0))
            .with_location(Coordinate::new(x, 63.0, 100.0))
    }

    fn plate_with_wells(scene: &mut DeckScene, parent: ResourceId, name: &str) -> ResourceId {
        let plate = Resource::new(
            name,
            ResourceKind::Plate {
                num_items_x: 2,
                num_items_y: 2,
            },
            (127.0, 86.0, 14.0),
        );
        let plate_id = scene.insert(plate, Some(parent)).expect("plate");
        for k in 0..4 {
            let well = Resource::new(
                format!("tmp_{name}_{k}"),
                ResourceKind::Well(ContainerState::new(300.0)),
                (9.0, 9.0, 10.0),
            );
            scene.insert(well, Some(plate_id)).expect("well");
        }
        plate_id
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut scene = DeckScene::with_root(deck());
        let root = scene.root().expect("root");
        let id = scene.insert(carrier("car", 100.0), Some(root)).expect("insert");

        assert_eq!(scene.len(), 2);
        assert_eq!(scene.id_of("car"), Some(id));
        assert_eq!(scene.parent(id), Some(root));
        assert_eq!(scene.children(root), &[id]);
    }

    #[test]
    fn test_insert_duplicate_name_fails() {
        let mut scene = DeckScene::with_root(deck());
        let root = scene.root().expect("root");
        scene.insert(carrier("car", 100.0), Some(root)).expect("insert");
        let err = scene.insert(carrier("car", 200.0), Some(root)).unwrap_err();
        assert!(matches!(err, DeckError::DuplicateName(_)));
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_assign_child_to_itself_is_noop() {
        let mut scene = DeckScene::with_root(deck());
        let root = scene.root().expect("root");
        let id = scene.insert(carrier("car", 100.0), Some(root)).expect("insert");

        assert!(!scene.assign_child(id, id));
        assert_eq!(scene.parent(id), Some(root));
        assert!(scene.children(id).is_empty());
    }

    #[test]
    fn test_assign_child_rejects_cycle() {
        let mut scene = DeckScene::with_root(deck());
        let root = scene.root().expect("root");
        let car = scene.insert(carrier("car", 100.0), Some(root)).expect("insert");
        let plate = plate_with_wells(&mut scene, car, "p");

        assert!(!scene.assign_child(plate, car));
        assert_eq!(scene.parent(car), Some(root));
    }

    #[test]
    fn test_assign_child_moves_between_parents() {
        let mut scene = DeckScene::with_root(deck());
        let root = scene.root().expect("root");
        let a = scene.insert(carrier("a", 100.0), Some(root)).expect("a");
        let b = scene.insert(carrier("b", 300.0), Some(root)).expect("b");
        let plate = plate_with_wells(&mut scene, a, "p");

        assert!(scene.assign_child(b, plate));
        assert!(scene.children(a).is_empty());
        assert_eq!(scene.children(b), &[plate]);
    }

    #[test]
    fn test_unassign_child_not_present_is_noop() {
        let mut scene = DeckScene::with_root(deck());
        let root = scene.root().expect("root");
        let a = scene.insert(carrier("a", 100.0), Some(root)).expect("a");
        let b = scene.insert(carrier("b", 300.0), Some(root)).expect("b");

        scene.unassign_child(a, b);
        assert_eq!(scene.parent(b), Some(root));
        assert_eq!(scene.children(root).len(), 2);
    }

    #[test]
    fn test_absolute_location_sums_chain() {
        let mut scene = DeckScene::with_root(deck());
        let root = scene.root().expect("root");
        let car = scene.insert(carrier("car", 100.0), Some(root)).expect("insert");
        let plate = scene
            .insert(
                Resource::new(
                    "p",
                    ResourceKind::Plate {
                        num_items_x: 0,
                        num_items_y: 0,
                    },
                    (127.0, 86.0, 14.0),
                )
                .with_location(Coordinate::new(4.0, 8.5, 86.15)),
                Some(car),
            )
            .expect("plate");

        let abs = scene.absolute_location(plate).expect("location");
        assert!((abs.x - 104.0).abs() < 1e-9);
        assert!((abs.y - 71.5).abs() < 1e-9);
        assert!((abs.z - 186.15).abs() < 1e-9);
    }

    #[test]
    fn test_destroy_cascades() {
        let mut scene = DeckScene::with_root(deck());
        let root = scene.root().expect("root");
        let car = scene.insert(carrier("car", 100.0), Some(root)).expect("insert");
        let plate = plate_with_wells(&mut scene, car, "p");

        let removed = scene.destroy(plate);

        assert_eq!(removed.len(), 5);
        assert_eq!(removed.last().map(String::as_str), Some("p"));
        assert!(!scene.contains_name("p"));
        assert!(!scene.contains_name("p_well_0_0"));
        assert!(scene.children(car).is_empty());
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_child_names_follow_grid() {
        let mut scene = DeckScene::with_root(deck());
        let root = scene.root().expect("root");
        let plate = plate_with_wells(&mut scene, root, "plate");

        let names: Vec<_> = scene
            .children(plate)
            .iter()
            .map(|&c| scene.get(c).expect("child").name.clone())
            .collect();
        assert_eq!(
            names,
            vec!["plate_well_0_0", "plate_well_0_1", "plate_well_1_0", "plate_well_1_1"]
        );
        assert!(scene.contains_name("plate_well_1_1"));
    }

    #[test]
    fn test_destroying_a_well_renames_remaining_slots() {
        let mut scene = DeckScene::with_root(deck());
        let root = scene.root().expect("root");
        let plate = plate_with_wells(&mut scene, root, "plate");
        let first = scene.id_of("plate_well_0_0").expect("well");
        let second = scene.id_of("plate_well_0_1").expect("well");

        assert_eq!(scene.destroy(first), vec!["plate_well_0_0".to_string()]);

        assert_eq!(scene.children(plate).len(), 3);
        assert_eq!(scene.id_of("plate_well_0_0"), Some(second));
        assert!(!scene.contains_name("plate_well_1_1"));
    }

    #[test]
    fn test_rename_reapplies_child_names() {
        let mut scene = DeckScene::with_root(deck());
        let root = scene.root().expect("root");
        let plate = plate_with_wells(&mut scene, root, "plate");

        scene.rename(plate, "assay").expect("rename");

        assert!(scene.contains_name("assay"));
        assert!(!scene.contains_name("plate"));
        assert!(scene.contains_name("assay_well_0_1"));
        assert!(!scene.contains_name("plate_well_0_1"));
    }

    #[test]
    fn test_rename_to_taken_name_fails() {
        let mut scene = DeckScene::with_root(deck());
        let root = scene.root().expect("root");
        let a = scene.insert(carrier("a", 100.0), Some(root)).expect("a");
        scene.insert(carrier("b", 300.0), Some(root)).expect("b");

        assert!(matches!(scene.rename(a, "b"), Err(DeckError::DuplicateName(_))));
        assert_eq!(scene.get(a).expect("a").name, "a");
    }

    #[test]
    fn test_resource_at_prefers_deepest() {
        let mut scene = DeckScene::with_root(deck());
        let root = scene.root().expect("root");
        let car = scene.insert(carrier("car", 100.0), Some(root)).expect("insert");

        assert_eq!(scene.resource_at(150.0, 200.0), Some(car));
        assert_eq!(scene.resource_at(50.0, 200.0), Some(root));
        assert_eq!(scene.resource_at(-10.0, -10.0), None);
    }

    #[test]
    fn test_unrooted_insert() {
        let mut scene = DeckScene::with_root(deck());
        let id = scene.insert(carrier("loose", 0.0), None).expect("insert");
        assert_eq!(scene.parent(id), None);
        assert_ne!(scene.root(), Some(id));
        assert!(!scene.walk(scene.root().expect("root")).contains(&id));
    }

    proptest! {
        #[test]
        fn prop_absolute_location_is_parent_plus_offset(
            offsets in proptest::collection::vec((-500.0f64..500.0, -500.0f64..500.0, 0.0f64..200.0), 1..8)
        ) {
            let mut scene = DeckScene::with_root(deck());
            let mut parent = scene.root().expect("root");
            let mut ids = Vec::new();
            for (k, (x, y, z)) in offsets.into_iter().enumerate() {
                let node = Resource::new(format!("n{k}"), ResourceKind::Resource, (10.0, 10.0, 10.0))
                    .with_location(Coordinate::new(x, y, z));
                parent = scene.insert(node, Some(parent)).expect("insert");
                ids.push(parent);
            }

            let root = scene.root().expect("root");
            let root_location = scene.get(root).expect("root").location;
            prop_assert_eq!(scene.absolute_location(root), Some(root_location));

            for id in ids {
                let own = scene.get(id).expect("node").location;
                let parent = scene.parent(id).expect("parent");
                let expected = scene.absolute_location(parent).expect("parent location") + own;
                let actual = scene.absolute_location(id).expect("location");
                prop_assert!((actual.x - expected.x).abs() < 1e-6);
                prop_assert!((actual.y - expected.y).abs() < 1e-6);
                prop_assert!((actual.z - expected.z).abs() < 1e-6);
            }
        }
    }
}
