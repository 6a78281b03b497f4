//! Editor state and event handling.
//!
//! [`DeckEditor`] is the single owner of one editing session: the scene, the
//! configuration, the active drag and the selection. Everything that changes
//! the picture is reported to a [`DeckSurface`] passed in by the host.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::drag::{DragOutcome, DragPreview, DragSession};
use crate::event::{DragEvent, DragPhase, InputEvent, RIGHT_BUTTON};
use crate::layout::StateRecord;
use crate::surface::DeckSurface;
use crate::{DeckError, DeckResult, DeckScene, EditorConfig, Liquid, ResourceId};

/// Callback invoked whenever the layout changes.
pub type ChangeCallback = Box<dyn FnMut(&DeckScene)>;

/// The editor's reaction to an input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "response", rename_all = "snake_case")]
pub enum EditorResponse {
    /// Nothing to do (unknown resource, malformed event, busy).
    Ignored,
    /// A drag session started.
    DragStarted {
        /// Dragged resource.
        resource: String,
    },
    /// A drag move was evaluated.
    Preview {
        /// What to show.
        preview: DragPreview,
    },
    /// A drag ended or was cancelled.
    Dropped {
        /// What happened to the layout.
        outcome: DragOutcome,
    },
    /// The selection changed.
    Selection {
        /// Newly selected resource, `None` when cleared.
        selected: Option<String>,
    },
    /// Show a tooltip.
    Tooltip {
        /// Label text.
        label: String,
        /// Anchor x (center of the resource).
        x: f64,
        /// Anchor y (center of the resource).
        y: f64,
    },
    /// Open the context menu for a resource.
    OpenContextMenu {
        /// Target resource.
        resource: String,
    },
}

/// One editing session.
pub struct DeckEditor {
    scene: DeckScene,
    config: EditorConfig,
    drag: Option<DragSession>,
    selected: Option<ResourceId>,
    on_change: Option<ChangeCallback>,
    has_local_changes: bool,
}

impl std::fmt::Debug for DeckEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeckEditor")
            .field("resources", &self.scene.len())
            .field("config", &self.config)
            .field("dragging", &self.drag.is_some())
            .field("selected", &self.selected)
            .field("has_local_changes", &self.has_local_changes)
            .finish_non_exhaustive()
    }
}

impl DeckEditor {
    /// Create an editor for an existing scene.
    #[must_use]
    pub fn new(scene: DeckScene, config: EditorConfig) -> Self {
        Self {
            scene,
            config,
            drag: None,
            selected: None,
            on_change: None,
            has_local_changes: false,
        }
    }

    /// Create an editor from a JSON layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout cannot be parsed or loaded.
    pub fn from_json(json: &str, config: EditorConfig) -> DeckResult<Self> {
        Ok(Self::new(DeckScene::from_json(json)?, config))
    }

    /// Replace the scene with a new JSON layout.
    ///
    /// Any active drag and the selection are dropped. On error the current
    /// scene is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout cannot be parsed or loaded.
    pub fn load_layout(&mut self, json: &str, surface: &mut dyn DeckSurface) -> DeckResult<()> {
        let scene = DeckScene::from_json(json)?;
        if let Some(old_root) = self.scene.root() {
            surface.remove(old_root);
        }
        self.scene = scene;
        self.drag = None;
        self.selected = None;
        self.has_local_changes = false;
        if let Some(root) = self.scene.root() {
            surface.redraw(root);
        }
        tracing::info!("Loaded layout with {} resources", self.scene.len());
        Ok(())
    }

    /// The scene.
    #[must_use]
    pub fn scene(&self) -> &DeckScene {
        &self.scene
    }

    /// Mutable access to the scene, for bulk edits by the host.
    pub fn scene_mut(&mut self) -> &mut DeckScene {
        &mut self.scene
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Toggle snapping at runtime.
    pub fn set_snapping_enabled(&mut self, enabled: bool) {
        self.config.snapping_enabled = enabled;
    }

    /// Name of the selected resource.
    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected
            .and_then(|id| self.scene.get(id))
            .map(|r| r.name.as_str())
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Whether the layout changed since it was loaded or last saved.
    #[must_use]
    pub fn has_local_changes(&self) -> bool {
        self.has_local_changes
    }

    /// Mark the current layout as persisted.
    pub fn mark_saved(&mut self) {
        self.has_local_changes = false;
    }

    /// Register the callback invoked after every layout change.
    pub fn set_on_change(&mut self, callback: impl FnMut(&DeckScene) + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    /// Process an input event.
    pub fn process_event(
        &mut self,
        event: &InputEvent,
        surface: &mut dyn DeckSurface,
    ) -> EditorResponse {
        match event {
            InputEvent::Drag(drag) => self.handle_drag(drag, surface),
            InputEvent::Click { resource, button } => {
                self.handle_click(resource.as_deref(), *button, surface)
            }
            InputEvent::Hover { resource } => self.handle_hover(resource.as_deref()),
            InputEvent::ContextMenu { resource } => {
                self.handle_context_menu(resource.as_deref(), surface)
            }
        }
    }

    /// Replay a complete drag of `name` to the absolute position `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::ResourceNotFound`] for an unknown name and
    /// [`DeckError::InvalidOperation`] if a drag is already active or the
    /// resource cannot be dragged.
    pub fn drag_to(
        &mut self,
        name: &str,
        x: f64,
        y: f64,
        surface: &mut dyn DeckSurface,
    ) -> DeckResult<DragOutcome> {
        if self.drag.is_some() {
            return Err(DeckError::InvalidOperation("a drag is already active".into()));
        }
        let id = self
            .scene
            .id_of(name)
            .ok_or_else(|| DeckError::ResourceNotFound(name.to_string()))?;
        let mut session = DragSession::start(&self.scene, surface, id).ok_or_else(|| {
            DeckError::InvalidOperation(format!("{name} cannot be dragged"))
        })?;
        let pose = session.pose_for_absolute(&self.scene, x, y);
        session.update(&self.scene, &self.config, surface, pose);
        Ok(self.commit(session, surface))
    }

    /// Delete a resource and its descendants.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::ResourceNotFound`] for an unknown name and
    /// [`DeckError::InvalidOperation`] for resources that cannot be deleted.
    pub fn delete_resource(
        &mut self,
        name: &str,
        surface: &mut dyn DeckSurface,
    ) -> DeckResult<Vec<String>> {
        let resource = self
            .scene
            .get_by_name(name)
            .ok_or_else(|| DeckError::ResourceNotFound(name.to_string()))?;
        if !resource.resource_type().can_delete() {
            return Err(DeckError::InvalidOperation(format!("{name} cannot be deleted")));
        }
        let id = resource.id;
        let removed = self.scene.destroy(id);
        surface.remove(id);
        self.forget_removed(surface);
        self.notify_change();
        Ok(removed)
    }

    /// Rename a resource.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::ResourceNotFound`] or [`DeckError::DuplicateName`].
    pub fn rename_resource(
        &mut self,
        name: &str,
        new_name: &str,
        surface: &mut dyn DeckSurface,
    ) -> DeckResult<()> {
        let id = self
            .scene
            .id_of(name)
            .ok_or_else(|| DeckError::ResourceNotFound(name.to_string()))?;
        self.scene.rename(id, new_name)?;
        surface.redraw(id);
        self.notify_change();
        Ok(())
    }

    /// Aspirate from a container.
    ///
    /// # Errors
    ///
    /// Lookup errors or [`DeckError::InsufficientVolume`]; state is unchanged on error.
    pub fn aspirate(
        &mut self,
        name: &str,
        volume: f64,
        surface: &mut dyn DeckSurface,
    ) -> DeckResult<()> {
        self.scene.container_mut(name)?.aspirate(name, volume)?;
        self.redraw_named(name, surface);
        Ok(())
    }

    /// Dispense unknown liquid into a container.
    ///
    /// # Errors
    ///
    /// Lookup errors or [`DeckError::OverCapacity`]; state is unchanged on error.
    pub fn dispense(
        &mut self,
        name: &str,
        volume: f64,
        surface: &mut dyn DeckSurface,
    ) -> DeckResult<()> {
        self.scene.container_mut(name)?.dispense(name, volume)?;
        self.redraw_named(name, surface);
        Ok(())
    }

    /// Add a named liquid to a container.
    ///
    /// # Errors
    ///
    /// Lookup errors or [`DeckError::OverCapacity`]; state is unchanged on error.
    pub fn add_liquid(
        &mut self,
        name: &str,
        liquid: Liquid,
        surface: &mut dyn DeckSurface,
    ) -> DeckResult<()> {
        self.scene.container_mut(name)?.add_liquid(name, liquid)?;
        self.redraw_named(name, surface);
        Ok(())
    }

    /// Pick up the tip from a tip spot.
    ///
    /// # Errors
    ///
    /// Lookup errors or [`DeckError::NoTipPresent`]; state is unchanged on error.
    pub fn pick_up_tip(&mut self, name: &str, surface: &mut dyn DeckSurface) -> DeckResult<()> {
        self.scene.tip_spot_mut(name)?.pick_up_tip(name)?;
        self.redraw_named(name, surface);
        Ok(())
    }

    /// Return a tip to a tip spot.
    ///
    /// # Errors
    ///
    /// Lookup errors or [`DeckError::TipAlreadyPresent`]; state is unchanged on error.
    pub fn drop_tip(&mut self, name: &str, surface: &mut dyn DeckSurface) -> DeckResult<()> {
        self.scene.tip_spot_mut(name)?.drop_tip(name)?;
        self.redraw_named(name, surface);
        Ok(())
    }

    /// Apply a state projection and redraw every stateful resource it names.
    ///
    /// # Errors
    ///
    /// Returns an error if a container state violates its capacity.
    pub fn load_state(
        &mut self,
        state: &BTreeMap<String, StateRecord>,
        surface: &mut dyn DeckSurface,
    ) -> DeckResult<()> {
        self.scene.load_state(state)?;
        for name in state.keys() {
            self.redraw_named(name, surface);
        }
        Ok(())
    }

    fn handle_drag(&mut self, event: &DragEvent, surface: &mut dyn DeckSurface) -> EditorResponse {
        let Some(name) = event.resource.as_deref() else {
            tracing::debug!("Ignoring drag event without resource");
            return EditorResponse::Ignored;
        };

        if event.phase == DragPhase::Start {
            if self.drag.is_some() {
                tracing::warn!("Ignoring drag start on {name}: a drag is already active");
                return EditorResponse::Ignored;
            }
            let Some(id) = self.scene.id_of(name) else {
                return EditorResponse::Ignored;
            };
            return match DragSession::start(&self.scene, surface, id) {
                Some(session) => {
                    self.drag = Some(session);
                    EditorResponse::DragStarted {
                        resource: name.to_string(),
                    }
                }
                None => EditorResponse::Ignored,
            };
        }

        let Some(session) = self.drag.as_mut() else {
            return EditorResponse::Ignored;
        };
        if self.scene.id_of(name) != Some(session.resource()) {
            tracing::debug!("Ignoring drag event for {name}: not the dragged resource");
            return EditorResponse::Ignored;
        }

        match event.phase {
            DragPhase::Start => EditorResponse::Ignored,
            DragPhase::Move => {
                let preview = session.update(&self.scene, &self.config, surface, (event.x, event.y));
                EditorResponse::Preview { preview }
            }
            DragPhase::End => {
                // The release position may arrive without a preceding move.
                let (px, py) = session.pose();
                if (px - event.x).abs() > f64::EPSILON || (py - event.y).abs() > f64::EPSILON {
                    session.update(&self.scene, &self.config, surface, (event.x, event.y));
                }
                match self.drag.take() {
                    Some(session) => EditorResponse::Dropped {
                        outcome: self.commit(session, surface),
                    },
                    None => EditorResponse::Ignored,
                }
            }
            DragPhase::Cancel => match self.drag.take() {
                Some(session) => EditorResponse::Dropped {
                    outcome: session.cancel(&mut self.scene, surface),
                },
                None => EditorResponse::Ignored,
            },
        }
    }

    fn commit(&mut self, session: DragSession, surface: &mut dyn DeckSurface) -> DragOutcome {
        let outcome = session.finish(&mut self.scene, &self.config, surface);
        if matches!(outcome, DragOutcome::Deleted { .. }) {
            self.forget_removed(surface);
        }
        if outcome.changed_layout() {
            self.notify_change();
        }
        outcome
    }

    fn handle_click(
        &mut self,
        name: Option<&str>,
        button: u8,
        surface: &mut dyn DeckSurface,
    ) -> EditorResponse {
        if button == RIGHT_BUTTON {
            return EditorResponse::Ignored;
        }

        let clicked = name
            .and_then(|n| self.scene.id_of(n))
            .filter(|&id| Some(id) != self.selected)
            .filter(|&id| {
                self.scene
                    .get(id)
                    .is_some_and(|r| !r.resource_type().is_deck())
            });

        self.select(clicked, surface)
    }

    fn handle_hover(&self, name: Option<&str>) -> EditorResponse {
        let Some(resource) = name.and_then(|n| self.scene.get_by_name(n)) else {
            return EditorResponse::Ignored;
        };
        let Some(rect) = self.scene.absolute_rect(resource.id) else {
            return EditorResponse::Ignored;
        };
        let (x, y) = rect.center();
        EditorResponse::Tooltip {
            label: resource.tooltip_label(),
            x,
            y,
        }
    }

    fn handle_context_menu(
        &mut self,
        name: Option<&str>,
        surface: &mut dyn DeckSurface,
    ) -> EditorResponse {
        let Some(id) = name.and_then(|n| self.scene.id_of(n)) else {
            return EditorResponse::Ignored;
        };
        self.select(Some(id), surface);
        EditorResponse::OpenContextMenu {
            resource: self.selected().unwrap_or_default().to_string(),
        }
    }

    fn select(&mut self, id: Option<ResourceId>, surface: &mut dyn DeckSurface) -> EditorResponse {
        if let Some(previous) = self.selected.take() {
            surface.redraw(previous);
        }
        self.selected = id;
        surface.set_selection(id);
        EditorResponse::Selection {
            selected: self.selected().map(str::to_string),
        }
    }

    /// Drop the selection if it no longer exists.
    fn forget_removed(&mut self, surface: &mut dyn DeckSurface) {
        if self.selected.is_some_and(|id| self.scene.get(id).is_none()) {
            self.selected = None;
            surface.set_selection(None);
        }
    }

    fn redraw_named(&self, name: &str, surface: &mut dyn DeckSurface) {
        if let Some(id) = self.scene.id_of(name) {
            surface.redraw(id);
        }
    }

    fn notify_change(&mut self) {
        self.has_local_changes = true;
        if let Some(callback) = self.on_change.as_mut() {
            callback(&self.scene);
        }
    }
}
