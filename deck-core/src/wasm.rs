//! WebAssembly bindings for deck-core.
//!
//! The browser host forwards pointer events as JSON and replays the returned
//! surface commands on its scene graph.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::editor::EditorResponse;
use crate::surface::{RecordingSurface, SurfaceCommand};
use crate::{DeckEditor, EditorConfig, InputEvent};

/// Initialize the deck WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

#[derive(Serialize)]
struct EventReply<'a> {
    response: &'a EditorResponse,
    commands: &'a [SurfaceCommand],
}

/// Deck editor instance for WASM.
#[wasm_bindgen]
pub struct WasmDeckEditor {
    editor: DeckEditor,
    surface: RecordingSurface,
}

#[wasm_bindgen]
impl WasmDeckEditor {
    /// Create an editor from a JSON layout.
    ///
    /// # Errors
    ///
    /// Returns an error string if the layout cannot be loaded.
    #[wasm_bindgen(constructor)]
    pub fn new(layout_json: &str) -> Result<WasmDeckEditor, String> {
        let editor =
            DeckEditor::from_json(layout_json, EditorConfig::default()).map_err(|e| e.to_string())?;
        Ok(Self {
            editor,
            surface: RecordingSurface::new(),
        })
    }

    /// Process a JSON input event.
    ///
    /// Returns `{"response": ..., "commands": [...]}` where `commands` are the
    /// surface calls the event produced.
    ///
    /// # Errors
    ///
    /// Returns an error string if the event JSON is malformed.
    #[wasm_bindgen(js_name = processEvent)]
    pub fn process_event(&mut self, event_json: &str) -> Result<String, String> {
        let event: InputEvent = serde_json::from_str(event_json).map_err(|e| e.to_string())?;
        let response = self.editor.process_event(&event, &mut self.surface);
        let commands = self.surface.drain();
        serde_json::to_string(&EventReply {
            response: &response,
            commands: &commands,
        })
        .map_err(|e| e.to_string())
    }

    /// Get the current layout as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if the scene has no deck.
    #[wasm_bindgen(js_name = getLayoutJson)]
    pub fn get_layout_json(&self) -> Result<String, String> {
        self.editor.scene().to_json().map_err(|e| e.to_string())
    }

    /// Get the state projection as JSON.
    #[wasm_bindgen(js_name = getStateJson)]
    #[must_use]
    pub fn get_state_json(&self) -> String {
        serde_json::to_string(&self.editor.scene().serialize_state()).unwrap_or_default()
    }

    /// Replace the layout.
    ///
    /// # Errors
    ///
    /// Returns an error string if the layout cannot be loaded.
    #[wasm_bindgen(js_name = loadLayout)]
    pub fn load_layout(&mut self, layout_json: &str) -> Result<(), String> {
        self.editor
            .load_layout(layout_json, &mut self.surface)
            .map_err(|e| e.to_string())
    }

    /// Toggle snapping.
    #[wasm_bindgen(js_name = setSnappingEnabled)]
    pub fn set_snapping_enabled(&mut self, enabled: bool) {
        self.editor.set_snapping_enabled(enabled);
    }

    /// Aspirate from a container.
    ///
    /// # Errors
    ///
    /// Returns an error string on lookup or capacity errors.
    pub fn aspirate(&mut self, name: &str, volume: f64) -> Result<(), String> {
        self.editor
            .aspirate(name, volume, &mut self.surface)
            .map_err(|e| e.to_string())
    }

    /// Dispense into a container.
    ///
    /// # Errors
    ///
    /// Returns an error string on lookup or capacity errors.
    pub fn dispense(&mut self, name: &str, volume: f64) -> Result<(), String> {
        self.editor
            .dispense(name, volume, &mut self.surface)
            .map_err(|e| e.to_string())
    }

    /// Pick up a tip.
    ///
    /// # Errors
    ///
    /// Returns an error string on lookup or tip state errors.
    #[wasm_bindgen(js_name = pickUpTip)]
    pub fn pick_up_tip(&mut self, name: &str) -> Result<(), String> {
        self.editor
            .pick_up_tip(name, &mut self.surface)
            .map_err(|e| e.to_string())
    }

    /// Drop a tip.
    ///
    /// # Errors
    ///
    /// Returns an error string on lookup or tip state errors.
    #[wasm_bindgen(js_name = dropTip)]
    pub fn drop_tip(&mut self, name: &str) -> Result<(), String> {
        self.editor
            .drop_tip(name, &mut self.surface)
            .map_err(|e| e.to_string())
    }

    /// Take the surface commands recorded outside of `processEvent`.
    #[wasm_bindgen(js_name = drainCommands)]
    #[must_use]
    pub fn drain_commands(&mut self) -> String {
        serde_json::to_string(&self.surface.drain()).unwrap_or_default()
    }

    /// Whether the layout changed since it was loaded or last saved.
    #[wasm_bindgen(js_name = hasLocalChanges)]
    #[must_use]
    pub fn has_local_changes(&self) -> bool {
        self.editor.has_local_changes()
    }

    /// Mark the layout as saved.
    #[wasm_bindgen(js_name = markSaved)]
    pub fn mark_saved(&mut self) {
        self.editor.mark_saved();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = r#"{
        "name": "deck", "type": "HamiltonDeck",
        "location": {"x": 0, "y": 0, "z": 0},
        "size_x": 1360, "size_y": 653.5, "size_z": 900,
        "num_rails": 30, "parent_name": null,
        "children": [{
            "name": "plate", "type": "Plate",
            "location": {"x": 400, "y": 300, "z": 0},
            "size_x": 127, "size_y": 86, "size_z": 14.5,
            "num_items_x": 0, "num_items_y": 0,
            "parent_name": "deck", "children": []
        }]
    }"#;

    #[test]
    fn new_rejects_invalid_layout() {
        assert!(WasmDeckEditor::new("{ not json }").is_err());
    }

    #[test]
    fn process_event_returns_commands() {
        let mut editor = WasmDeckEditor::new(LAYOUT).expect("editor");
        let reply = editor
            .process_event(r#"{"type":"Drag","data":{"phase":"start","resource":"plate","x":400,"y":300}}"#)
            .expect("reply");
        let value: serde_json::Value = serde_json::from_str(&reply).expect("json");
        assert_eq!(value["response"]["response"], "drag_started");
        assert!(value["commands"]
            .as_array()
            .is_some_and(|c| c.iter().any(|c| c["command"] == "set_trash_visible")));
    }

    #[test]
    fn process_event_rejects_malformed_json() {
        let mut editor = WasmDeckEditor::new(LAYOUT).expect("editor");
        assert!(editor.process_event("nope").is_err());
    }

    #[test]
    fn layout_json_round_trips() {
        let editor = WasmDeckEditor::new(LAYOUT).expect("editor");
        let json = editor.get_layout_json().expect("layout");
        assert!(WasmDeckEditor::new(&json).is_ok());
        assert!(!editor.has_local_changes());
    }
}
