//! Input events delivered by the rendering host.

use serde::{Deserialize, Serialize};

/// Mouse button number of the secondary (right) button.
pub const RIGHT_BUTTON: u8 = 2;

/// Phase of a drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragPhase {
    /// Drag started (button down on a draggable resource).
    Start,
    /// Pointer moved while dragging.
    Move,
    /// Button released.
    End,
    /// Gesture aborted by the host (e.g. Escape pressed).
    Cancel,
}

/// A drag gesture event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragEvent {
    /// Phase of this event.
    pub phase: DragPhase,
    /// Name of the dragged resource, if the host could attribute one.
    pub resource: Option<String>,
    /// On-screen offset of the dragged node relative to its parent, x.
    pub x: f64,
    /// On-screen offset of the dragged node relative to its parent, y.
    pub y: f64,
    /// Timestamp in milliseconds since editor start.
    #[serde(default)]
    pub timestamp_ms: u64,
}

impl DragEvent {
    /// Create a new drag event for a named resource.
    #[must_use]
    pub fn new(phase: DragPhase, resource: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            phase,
            resource: Some(resource.into()),
            x,
            y,
            timestamp_ms: 0,
        }
    }
}

/// All input events the editor can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Drag gesture.
    Drag(DragEvent),

    /// Click on a resource or on the background.
    Click {
        /// Clicked resource, `None` for the background.
        resource: Option<String>,
        /// Mouse button (0 = left, 1 = middle, 2 = right).
        button: u8,
    },

    /// Pointer entered a resource.
    Hover {
        /// Hovered resource.
        resource: Option<String>,
    },

    /// Context menu requested on a resource.
    ContextMenu {
        /// Target resource.
        resource: Option<String>,
    },
}

impl InputEvent {
    /// Name of the resource this event refers to, if any.
    #[must_use]
    pub fn resource(&self) -> Option<&str> {
        match self {
            Self::Drag(drag) => drag.resource.as_deref(),
            Self::Click { resource, .. }
            | Self::Hover { resource }
            | Self::ContextMenu { resource } => resource.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = InputEvent::Drag(DragEvent::new(DragPhase::Move, "plate", 1.0, 2.0));
        let json = serde_json::to_value(&event).expect("serialize");
        assert_eq!(json["type"], "Drag");
        assert_eq!(json["data"]["phase"], "move");
        assert_eq!(json["data"]["resource"], "plate");
    }

    #[test]
    fn test_event_without_timestamp_parses() {
        let json = r#"{"type":"Drag","data":{"phase":"end","resource":null,"x":0,"y":0}}"#;
        let event: InputEvent = serde_json::from_str(json).expect("parse");
        assert_eq!(event.resource(), None);
    }
}
