//! # Deck Core
//!
//! Editing core for liquid-handling robot deck layouts.
//! Compiles to WASM for use behind a browser scene graph.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               deck-core.wasm                │
//! ├─────────────────────────────────────────────┤
//! │  Resource Tree     │  Drag Controller       │
//! │  - Arena + names   │  - Start/move/end      │
//! │  - Absolute locs   │  - Snap targets        │
//! │  - Layout records  │  - Grid hints          │
//! ├─────────────────────────────────────────────┤
//! │  State             │  Editor                │
//! │  - Liquids (LIFO)  │  - Selection, tooltips │
//! │  - Tip presence    │  - Change callback     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The core never draws. Every visual effect is requested through a
//! [`DeckSurface`], which `deck-renderer` implements.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod container;
pub mod deck;
pub mod document;
pub mod drag;
pub mod editor;
pub mod error;
pub mod event;
pub mod geometry;
pub mod grid;
pub mod layout;
pub mod resource;
pub mod scene;
pub mod snap;
pub mod store;
pub mod surface;
pub mod tip;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::{ConfigError, EditorConfig};
pub use container::{ContainerState, Liquid};
pub use document::LayoutDocument;
pub use drag::{DragOutcome, DragPreview, DragSession};
pub use editor::{DeckEditor, EditorResponse};
pub use error::{DeckError, DeckResult};
pub use event::{DragEvent, DragPhase, InputEvent};
pub use geometry::{Coordinate, Rect};
pub use grid::{grid_snap_hints, GridSnap};
pub use layout::{ResourceRecord, StateRecord};
pub use resource::{Resource, ResourceId, ResourceKind, ResourceType};
pub use scene::DeckScene;
pub use snap::{resolve_snap_target, SnapResult, SnapTarget};
pub use store::{LayoutStore, StoreError};
pub use surface::{DeckSurface, GuideLine, NullSurface, RecordingSurface, SurfaceCommand};
pub use tip::TipSpotState;

/// Deck core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
