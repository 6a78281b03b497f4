//! Rendering backend implementations.

pub mod canvas2d;
pub mod svg;

use crate::display::DisplayList;
use crate::stage::StageTransform;
use crate::{BackendType, RenderResult};

/// Trait for rendering backends.
pub trait RenderBackend {
    /// Get the backend type.
    fn backend_type(&self) -> BackendType;

    /// Draw a display list.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails.
    fn render(&mut self, list: &DisplayList, stage: &StageTransform) -> RenderResult<()>;

    /// Resize the rendering surface.
    ///
    /// # Errors
    ///
    /// Returns an error if resizing fails.
    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()>;

    /// Serialized form of the last frame, for backends that produce one.
    fn snapshot(&self) -> Option<&str> {
        None
    }
}
