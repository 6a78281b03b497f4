//! 2D Canvas backend.
//!
//! In the browser the host replays the display list on a 2D context. On the
//! Rust side this backend only sorts out the canvas size and traces what a
//! frame contains.

use crate::display::DisplayList;
use crate::shape::DrawCommand;
use crate::stage::StageTransform;
use crate::{BackendType, RenderResult};

use super::RenderBackend;

/// 2D Canvas renderer.
pub struct Canvas2DBackend {
    width: u32,
    height: u32,
}

impl Canvas2DBackend {
    /// Create a new 2D canvas backend.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Current canvas size.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Log one command for debugging purposes.
    fn render_command(command: &DrawCommand, stage: &StageTransform) {
        match command {
            DrawCommand::Rect { rect, style, .. } => {
                let (x, y, w, h) = stage.screen_rect(*rect);
                tracing::trace!("Render rect at ({x}, {y}) size {w}x{h} fill={}", style.fill);
            }
            DrawCommand::Circle {
                cx, cy, radius, style, ..
            } => {
                let (x, y) = stage.to_screen(*cx, *cy);
                tracing::trace!(
                    "Render circle at ({x}, {y}) r={} fill={}",
                    stage.length(*radius),
                    style.fill
                );
            }
            DrawCommand::Line { from, to, .. } => {
                tracing::trace!("Render line {from:?} -> {to:?}");
            }
            DrawCommand::Text { content, .. } => {
                tracing::trace!("Render text '{content}'");
            }
            DrawCommand::TrashIcon { rect } => {
                tracing::trace!("Render trash zone {rect:?}");
            }
        }
    }
}

impl Default for Canvas2DBackend {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl RenderBackend for Canvas2DBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Canvas2D
    }

    fn render(&mut self, list: &DisplayList, stage: &StageTransform) -> RenderResult<()> {
        tracing::trace!(
            "Canvas2D render: {} commands, viewport {}x{}",
            list.len(),
            self.width,
            self.height
        );

        for command in list.commands() {
            Self::render_command(command, stage);
        }

        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.width = width;
        self.height = height;
        tracing::debug!("Canvas2D resized to {}x{}", width, height);
        Ok(())
    }
}
