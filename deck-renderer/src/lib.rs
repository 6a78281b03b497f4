//! # Deck Renderer
//!
//! Drawing side of the deck editor. Implements the core's
//! [`DeckSurface`](deck_core::DeckSurface) and turns a scene into display lists.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐  surface calls  ┌──────────────┐
//! │  deck-core   │ ──────────────▶ │  EditorView  │
//! │  DeckScene   │                 │  (overlays)  │
//! └──────┬───────┘                 └──────┬───────┘
//!        └───────────┬────────────────────┘
//!                    ▼
//!             ┌─────────────┐  StageTransform  ┌──────────────────┐
//!             │ DisplayList │ ───────────────▶ │ Canvas2D │ SVG   │
//!             └─────────────┘                  └──────────────────┘
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod display;
pub mod error;
pub mod export;
pub mod shape;
pub mod stage;
pub mod view;

pub use backend::RenderBackend;
pub use display::DisplayList;
pub use error::{RenderError, RenderResult};
pub use export::{ExportConfig, SvgExporter};
pub use shape::{DrawCommand, Style};
pub use stage::StageTransform;
pub use view::{EditorView, Tooltip};

use deck_core::deck::{DEFAULT_NUM_RAILS, RAIL_PITCH_MM, RAIL_START_MM};
use deck_core::DeckScene;

/// Width of the drawn robot area: the deck up to its last rail.
#[allow(clippy::cast_lossless)]
pub const ROBOT_WIDTH_MM: f64 = RAIL_START_MM + DEFAULT_NUM_RAILS as f64 * RAIL_PITCH_MM;

/// Depth of the drawn robot area.
pub const ROBOT_HEIGHT_MM: f64 = 653.5;

/// Configuration for the renderer.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Backend to draw with.
    pub preferred_backend: BackendType,
    /// Canvas width in pixels.
    pub canvas_width: u32,
    /// Canvas height in pixels.
    pub canvas_height: u32,
    /// Robot width in millimetres.
    pub robot_width: f64,
    /// Robot depth in millimetres.
    pub robot_height: f64,
    /// SVG output settings.
    pub export: ExportConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            preferred_backend: BackendType::Canvas2D,
            canvas_width: 1200,
            canvas_height: 800,
            robot_width: ROBOT_WIDTH_MM,
            robot_height: ROBOT_HEIGHT_MM,
            export: ExportConfig::default(),
        }
    }
}

/// Available rendering backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// 2D canvas, replayed by the browser host.
    Canvas2D,
    /// Headless SVG snapshots.
    Svg,
}

/// The main renderer interface.
pub struct Renderer {
    config: RendererConfig,
    backend: Box<dyn RenderBackend>,
    stage: StageTransform,
    frame_count: u64,
}

impl Renderer {
    /// Create a new renderer with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the canvas or robot dimensions are unusable.
    pub fn new(config: RendererConfig) -> RenderResult<Self> {
        let stage = Self::fit_stage(&config, config.canvas_width, config.canvas_height)?;
        let backend = Self::create_backend(&config);

        Ok(Self {
            config,
            backend,
            stage,
            frame_count: 0,
        })
    }

    fn create_backend(config: &RendererConfig) -> Box<dyn RenderBackend> {
        match config.preferred_backend {
            BackendType::Canvas2D => Box::new(backend::canvas2d::Canvas2DBackend::new(
                config.canvas_width,
                config.canvas_height,
            )),
            BackendType::Svg => Box::new(backend::svg::SvgBackend::new(config.export.clone())),
        }
    }

    fn fit_stage(config: &RendererConfig, width: u32, height: u32) -> RenderResult<StageTransform> {
        StageTransform::fit(
            f64::from(width),
            f64::from(height),
            config.robot_width,
            config.robot_height,
        )
    }

    /// Render a frame of the scene with the view's overlays.
    ///
    /// # Errors
    ///
    /// Returns an error if the scene has no deck or the backend fails.
    pub fn render(&mut self, scene: &DeckScene, view: &mut EditorView) -> RenderResult<DisplayList> {
        let list = DisplayList::build(
            scene,
            view,
            (self.config.robot_width, self.config.robot_height),
        )?;
        self.backend.render(&list, &self.stage)?;
        view.mark_rendered();
        self.frame_count += 1;
        Ok(list)
    }

    /// Get the current frame count.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the active backend type.
    #[must_use]
    pub fn active_backend(&self) -> BackendType {
        self.backend.backend_type()
    }

    /// Get the renderer configuration.
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Current deck-to-canvas mapping.
    #[must_use]
    pub fn stage(&self) -> &StageTransform {
        &self.stage
    }

    /// Serialized last frame.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Export`] if the backend keeps no snapshots or
    /// nothing was rendered since the last resize.
    pub fn snapshot(&self) -> RenderResult<&str> {
        self.backend.snapshot().ok_or_else(|| {
            RenderError::Export(format!(
                "{:?} backend has no frame to export",
                self.backend.backend_type()
            ))
        })
    }

    /// Resize the rendering surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the new size is unusable or the backend fails.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.stage = Self::fit_stage(&self.config, width, height)?;
        self.config.canvas_width = width;
        self.config.canvas_height = height;
        self.backend.resize(width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_robot_width_spans_rails() {
        assert!((ROBOT_WIDTH_MM - 775.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_canvas_is_rejected() {
        let config = RendererConfig {
            canvas_width: 0,
            ..RendererConfig::default()
        };
        assert!(matches!(
            Renderer::new(config),
            Err(RenderError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_canvas_backend_has_no_snapshot() {
        let renderer = Renderer::new(RendererConfig::default()).expect("renderer");
        assert_eq!(renderer.active_backend(), BackendType::Canvas2D);
        assert!(matches!(renderer.snapshot(), Err(RenderError::Export(_))));
    }

    #[test]
    fn test_resize_refits_stage() {
        let mut renderer = Renderer::new(RendererConfig::default()).expect("renderer");
        renderer.resize(775, 1000).expect("resize");
        assert!((renderer.stage().scale() - 1.0).abs() < 1e-9);
        assert!(renderer.resize(0, 10).is_err());
    }
}
