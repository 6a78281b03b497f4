//! Headless backend that keeps each frame as an SVG document.

use crate::display::DisplayList;
use crate::export::{ExportConfig, SvgExporter};
use crate::stage::StageTransform;
use crate::{BackendType, RenderResult};

use super::RenderBackend;

/// SVG snapshot renderer.
pub struct SvgBackend {
    exporter: SvgExporter,
    document: Option<String>,
}

impl SvgBackend {
    /// Create a backend writing with the given export settings.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self {
            exporter: SvgExporter::new(config),
            document: None,
        }
    }
}

impl RenderBackend for SvgBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Svg
    }

    fn render(&mut self, list: &DisplayList, stage: &StageTransform) -> RenderResult<()> {
        self.document = Some(self.exporter.render_to_svg(list, stage));
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        // The next frame picks the size up from the stage.
        self.document = None;
        tracing::debug!("SVG backend resized to {}x{}", width, height);
        Ok(())
    }

    fn snapshot(&self) -> Option<&str> {
        self.document.as_deref()
    }
}
