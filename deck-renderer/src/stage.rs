//! Mapping between deck millimetres and canvas pixels.
//!
//! Deck coordinates grow upwards from the front-left corner of the robot,
//! canvas coordinates grow downwards from the top-left corner. The stage
//! applies one uniform scale so the whole robot fits the canvas, then flips
//! the vertical axis.

use deck_core::Rect;

use crate::{RenderError, RenderResult};

/// Uniform scale plus vertical flip from deck space to canvas space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageTransform {
    scale: f64,
    canvas_width: f64,
    canvas_height: f64,
}

impl StageTransform {
    /// Fit a robot of the given size into a canvas.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidConfig`] if any dimension is not a
    /// positive finite number.
    pub fn fit(
        canvas_width: f64,
        canvas_height: f64,
        robot_width: f64,
        robot_height: f64,
    ) -> RenderResult<Self> {
        for (label, value) in [
            ("canvas width", canvas_width),
            ("canvas height", canvas_height),
            ("robot width", robot_width),
            ("robot height", robot_height),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(RenderError::InvalidConfig(format!(
                    "{label} must be positive, got {value}"
                )));
            }
        }

        let scale = (canvas_width / robot_width).min(canvas_height / robot_height);
        Ok(Self {
            scale,
            canvas_width,
            canvas_height,
        })
    }

    /// Pixels per millimetre.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Canvas size in pixels.
    #[must_use]
    pub fn canvas_size(&self) -> (f64, f64) {
        (self.canvas_width, self.canvas_height)
    }

    /// Convert a deck point to canvas pixels.
    #[must_use]
    pub fn to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.scale, self.canvas_height - y * self.scale)
    }

    /// Convert a canvas pixel back to deck millimetres.
    #[must_use]
    pub fn to_world(&self, px: f64, py: f64) -> (f64, f64) {
        (px / self.scale, (self.canvas_height - py) / self.scale)
    }

    /// Scale a length without translating it.
    #[must_use]
    pub fn length(&self, mm: f64) -> f64 {
        mm * self.scale
    }

    /// Canvas rectangle `(left, top, width, height)` covering a deck rectangle.
    #[must_use]
    pub fn screen_rect(&self, rect: Rect) -> (f64, f64, f64, f64) {
        let (left, top) = self.to_screen(rect.x, rect.y + rect.height);
        (
            left,
            top,
            self.length(rect.width),
            self.length(rect.height),
        )
    }
}
