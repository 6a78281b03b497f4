//! Editor configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::deck::SNAP_MARGIN_MM;
use crate::Rect;

/// Environment variable that disables snapping when set to `0` or `false`.
pub const ENV_SNAPPING: &str = "DECK_SNAPPING";

/// Environment variable overriding the snap margin in millimetres.
pub const ENV_SNAP_MARGIN: &str = "DECK_SNAP_MARGIN";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The configuration file is not valid JSON.
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration for the deck editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Global snapping switch. When off every drag is free placement.
    pub snapping_enabled: bool,
    /// Tolerance for grid-snap hints.
    pub snap_margin_mm: f64,
    /// Drop zone that deletes the dragged resource, in stage millimetres.
    pub trash_zone: Rect,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snapping_enabled: true,
            snap_margin_mm: SNAP_MARGIN_MM,
            trash_zone: Rect::new(700.0, 100.0, 50.0, 50.0),
        }
    }
}

impl EditorConfig {
    /// Load configuration from a JSON file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Apply overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Unparseable values are logged and ignored.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = lookup(ENV_SNAPPING) {
            match value.trim().to_ascii_lowercase().as_str() {
                "0" | "false" | "off" | "no" => self.snapping_enabled = false,
                "1" | "true" | "on" | "yes" => self.snapping_enabled = true,
                other => tracing::warn!("Ignoring {ENV_SNAPPING}={other}"),
            }
        }
        if let Some(value) = lookup(ENV_SNAP_MARGIN) {
            match value.trim().parse::<f64>() {
                Ok(margin) if margin.is_finite() && margin >= 0.0 => {
                    self.snap_margin_mm = margin;
                }
                _ => tracing::warn!("Ignoring {ENV_SNAP_MARGIN}={value}"),
            }
        }
        self
    }
}
