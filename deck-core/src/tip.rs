//! Discrete tip presence on tip spots.

use serde::{Deserialize, Serialize};

use crate::{DeckError, DeckResult};

/// Tip state of a tip spot.
///
/// The prototype tip is an opaque record describing the tip that lives in
/// this spot; it is carried through serialization untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TipSpotState {
    /// Whether a tip is currently present.
    pub has_tip: bool,
    /// Prototype tip definition, if known.
    pub prototype_tip: Option<serde_json::Value>,
}

impl TipSpotState {
    /// Create an empty tip spot with the given prototype.
    #[must_use]
    pub fn new(prototype_tip: Option<serde_json::Value>) -> Self {
        Self {
            has_tip: false,
            prototype_tip,
        }
    }

    /// The tip currently held, if any.
    #[must_use]
    pub fn tip(&self) -> Option<&serde_json::Value> {
        if self.has_tip {
            self.prototype_tip.as_ref()
        } else {
            None
        }
    }

    /// Take the tip out of the spot.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::NoTipPresent`] if the spot is empty.
    pub fn pick_up_tip(&mut self, owner: &str) -> DeckResult<()> {
        if !self.has_tip {
            return Err(DeckError::NoTipPresent(owner.to_string()));
        }
        self.has_tip = false;
        Ok(())
    }

    /// Put a tip into the spot.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::TipAlreadyPresent`] if the spot is occupied.
    pub fn drop_tip(&mut self, owner: &str) -> DeckResult<()> {
        if self.has_tip {
            return Err(DeckError::TipAlreadyPresent(owner.to_string()));
        }
        self.has_tip = true;
        Ok(())
    }
}
