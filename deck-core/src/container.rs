//! Liquid volume accounting for containers and wells.
//!
//! Liquids form a stack: the most recently added entry is consumed first
//! when aspirating.

use serde::{Deserialize, Serialize};

use crate::{DeckError, DeckResult};

/// Name given to liquid dispensed without an explicit identity.
pub const UNKNOWN_LIQUID: &str = "Unknown liquid";

/// A volume of a named liquid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Liquid {
    /// Liquid name.
    pub name: String,
    /// Volume in microlitres.
    pub volume: f64,
}

impl Liquid {
    /// Create a new liquid entry.
    #[must_use]
    pub fn new(name: impl Into<String>, volume: f64) -> Self {
        Self {
            name: name.into(),
            volume,
        }
    }

    /// Create an entry of unidentified liquid.
    #[must_use]
    pub fn unknown(volume: f64) -> Self {
        Self::new(UNKNOWN_LIQUID, volume)
    }
}

/// Liquid state of a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerState {
    /// Maximum volume in microlitres.
    pub max_volume: f64,
    /// Liquid stack, bottom first.
    liquids: Vec<Liquid>,
}

impl ContainerState {
    /// Create an empty container.
    #[must_use]
    pub fn new(max_volume: f64) -> Self {
        Self {
            max_volume,
            liquids: Vec::new(),
        }
    }

    /// The liquid stack, bottom first.
    #[must_use]
    pub fn liquids(&self) -> &[Liquid] {
        &self.liquids
    }

    /// Total volume currently held.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.liquids.iter().map(|l| l.volume).sum()
    }

    /// Remaining capacity.
    #[must_use]
    pub fn free_volume(&self) -> f64 {
        self.max_volume - self.volume()
    }

    /// Fill fraction in `[0, 1]`, used for colouring.
    #[must_use]
    pub fn fill_fraction(&self) -> f64 {
        if self.max_volume <= 0.0 {
            return 0.0;
        }
        (self.volume() / self.max_volume).clamp(0.0, 1.0)
    }

    /// Push a liquid on top of the stack.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::InvalidVolume`] for negative or non-finite volumes
    /// and [`DeckError::OverCapacity`] if the container would overflow.
    pub fn add_liquid(&mut self, owner: &str, liquid: Liquid) -> DeckResult<()> {
        check_volume(liquid.volume)?;
        let current = self.volume();
        if liquid.volume + current > self.max_volume {
            return Err(DeckError::OverCapacity {
                container: owner.to_string(),
                requested: liquid.volume,
                current,
                max: self.max_volume,
            });
        }
        self.liquids.push(liquid);
        Ok(())
    }

    /// Dispense unidentified liquid into the container.
    ///
    /// # Errors
    ///
    /// See [`ContainerState::add_liquid`].
    pub fn dispense(&mut self, owner: &str, volume: f64) -> DeckResult<()> {
        self.add_liquid(owner, Liquid::unknown(volume))
    }

    /// Remove `volume` from the top of the stack downward.
    ///
    /// The last touched entry may be consumed partially.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::InsufficientVolume`] if the container holds less
    /// than `volume`; the stack is left unchanged.
    pub fn aspirate(&mut self, owner: &str, volume: f64) -> DeckResult<()> {
        check_volume(volume)?;
        let available = self.volume();
        if volume > available {
            return Err(DeckError::InsufficientVolume {
                container: owner.to_string(),
                requested: volume,
                available,
            });
        }

        let mut remaining = volume;
        while remaining > 0.0 {
            let Some(top) = self.liquids.last_mut() else {
                break;
            };
            if remaining >= top.volume {
                remaining -= top.volume;
                self.liquids.pop();
            } else {
                top.volume -= remaining;
                remaining = 0.0;
            }
        }
        Ok(())
    }

    /// Replace the whole stack.
    ///
    /// # Errors
    ///
    /// Returns [`DeckError::OverCapacity`] if the liquids exceed the maximum
    /// volume, or [`DeckError::InvalidVolume`] for any invalid entry.
    pub fn set_liquids(&mut self, owner: &str, liquids: Vec<Liquid>) -> DeckResult<()> {
        for liquid in &liquids {
            check_volume(liquid.volume)?;
        }
        let total: f64 = liquids.iter().map(|l| l.volume).sum();
        if total > self.max_volume {
            return Err(DeckError::OverCapacity {
                container: owner.to_string(),
                requested: total,
                current: 0.0,
                max: self.max_volume,
            });
        }
        self.liquids = liquids;
        Ok(())
    }
}

fn check_volume(volume: f64) -> DeckResult<()> {
    if volume.is_finite() && volume >= 0.0 {
        Ok(())
    } else {
        Err(DeckError::InvalidVolume(volume))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_dispense_and_volume() {
        let mut well = ContainerState::new(100.0);
        well.dispense("w", 30.0).expect("dispense");
        well.dispense("w", 20.0).expect("dispense");
        assert!((well.volume() - 50.0).abs() < f64::EPSILON);
        assert!((well.free_volume() - 50.0).abs() < f64::EPSILON);
        assert_eq!(well.liquids().len(), 2);
    }

    #[test]
    fn test_dispense_over_capacity_leaves_state() {
        let mut well = ContainerState::new(100.0);
        well.dispense("w", 90.0).expect("dispense");
        let err = well.dispense("w", 20.0).unwrap_err();
        assert!(matches!(err, DeckError::OverCapacity { .. }));
        assert!(err.is_capacity_violation());
        assert_eq!(well.liquids().len(), 1);
    }

    #[test]
    fn test_aspirate_top_down() {
        let mut well = ContainerState::new(100.0);
        well.add_liquid("w", Liquid::new("water", 40.0)).expect("add");
        well.add_liquid("w", Liquid::new("ethanol", 10.0)).expect("add");

        well.aspirate("w", 15.0).expect("aspirate");

        assert_eq!(well.liquids(), &[Liquid::new("water", 35.0)]);
    }

    #[test]
    fn test_aspirate_partial_top_entry() {
        let mut well = ContainerState::new(100.0);
        well.add_liquid("w", Liquid::new("water", 40.0)).expect("add");
        well.add_liquid("w", Liquid::new("ethanol", 10.0)).expect("add");

        well.aspirate("w", 4.0).expect("aspirate");

        assert_eq!(
            well.liquids(),
            &[Liquid::new("water", 40.0), Liquid::new("ethanol", 6.0)]
        );
    }

    #[test]
    fn test_aspirate_too_much_leaves_state() {
        let mut well = ContainerState::new(100.0);
        well.dispense("w", 10.0).expect("dispense");
        let err = well.aspirate("w", 10.5).unwrap_err();
        assert!(matches!(err, DeckError::InsufficientVolume { .. }));
        assert!((well.volume() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_volume_rejected() {
        let mut well = ContainerState::new(100.0);
        assert!(matches!(
            well.dispense("w", -1.0),
            Err(DeckError::InvalidVolume(_))
        ));
        assert!(matches!(
            well.aspirate("w", f64::NAN),
            Err(DeckError::InvalidVolume(_))
        ));
    }

    #[test]
    fn test_set_liquids_checks_capacity() {
        let mut well = ContainerState::new(50.0);
        assert!(well
            .set_liquids("w", vec![Liquid::new("a", 30.0), Liquid::new("b", 30.0)])
            .is_err());
        assert!(well.liquids().is_empty());
        well.set_liquids("w", vec![Liquid::new("a", 30.0)])
            .expect("set");
        assert!((well.fill_fraction() - 0.6).abs() < 1e-9);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Dispense(f64),
        Aspirate(f64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0.0f64..60.0).prop_map(Op::Dispense),
            (0.0f64..60.0).prop_map(Op::Aspirate),
        ]
    }

    proptest! {
        #[test]
        fn prop_volume_stays_within_bounds(ops in proptest::collection::vec(op_strategy(), 0..40)) {
            let mut well = ContainerState::new(200.0);
            for op in ops {
                let before = well.clone();
                let result = match op {
                    Op::Dispense(v) => well.dispense("w", v),
                    Op::Aspirate(v) => well.aspirate("w", v),
                };
                if result.is_err() {
                    prop_assert_eq!(&well, &before);
                }
                prop_assert!(well.volume() >= -1e-9);
                prop_assert!(well.volume() <= well.max_volume + 1e-9);
            }
        }

        #[test]
        fn prop_aspirate_consumes_most_recent_first(first in 1.0f64..50.0, second in 1.0f64..50.0) {
            let mut well = ContainerState::new(200.0);
            well.add_liquid("w", Liquid::new("first", first)).expect("add");
            well.add_liquid("w", Liquid::new("second", second)).expect("add");
            well.aspirate("w", second).expect("aspirate");
            prop_assert_eq!(well.liquids().len(), 1);
            prop_assert_eq!(well.liquids()[0].name.as_str(), "first");
            prop_assert!((well.liquids()[0].volume - first).abs() < 1e-9);
        }
    }
}
