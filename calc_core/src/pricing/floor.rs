//! Labor Floor Adjuster
//!
//! A few hauling tasks cost more the higher the floor they deliver to. For
//! those resources the stored price is
//!
//! ```text
//! stored = pinned_base + extra_per_floor × (floor_level − 1)
//! ```
//!
//! The pinned base only moves when the user edits the price or the extra.
//! Changing the floor level rewrites stored prices from the pin, so going
//! from floor N to floor 1 and back to N returns the same prices.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::numeric::{lenient, sanitize};

/// Labor resources priced per floor
pub const FLOOR_ELIGIBLE_LABOR: [&str; 4] = [
    "تشوين أسمنت",
    "تشوين رمل",
    "تشوين طوب",
    "تشوين مادة لاصقة",
];

pub fn is_floor_eligible(name: &str) -> bool {
    FLOOR_ELIGIBLE_LABOR.contains(&name)
}

/// Floor level plus per-resource extras and pinned bases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborFloorConfig {
    /// Current floor, always ≥ 1
    #[serde(default = "default_floor")]
    pub floor_level: u32,

    /// Resource name -> surcharge per floor above the first
    #[serde(default, deserialize_with = "lenient::f64_map")]
    pub extras_per_floor: BTreeMap<String, f64>,

    /// Resource name -> floor-1 price the surcharge is added to
    #[serde(default, deserialize_with = "lenient::f64_map")]
    pub pinned_base: BTreeMap<String, f64>,
}

fn default_floor() -> u32 {
    1
}

impl Default for LaborFloorConfig {
    fn default() -> Self {
        LaborFloorConfig {
            floor_level: 1,
            extras_per_floor: BTreeMap::new(),
            pinned_base: BTreeMap::new(),
        }
    }
}

/// Clamp raw input to a valid floor level (invalid or < 1 -> 1).
pub fn clamp_floor(raw: f64) -> u32 {
    if raw.is_finite() && raw >= 1.0 {
        raw.trunc().min(u32::MAX as f64) as u32
    } else {
        1
    }
}

impl LaborFloorConfig {
    pub fn extra_for(&self, name: &str) -> f64 {
        self.extras_per_floor.get(name).copied().map(sanitize).unwrap_or(0.0)
    }

    pub fn pinned_base_for(&self, name: &str) -> Option<f64> {
        self.pinned_base.get(name).copied()
    }

    /// Floors above the first
    fn floors_above_ground(&self) -> f64 {
        f64::from(self.floor_level.max(1) - 1)
    }

    /// Move to a new floor.
    ///
    /// Returns the stored price each configured resource should now have.
    /// `stored_price` reports the price currently stored for a resource; it
    /// is only consulted to pin a base for resources that have none yet.
    pub fn change_floor(
        &mut self,
        new_floor: f64,
        stored_price: impl Fn(&str) -> f64,
    ) -> Vec<(String, f64)> {
        let previous = self.floors_above_ground();
        self.floor_level = clamp_floor(new_floor);
        let current = self.floors_above_ground();

        let mut writes = Vec::new();
        for (name, extra) in &self.extras_per_floor {
            if !is_floor_eligible(name) {
                continue;
            }
            let extra = sanitize(*extra);
            let base = *self
                .pinned_base
                .entry(name.clone())
                .or_insert_with(|| sanitize(stored_price(name) - extra * previous));
            writes.push((name.clone(), sanitize(base + extra * current)));
        }

        tracing::debug!(floor = self.floor_level, updated = writes.len(), "labor floor changed");
        writes
    }

    /// Set the per-floor extra, pinning the base so the displayed price
    /// stays where it is. Returns false for resources that ignore floors.
    pub fn set_extra(&mut self, name: &str, extra: f64, displayed_price: f64) -> bool {
        if !is_floor_eligible(name) {
            return false;
        }
        let extra = sanitize(extra);
        self.extras_per_floor.insert(name.to_string(), extra);
        self.pin(name, displayed_price, extra);
        true
    }

    /// Re-pin after a direct price edit. Returns false for resources that
    /// ignore floors.
    pub fn repin(&mut self, name: &str, typed_price: f64) -> bool {
        if !is_floor_eligible(name) {
            return false;
        }
        let extra = self.extra_for(name);
        self.pin(name, typed_price, extra);
        true
    }

    fn pin(&mut self, name: &str, price: f64, extra: f64) {
        let base = sanitize(sanitize(price) - extra * self.floors_above_ground());
        self.pinned_base.insert(name.to_string(), base);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HAUL: &str = "تشوين أسمنت";

    #[test]
    fn test_eligible_set() {
        assert!(is_floor_eligible("تشوين رمل"));
        assert!(is_floor_eligible("تشوين مادة لاصقة"));
        assert!(!is_floor_eligible("نظافة"));
        assert!(!is_floor_eligible("تشوين"));
    }

    #[test]
    fn test_clamp_floor() {
        assert_eq!(clamp_floor(3.0), 3);
        assert_eq!(clamp_floor(2.7), 2);
        assert_eq!(clamp_floor(0.0), 1);
        assert_eq!(clamp_floor(-4.0), 1);
        assert_eq!(clamp_floor(f64::NAN), 1);
    }

    #[test]
    fn test_floor_round_trip_is_idempotent() {
        let mut config = LaborFloorConfig::default();
        assert!(config.set_extra(HAUL, 2.0, 10.0));
        assert_eq!(config.pinned_base_for(HAUL), Some(10.0));

        let writes = config.change_floor(3.0, |_| 10.0);
        assert_eq!(writes, vec![(HAUL.to_string(), 14.0)]);

        let writes = config.change_floor(1.0, |_| 14.0);
        assert_eq!(writes, vec![(HAUL.to_string(), 10.0)]);

        let writes = config.change_floor(3.0, |_| 10.0);
        assert_eq!(writes, vec![(HAUL.to_string(), 14.0)]);
    }

    #[test]
    fn test_set_extra_keeps_displayed_price() {
        let mut config = LaborFloorConfig {
            floor_level: 4,
            ..Default::default()
        };
        config.set_extra(HAUL, 5.0, 40.0);
        // base = 40 - 5 × 3
        assert_eq!(config.pinned_base_for(HAUL), Some(25.0));

        let writes = config.change_floor(4.0, |_| 40.0);
        assert_eq!(writes, vec![(HAUL.to_string(), 40.0)]);
    }

    #[test]
    fn test_repin_after_price_edit() {
        let mut config = LaborFloorConfig::default();
        config.set_extra(HAUL, 2.0, 10.0);
        config.change_floor(3.0, |_| 10.0);

        // user types 20 while on floor 3
        assert!(config.repin(HAUL, 20.0));
        assert_eq!(config.pinned_base_for(HAUL), Some(16.0));

        let writes = config.change_floor(1.0, |_| 20.0);
        assert_eq!(writes, vec![(HAUL.to_string(), 16.0)]);
        assert!(!config.repin("نظافة", 20.0));
    }

    #[test]
    fn test_missing_pin_is_derived_from_stored_price() {
        let mut config = LaborFloorConfig {
            floor_level: 2,
            ..Default::default()
        };
        config.extras_per_floor.insert(HAUL.to_string(), 3.0);

        let writes = config.change_floor(4.0, |_| 13.0);
        // base = 13 - 3 × 1, stored = 10 + 3 × 3
        assert_eq!(config.pinned_base_for(HAUL), Some(10.0));
        assert_eq!(writes, vec![(HAUL.to_string(), 19.0)]);
    }

    #[test]
    fn test_ineligible_extras_ignored() {
        let mut config = LaborFloorConfig::default();
        assert!(!config.set_extra("نظافة", 2.0, 10.0));
        config.extras_per_floor.insert("نظافة".to_string(), 2.0);
        assert!(config.change_floor(5.0, |_| 10.0).is_empty());
    }
}
