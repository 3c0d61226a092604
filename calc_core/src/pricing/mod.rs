//! # Price Resolution
//!
//! Layers a project's custom prices over the catalog defaults.
//!
//! Custom prices are always stored in a resource's **default unit**. The
//! unit a user picks for a resource only changes how the price is shown and
//! typed; [`PriceResolver::display_price`] and
//! [`PriceResolver::price_from_display`] convert at that boundary.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::catalog::{Catalog, Resource, ResourceType};
//! use calc_core::pricing::{PriceOverrides, PriceResolver};
//!
//! let catalog = Catalog::new(
//!     vec![Resource::new("أسمنت أسود", "شيكارة", 300.0, ResourceType::Material).with_alt_unit("طن")],
//!     vec![], vec![], vec![],
//! );
//! let mut overrides = PriceOverrides::default();
//! overrides.set_unit("أسمنت أسود", "طن");
//!
//! let resolver = PriceResolver::new(&catalog, &overrides);
//! assert_eq!(resolver.effective_price("أسمنت أسود", None), 300.0);
//! assert_eq!(resolver.display_price("أسمنت أسود", None), 6000.0);
//! ```

pub mod conversion;
pub mod floor;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, Resource, ResourceType};
use crate::numeric::{lenient, sanitize};

pub use conversion::{convert_from_alt, convert_to_alt};
pub use floor::{is_floor_eligible, LaborFloorConfig, FLOOR_ELIGIBLE_LABOR};

/// Per-project custom prices and unit selections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceOverrides {
    /// Resource name -> price per default unit
    #[serde(default, deserialize_with = "lenient::f64_map")]
    pub custom_prices: BTreeMap<String, f64>,

    /// Resource name -> unit the price is displayed in
    #[serde(default)]
    pub custom_units: BTreeMap<String, String>,
}

impl PriceOverrides {
    pub fn price(&self, name: &str) -> Option<f64> {
        self.custom_prices.get(name).copied()
    }

    /// Store a default-unit price; NaN is stored as 0.
    pub fn set_price(&mut self, name: impl Into<String>, price: f64) {
        self.custom_prices.insert(name.into(), sanitize(price));
    }

    pub fn clear_price(&mut self, name: &str) -> Option<f64> {
        self.custom_prices.remove(name)
    }

    pub fn unit(&self, name: &str) -> Option<&str> {
        self.custom_units.get(name).map(String::as_str)
    }

    pub fn set_unit(&mut self, name: impl Into<String>, unit: impl Into<String>) {
        self.custom_units.insert(name.into(), unit.into());
    }

    pub fn is_empty(&self) -> bool {
        self.custom_prices.is_empty() && self.custom_units.is_empty()
    }
}

/// Read-only view resolving prices and units for one project.
#[derive(Debug, Clone, Copy)]
pub struct PriceResolver<'a> {
    catalog: &'a Catalog,
    overrides: &'a PriceOverrides,
}

impl<'a> PriceResolver<'a> {
    pub fn new(catalog: &'a Catalog, overrides: &'a PriceOverrides) -> Self {
        PriceResolver { catalog, overrides }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn resource(&self, name: &str, preferred: Option<ResourceType>) -> Option<&'a Resource> {
        self.catalog.find_resource(name, preferred)
    }

    /// Price per default unit: custom override, else catalog cost, else 0.
    pub fn effective_price(&self, name: &str, preferred: Option<ResourceType>) -> f64 {
        if let Some(price) = self.overrides.price(name) {
            return sanitize(price);
        }
        self.resource(name, preferred)
            .map(Resource::unit_cost)
            .unwrap_or(0.0)
    }

    /// Unit the price is shown in: the selected unit, else the default unit.
    /// Unknown resources have no unit.
    pub fn display_unit(&self, name: &str, preferred: Option<ResourceType>) -> String {
        if let Some(unit) = self.overrides.unit(name).filter(|u| !u.is_empty()) {
            return unit.to_string();
        }
        self.resource(name, preferred)
            .map(|r| r.default_unit.clone())
            .unwrap_or_default()
    }

    /// Units a resource can be priced in (default first)
    pub fn unit_options(&self, name: &str, preferred: Option<ResourceType>) -> Vec<String> {
        match self.resource(name, preferred) {
            Some(resource) => {
                let mut units = vec![resource.default_unit.clone()];
                if let Some(alt) = resource.alt_unit() {
                    if alt != resource.default_unit {
                        units.push(alt.to_string());
                    }
                }
                units
            }
            None => Vec::new(),
        }
    }

    /// Stored price expressed in the currently selected unit
    pub fn display_price(&self, name: &str, preferred: Option<ResourceType>) -> f64 {
        let stored = self.effective_price(name, preferred);
        match self.resource(name, preferred) {
            Some(resource) => {
                let unit = self.display_unit(name, preferred);
                if unit == resource.default_unit {
                    stored
                } else {
                    convert_to_alt(name, stored, &resource.default_unit, &unit)
                }
            }
            None => stored,
        }
    }

    /// Convert a price typed in the selected unit into the default unit
    pub fn price_from_display(&self, name: &str, preferred: Option<ResourceType>, typed: f64) -> f64 {
        let typed = sanitize(typed);
        match self.resource(name, preferred) {
            Some(resource) => {
                let unit = self.display_unit(name, preferred);
                if unit == resource.default_unit {
                    typed
                } else {
                    convert_from_alt(name, typed, &unit, &resource.default_unit)
                }
            }
            None => typed,
        }
    }
}
