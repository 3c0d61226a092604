//! # Line Item Calculation
//!
//! Prices one work item (main item / sub item) at a given quantity.
//!
//! ## Method
//!
//! For every usage rule of the work item:
//!
//! ```text
//! rate      = custom rate (main||sub||resource) or catalog quantity per unit
//! quantity  = rate × item quantity
//! cost      = quantity × price per default unit
//! ```
//!
//! Lines are grouped by resource type and summed, then markups apply to the
//! base total:
//!
//! ```text
//! grand = base × (1 + waste%) + base × operation%
//! ```
//!
//! ## Example
//!
//! ```rust
//! use calc_core::calculations::line_item::{apply_markups, LineItemResult};
//!
//! assert_eq!(apply_markups(1000.0, 10.0, 5.0), 1150.0);
//! assert_eq!(LineItemResult::empty().grand_total, 0.0);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::ResourceType;
use crate::numeric::{lenient, percent, sanitize};
use crate::pricing::PriceResolver;

use super::unit_rules::correct_unit;

/// Separator of the three parts of a rate key
pub const RATE_KEY_SEPARATOR: &str = "||";

/// Key of a custom rate: `main||sub||resource`
pub fn rate_key(main_item: &str, sub_item: &str, resource: &str) -> String {
    [main_item, sub_item, resource].join(RATE_KEY_SEPARATOR)
}

/// Per-project overrides of catalog consumption rates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RateOverrides(BTreeMap<String, f64>);

impl<'de> Deserialize<'de> for RateOverrides {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        lenient::f64_map(deserializer).map(RateOverrides)
    }
}

impl RateOverrides {
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    pub fn set(&mut self, key: impl Into<String>, rate: f64) {
        self.0.insert(key.into(), sanitize(rate));
    }

    pub fn remove(&mut self, key: &str) -> Option<f64> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }
}

/// A work item selection to price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    #[serde(default)]
    pub main_item: String,

    #[serde(default)]
    pub sub_item: String,

    /// Work item quantity in its measurement unit
    #[serde(default, deserialize_with = "lenient::f64")]
    pub quantity: f64,

    /// Waste markup, percent of base
    #[serde(default, deserialize_with = "lenient::f64")]
    pub waste_percentage: f64,

    /// Operation markup, percent of base
    #[serde(default, deserialize_with = "lenient::f64")]
    pub operation_percentage: f64,
}

impl LineItemInput {
    pub fn new(main_item: impl Into<String>, sub_item: impl Into<String>, quantity: f64) -> Self {
        LineItemInput {
            main_item: main_item.into(),
            sub_item: sub_item.into(),
            quantity,
            waste_percentage: 0.0,
            operation_percentage: 0.0,
        }
    }

    pub fn with_markups(mut self, waste_percentage: f64, operation_percentage: f64) -> Self {
        self.waste_percentage = waste_percentage;
        self.operation_percentage = operation_percentage;
        self
    }

    /// A priceable selection: both names present and a positive quantity
    pub fn is_priceable(&self) -> bool {
        !self.main_item.trim().is_empty()
            && !self.sub_item.trim().is_empty()
            && sanitize(self.quantity) > 0.0
    }
}

/// One resource's contribution to a line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceLine {
    pub resource: String,

    #[serde(rename = "type")]
    pub resource_type: ResourceType,

    /// Rate used (custom or default)
    pub rate: f64,

    /// Catalog rate
    pub default_rate: f64,

    pub rate_key: String,

    /// Total consumption: rate × item quantity
    pub quantity: f64,

    /// Unit the resource price is displayed in
    pub unit: String,

    /// Price per default unit
    pub unit_price: f64,

    pub total_cost: f64,
}

impl ResourceLine {
    pub fn has_custom_rate(&self) -> bool {
        self.rate != self.default_rate
    }
}

/// Priced breakdown of a line item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemResult {
    pub materials: Vec<ResourceLine>,
    pub workmanship: Vec<ResourceLine>,
    pub labor: Vec<ResourceLine>,
    pub materials_total: f64,
    pub workmanship_total: f64,
    pub labor_total: f64,
    pub base_total: f64,
    pub grand_total: f64,
    /// Grand total per unit of work item (0 when nothing is priced)
    pub unit_price: f64,
    /// Work item unit ("" when nothing is priced)
    pub unit: String,
}

impl LineItemResult {
    /// Zero totals and no breakdown
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty() && self.workmanship.is_empty() && self.labor.is_empty()
    }

    pub fn lines(&self, resource_type: ResourceType) -> &[ResourceLine] {
        match resource_type {
            ResourceType::Material => &self.materials,
            ResourceType::Workmanship => &self.workmanship,
            ResourceType::Labor => &self.labor,
        }
    }

    pub fn total_for(&self, resource_type: ResourceType) -> f64 {
        match resource_type {
            ResourceType::Material => self.materials_total,
            ResourceType::Workmanship => self.workmanship_total,
            ResourceType::Labor => self.labor_total,
        }
    }

    /// All lines in type order
    pub fn all_lines(&self) -> impl Iterator<Item = &ResourceLine> {
        self.materials
            .iter()
            .chain(self.workmanship.iter())
            .chain(self.labor.iter())
    }
}

/// Base total with waste and operation markups applied
pub fn apply_markups(base_total: f64, waste_percentage: f64, operation_percentage: f64) -> f64 {
    let base = sanitize(base_total);
    sanitize(base * (1.0 + percent(waste_percentage)) + base * percent(operation_percentage))
}

/// Price a work item selection.
///
/// Never fails: blank selections, non-positive quantities and work items
/// without usage rules yield [`LineItemResult::empty`]. Rules referring to
/// resources missing from the catalog are skipped.
pub fn calculate(prices: &PriceResolver<'_>, rates: &RateOverrides, input: &LineItemInput) -> LineItemResult {
    if !input.is_priceable() {
        return LineItemResult::empty();
    }

    let catalog = prices.catalog();
    let quantity = sanitize(input.quantity);
    let mut result = LineItemResult::empty();
    let mut matched = false;

    for rule in catalog.usage_rules_for(&input.main_item, &input.sub_item) {
        matched = true;
        let Some(resource) = catalog.find_resource(&rule.resource, Some(rule.resource_type)) else {
            tracing::warn!(resource = %rule.resource, "usage rule refers to unknown resource");
            continue;
        };

        let key = rate_key(&input.main_item, &input.sub_item, &rule.resource);
        let default_rate = rule.default_rate();
        let rate = rates.get(&key).map(sanitize).unwrap_or(default_rate);
        let unit_price = prices.effective_price(&rule.resource, Some(rule.resource_type));
        let consumed = rate * quantity;

        let line = ResourceLine {
            resource: rule.resource.clone(),
            resource_type: resource.resource_type,
            rate,
            default_rate,
            rate_key: key,
            quantity: sanitize(consumed),
            unit: prices.display_unit(&rule.resource, Some(rule.resource_type)),
            unit_price,
            total_cost: sanitize(consumed * unit_price),
        };

        match resource.resource_type {
            ResourceType::Material => result.materials.push(line),
            ResourceType::Workmanship => result.workmanship.push(line),
            ResourceType::Labor => result.labor.push(line),
        }
    }

    if !matched {
        return LineItemResult::empty();
    }

    result.materials_total = result.materials.iter().map(|l| l.total_cost).sum();
    result.workmanship_total = result.workmanship.iter().map(|l| l.total_cost).sum();
    result.labor_total = result.labor.iter().map(|l| l.total_cost).sum();
    result.base_total = result.materials_total + result.workmanship_total + result.labor_total;
    result.grand_total = apply_markups(
        result.base_total,
        input.waste_percentage,
        input.operation_percentage,
    );

    if result.grand_total > 0.0 {
        result.unit_price = result.grand_total / quantity;
        result.unit = correct_unit(catalog, &input.main_item, &input.sub_item);
    }

    tracing::debug!(
        main_item = %input.main_item,
        sub_item = %input.sub_item,
        quantity,
        grand_total = result.grand_total,
        "line item calculated"
    );
    result
}
