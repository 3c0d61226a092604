//! Resource roll-up across summary cards.
//!
//! Every saved card is expanded back into its work item's usage rules to
//! answer "how much cement does the whole project need, and what does it
//! cost". Amounts use the catalog rates and costs use the catalog unit
//! cost, not the project's custom prices or rates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ResourceType};
use crate::numeric::sanitize;

use super::SummaryCard;

/// One card's consumption of a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceUsage {
    /// `"main - sub"` of the consuming card
    pub item_title: String,
    pub amount: f64,
    pub cost: f64,
    pub unit: String,
}

/// Totals for one resource across the project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSummary {
    pub resource: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub unit: String,
    pub total_amount: f64,
    pub total_cost: f64,
    pub usages: Vec<ResourceUsage>,
}

/// Resource summaries grouped by type, each group sorted by cost descending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRollup {
    pub materials: Vec<ResourceSummary>,
    pub workmanship: Vec<ResourceSummary>,
    pub labor: Vec<ResourceSummary>,
    pub materials_total: f64,
    pub workmanship_total: f64,
    pub labor_total: f64,
    pub grand_total: f64,
}

impl ResourceRollup {
    /// Roll up the resources consumed by `cards`.
    pub fn build(catalog: &Catalog, cards: &[SummaryCard]) -> Self {
        let mut order: Vec<ResourceSummary> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for card in cards {
            let quantity = sanitize(card.quantity);
            let title = card.title();

            for rule in catalog.usage_rules_for(&card.main_item, &card.sub_item) {
                let resource = catalog.find_resource(&rule.resource, None);
                let unit = resource
                    .map(|r| r.default_unit.clone())
                    .or_else(|| rule.unit.clone())
                    .unwrap_or_default();
                let amount = sanitize(rule.default_rate() * quantity);
                let cost = sanitize(amount * resource.map(|r| r.unit_cost()).unwrap_or(0.0));

                let slot = *index.entry(rule.resource.clone()).or_insert_with(|| {
                    order.push(ResourceSummary {
                        resource: rule.resource.clone(),
                        resource_type: rule.resource_type,
                        unit: unit.clone(),
                        total_amount: 0.0,
                        total_cost: 0.0,
                        usages: Vec::new(),
                    });
                    order.len() - 1
                });

                let summary = &mut order[slot];
                summary.total_amount += amount;
                summary.total_cost += cost;
                summary.usages.push(ResourceUsage {
                    item_title: title.clone(),
                    amount,
                    cost,
                    unit,
                });
            }
        }

        let mut rollup = ResourceRollup::default();
        for summary in order {
            match summary.resource_type {
                ResourceType::Material => rollup.materials.push(summary),
                ResourceType::Workmanship => rollup.workmanship.push(summary),
                ResourceType::Labor => rollup.labor.push(summary),
            }
        }
        for group in [&mut rollup.materials, &mut rollup.workmanship, &mut rollup.labor] {
            group.sort_by(|a, b| b.total_cost.total_cmp(&a.total_cost));
        }

        rollup.materials_total = rollup.materials.iter().map(|s| s.total_cost).sum();
        rollup.workmanship_total = rollup.workmanship.iter().map(|s| s.total_cost).sum();
        rollup.labor_total = rollup.labor.iter().map(|s| s.total_cost).sum();
        rollup.grand_total = rollup.materials_total + rollup.workmanship_total + rollup.labor_total;
        rollup
    }

    pub fn group(&self, resource_type: ResourceType) -> &[ResourceSummary] {
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

    pub fn find(&self, resource: &str) -> Option<&ResourceSummary> {
        self.materials
            .iter()
            .chain(self.workmanship.iter())
            .chain(self.labor.iter())
            .find(|s| s.resource == resource)
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty() && self.workmanship.is_empty() && self.labor.is_empty()
    }
}
