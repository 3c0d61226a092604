//! # Export View
//!
//! Flat, exporter-friendly aggregates of one project: metadata, one section
//! per resource type, the saved line items and every total. Spreadsheet and
//! report writers consume [`ExportView`] directly; it holds plain numbers,
//! formatting is left to the writer.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use calc_core::catalog::Catalog;
//! use calc_core::export::ExportView;
//! use calc_core::project::{Project, ProjectInfo};
//! use calc_core::state::ProjectState;
//!
//! let project = Project::new(ProjectInfo::new("فيلا", "P-1", "سكني", 200.0, 2));
//! let state = ProjectState::from_project(Arc::new(Catalog::default()), &project);
//!
//! let view = ExportView::build(&project, &state);
//! assert_eq!(view.sections.len(), 3);
//! assert!(view.line_items.is_empty());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::ResourceType;
use crate::numeric::sanitize;
use crate::project::Project;
use crate::state::ProjectState;
use crate::summary::ResourceSummary;

/// Project identity as shown on the overview sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub name: String,
    pub code: String,
    #[serde(rename = "type")]
    pub project_type: String,
    pub area: f64,
    pub floor: u32,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// One resource row of a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResourceRow {
    pub name: String,
    pub unit: String,
    pub quantity: f64,
    /// Average cost per unit; `None` when nothing was consumed
    pub unit_price: Option<f64>,
    pub total_cost: f64,
}

impl From<&ResourceSummary> for ExportResourceRow {
    fn from(summary: &ResourceSummary) -> Self {
        let quantity = sanitize(summary.total_amount);
        ExportResourceRow {
            name: summary.resource.clone(),
            unit: summary.unit.clone(),
            quantity,
            unit_price: (quantity > 0.0).then(|| sanitize(summary.total_cost / quantity)),
            total_cost: sanitize(summary.total_cost),
        }
    }
}

/// Resources of one type, most expensive first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSection {
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    /// Section heading (`خامات`, `مصنعيات`, `عمالة`)
    pub title: String,
    pub rows: Vec<ExportResourceRow>,
    pub total: f64,
}

/// One saved summary card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportLineItem {
    pub main_item: String,
    pub sub_item: String,
    pub quantity: f64,
    pub unit: String,
    pub unit_price: f64,
    pub sell_price: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTotals {
    pub materials_total: f64,
    pub workmanship_total: f64,
    pub labor_total: f64,
    pub resources_total: f64,
    /// Σ unit price × quantity
    pub summary_total: f64,
    /// Σ sell price × quantity
    pub selling_total: f64,
    /// Selling total with supervision
    pub final_total: f64,
    pub supervision_percentage: f64,
}

/// Everything an exporter needs for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportView {
    pub metadata: ExportMetadata,
    pub sections: Vec<ExportSection>,
    pub line_items: Vec<ExportLineItem>,
    pub totals: ExportTotals,
}

impl ExportView {
    /// Build the view from a project's identity and its working state.
    pub fn build(project: &Project, state: &ProjectState) -> Self {
        let rollup = state.resources_summary();
        let totals = state.totals();

        let sections = ResourceType::ALL
            .iter()
            .map(|&resource_type| ExportSection {
                resource_type,
                title: resource_type.label().to_string(),
                rows: rollup.group(resource_type).iter().map(ExportResourceRow::from).collect(),
                total: rollup.total_for(resource_type),
            })
            .collect();

        let line_items = state
            .cards()
            .iter()
            .map(|card| ExportLineItem {
                main_item: card.main_item.clone(),
                sub_item: card.sub_item.clone(),
                quantity: sanitize(card.quantity),
                unit: card.unit.clone(),
                unit_price: sanitize(card.unit_price),
                sell_price: card.effective_sell_price(),
                total: sanitize(card.total),
            })
            .collect();

        ExportView {
            metadata: ExportMetadata {
                name: project.name.clone(),
                code: project.code.clone(),
                project_type: project.project_type.clone(),
                area: project.area,
                floor: project.floor,
                created: project.created,
                modified: project.modified,
            },
            sections,
            line_items,
            totals: ExportTotals {
                materials_total: rollup.materials_total,
                workmanship_total: rollup.workmanship_total,
                labor_total: rollup.labor_total,
                resources_total: rollup.grand_total,
                summary_total: totals.summary_total,
                selling_total: totals.selling_total,
                final_total: totals.final_total,
                supervision_percentage: totals.supervision_percentage,
            },
        }
    }

    pub fn section(&self, resource_type: ResourceType) -> Option<&ExportSection> {
        self.sections.iter().find(|s| s.resource_type == resource_type)
    }
}
