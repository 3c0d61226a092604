//! # Project Working State
//!
//! [`ProjectState`] is everything the estimator holds for one open project:
//! custom prices and units, the labor floor configuration, custom rates and
//! the summary board. Every mutation recomputes the dependent totals and the
//! resource roll-up before it returns.
//!
//! Calculation paths never fail. Invalid numbers are treated as 0, unknown
//! resources and cards are ignored and reported through the return value.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use calc_core::catalog::{Catalog, Resource, ResourceType, UsageRule};
//! use calc_core::calculations::LineItemInput;
//! use calc_core::state::ProjectState;
//!
//! let catalog = Catalog::new(
//!     vec![Resource::new("سيكا 107", "شيكارة", 1000.0, ResourceType::Material)],
//!     vec![], vec![],
//!     vec![UsageRule::new("العزل", "سيكا 107 للحمامات", "سيكا 107", ResourceType::Material, 0.2)],
//! );
//! let mut state = ProjectState::new(Arc::new(catalog));
//!
//! let input = LineItemInput::new("العزل", "سيكا 107 للحمامات", 10.0);
//! let card_id = state.save_line_item(&input).unwrap();
//! assert_eq!(state.totals().summary_total, 2000.0);
//!
//! state.set_price("سيكا 107", 1100.0);
//! let breakdown = state.card_breakdown(&card_id).unwrap();
//! assert_eq!(breakdown.grand_total, 2200.0);
//! ```

use std::sync::Arc;

use crate::calculations::{calculate, rate_key, LineItemInput, LineItemResult, RateOverrides};
use crate::catalog::{Catalog, ResourceType};
use crate::numeric::{round_rate, sanitize};
use crate::pricing::{is_floor_eligible, LaborFloorConfig, PriceOverrides, PriceResolver};
use crate::project::Project;
use crate::summary::{ResourceRollup, SummaryBoard, SummaryCard, SummaryTotals};

/// Working state of one open project.
#[derive(Debug, Clone)]
pub struct ProjectState {
    catalog: Arc<Catalog>,
    prices: PriceOverrides,
    labor_floor: LaborFloorConfig,
    rates: RateOverrides,
    board: SummaryBoard,
    resources: ResourceRollup,
}

impl ProjectState {
    /// Empty state over a catalog.
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let mut state = ProjectState {
            catalog,
            prices: PriceOverrides::default(),
            labor_floor: LaborFloorConfig::default(),
            rates: RateOverrides::default(),
            board: SummaryBoard::default(),
            resources: ResourceRollup::default(),
        };
        state.refresh_resources();
        state
    }

    /// Working state for a stored project.
    pub fn from_project(catalog: Arc<Catalog>, project: &Project) -> Self {
        let mut state = ProjectState {
            catalog,
            prices: project.prices.clone(),
            labor_floor: project.labor_floor(),
            rates: project.custom_rates.clone(),
            board: SummaryBoard::new(project.items.clone(), project.settings.supervision_percentage),
            resources: ResourceRollup::default(),
        };
        state.refresh_resources();
        state
    }

    /// Copy the working state back into its project and bump `modified`.
    pub fn write_into(&self, project: &mut Project) {
        project.prices = self.prices.clone();
        project.items = self.board.cards().to_vec();
        project.custom_rates = self.rates.clone();
        project.set_labor_floor(&self.labor_floor);
        project.settings.supervision_percentage = self.board.supervision_percentage();
        project.touch();
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn prices(&self) -> &PriceOverrides {
        &self.prices
    }

    pub fn labor_floor(&self) -> &LaborFloorConfig {
        &self.labor_floor
    }

    pub fn rates(&self) -> &RateOverrides {
        &self.rates
    }

    pub fn board(&self) -> &SummaryBoard {
        &self.board
    }

    pub fn cards(&self) -> &[SummaryCard] {
        self.board.cards()
    }

    pub fn totals(&self) -> SummaryTotals {
        self.board.totals()
    }

    /// Resource roll-up of the saved cards
    pub fn resources_summary(&self) -> &ResourceRollup {
        &self.resources
    }

    pub fn resolver(&self) -> PriceResolver<'_> {
        PriceResolver::new(&self.catalog, &self.prices)
    }

    // ------------------------------------------------------------------
    // Prices and units
    // ------------------------------------------------------------------

    /// Store a price in the resource's default unit.
    ///
    /// For floor-dependent labor the base is re-pinned so the typed price
    /// holds at the current floor.
    pub fn set_price(&mut self, name: &str, price: f64) {
        let price = sanitize(price);
        self.prices.set_price(name, price);
        if is_floor_eligible(name) {
            self.labor_floor.repin(name, price);
        }
    }

    /// Store a price typed in the currently selected unit.
    /// Returns the stored default-unit price.
    pub fn set_display_price(&mut self, name: &str, typed: f64) -> f64 {
        let stored = self.resolver().price_from_display(name, None, typed);
        self.set_price(name, stored);
        stored
    }

    /// Drop a custom price, falling back to the catalog cost.
    ///
    /// Floor-dependent labor is re-pinned to the catalog cost so a later
    /// floor change starts from it rather than from the cleared price.
    pub fn clear_price(&mut self, name: &str) -> bool {
        if self.prices.clear_price(name).is_none() {
            return false;
        }
        if is_floor_eligible(name) {
            let fallback = self.resolver().effective_price(name, Some(ResourceType::Labor));
            self.labor_floor.repin(name, fallback);
        }
        true
    }

    /// Select the unit a resource is shown in. Units the resource cannot be
    /// priced in are rejected.
    pub fn select_unit(&mut self, name: &str, unit: &str) -> bool {
        let options = self.resolver().unit_options(name, None);
        if !options.iter().any(|u| u == unit) {
            return false;
        }
        self.prices.set_unit(name, unit);
        true
    }

    // ------------------------------------------------------------------
    // Labor floor surcharges
    // ------------------------------------------------------------------

    /// Move labor pricing to another floor. Invalid or < 1 means floor 1.
    pub fn set_floor_level(&mut self, floor: f64) {
        let writes = {
            let prices = &self.prices;
            let catalog = &self.catalog;
            let stored = |name: &str| PriceResolver::new(catalog, prices).effective_price(name, Some(ResourceType::Labor));
            self.labor_floor.change_floor(floor, stored)
        };
        for (name, price) in writes {
            self.prices.set_price(name, price);
        }
    }

    /// Set the per-floor surcharge of a labor resource without moving its
    /// current price. Returns false for resources that ignore floors.
    pub fn set_extra_per_floor(&mut self, name: &str, extra: f64) -> bool {
        let displayed = self.resolver().effective_price(name, Some(ResourceType::Labor));
        self.labor_floor.set_extra(name, extra, displayed)
    }

    // ------------------------------------------------------------------
    // Consumption rates
    // ------------------------------------------------------------------

    pub fn set_rate(&mut self, main_item: &str, sub_item: &str, resource: &str, rate: f64) {
        self.rates.set(rate_key(main_item, sub_item, resource), sanitize(rate));
    }

    /// Reset a rate to the catalog default. The rounded default is kept as
    /// an explicit override. Returns it, or `None` when no rule matches.
    pub fn reset_rate(&mut self, main_item: &str, sub_item: &str, resource: &str) -> Option<f64> {
        let default_rate = self
            .catalog
            .usage_rules_for(main_item, sub_item)
            .find(|rule| rule.resource == resource)
            .map(|rule| round_rate(rule.default_rate()))?;
        self.rates.set(rate_key(main_item, sub_item, resource), default_rate);
        Some(default_rate)
    }

    // ------------------------------------------------------------------
    // Line items and summary
    // ------------------------------------------------------------------

    /// Price a work item with the project's prices and rates.
    pub fn calculate(&self, input: &LineItemInput) -> LineItemResult {
        calculate(&self.resolver(), &self.rates, input)
    }

    /// Calculate a line item and save it as a summary card.
    /// Returns the new card id, or `None` when nothing was priced.
    pub fn save_line_item(&mut self, input: &LineItemInput) -> Option<String> {
        let result = self.calculate(input);
        let card = SummaryCard::from_line_item(input, &result)?;
        let id = card.id.clone();
        self.add_card(card);
        Some(id)
    }

    pub fn add_card(&mut self, card: SummaryCard) {
        self.board.add_card(card);
        self.refresh_resources();
    }

    pub fn delete_card(&mut self, id: &str) -> bool {
        let deleted = self.board.delete_card(id);
        if deleted {
            self.refresh_resources();
        }
        deleted
    }

    pub fn undo(&mut self) -> bool {
        let restored = self.board.undo();
        if restored {
            self.refresh_resources();
        }
        restored
    }

    pub fn update_card_risk_tax(&mut self, id: &str, risk_percentage: f64, tax_percentage: f64) -> bool {
        self.board.update_card_risk_tax(id, risk_percentage, tax_percentage)
    }

    pub fn set_supervision_percentage(&mut self, supervision_percentage: f64) {
        self.board.set_supervision_percentage(supervision_percentage);
    }

    /// Breakdown of a saved card at its quantity with the live prices and
    /// rates (no markups).
    pub fn card_breakdown(&self, id: &str) -> Option<LineItemResult> {
        let card = self.board.card(id)?;
        let input = LineItemInput::new(card.main_item.clone(), card.sub_item.clone(), card.quantity);
        Some(self.calculate(&input))
    }

    fn refresh_resources(&mut self) {
        self.resources = ResourceRollup::build(&self.catalog, self.board.cards());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectInfo;
    use crate::test_support::{sample_catalog, BATHROOM_SIKA, BRICK_WALL, HDF_FLOOR, INSULATION, MASONRY, PORCELAIN};
    use pretty_assertions::assert_eq;

    const CEMENT: &str = "أسمنت أسود";
    const CEMENT_HAUL: &str = "تشوين أسمنت";

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn state() -> ProjectState {
        ProjectState::new(Arc::new(sample_catalog()))
    }

    #[test]
    fn test_display_price_round_trip() {
        let mut state = state();
        assert!(state.select_unit(CEMENT, "طن"));
        assert!(approx(state.resolver().display_price(CEMENT, None), 6000.0));

        let stored = state.set_display_price(CEMENT, 7000.0);
        assert!(approx(stored, 350.0));
        assert!(approx(state.resolver().effective_price(CEMENT, None), 350.0));
        assert!(!state.select_unit(CEMENT, "كيلو"));
    }

    #[test]
    fn test_floor_idempotence() {
        let mut state = state();
        assert!(state.set_extra_per_floor(CEMENT_HAUL, 2.0));

        state.set_floor_level(3.0);
        assert!(approx(state.resolver().effective_price(CEMENT_HAUL, None), 14.0));
        state.set_floor_level(1.0);
        assert!(approx(state.resolver().effective_price(CEMENT_HAUL, None), 10.0));
        state.set_floor_level(3.0);
        assert!(approx(state.resolver().effective_price(CEMENT_HAUL, None), 14.0));

        // non-eligible resources ignore floors
        assert!(!state.set_extra_per_floor("نظافة", 3.0));
        assert!(approx(state.resolver().effective_price("نظافة", None), 5.0));
    }

    #[test]
    fn test_direct_price_edit_repins_base() {
        let mut state = state();
        state.set_extra_per_floor(CEMENT_HAUL, 2.0);
        state.set_floor_level(3.0);

        state.set_price(CEMENT_HAUL, 20.0);
        assert_eq!(state.labor_floor().pinned_base_for(CEMENT_HAUL), Some(16.0));
        state.set_floor_level(1.0);
        assert!(approx(state.resolver().effective_price(CEMENT_HAUL, None), 16.0));
    }

    #[test]
    fn test_cleared_labor_price_survives_floor_change() {
        let mut state = state();
        state.set_extra_per_floor(CEMENT_HAUL, 2.0);
        state.set_price(CEMENT_HAUL, 20.0);

        assert!(state.clear_price(CEMENT_HAUL));
        assert!(approx(state.resolver().effective_price(CEMENT_HAUL, None), 10.0));
        assert_eq!(state.labor_floor().pinned_base_for(CEMENT_HAUL), Some(10.0));

        state.set_floor_level(1.0);
        assert!(approx(state.resolver().effective_price(CEMENT_HAUL, None), 10.0));
        state.set_floor_level(3.0);
        assert!(approx(state.resolver().effective_price(CEMENT_HAUL, None), 14.0));

        // cleared on floor 3: the catalog cost holds on that floor
        assert!(state.clear_price(CEMENT_HAUL));
        state.set_floor_level(3.0);
        assert!(approx(state.resolver().effective_price(CEMENT_HAUL, None), 10.0));
        assert!(!state.clear_price("نظافة"));
    }

    #[test]
    fn test_reloaded_cards_recompute_sell_price() {
        let mut card = SummaryCard::new(PORCELAIN, HDF_FLOOR, 1.0, "م2", 100.0, 100.0);
        card.risk_percentage = Some(10.0);
        let mut taxed = SummaryCard::new(PORCELAIN, HDF_FLOOR, 2.0, "م2", 100.0, 50.0);
        taxed.tax_percentage = Some(20.0);

        let mut project = Project::new(ProjectInfo::new("فيلا", "P-1", "سكني", 200.0, 2));
        project.items = vec![card.clone(), taxed];

        let reloaded = ProjectState::from_project(Arc::new(sample_catalog()), &project);
        assert!(approx(reloaded.cards()[0].effective_sell_price(), 110.0));
        assert!(approx(reloaded.cards()[1].effective_sell_price(), 60.0));
        assert!(approx(reloaded.totals().selling_total, 230.0));

        let mut added = state();
        added.add_card(card);
        assert!(approx(added.totals().selling_total, 110.0));
    }

    #[test]
    fn test_invalid_floor_is_first_floor() {
        let mut state = state();
        state.set_floor_level(f64::NAN);
        assert_eq!(state.labor_floor().floor_level, 1);
        state.set_floor_level(-4.0);
        assert_eq!(state.labor_floor().floor_level, 1);
    }

    #[test]
    fn test_rate_override_and_reset() {
        let mut state = state();
        let input = LineItemInput::new(MASONRY, BRICK_WALL, 10.0);
        let before = state.calculate(&input).grand_total;

        state.set_rate(MASONRY, BRICK_WALL, CEMENT, 0.5);
        let after = state.calculate(&input);
        assert!(approx(after.grand_total - before, 750.0));

        assert_eq!(state.reset_rate(MASONRY, BRICK_WALL, CEMENT), Some(0.25));
        assert!(approx(state.calculate(&input).grand_total, before));
        assert_eq!(state.rates().len(), 1);
        assert_eq!(state.reset_rate(MASONRY, BRICK_WALL, "غير موجود"), None);
    }

    #[test]
    fn test_save_delete_undo_refreshes_rollup() {
        let mut state = state();
        assert!(state.save_line_item(&LineItemInput::new("", "", 0.0)).is_none());

        let id = state.save_line_item(&LineItemInput::new(INSULATION, BATHROOM_SIKA, 10.0)).unwrap();
        assert!(approx(state.totals().summary_total, 2550.0));
        assert!(state.resources_summary().find("سيكا 107").is_some());

        assert!(state.delete_card(&id));
        assert!(state.resources_summary().is_empty());
        assert_eq!(state.totals().summary_total, 0.0);

        assert!(state.undo());
        assert!(approx(state.resources_summary().grand_total, 2550.0));
    }

    #[test]
    fn test_card_breakdown_uses_live_prices() {
        let mut state = state();
        let id = state
            .save_line_item(&LineItemInput::new(INSULATION, BATHROOM_SIKA, 10.0).with_markups(10.0, 0.0))
            .unwrap();
        state.set_price("سيكا 107", 2000.0);

        let breakdown = state.card_breakdown(&id).unwrap();
        assert!(approx(breakdown.materials_total, 4000.0));
        assert!(approx(breakdown.grand_total, 4550.0));
        // saved card keeps its calculated total
        assert!(approx(state.cards()[0].total, 2805.0));
        assert!(state.card_breakdown("missing").is_none());
    }

    #[test]
    fn test_project_round_trip() {
        let mut state = state();
        state.set_price(CEMENT, 320.0);
        state.select_unit(CEMENT, "طن");
        state.set_extra_per_floor(CEMENT_HAUL, 1.5);
        state.set_floor_level(2.0);
        state.set_rate(MASONRY, BRICK_WALL, CEMENT, 0.3);
        state.save_line_item(&LineItemInput::new(MASONRY, BRICK_WALL, 4.0));
        state.set_supervision_percentage(5.0);

        let mut project = Project::new(ProjectInfo::new("فيلا", "P-1", "سكني", 200.0, 2));
        state.write_into(&mut project);
        assert_eq!(project.labor_floor_level, 2);
        assert_eq!(project.items.len(), 1);
        assert_eq!(project.settings.supervision_percentage, 5.0);

        let reopened = ProjectState::from_project(Arc::new(sample_catalog()), &project);
        assert_eq!(reopened.prices(), state.prices());
        assert_eq!(reopened.labor_floor(), state.labor_floor());
        assert_eq!(reopened.rates(), state.rates());
        assert_eq!(reopened.totals(), state.totals());
        assert_eq!(reopened.resources_summary(), state.resources_summary());
    }
}
