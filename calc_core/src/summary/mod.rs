//! # Project Summary
//!
//! The ordered list of saved line items ("summary cards") of a project and
//! the totals derived from them. Insertion order is display order.
//!
//! ## Totals cascade
//!
//! ```text
//! summary total = Σ unit price × quantity
//! selling total = Σ sell price × quantity      (sell price falls back to unit price)
//! final total   = selling total × (1 + supervision%)
//! ```
//!
//! Every mutation of a [`SummaryBoard`] recomputes the totals before it
//! returns, so [`SummaryBoard::totals`] is always current.
//!
//! ## Example
//!
//! ```rust
//! use calc_core::summary::{SummaryBoard, SummaryCard};
//!
//! let mut board = SummaryBoard::default();
//! let card = SummaryCard::new("المباني", "طوب أحمر 20 10 5", 10.0, "م2", 3655.0, 365.5);
//! let id = card.id.clone();
//! board.add_card(card);
//! board.update_card_risk_tax(&id, 10.0, 0.0);
//! assert!((board.totals().selling_total - 4020.5).abs() < 1e-9);
//! ```

pub mod resources;
pub mod undo;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::calculations::{LineItemInput, LineItemResult};
use crate::numeric::{lenient, percent, sanitize};

pub use resources::{ResourceRollup, ResourceSummary, ResourceUsage};
pub use undo::{UndoAction, UndoStack, MAX_UNDO_ACTIONS};

/// Sell price after risk and tax markups
pub fn sell_price(unit_price: f64, risk_percentage: f64, tax_percentage: f64) -> f64 {
    sanitize(sanitize(unit_price) * (1.0 + percent(risk_percentage)) * (1.0 + percent(tax_percentage)))
}

/// A saved line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCard {
    /// Unique within the project. Older files stored numeric ids.
    #[serde(default = "new_card_id", deserialize_with = "card_id")]
    pub id: String,

    #[serde(default)]
    pub main_item: String,

    #[serde(default)]
    pub sub_item: String,

    #[serde(default, deserialize_with = "lenient::f64")]
    pub quantity: f64,

    #[serde(default)]
    pub unit: String,

    /// Grand total at the time the card was saved
    #[serde(default, deserialize_with = "lenient::f64")]
    pub total: f64,

    #[serde(default, deserialize_with = "lenient::f64")]
    pub unit_price: f64,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::option_f64")]
    pub risk_percentage: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::option_f64")]
    pub tax_percentage: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::option_f64")]
    pub sell_price: Option<f64>,
}

fn new_card_id() -> String {
    Uuid::new_v4().to_string()
}

fn card_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => new_card_id(),
        other => other.to_string(),
    })
}

impl SummaryCard {
    pub fn new(
        main_item: impl Into<String>,
        sub_item: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        total: f64,
        unit_price: f64,
    ) -> Self {
        SummaryCard {
            id: new_card_id(),
            main_item: main_item.into(),
            sub_item: sub_item.into(),
            quantity,
            unit: unit.into(),
            total,
            unit_price,
            risk_percentage: None,
            tax_percentage: None,
            sell_price: None,
        }
    }

    /// Card for a calculated line item; `None` unless the selection is
    /// priceable and the total is positive.
    pub fn from_line_item(input: &LineItemInput, result: &LineItemResult) -> Option<Self> {
        if !input.is_priceable() || !(result.grand_total > 0.0) {
            return None;
        }
        let quantity = sanitize(input.quantity);
        let unit_price = if result.unit_price > 0.0 {
            result.unit_price
        } else {
            result.grand_total / quantity
        };
        Some(SummaryCard::new(
            input.main_item.clone(),
            input.sub_item.clone(),
            quantity,
            result.unit.clone(),
            result.grand_total,
            unit_price,
        ))
    }

    /// `"main - sub"`
    pub fn title(&self) -> String {
        format!("{} - {}", self.main_item, self.sub_item)
    }

    pub fn has_markups(&self) -> bool {
        self.risk_percentage.is_some() || self.tax_percentage.is_some()
    }

    /// Store risk and tax and recompute the sell price
    pub fn apply_risk_tax(&mut self, risk_percentage: f64, tax_percentage: f64) {
        let risk = sanitize(risk_percentage);
        let tax = sanitize(tax_percentage);
        self.risk_percentage = Some(risk);
        self.tax_percentage = Some(tax);
        self.sell_price = Some(sell_price(self.unit_price, risk, tax));
    }

    /// Recompute the sell price from stored risk and tax, if either is set
    fn refresh_sell_price(&mut self) {
        if self.has_markups() {
            let risk = self.risk_percentage.unwrap_or(0.0);
            let tax = self.tax_percentage.unwrap_or(0.0);
            self.apply_risk_tax(risk, tax);
        }
    }

    /// Sell price, falling back to unit price when unset or zero
    pub fn effective_sell_price(&self) -> f64 {
        match self.sell_price.map(sanitize) {
            Some(price) if price != 0.0 => price,
            _ => sanitize(self.unit_price),
        }
    }

    pub fn cost_total(&self) -> f64 {
        sanitize(sanitize(self.unit_price) * sanitize(self.quantity))
    }

    pub fn selling_total(&self) -> f64 {
        sanitize(self.effective_sell_price() * sanitize(self.quantity))
    }
}

/// Project-level totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryTotals {
    pub summary_total: f64,
    pub selling_total: f64,
    pub final_total: f64,
    pub supervision_percentage: f64,
}

impl SummaryTotals {
    pub fn compute(cards: &[SummaryCard], supervision_percentage: f64) -> Self {
        let summary_total = cards.iter().map(SummaryCard::cost_total).sum();
        let selling_total: f64 = cards.iter().map(SummaryCard::selling_total).sum();
        let supervision_percentage = sanitize(supervision_percentage);
        SummaryTotals {
            summary_total,
            selling_total,
            final_total: sanitize(selling_total * (1.0 + percent(supervision_percentage))),
            supervision_percentage,
        }
    }
}

/// Live, ordered summary cards with undo and totals.
#[derive(Debug, Clone, Default)]
pub struct SummaryBoard {
    cards: Vec<SummaryCard>,
    undo: UndoStack,
    supervision_percentage: f64,
    totals: SummaryTotals,
}

impl SummaryBoard {
    /// Board over loaded cards. Cards with risk or tax get their sell
    /// price recomputed, as if each were added with [`Self::add_card`].
    pub fn new(mut cards: Vec<SummaryCard>, supervision_percentage: f64) -> Self {
        cards.iter_mut().for_each(SummaryCard::refresh_sell_price);
        let mut board = SummaryBoard {
            cards,
            undo: UndoStack::default(),
            supervision_percentage: sanitize(supervision_percentage),
            totals: SummaryTotals::default(),
        };
        board.recompute();
        board
    }

    pub fn cards(&self) -> &[SummaryCard] {
        &self.cards
    }

    pub fn card(&self, id: &str) -> Option<&SummaryCard> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn totals(&self) -> SummaryTotals {
        self.totals
    }

    pub fn supervision_percentage(&self) -> f64 {
        self.supervision_percentage
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Append a card. Cards carrying risk or tax get their sell price
    /// recomputed from the stored unit price.
    pub fn add_card(&mut self, mut card: SummaryCard) {
        card.refresh_sell_price();
        self.cards.push(card);
        self.recompute();
    }

    /// Remove a card, remembering where it was. Unknown ids are ignored.
    pub fn delete_card(&mut self, id: &str) -> bool {
        let Some(position) = self.position(id) else {
            return false;
        };
        let card = self.cards.remove(position);
        self.undo.push(UndoAction::Delete { card, position });
        self.recompute();
        true
    }

    /// Restore the most recently deleted card at its old position, or at
    /// the end when that position no longer exists.
    pub fn undo(&mut self) -> bool {
        let Some(action) = self.undo.pop() else {
            return false;
        };
        match action {
            UndoAction::Delete { card, position } => {
                if position < self.cards.len() {
                    self.cards.insert(position, card);
                } else {
                    self.cards.push(card);
                }
            }
        }
        self.recompute();
        true
    }

    pub fn update_card_risk_tax(&mut self, id: &str, risk_percentage: f64, tax_percentage: f64) -> bool {
        let Some(card) = self.cards.iter_mut().find(|c| c.id == id) else {
            return false;
        };
        card.apply_risk_tax(risk_percentage, tax_percentage);
        self.recompute();
        true
    }

    pub fn set_supervision_percentage(&mut self, supervision_percentage: f64) {
        self.supervision_percentage = sanitize(supervision_percentage);
        self.recompute();
    }

    /// Drop all cards and undo history
    pub fn clear(&mut self) {
        self.cards.clear();
        self.undo.clear();
        self.recompute();
    }

    fn recompute(&mut self) {
        self.totals = SummaryTotals::compute(&self.cards, self.supervision_percentage);
        tracing::debug!(
            cards = self.cards.len(),
            summary_total = self.totals.summary_total,
            final_total = self.totals.final_total,
            "summary totals recomputed"
        );
    }
}
