//! Bounded undo stack for summary card edits.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::SummaryCard;

/// Number of actions kept; older ones are discarded.
pub const MAX_UNDO_ACTIONS: usize = 10;

/// A reversible summary edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum UndoAction {
    /// A card was removed from `position`
    Delete { card: SummaryCard, position: usize },
}

/// Fixed-capacity LIFO of [`UndoAction`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoStack {
    actions: VecDeque<UndoAction>,
    capacity: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::with_capacity(MAX_UNDO_ACTIONS)
    }
}

impl UndoStack {
    pub fn with_capacity(capacity: usize) -> Self {
        UndoStack {
            actions: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record an action, dropping the oldest when full
    pub fn push(&mut self, action: UndoAction) {
        self.actions.push_back(action);
        while self.actions.len() > self.capacity {
            self.actions.pop_front();
        }
    }

    /// Take the most recent action
    pub fn pop(&mut self) -> Option<UndoAction> {
        self.actions.pop_back()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}
