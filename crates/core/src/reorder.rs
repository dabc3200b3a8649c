//! Drag-and-drop ordering of dashboard cards.
//!
//! The list only ever holds a permutation of its identity tokens: a drag
//! moves one card, an observed order is accepted only if it is a permutation,
//! and a change in card count rebuilds the list from scratch.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChartError, Result};

/// Opaque identity of one card, stable across reorders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// A card was picked up by its handle at `from`.
    Dragging { from: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderList {
    order: Vec<CardId>,
    state: DragState,
}

impl ReorderList {
    pub fn new(len: usize) -> Self {
        Self {
            order: (0..len).map(CardId).collect(),
            state: DragState::Idle,
        }
    }

    pub fn order(&self) -> &[CardId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn position_of(&self, id: CardId) -> Option<usize> {
        self.order.iter().position(|c| *c == id)
    }

    /// Pointer went down on the handle of the card at `position`.
    pub fn begin_drag(&mut self, position: usize) -> bool {
        if self.is_dragging() || position >= self.order.len() {
            debug!(position, state = ?self.state, "drag start ignored");
            return false;
        }
        self.state = DragState::Dragging { from: position };
        true
    }

    /// Drops the dragged card at `target`. Returns the new order, or `None` when idle.
    pub fn drop_at(&mut self, target: usize) -> Option<&[CardId]> {
        let DragState::Dragging { from } = self.state else {
            return None;
        };
        self.state = DragState::Idle;
        let card = self.order.remove(from);
        let target = target.min(self.order.len());
        self.order.insert(target, card);
        debug!(from, to = target, card = card.0, "card moved");
        Some(&self.order)
    }

    pub fn cancel_drag(&mut self) {
        self.state = DragState::Idle;
    }

    /// Adopts an order read back from the view after a drop.
    pub fn commit_observed(&mut self, observed: &[CardId]) -> Result<()> {
        let current: HashSet<CardId> = self.order.iter().copied().collect();
        let seen: HashSet<CardId> = observed.iter().copied().collect();
        if observed.len() != self.order.len() || seen.len() != observed.len() || seen != current {
            return Err(ChartError::NotAPermutation {
                expected: self.order.len(),
                got: observed.len(),
            });
        }
        self.order = observed.to_vec();
        self.state = DragState::Idle;
        Ok(())
    }

    /// Rebuilds the list when the number of cards changed underneath it.
    /// Any stale order and in-flight drag are discarded. Returns whether a rebuild happened.
    pub fn sync_len(&mut self, len: usize) -> bool {
        if len == self.order.len() {
            return false;
        }
        debug!(old = self.order.len(), new = len, "card count changed, resetting order");
        *self = Self::new(len);
        true
    }
}
