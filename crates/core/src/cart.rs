//! Cart selection and quantity editing.
//!
//! The cart page lets a customer tick which lines go to checkout and type
//! new quantities before committing them. [`CartSelection`] holds that
//! transient state over a snapshot of the backend cart. Nothing here is
//! authoritative: committed quantities always come back from the backend.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::CartItem;
use crate::types::{CartItemId, Rupiah};

/// Quantity input that cannot be committed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// Not an integer, or less than one.
    #[error("Kuantitas minimal adalah 1.")]
    Invalid,
}

/// Parse a quantity typed by the customer.
///
/// # Errors
///
/// Returns [`QuantityError::Invalid`] unless the trimmed input is an
/// integer of at least 1.
pub fn parse_quantity(input: &str) -> Result<u32, QuantityError> {
    match input.trim().parse::<u32>() {
        Ok(q) if q >= 1 => Ok(q),
        _ => Err(QuantityError::Invalid),
    }
}

/// One quantity lower, never below 1.
#[must_use]
pub const fn decrement(quantity: u32) -> u32 {
    if quantity > 1 { quantity - 1 } else { 1 }
}

/// One quantity higher, saturating.
#[must_use]
pub const fn increment(quantity: u32) -> u32 {
    quantity.saturating_add(1)
}

/// Total number of units in the cart, shown on the header badge.
#[must_use]
pub fn cart_badge_count(items: &[CartItem]) -> u32 {
    items
        .iter()
        .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    id: CartItemId,
    unit_price: Rupiah,
    quantity: u32,
}

/// Which cart lines are selected for checkout, plus uncommitted quantities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartSelection {
    lines: Vec<Line>,
    selected: BTreeSet<CartItemId>,
    pending: BTreeMap<CartItemId, u32>,
}

impl CartSelection {
    /// A selection over `items` with every line selected.
    #[must_use]
    pub fn all_selected(items: &[CartItem]) -> Self {
        let lines: Vec<Line> = items
            .iter()
            .map(|item| Line {
                id: item.id,
                unit_price: item.product.price,
                quantity: item.quantity,
            })
            .collect();
        let selected = lines.iter().map(|line| line.id).collect();
        Self {
            lines,
            selected,
            pending: BTreeMap::new(),
        }
    }

    /// A selection over `items` with only `ids` selected. Unknown ids are ignored.
    #[must_use]
    pub fn with_selected(items: &[CartItem], ids: &[CartItemId]) -> Self {
        let mut selection = Self::all_selected(items);
        selection.selected.retain(|id| ids.contains(id));
        selection
    }

    /// Flip the selection of one line.
    pub fn toggle(&mut self, id: CartItemId) {
        if !self.contains(id) {
            return;
        }
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// Select or clear every line.
    pub fn set_all(&mut self, selected: bool) {
        if selected {
            self.selected = self.lines.iter().map(|line| line.id).collect();
        } else {
            self.selected.clear();
        }
    }

    /// Drop a line along with its selection and pending quantity.
    pub fn remove(&mut self, id: CartItemId) {
        self.lines.retain(|line| line.id != id);
        self.selected.remove(&id);
        self.pending.remove(&id);
    }

    /// Record a quantity typed for a line but not yet committed.
    pub fn set_pending_quantity(&mut self, id: CartItemId, quantity: u32) {
        if self.contains(id) {
            self.pending.insert(id, quantity);
        }
    }

    /// The quantity the customer currently sees for a line.
    #[must_use]
    pub fn display_quantity(&self, id: CartItemId) -> Option<u32> {
        self.pending.get(&id).copied().or_else(|| {
            self.lines
                .iter()
                .find(|line| line.id == id)
                .map(|line| line.quantity)
        })
    }

    /// Whether a line's pending quantity differs from the committed one.
    #[must_use]
    pub fn is_dirty(&self, id: CartItemId) -> bool {
        self.lines
            .iter()
            .find(|line| line.id == id)
            .is_some_and(|line| self.pending.get(&id).is_some_and(|&q| q != line.quantity))
    }

    /// Sum of selected lines, using pending quantities where set.
    #[must_use]
    pub fn selected_total(&self) -> Rupiah {
        self.lines
            .iter()
            .filter(|line| self.selected.contains(&line.id))
            .map(|line| {
                let quantity = self.pending.get(&line.id).copied().unwrap_or(line.quantity);
                line.unit_price * quantity
            })
            .sum()
    }

    /// Whether the cart is non-empty and every line is selected.
    #[must_use]
    pub fn is_all_selected(&self) -> bool {
        !self.lines.is_empty() && self.lines.iter().all(|line| self.selected.contains(&line.id))
    }

    /// Whether a line is selected.
    #[must_use]
    pub fn is_selected(&self, id: CartItemId) -> bool {
        self.selected.contains(&id)
    }

    #[must_use]
    pub fn has_selected(&self) -> bool {
        !self.selected.is_empty()
    }

    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Selected ids in cart order.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<CartItemId> {
        self.lines
            .iter()
            .map(|line| line.id)
            .filter(|id| self.selected.contains(id))
            .collect()
    }

    /// The `items=1,2,3` query for the checkout page, or `None` when
    /// nothing is selected.
    #[must_use]
    pub fn checkout_query(&self) -> Option<String> {
        let ids = self.selected_ids();
        if ids.is_empty() {
            return None;
        }
        let joined = ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        Some(format!("items={joined}"))
    }

    fn contains(&self, id: CartItemId) -> bool {
        self.lines.iter().any(|line| line.id == id)
    }
}
