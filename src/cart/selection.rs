//! Selection
//!
//! The set of checked cart rows. Selection is tracked per product, matching the consolidated
//! rows the user sees, and every operation returns a new set instead of mutating in place.

use rustc_hash::FxHashSet;

use crate::{cart::LineItem, products::ProductId};

/// Set of currently checked product ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: FxHashSet<ProductId>,
}

impl Selection {
    /// An empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A selection holding every item in `items`.
    #[must_use]
    pub fn of_items(items: &[LineItem<'_>]) -> Self {
        items.iter().map(|item| item.product_id().clone()).collect()
    }

    /// Returns a new selection with `product_id` added if absent, removed if present.
    #[must_use]
    pub fn toggle_select(&self, product_id: &ProductId) -> Self {
        let mut ids = self.ids.clone();

        if !ids.remove(product_id) {
            ids.insert(product_id.clone());
        }

        Self { ids }
    }

    /// Select every id in `all_ids`, or clear the selection when it already holds exactly them.
    ///
    /// One control serves as both "select all" and "deselect all".
    #[must_use]
    pub fn select_all(&self, all_ids: &[ProductId]) -> Self {
        let all: Self = all_ids.iter().cloned().collect();

        if *self == all { Self::new() } else { all }
    }

    /// Returns a new selection without ids that no longer match an item in `items`.
    #[must_use]
    pub fn pruned(&self, items: &[LineItem<'_>]) -> Self {
        let present: FxHashSet<&ProductId> = items.iter().map(LineItem::product_id).collect();

        self.ids
            .iter()
            .filter(|id| present.contains(id))
            .cloned()
            .collect()
    }

    /// Whether `product_id` is selected.
    pub fn contains(&self, product_id: &ProductId) -> bool {
        self.ids.contains(product_id)
    }

    /// Number of selected products.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate over the selected ids in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &ProductId> {
        self.ids.iter()
    }

    /// Whether no id is selected in both `self` and `other`.
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.ids.is_disjoint(&other.ids)
    }

    /// Ids selected in either `self` or `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        self.ids.union(&other.ids).cloned().collect()
    }
}

impl FromIterator<ProductId> for Selection {
    fn from_iter<I: IntoIterator<Item = ProductId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
