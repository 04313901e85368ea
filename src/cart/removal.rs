//! Removal
//!
//! Works out which cart lines must be deleted on the gateway when rows are removed. Nothing
//! here performs I/O; callers drop the rows locally only once the gateway confirmed.

use crate::{
    cart::{CartLineId, LineItem, selection::Selection},
    products::ProductId,
};

/// Outcome of removing rows from a consolidated cart.
#[derive(Debug, Clone, PartialEq)]
pub struct Removal<'a> {
    /// Rows left in the cart, in their original order
    pub remaining: Vec<LineItem<'a>>,

    /// Cart lines to delete on the gateway, in row then line order
    pub removed_cart_line_ids: Vec<CartLineId>,
}

impl Removal<'_> {
    /// Whether nothing was removed.
    pub fn is_empty(&self) -> bool {
        self.removed_cart_line_ids.is_empty()
    }
}

/// Remove the row for `product_id`.
///
/// Removing an absent product returns the items unchanged with nothing to delete.
pub fn remove_line_item<'a>(items: Vec<LineItem<'a>>, product_id: &ProductId) -> Removal<'a> {
    remove_where(items, |item| item.product_id() == product_id)
}

/// Remove every selected row at once.
pub fn remove_selected<'a>(items: Vec<LineItem<'a>>, selected: &Selection) -> Removal<'a> {
    remove_where(items, |item| selected.contains(item.product_id()))
}

fn remove_where<'a>(
    items: Vec<LineItem<'a>>,
    mut remove: impl FnMut(&LineItem<'a>) -> bool,
) -> Removal<'a> {
    let mut remaining = Vec::with_capacity(items.len());
    let mut removed_cart_line_ids = Vec::new();

    for item in items {
        if remove(&item) {
            removed_cart_line_ids.extend(item.cart_line_ids().cloned());
        } else {
            remaining.push(item);
        }
    }

    Removal {
        remaining,
        removed_cart_line_ids,
    }
}
