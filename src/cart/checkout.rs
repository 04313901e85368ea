//! Checkout
//!
//! Builds the batch status-update payload for the selected rows.

use serde::Serialize;

use crate::cart::{CartLineId, CartLineStatus, LineItem, selection::Selection};

/// One cart line in a status-update batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutEntry {
    /// Cart line id
    #[serde(rename = "_id")]
    pub cart_line_id: CartLineId,

    /// Correlation id of the line
    pub cart_no: String,
}

/// Batch status-update request body: `{ status, items: [{ _id, cart_no }] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    /// Status to move every line to
    pub status: CartLineStatus,

    /// Lines to update
    pub items: Vec<CheckoutEntry>,
}

impl StatusUpdate {
    /// Whether the batch has no lines. Empty batches must not be sent.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of lines in the batch.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// The cart line ids in the batch.
    pub fn cart_line_ids(&self) -> impl Iterator<Item = &CartLineId> {
        self.items.iter().map(|entry| &entry.cart_line_id)
    }
}

/// Emit one entry per cart line of every selected row, in row then line order.
pub fn prepare_checkout_batch(
    items: &[LineItem<'_>],
    selected: &Selection,
    new_status: CartLineStatus,
) -> StatusUpdate {
    let entries = items
        .iter()
        .filter(|item| selected.contains(item.product_id()))
        .flat_map(LineItem::lines)
        .map(|line| CheckoutEntry {
            cart_line_id: line.id.clone(),
            cart_no: line.cart_no.clone(),
        })
        .collect();

    StatusUpdate {
        status: new_status,
        items: entries,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        cart::{consolidate, test_support::scenario_lines},
        products::ProductId,
    };

    use super::*;

    #[test]
    fn batch_contains_every_line_of_selected_items() {
        let items = consolidate(&scenario_lines());
        let selected: Selection = [ProductId::new("P1")].into_iter().collect();

        let batch = prepare_checkout_batch(&items, &selected, CartLineStatus::WaitingPaid);

        assert_eq!(batch.status, CartLineStatus::WaitingPaid);
        assert_eq!(
            batch.items,
            vec![
                CheckoutEntry {
                    cart_line_id: CartLineId::new("a"),
                    cart_no: "CART-a".to_string(),
                },
                CheckoutEntry {
                    cart_line_id: CartLineId::new("b"),
                    cart_no: "CART-b".to_string(),
                },
            ]
        );
    }

    #[test]
    fn empty_selection_yields_empty_batch() {
        let items = consolidate(&scenario_lines());

        let batch = prepare_checkout_batch(&items, &Selection::new(), CartLineStatus::Completed);

        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }

    #[test]
    fn batch_serializes_to_gateway_shape() -> TestResult {
        let items = consolidate(&scenario_lines());
        let selected: Selection = [ProductId::new("P2")].into_iter().collect();

        let batch = prepare_checkout_batch(&items, &selected, CartLineStatus::Completed);

        assert_eq!(
            serde_json::to_value(&batch)?,
            json!({
                "status": "completed",
                "items": [{ "_id": "c", "cart_no": "CART-c" }],
            })
        );

        Ok(())
    }
}
