//! Cart session
//!
//! Holds the consolidated cart and the selection for one screen, and talks to the gateway on
//! refresh, removal and checkout. Selection changes are local. Removals and checkouts are
//! only reflected locally after the gateway confirmed them.

use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::{
    cart::{
        CartLineId, CartLineStatus, LineItem, consolidate, consolidate_with_status,
        checkout::prepare_checkout_batch,
        product_ids,
        removal::{Removal, remove_line_item, remove_selected},
        selection::Selection,
        totals::{CartTotals, compute_total, summarize},
    },
    gateway::{CartGateway, CartQuery, GatewayError, fetch_all},
    products::ProductId,
};

/// Errors raised by cart session operations. Local state is unchanged when one is returned.
#[derive(Debug, Error)]
pub enum CartSessionError {
    /// The gateway call failed.
    #[error("cart gateway request failed")]
    Gateway(#[from] GatewayError),
}

/// The active cart of one user.
#[derive(Debug)]
pub struct CartSession<G> {
    gateway: G,
    currency: &'static Currency,
    page_size: u32,
    items: Vec<LineItem<'static>>,
    selection: Selection,
}

impl<G: CartGateway> CartSession<G> {
    /// Create an empty session. Call [`CartSession::refresh`] to load the cart.
    pub fn new(gateway: G, currency: &'static Currency, page_size: u32) -> Self {
        Self {
            gateway,
            currency,
            page_size: page_size.max(1),
            items: Vec::new(),
            selection: Selection::new(),
        }
    }

    /// The gateway this session talks to.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Consolidated cart rows, in first-seen order.
    pub fn items(&self) -> &[LineItem<'static>] {
        &self.items
    }

    /// The selected products.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Reload the cart from the gateway.
    ///
    /// Fetches every page of active cart lines, skips malformed records, consolidates the
    /// rest and drops selected products that are no longer in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if any page cannot be fetched. The previous cart is kept.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<(), CartSessionError> {
        let query = CartQuery::active(self.page_size);
        let lines = fetch_all(&self.gateway, query, self.currency).await?;

        self.items = consolidate(&lines);
        self.selection = self.selection.pruned(&self.items);

        info!(
            lines = lines.len(),
            items = self.items.len(),
            selected = self.selection.len(),
            "refreshed cart"
        );

        Ok(())
    }

    /// Fetch every line in `status` and consolidate it for display, as the delivery status and
    /// purchase history screens do after checkout. The active cart is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if any page cannot be fetched.
    #[instrument(skip(self))]
    pub async fn lines_with_status(
        &self,
        status: CartLineStatus,
    ) -> Result<Vec<LineItem<'static>>, CartSessionError> {
        let query = CartQuery::with_status(status, self.page_size);
        let lines = fetch_all(&self.gateway, query, self.currency).await?;
        let items = consolidate_with_status(&lines, status);

        debug!(lines = lines.len(), items = items.len(), "fetched order lines");

        Ok(items)
    }

    pub fn toggle_select(&mut self, product_id: &ProductId) {
        self.selection = self.selection.toggle_select(product_id);
    }

    /// Select every row, or clear the selection if every row is already selected.
    pub fn select_all(&mut self) {
        self.selection = self.selection.select_all(&product_ids(&self.items));
    }

    /// Total paid price of the selected rows.
    pub fn total(&self) -> Money<'static, Currency> {
        compute_total(&self.items, &self.selection, self.currency)
    }

    /// Subtotal, total, savings and unit count of the selected rows.
    pub fn totals(&self) -> CartTotals<'static> {
        summarize(&self.items, &self.selection, self.currency)
    }

    /// Remove the row for `product_id`, deleting each of its cart lines on the gateway.
    ///
    /// Returns the deleted cart line ids; removing an absent product deletes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error on the first failed delete. Local state is unchanged; lines deleted
    /// before the failure disappear on the next refresh.
    #[instrument(skip(self))]
    pub async fn remove(
        &mut self,
        product_id: &ProductId,
    ) -> Result<Vec<CartLineId>, CartSessionError> {
        let removal = remove_line_item(self.items.clone(), product_id);

        self.apply_removal(removal).await
    }

    /// Remove every selected row.
    ///
    /// # Errors
    ///
    /// Same as [`CartSession::remove`].
    #[instrument(skip(self), fields(selected = self.selection.len()))]
    pub async fn remove_selected(&mut self) -> Result<Vec<CartLineId>, CartSessionError> {
        let removal = remove_selected(self.items.clone(), &self.selection);

        self.apply_removal(removal).await
    }

    async fn apply_removal(
        &mut self,
        removal: Removal<'static>,
    ) -> Result<Vec<CartLineId>, CartSessionError> {
        if removal.is_empty() {
            return Ok(Vec::new());
        }

        for id in &removal.removed_cart_line_ids {
            self.gateway.delete_cart_line(id).await?;
        }

        self.items = removal.remaining;
        self.selection = self.selection.pruned(&self.items);

        debug!(
            removed = removal.removed_cart_line_ids.len(),
            "removed cart lines"
        );

        Ok(removal.removed_cart_line_ids)
    }

    /// Move every cart line of the selected rows to `new_status`.
    ///
    /// Returns `false` without calling the gateway when nothing is selected. On success the
    /// checked-out rows leave the cart and the selection is cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if the status update fails. Local state is unchanged.
    #[instrument(skip(self))]
    pub async fn checkout(&mut self, new_status: CartLineStatus) -> Result<bool, CartSessionError> {
        let batch = prepare_checkout_batch(&self.items, &self.selection, new_status);

        if batch.is_empty() {
            debug!("nothing selected; skipping checkout");

            return Ok(false);
        }

        self.gateway.update_status(&batch).await?;

        self.items
            .retain(|item| !self.selection.contains(item.product_id()));
        self.selection = Selection::new();

        info!(lines = batch.len(), "checked out cart lines");

        Ok(true)
    }
}
