//! Cart
//!
//! The gateway stores one cart line per purchased unit. The storefront shows one row per
//! product, so lines are consolidated into [`LineItem`]s keyed by product id before they
//! reach the selection, total, removal and checkout helpers in the submodules.

use std::{fmt, str::FromStr};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::warn;

use crate::{
    pricing::{line_total_minor, percent_points},
    products::{ProductId, ProductType},
};

pub mod checkout;
pub mod removal;
pub mod selection;
pub mod session;
pub mod totals;

/// Identifier of a single cart line record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartLineId(String);

impl CartLineId {
    /// Create a cart line id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CartLineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CartLineId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Unknown cart line status string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown cart line status: {0}")]
pub struct UnknownStatus(pub String);

/// Lifecycle of a cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartLineStatus {
    /// In the active, editable cart.
    New,

    /// Submitted for payment.
    WaitingPaid,

    /// Paid and finalised.
    Completed,

    /// Cancelled.
    Cancel,
}

impl CartLineStatus {
    /// The gateway representation of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::WaitingPaid => "waiting_paid",
            Self::Completed => "completed",
            Self::Cancel => "cancel",
        }
    }
}

impl fmt::Display for CartLineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CartLineStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "waiting_paid" => Ok(Self::WaitingPaid),
            "completed" => Ok(Self::Completed),
            "cancel" => Ok(Self::Cancel),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// One unit of a product previously added to the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine<'a> {
    /// Cart line id
    pub id: CartLineId,

    /// Product this unit belongs to
    pub product_id: ProductId,

    /// Product type
    pub product_type: ProductType,

    /// Product name
    pub name: String,

    /// Product image URL
    pub image_url: String,

    /// Product category, if any
    pub category_name: Option<String>,

    /// Original unit price
    pub unit_price: Money<'a, Currency>,

    /// Price actually charged for this unit
    pub unit_price_paid: Money<'a, Currency>,

    /// Discount as a fraction of the unit price
    pub discount: Percentage,

    /// Lifecycle status
    pub status: CartLineStatus,

    /// Correlation id used when submitting status changes
    pub cart_no: String,
}

/// Reference to one cart line inside a [`LineItem`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineRef {
    /// Cart line id
    pub id: CartLineId,

    /// Correlation id of the line
    pub cart_no: String,
}

/// A consolidated, user-facing cart row: every `new` cart line of one product.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem<'a> {
    product_id: ProductId,
    product_type: ProductType,
    name: String,
    image_url: String,
    category_name: Option<String>,
    unit_price: Money<'a, Currency>,
    unit_price_paid: Money<'a, Currency>,
    discount: Percentage,
    lines: SmallVec<[LineRef; 4]>,
}

impl<'a> LineItem<'a> {
    fn from_line(line: &CartLine<'a>) -> Self {
        let mut lines = SmallVec::new();

        lines.push(LineRef {
            id: line.id.clone(),
            cart_no: line.cart_no.clone(),
        });

        Self {
            product_id: line.product_id.clone(),
            product_type: line.product_type.clone(),
            name: line.name.clone(),
            image_url: line.image_url.clone(),
            category_name: line.category_name.clone(),
            unit_price: line.unit_price,
            unit_price_paid: line.unit_price_paid,
            discount: line.discount,
            lines,
        }
    }

    /// Add another unit of the same product. The first-seen price is kept.
    fn absorb(&mut self, line: &CartLine<'a>) {
        if line.unit_price != self.unit_price || line.unit_price_paid != self.unit_price_paid {
            warn!(
                product_id = %self.product_id,
                cart_line_id = %line.id,
                kept_price = %self.unit_price,
                kept_price_paid = %self.unit_price_paid,
                conflicting_price = %line.unit_price,
                conflicting_price_paid = %line.unit_price_paid,
                "conflicting prices for product in cart; keeping first-seen price"
            );
        }

        self.lines.push(LineRef {
            id: line.id.clone(),
            cart_no: line.cart_no.clone(),
        });
    }

    /// Returns the product id (the grouping key)
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Returns the product type
    pub fn product_type(&self) -> &ProductType {
        &self.product_type
    }

    /// Returns the product name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the product image URL
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Returns the product category, if any
    pub fn category_name(&self) -> Option<&str> {
        self.category_name.as_deref()
    }

    /// Returns the original unit price
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the price charged per unit
    pub fn unit_price_paid(&self) -> &Money<'a, Currency> {
        &self.unit_price_paid
    }

    /// Returns the discount as a fraction
    pub fn discount(&self) -> Percentage {
        self.discount
    }

    /// Returns the discount in percent points, as shown next to the price.
    pub fn discount_points(&self) -> Decimal {
        percent_points(self.discount)
    }

    /// Number of units of this product in the cart.
    pub fn quantity(&self) -> usize {
        self.lines.len()
    }

    /// The cart lines that make up this item, in input order.
    pub fn lines(&self) -> &[LineRef] {
        &self.lines
    }

    /// The ids of the cart lines that make up this item, in input order.
    pub fn cart_line_ids(&self) -> impl Iterator<Item = &CartLineId> {
        self.lines.iter().map(|line| &line.id)
    }

    /// `unit_price_paid × quantity`.
    pub fn line_total(&self) -> Money<'a, Currency> {
        Money::from_minor(
            line_total_minor(self.unit_price_paid.to_minor_units(), self.quantity()),
            self.unit_price_paid.currency(),
        )
    }
}

/// Consolidate raw cart lines into one [`LineItem`] per product.
///
/// Lines whose status is not [`CartLineStatus::New`] are ignored. Items are returned in the
/// order their product was first seen, and each item's cart line ids keep input order, so the
/// same input always yields the same output.
pub fn consolidate<'a>(lines: &[CartLine<'a>]) -> Vec<LineItem<'a>> {
    consolidate_with_status(lines, CartLineStatus::New)
}

/// Consolidate the lines in `status`, as [`consolidate`] does for the active cart.
///
/// Used by the order tracking views, which group checked-out lines the same way.
pub fn consolidate_with_status<'a>(
    lines: &[CartLine<'a>],
    status: CartLineStatus,
) -> Vec<LineItem<'a>> {
    let mut positions: FxHashMap<&ProductId, usize> = FxHashMap::default();
    let mut items: Vec<LineItem<'a>> = Vec::new();

    for line in lines.iter().filter(|line| line.status == status) {
        if let Some(item) = positions
            .get(&line.product_id)
            .copied()
            .and_then(|position| items.get_mut(position))
        {
            item.absorb(line);
            continue;
        }

        positions.insert(&line.product_id, items.len());
        items.push(LineItem::from_line(line));
    }

    items
}

/// The product ids of the given items, in item order.
pub fn product_ids(items: &[LineItem<'_>]) -> Vec<ProductId> {
    items.iter().map(|item| item.product_id().clone()).collect()
}


#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;

    use super::{test_support::*, *};

    fn ids<'i>(item: &'i LineItem<'_>) -> Vec<&'i str> {
        item.cart_line_ids().map(CartLineId::as_str).collect()
    }

    #[test]
    fn consolidate_groups_lines_by_product() {
        let items = consolidate(&scenario_lines());

        assert_eq!(items.len(), 2);

        let [p1, p2] = items.as_slice() else {
            panic!("expected two line items, got {items:?}");
        };

        assert_eq!(p1.product_id().as_str(), "P1");
        assert_eq!(p1.quantity(), 2);
        assert_eq!(p1.unit_price_paid(), &Money::from_minor(8_00, USD));
        assert_eq!(ids(p1), vec!["a", "b"]);

        assert_eq!(p2.product_id().as_str(), "P2");
        assert_eq!(p2.quantity(), 1);
        assert_eq!(p2.unit_price_paid(), &Money::from_minor(20_00, USD));
        assert_eq!(ids(p2), vec!["c"]);
    }

    #[test]
    fn consolidate_skips_lines_that_are_not_new() {
        let lines = vec![
            line("a", "P1", 10_00, 8_00),
            line("b", "P1", 10_00, 8_00),
            line_with_status("c", "P2", 20_00, 20_00, CartLineStatus::Cancel),
            line_with_status("d", "P1", 10_00, 8_00, CartLineStatus::Completed),
            line_with_status("e", "P3", 5_00, 5_00, CartLineStatus::WaitingPaid),
        ];

        let items = consolidate(&lines);

        assert_eq!(product_ids(&items), vec![ProductId::new("P1")]);
        assert_eq!(items.first().map(ids), Some(vec!["a", "b"]));
    }

    #[test]
    fn consolidate_with_status_groups_only_that_status() {
        let lines = vec![
            line("a", "P1", 10_00, 8_00),
            line_with_status("b", "P1", 10_00, 8_00, CartLineStatus::WaitingPaid),
            line_with_status("c", "P2", 20_00, 20_00, CartLineStatus::WaitingPaid),
            line_with_status("d", "P1", 10_00, 8_00, CartLineStatus::WaitingPaid),
            line_with_status("e", "P2", 20_00, 20_00, CartLineStatus::Completed),
        ];

        let items = consolidate_with_status(&lines, CartLineStatus::WaitingPaid);

        assert_eq!(
            product_ids(&items),
            vec![ProductId::new("P1"), ProductId::new("P2")]
        );
        assert_eq!(items.first().map(ids), Some(vec!["b", "d"]));
        assert_eq!(items.last().map(ids), Some(vec!["c"]));
    }

    #[test]
    fn consolidate_orders_items_by_first_appearance() {
        let lines = vec![
            line("x", "P2", 20_00, 20_00),
            line("a", "P1", 10_00, 8_00),
            line("y", "P2", 20_00, 20_00),
        ];

        let items = consolidate(&lines);

        assert_eq!(
            product_ids(&items),
            vec![ProductId::new("P2"), ProductId::new("P1")]
        );
        assert_eq!(items.first().map(ids), Some(vec!["x", "y"]));
    }

    #[test]
    fn consolidate_keeps_first_seen_price_on_conflict() {
        let lines = vec![line("a", "P1", 10_00, 8_00), line("b", "P1", 12_00, 9_00)];

        let items = consolidate(&lines);

        let item = items.first().expect("expected one line item");

        assert_eq!(item.quantity(), 2);
        assert_eq!(item.unit_price(), &Money::from_minor(10_00, USD));
        assert_eq!(item.unit_price_paid(), &Money::from_minor(8_00, USD));
    }

    #[test]
    fn consolidate_empty_input_yields_no_items() {
        assert!(consolidate(&[]).is_empty());
    }

    #[test]
    fn line_total_multiplies_paid_price_by_quantity() {
        let items = consolidate(&scenario_lines());

        let totals: Vec<i64> = items
            .iter()
            .map(|item| item.line_total().to_minor_units())
            .collect();

        assert_eq!(totals, vec![16_00, 20_00]);
    }

    #[test]
    fn line_items_keep_cart_numbers_per_line() {
        let items = consolidate(&scenario_lines());

        let cart_nos: Vec<&str> = items
            .iter()
            .flat_map(LineItem::lines)
            .map(|line| line.cart_no.as_str())
            .collect();

        assert_eq!(cart_nos, vec!["CART-a", "CART-b", "CART-c"]);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            CartLineStatus::New,
            CartLineStatus::WaitingPaid,
            CartLineStatus::Completed,
            CartLineStatus::Cancel,
        ] {
            assert_eq!(status.as_str().parse::<CartLineStatus>(), Ok(status));
        }

        assert_eq!(
            "shipped".parse::<CartLineStatus>(),
            Err(UnknownStatus("shipped".to_string()))
        );
    }
}
