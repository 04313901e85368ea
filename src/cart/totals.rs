//! Totals

use rusty_money::{Money, iso::Currency};
use tracing::warn;

use crate::{
    cart::{LineItem, selection::Selection},
    pricing::line_total_minor,
};

/// Price summary of the selected part of a cart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals<'a> {
    /// Sum of list prices
    pub subtotal: Money<'a, Currency>,

    /// Sum of paid prices
    pub total: Money<'a, Currency>,

    /// `subtotal - total`
    pub savings: Money<'a, Currency>,

    /// Number of units selected
    pub quantity: usize,
}

/// Sum `unit_price_paid × quantity` over every selected item.
///
/// Unselected items contribute nothing and an empty selection totals zero. Items priced in a
/// currency other than `currency` are skipped with a warning.
pub fn compute_total<'a>(
    items: &[LineItem<'_>],
    selected: &Selection,
    currency: &'a Currency,
) -> Money<'a, Currency> {
    let total_minor = selected_items(items, selected, currency).fold(0_i64, |acc, item| {
        acc.saturating_add(line_total_minor(
            item.unit_price_paid().to_minor_units(),
            item.quantity(),
        ))
    });

    Money::from_minor(total_minor, currency)
}

/// Subtotal, total, savings and unit count over every selected item.
pub fn summarize<'a>(
    items: &[LineItem<'_>],
    selected: &Selection,
    currency: &'a Currency,
) -> CartTotals<'a> {
    let (subtotal_minor, total_minor, quantity) = selected_items(items, selected, currency).fold(
        (0_i64, 0_i64, 0_usize),
        |(subtotal, total, quantity), item| {
            (
                subtotal.saturating_add(line_total_minor(
                    item.unit_price().to_minor_units(),
                    item.quantity(),
                )),
                total.saturating_add(line_total_minor(
                    item.unit_price_paid().to_minor_units(),
                    item.quantity(),
                )),
                quantity.saturating_add(item.quantity()),
            )
        },
    );

    CartTotals {
        subtotal: Money::from_minor(subtotal_minor, currency),
        total: Money::from_minor(total_minor, currency),
        savings: Money::from_minor(subtotal_minor.saturating_sub(total_minor), currency),
        quantity,
    }
}

fn selected_items<'i, 'a>(
    items: &'i [LineItem<'a>],
    selected: &'i Selection,
    currency: &'i Currency,
) -> impl Iterator<Item = &'i LineItem<'a>> {
    items
        .iter()
        .filter(|item| selected.contains(item.product_id()))
        .filter(move |item| {
            let item_currency = item.unit_price_paid().currency();

            if item_currency == currency {
                true
            } else {
                warn!(
                    product_id = %item.product_id(),
                    item_currency = item_currency.iso_alpha_code,
                    cart_currency = currency.iso_alpha_code,
                    "skipping cart item priced in a different currency"
                );
                false
            }
        })
}
