//! Receipt
//!
//! Terminal rendering of a consolidated cart: one row per line item, then the subtotal,
//! total and savings of the selected rows.

use std::{fmt::Write, io};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::{
        LineItem,
        selection::Selection,
        totals::{CartTotals, summarize},
    },
    pricing::percent_points,
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// One rendered cart row.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptRow<'a> {
    /// Whether the row counts towards the totals
    pub selected: bool,

    /// Product name
    pub name: String,

    /// Product category, if any
    pub category: Option<String>,

    /// Units in the cart
    pub quantity: usize,

    /// List price per unit
    pub unit_price: Money<'a, Currency>,

    /// Paid price per unit
    pub unit_price_paid: Money<'a, Currency>,

    /// Discount in percent points
    pub discount_points: Decimal,

    /// Paid price times quantity
    pub line_total: Money<'a, Currency>,
}

/// Summary of a cart ready to print.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    rows: Vec<ReceiptRow<'a>>,
    totals: CartTotals<'a>,
}

impl<'a> Receipt<'a> {
    /// Build a receipt for `items`, totalling the `selected` rows in `currency`.
    #[must_use]
    pub fn from_cart(items: &[LineItem<'a>], selected: &Selection, currency: &'a Currency) -> Self {
        let rows = items
            .iter()
            .map(|item| ReceiptRow {
                selected: selected.contains(item.product_id()),
                name: item.name().to_string(),
                category: item.category_name().map(str::to_string),
                quantity: item.quantity(),
                unit_price: *item.unit_price(),
                unit_price_paid: *item.unit_price_paid(),
                discount_points: item.discount_points(),
                line_total: item.line_total(),
            })
            .collect();

        Self {
            rows,
            totals: summarize(items, selected, currency),
        }
    }

    /// Rendered rows, in cart order.
    #[must_use]
    pub fn rows(&self) -> &[ReceiptRow<'a>] {
        &self.rows
    }

    /// Totals over the selected rows.
    #[must_use]
    pub fn totals(&self) -> &CartTotals<'a> {
        &self.totals
    }

    /// Savings as a fraction of the subtotal.
    #[must_use]
    pub fn savings_percent(&self) -> Percentage {
        let subtotal_minor = self.totals.subtotal.to_minor_units();

        if subtotal_minor == 0 {
            return Percentage::from(0.0);
        }

        Percentage::from(
            Decimal::from(self.totals.savings.to_minor_units()) / Decimal::from(subtotal_minor),
        )
    }

    /// Prints the receipt.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "Category", "Qty", "Unit Price", "Paid", "Total"]);

        let mut color_ops: Vec<(usize, usize, Color)> = Vec::new();

        for (idx, row) in self.rows.iter().enumerate() {
            let table_row = idx + 1;

            builder.push_record([
                if row.selected { "✓" } else { "" }.to_string(),
                row.name.clone(),
                row.category.clone().unwrap_or_default(),
                row.quantity.to_string(),
                row.unit_price.to_string(),
                paid_cell(row),
                row.line_total.to_string(),
            ]);

            if row.selected {
                color_ops.push((table_row, 0, Color::FG_GREEN));
            } else {
                color_ops.push((table_row, 1, color_dark_grey()));
                color_ops.push((table_row, 6, color_dark_grey()));
            }
        }

        write_table(&mut out, builder, color_ops)?;
        write_summary(&mut out, self)
    }
}

fn paid_cell(row: &ReceiptRow<'_>) -> String {
    if row.unit_price_paid == row.unit_price {
        row.unit_price_paid.to_string()
    } else {
        format!("{} (-{}%)", row.unit_price_paid, row.discount_points)
    }
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    color_ops: Vec<(usize, usize, Color)>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..7), Alignment::right());

    for (row, col, color) in color_ops {
        table.modify((row, col), color);
    }

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_summary(out: &mut impl io::Write, receipt: &Receipt<'_>) -> Result<(), ReceiptError> {
    let totals = receipt.totals();
    let savings_points = percent_points(receipt.savings_percent());

    let lines = [
        (" Items:", format!("{}  ", totals.quantity)),
        (" Subtotal:", format!("{}  ", totals.subtotal)),
        (" \x1b[1mTotal:\x1b[0m", format!("\x1b[1m{}\x1b[0m  ", totals.total)),
        (" Savings:", format!("({savings_points:.2}%) {}  ", totals.savings)),
    ];

    let label_width = lines
        .iter()
        .map(|(label, _)| visible_width(label))
        .max()
        .unwrap_or_default();

    let value_width = lines
        .iter()
        .map(|(_, value)| visible_width(value))
        .max()
        .unwrap_or_default();

    for (label, value) in &lines {
        let label_pad = label_width.saturating_sub(visible_width(label));
        let value_pad = value_width.saturating_sub(visible_width(value));

        writeln!(
            out,
            "{:>label_pad$}{label}  {}{value}",
            "",
            " ".repeat(value_pad)
        )
        .map_err(|_err| ReceiptError::IO)?;
    }

    writeln!(out).map_err(|_err| ReceiptError::IO)
}

/// Wraps runs of box-drawing characters (U+2500..U+257F) in ANSI dark-grey escapes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// ANSI dark grey foreground.
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}
