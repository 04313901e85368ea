//! Cart Fixtures

use rusty_money::Money;
use serde::Deserialize;

use crate::{
    cart::{CartLine, CartLineId, CartLineStatus},
    fixtures::{FixtureError, products::parse_price},
    products::Product,
};

/// Wrapper for cart lines in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart lines in gateway order
    pub lines: Vec<CartLineFixture>,
}

/// Cart Line Fixture
///
/// Name, type, category and list price come from the referenced product.
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Cart line id
    pub id: String,

    /// Id of a product from the loaded product fixtures
    pub product: String,

    /// Lifecycle status
    #[serde(default = "default_status")]
    pub status: String,

    /// Price paid (e.g., "8.00 USD"); the product's discounted price when omitted
    #[serde(default)]
    pub price_paid: Option<String>,

    /// Correlation id; derived from the line id when omitted
    #[serde(default)]
    pub cart_no: Option<String>,
}

fn default_status() -> String {
    CartLineStatus::New.as_str().to_string()
}

impl CartLineFixture {
    /// Build the cart line for one unit of `product`.
    ///
    /// # Errors
    ///
    /// Returns an error if the status is unknown, the paid price cannot be parsed or is in a
    /// different currency than the product.
    pub fn into_cart_line<'a>(self, product: &Product<'a>) -> Result<CartLine<'a>, FixtureError> {
        let status = self
            .status
            .parse::<CartLineStatus>()
            .map_err(|err| FixtureError::UnknownStatus(err.0))?;

        let unit_price_paid = match self.price_paid.as_deref() {
            Some(price_paid) => {
                let (minor_units, currency) = parse_price(price_paid)?;

                if currency != product.price.currency() {
                    return Err(FixtureError::CurrencyMismatch(
                        product.price.currency().iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }

                Money::from_minor(minor_units, product.price.currency())
            }
            None => product.discounted_price()?,
        };

        let cart_no = self.cart_no.unwrap_or_else(|| format!("CN-{}", self.id));

        Ok(CartLine {
            id: CartLineId::new(self.id),
            product_id: product.id.clone(),
            product_type: product.product_type.clone(),
            name: product.name.clone(),
            image_url: product.image_url.clone(),
            category_name: product.category_name.clone(),
            unit_price: product.price,
            unit_price_paid,
            discount: product.discount,
            status,
            cart_no,
        })
    }
}
