//! Products
//!
//! Identifiers and catalog records shared by the cart, favourites and filter modules.

use std::fmt;

use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::pricing::{PricingError, discounted_price};

/// Product identifier, as assigned by the catalog gateway.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a product id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier carries no characters other than whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ProductId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Kind of product sold by the storefront.
///
/// Unknown values reported by the gateway are preserved verbatim in [`ProductType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProductType {
    /// A STEM kit.
    Kit,

    /// A lab (guided experiment).
    Lab,

    /// A bundle of kits and labs.
    Combo,

    /// Any other product type string.
    Other(String),
}

impl ProductType {
    /// Parse a gateway product type string. Matching is case-insensitive.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "kit" => Self::Kit,
            "lab" => Self::Lab,
            "combo" => Self::Combo,
            _ => Self::Other(value.to_string()),
        }
    }

    /// The gateway representation of this product type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Kit => "kit",
            Self::Lab => "lab",
            Self::Combo => "combo",
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ProductType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<ProductType> for String {
    fn from(value: ProductType) -> Self {
        value.as_str().to_string()
    }
}

/// A catalog product, as listed on the kits, labs and combo screens.
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    /// Product id
    pub id: ProductId,

    /// Product name
    pub name: String,

    /// Product type
    pub product_type: ProductType,

    /// Category shown on the category tabs, if the gateway reported one
    pub category_name: Option<String>,

    /// List price
    pub price: Money<'a, Currency>,

    /// Limited-time discount as a fraction of the list price
    pub discount: Percentage,

    /// Image URL
    pub image_url: String,

    /// Soft-deleted products are hidden from listings
    pub is_deleted: bool,
}

impl<'a> Product<'a> {
    /// The list price with the product's discount applied.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] if the discount cannot be represented in minor units.
    pub fn discounted_price(&self) -> Result<Money<'a, Currency>, PricingError> {
        discounted_price(&self.price, &self.discount)
    }
}

/// A customer review left on a product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Review {
    /// Review id
    #[serde(rename = "_id")]
    pub id: String,

    /// Display name of the reviewer
    #[serde(default)]
    pub author: String,

    /// Star rating, nominally 1 to 5
    pub rating: u8,

    /// Review text
    #[serde(default)]
    pub content: String,

    /// Creation date as reported by the gateway
    #[serde(default)]
    pub date: String,
}
