//! Gateway
//!
//! Boundary with the remote catalog API: request and response shapes, the conversion from
//! wire records to [`CartLine`]s, and the [`CartGateway`] trait the cart session calls.

use async_trait::async_trait;
use decimal_percentage::Percentage;
use mockall::automock;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::{
    cart::{CartLine, CartLineId, CartLineStatus, UnknownStatus, checkout::StatusUpdate},
    pricing::{PricingError, minor_units_from_major},
    products::{ProductId, ProductType},
    storage::StorageError,
};

pub mod http;

pub use http::HttpCartGateway;

/// Errors raised while talking to the catalog gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway returned a non-2xx response or an unexpected body.
    #[error("unexpected response from gateway: {0}")]
    UnexpectedResponse(String),

    /// The auth token could not be read.
    #[error("failed to read auth token")]
    Storage(#[from] StorageError),
}

/// Reasons a gateway cart record cannot become a [`CartLine`].
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    /// The record has no product id to group by.
    #[error("cart line {0} has no product id")]
    MissingProductId(String),

    /// The record carries a status this client does not know.
    #[error("cart line {0}: {1}")]
    UnknownStatus(String, UnknownStatus),

    /// A price could not be converted to minor units.
    #[error("cart line {0}: {1}")]
    InvalidPrice(String, PricingError),

    /// The discount is not a finite fraction between 0 and 1.
    #[error("cart line {0}: discount {1} is outside 0..=1")]
    InvalidDiscount(String, f64),

    /// The paid price exceeds the list price.
    #[error("cart line {0}: paid {1} minor units, above the list price of {2}")]
    PaidAboveList(String, i64, i64),
}

/// A cart line exactly as the gateway returns it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CartLineRecord {
    /// Cart line id
    #[serde(rename = "_id")]
    pub id: String,

    /// Product id
    #[serde(default)]
    pub product_id: Option<String>,

    /// Product type (`kit`, `lab`, `combo`)
    #[serde(default)]
    pub product_type: Option<String>,

    /// Product name
    #[serde(default)]
    pub product_name: String,

    /// Product image URL
    #[serde(default)]
    pub product_image: String,

    /// Product category
    #[serde(default)]
    pub category_name: Option<String>,

    /// Unit price in major units
    #[serde(default)]
    pub price: f64,

    /// Price paid in major units; the list price when absent
    #[serde(default)]
    pub price_paid: Option<f64>,

    /// Discount as a fraction
    #[serde(default)]
    pub discount: f64,

    /// Lifecycle status
    pub status: String,

    /// Correlation id
    #[serde(default)]
    pub cart_no: String,
}

impl CartLineRecord {
    /// Convert the record into a [`CartLine`] priced in `currency`.
    ///
    /// # Errors
    ///
    /// Returns a [`RecordError`] if the product id is missing, the status is unknown, a price
    /// is negative or not representable, the paid price exceeds the list price, or the discount
    /// is not a fraction between 0 and 1.
    pub fn into_cart_line(self, currency: &Currency) -> Result<CartLine<'_>, RecordError> {
        let product_id = self
            .product_id
            .map(ProductId::new)
            .filter(|id| !id.is_blank())
            .ok_or_else(|| RecordError::MissingProductId(self.id.clone()))?;

        let status = self
            .status
            .parse::<CartLineStatus>()
            .map_err(|err| RecordError::UnknownStatus(self.id.clone(), err))?;

        let price_minor = minor_units_from_major(self.price)
            .map_err(|err| RecordError::InvalidPrice(self.id.clone(), err))?;

        let price_paid_minor = match self.price_paid {
            Some(paid) => minor_units_from_major(paid)
                .map_err(|err| RecordError::InvalidPrice(self.id.clone(), err))?,
            None => price_minor,
        };

        if price_paid_minor > price_minor {
            return Err(RecordError::PaidAboveList(
                self.id,
                price_paid_minor,
                price_minor,
            ));
        }

        let discount = Decimal::from_f64(self.discount)
            .filter(|fraction| (Decimal::ZERO..=Decimal::ONE).contains(fraction))
            .map(Percentage::from)
            .ok_or_else(|| RecordError::InvalidDiscount(self.id.clone(), self.discount))?;

        Ok(CartLine {
            id: CartLineId::new(self.id),
            product_id,
            product_type: self
                .product_type
                .as_deref()
                .map_or(ProductType::Kit, ProductType::parse),
            name: self.product_name,
            image_url: self.product_image,
            category_name: self.category_name,
            unit_price: Money::from_minor(price_minor, currency),
            unit_price_paid: Money::from_minor(price_paid_minor, currency),
            discount,
            status,
            cart_no: self.cart_no,
        })
    }
}

/// Pagination info echoed back by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-based page number
    pub page_num: u32,

    /// Page size
    pub page_size: u32,

    /// Total number of records, when reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_items: Option<u32>,
}

/// A page of cart line records.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartPage {
    /// Records on this page
    #[serde(default)]
    pub page_data: Vec<CartLineRecord>,

    /// Pagination info
    #[serde(default)]
    pub page_info: Option<PageInfo>,
}

impl CartPage {
    /// Convert every well-formed record, skipping malformed ones with a warning.
    pub fn into_cart_lines(self, currency: &Currency) -> Vec<CartLine<'_>> {
        self.page_data
            .into_iter()
            .filter_map(|record| match record.into_cart_line(currency) {
                Ok(line) => Some(line),
                Err(err) => {
                    warn!(error = %err, "skipping malformed cart line record");
                    None
                }
            })
            .collect()
    }
}

/// Response envelope: every gateway body wraps its payload in `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    /// Payload
    pub data: T,
}

/// Filter half of a cart search request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchCondition {
    /// Restrict to one product; empty matches every product
    pub product_id: String,

    /// Restrict to one status; empty matches every status
    pub status: String,

    /// Whether to return soft-deleted lines
    pub is_deleted: bool,
}

/// Cart search request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartQuery {
    /// Filter
    pub search_condition: SearchCondition,

    /// Pagination
    pub page_info: PageInfo,
}

impl CartQuery {
    /// First page of the active cart: `new`, non-deleted lines of every product.
    pub fn active(page_size: u32) -> Self {
        Self::with_status(CartLineStatus::New, page_size)
    }

    /// First page of the non-deleted lines in `status`, across every product.
    pub fn with_status(status: CartLineStatus, page_size: u32) -> Self {
        Self {
            search_condition: SearchCondition {
                product_id: String::new(),
                status: status.as_str().to_string(),
                is_deleted: false,
            },
            page_info: PageInfo {
                page_num: 1,
                page_size: page_size.max(1),
                total_items: None,
            },
        }
    }
}

/// Cart endpoints of the remote catalog API.
#[automock]
#[async_trait]
pub trait CartGateway: Send + Sync {
    /// Fetch a page of cart lines matching `query`.
    async fn fetch_cart_lines(&self, query: &CartQuery) -> Result<CartPage, GatewayError>;

    /// Move every line in `update` to its target status.
    async fn update_status(&self, update: &StatusUpdate) -> Result<(), GatewayError>;

    /// Delete a single cart line.
    async fn delete_cart_line(&self, id: &CartLineId) -> Result<(), GatewayError>;
}

/// Fetch every page matching `query` and convert the records priced in `currency`.
///
/// Pages are requested while the gateway reports more `totalItems` than were received so far.
/// Malformed records are skipped.
///
/// # Errors
///
/// Returns the first gateway error; lines from earlier pages are discarded.
pub async fn fetch_all<'c, G>(
    gateway: &G,
    mut query: CartQuery,
    currency: &'c Currency,
) -> Result<Vec<CartLine<'c>>, GatewayError>
where
    G: CartGateway + ?Sized,
{
    let mut lines = Vec::new();
    let mut fetched = 0_usize;

    loop {
        let page = gateway.fetch_cart_lines(&query).await?;
        let page_len = page.page_data.len();
        let total = page.page_info.and_then(|info| info.total_items);

        fetched += page_len;
        lines.extend(page.into_cart_lines(currency));

        match total {
            Some(total) if page_len > 0 && fetched < total as usize => {
                query.page_info.page_num += 1;
            }
            _ => break,
        }
    }

    Ok(lines)
}
