//! Fixtures
//!
//! YAML catalog, cart and review fixtures for tests and demos. A fixture set named `name` is
//! read from `products/<name>.yml`, `carts/<name>.yml` and `reviews/<name>.yml` under the base
//! path.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    cart::{CartLine, LineItem, consolidate},
    fixtures::{carts::CartFixture, products::ProductsFixture},
    pricing::PricingError,
    products::{Product, Review},
};

pub mod carts;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Unknown cart line status
    #[error("Unknown cart line status: {0}")]
    UnknownStatus(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Duplicate product id
    #[error("Duplicate product id: {0}")]
    DuplicateProduct(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// Price arithmetic failed
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Wrapper for reviews in YAML
#[derive(Debug, Deserialize)]
struct ReviewsFixture {
    reviews: Vec<Review>,
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Products in catalog order
    products: Vec<Product<'static>>,

    /// Product id -> index into `products`
    product_index: FxHashMap<String, usize>,

    /// Raw cart lines in gateway order
    cart_lines: Vec<CartLine<'static>>,

    /// Reviews in file order
    reviews: Vec<Review>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            products: Vec::new(),
            product_index: FxHashMap::default(),
            cart_lines: Vec::new(),
            reviews: Vec::new(),
            currency: None,
        }
    }

    fn read(&self, category: &str, name: &str) -> Result<String, FixtureError> {
        let file_path = self.base_path.join(category).join(format!("{name}.yml"));

        Ok(fs::read_to_string(file_path)?)
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a product id repeats, or if
    /// products are priced in different currencies.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProductsFixture = serde_norway::from_str(&self.read("products", name)?)?;

        for product_fixture in fixture.products {
            let product: Product<'static> = product_fixture.try_into()?;
            let currency = product.price.currency();

            match self.currency {
                Some(existing) if existing != currency => {
                    return Err(FixtureError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
                Some(_) => {}
                None => self.currency = Some(currency),
            }

            let id = product.id.as_str().to_string();

            if self.product_index.contains_key(&id) {
                return Err(FixtureError::DuplicateProduct(id));
            }

            self.product_index.insert(id, self.products.len());
            self.products.push(product);
        }

        Ok(self)
    }

    /// Load cart lines from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a line references a
    /// product that has not been loaded.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CartFixture = serde_norway::from_str(&self.read("carts", name)?)?;

        for line_fixture in fixture.lines {
            let product = self.product(&line_fixture.product)?;
            let line = line_fixture.into_cart_line(product)?;

            self.cart_lines.push(line);
        }

        Ok(self)
    }

    /// Load reviews from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_reviews(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ReviewsFixture = serde_norway::from_str(&self.read("reviews", name)?)?;

        self.reviews.extend(fixture.reviews);

        Ok(self)
    }

    /// Load a complete fixture set (products, cart and reviews with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture
            .load_products(name)?
            .load_cart(name)?
            .load_reviews(name)?;

        Ok(fixture)
    }

    /// Get a product by its id
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, id: &str) -> Result<&Product<'static>, FixtureError> {
        self.product_index
            .get(id)
            .and_then(|&idx| self.products.get(idx))
            .ok_or_else(|| FixtureError::ProductNotFound(id.to_string()))
    }

    /// Get all products, in catalog order
    pub fn products(&self) -> &[Product<'static>] {
        &self.products
    }

    /// Get all raw cart lines
    pub fn cart_lines(&self) -> &[CartLine<'static>] {
        &self.cart_lines
    }

    /// Get all reviews
    pub fn reviews(&self) -> &[Review] {
        &self.reviews
    }

    /// Consolidate the loaded cart lines
    pub fn line_items(&self) -> Vec<LineItem<'static>> {
        consolidate(&self.cart_lines)
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no products have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
