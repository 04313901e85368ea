//! Stemcart
//!
//! Client core for a STEM kits, labs and combos storefront: cart consolidation and selection,
//! per-category favourites, and the category, rating and search filters behind the catalog
//! screens.

pub mod cart;
pub mod config;
pub mod favorites;
pub mod filters;
pub mod fixtures;
pub mod gateway;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod storage;
pub mod utils;
