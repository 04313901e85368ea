//! Stemcart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{
        CartLine, CartLineId, CartLineStatus, LineItem, consolidate, consolidate_with_status,
        checkout::{CheckoutEntry, StatusUpdate, prepare_checkout_batch},
        removal::{Removal, remove_line_item, remove_selected},
        selection::Selection,
        session::{CartSession, CartSessionError},
        totals::{CartTotals, compute_total, summarize},
    },
    config::{ClientConfig, ConfigError},
    favorites::{FavoriteCategory, FavoriteSet, FavoritesError, FavoritesManager, is_favorite},
    filters::{
        CategoryFilter, Rating, count_by_category, count_by_rating, exclude_deleted,
        filter_by_category, filter_by_rating, search_by_name, sort_by_date_descending,
    },
    gateway::{CartGateway, CartQuery, GatewayError, HttpCartGateway, fetch_all},
    pricing::PricingError,
    products::{Product, ProductId, ProductType, Review},
    receipt::{Receipt, ReceiptError},
    storage::{FileStore, KeyValueStore, MemoryStore, StorageError},
};
