//! Favorites
//!
//! Per-category favourite product ids, persisted as a JSON array under `favorites:<category>`.
//! Toggling is the only single-item mutation and is written through before it returns.

use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::{
    products::{Product, ProductId},
    storage::{KeyValueStore, StorageError},
};

/// Errors raised while persisting favourites.
#[derive(Debug, Error)]
pub enum FavoritesError {
    /// The store rejected the read or write.
    #[error("favorites storage error")]
    Storage(#[from] StorageError),

    /// The set could not be encoded.
    #[error("failed to encode favorites")]
    Encode(#[from] serde_json::Error),
}

/// Unknown favourite category name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown favorites category: {0}")]
pub struct UnknownCategory(pub String);

/// Catalog section a favourite belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FavoriteCategory {
    /// STEM kits
    Kits,

    /// Labs
    Labs,

    /// Art tools
    ArtTools,

    /// Combos
    Combos,
}

impl FavoriteCategory {
    /// Every category, in menu order.
    pub const ALL: [Self; 4] = [Self::Kits, Self::Labs, Self::ArtTools, Self::Combos];

    /// Short name of the category.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kits => "kits",
            Self::Labs => "labs",
            Self::ArtTools => "art_tools",
            Self::Combos => "combos",
        }
    }

    /// Store key holding this category's favourites.
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Kits => "favorites:kits",
            Self::Labs => "favorites:labs",
            Self::ArtTools => "favorites:art_tools",
            Self::Combos => "favorites:combos",
        }
    }
}

impl fmt::Display for FavoriteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FavoriteCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Ordered, duplicate-free set of favourite product ids.
///
/// Equality ignores order: toggling an id off and on again moves it to the end, but the set
/// is still the same set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ProductId>", into = "Vec<ProductId>")]
pub struct FavoriteSet {
    ids: Vec<ProductId>,
}

impl FavoriteSet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` is a favourite.
    pub fn is_favorite(&self, id: &ProductId) -> bool {
        self.ids.contains(id)
    }

    /// A copy of this set with membership of `id` flipped.
    #[must_use]
    pub fn toggled(&self, id: &ProductId) -> Self {
        let mut next = self.clone();

        if !next.remove(id) {
            next.ids.push(id.clone());
        }

        next
    }

    /// Add `id` at the end. Returns `false` if it was already present.
    pub fn insert(&mut self, id: ProductId) -> bool {
        if self.is_favorite(&id) {
            return false;
        }

        self.ids.push(id);

        true
    }

    /// Remove `id`. Returns `false` if it was not present.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let before = self.ids.len();

        self.ids.retain(|existing| existing != id);

        self.ids.len() != before
    }

    /// The catalog products that are favourites, in catalog order.
    pub fn retain_favorites<'p, 'a>(&self, products: &'p [Product<'a>]) -> Vec<&'p Product<'a>> {
        products
            .iter()
            .filter(|product| self.is_favorite(&product.id))
            .collect()
    }

    /// Favourite ids in insertion order.
    pub fn ids(&self) -> &[ProductId] {
        &self.ids
    }

    /// Number of favourites.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether there are no favourites.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl PartialEq for FavoriteSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.ids.iter().all(|id| other.is_favorite(id))
    }
}

impl Eq for FavoriteSet {}

impl From<Vec<ProductId>> for FavoriteSet {
    fn from(ids: Vec<ProductId>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<FavoriteSet> for Vec<ProductId> {
    fn from(set: FavoriteSet) -> Self {
        set.ids
    }
}

impl FromIterator<ProductId> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = ProductId>>(iter: I) -> Self {
        let mut set = Self::new();

        for id in iter {
            set.insert(id);
        }

        set
    }
}

/// Whether `id` is in `set`.
pub fn is_favorite(set: &FavoriteSet, id: &ProductId) -> bool {
    set.is_favorite(id)
}

/// Loads and persists [`FavoriteSet`]s through a [`KeyValueStore`].
#[derive(Debug)]
pub struct FavoritesManager<S> {
    store: Arc<S>,
}

impl<S: KeyValueStore> FavoritesManager<S> {
    /// Create a manager over `store`.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Load the favourites of `category`.
    ///
    /// A missing key yields an empty set. An unreadable or corrupt value also yields an empty
    /// set and is logged.
    #[instrument(skip(self))]
    pub async fn load(&self, category: FavoriteCategory) -> FavoriteSet {
        match self.read(category).await {
            Ok(set) => set,
            Err(err) => {
                warn!(error = %err, "failed to read favorites; treating as empty");

                FavoriteSet::new()
            }
        }
    }

    /// Flip membership of `id` in `category` and persist the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the current set cannot be read or the new set cannot be written.
    /// Nothing is written in that case.
    #[instrument(skip(self))]
    pub async fn toggle(
        &self,
        category: FavoriteCategory,
        id: &ProductId,
    ) -> Result<FavoriteSet, FavoritesError> {
        let next = self.read(category).await?.toggled(id);

        self.save(category, &next).await?;

        debug!(favorite = next.is_favorite(id), "toggled favorite");

        Ok(next)
    }

    /// Remove every id in `ids` from `category` and persist the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the current set cannot be read or the new set cannot be written.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn remove_many(
        &self,
        category: FavoriteCategory,
        ids: &[ProductId],
    ) -> Result<FavoriteSet, FavoritesError> {
        let mut next = self.read(category).await?;

        let removed = ids.iter().filter(|id| next.remove(id)).count();

        if removed > 0 {
            self.save(category, &next).await?;
        }

        Ok(next)
    }

    /// Forget every favourite of `category`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be removed from the store.
    pub async fn clear(&self, category: FavoriteCategory) -> Result<(), FavoritesError> {
        self.store.remove(category.storage_key()).await?;

        Ok(())
    }

    async fn read(&self, category: FavoriteCategory) -> Result<FavoriteSet, StorageError> {
        let Some(raw) = self.store.get(category.storage_key()).await? else {
            return Ok(FavoriteSet::new());
        };

        Ok(serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!(
                key = category.storage_key(),
                error = %err,
                "corrupt favorites value; treating as empty"
            );

            FavoriteSet::new()
        }))
    }

    async fn save(
        &self,
        category: FavoriteCategory,
        set: &FavoriteSet,
    ) -> Result<(), FavoritesError> {
        let encoded = serde_json::to_string(set)?;

        self.store.set(category.storage_key(), &encoded).await?;

        Ok(())
    }
}
