//! Filters
//!
//! Stateless helpers deriving filtered or sorted views of product, cart and review lists:
//! the category tabs, the star-rating chips, the search box and the newest-first comment
//! ordering.

use std::{cmp::Reverse, fmt, str::FromStr};

use jiff::{Timestamp, civil, tz::TimeZone};
use thiserror::Error;

use crate::{
    cart::{CartLine, LineItem},
    products::{Product, Review},
};

/// Label of the synthetic tab covering every category.
pub const ALL_CATEGORIES: &str = "All";

/// Something shown under a category tab.
pub trait Categorized {
    /// The item's category, if it has one.
    fn category_name(&self) -> Option<&str>;
}

/// Something searchable by name.
pub trait Named {
    /// The display name.
    fn name(&self) -> &str;
}

/// Something carrying a star rating.
pub trait Rated {
    /// The raw star rating.
    fn rating(&self) -> u8;
}

impl Categorized for Product<'_> {
    fn category_name(&self) -> Option<&str> {
        self.category_name.as_deref()
    }
}

impl Named for Product<'_> {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Categorized for CartLine<'_> {
    fn category_name(&self) -> Option<&str> {
        self.category_name.as_deref()
    }
}

impl Named for CartLine<'_> {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Categorized for LineItem<'_> {
    fn category_name(&self) -> Option<&str> {
        LineItem::category_name(self)
    }
}

impl Named for LineItem<'_> {
    fn name(&self) -> &str {
        LineItem::name(self)
    }
}

impl Rated for Review {
    fn rating(&self) -> u8 {
        self.rating
    }
}

impl Named for Review {
    fn name(&self) -> &str {
        &self.author
    }
}

/// The selected category tab.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    /// Every item, including those without a category.
    #[default]
    All,

    /// Items whose category equals this name exactly.
    Named(String),
}

impl CategoryFilter {
    /// Whether an item with `category` passes this filter.
    pub fn matches(&self, category: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => category == Some(name.as_str()),
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(value: &str) -> Self {
        if value == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Named(value.to_string())
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_CATEGORIES),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Star rating outside `1..=5`.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("rating must be between 1 and 5, got {0}")]
pub struct InvalidRating(pub u8);

/// A star rating between 1 and 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rating(u8);

impl Rating {
    /// Every rating, highest first, as shown on the filter chips.
    pub const DESCENDING: [Self; 5] = [Self(5), Self(4), Self(3), Self(2), Self(1)];

    /// The number of stars.
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = InvalidRating;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidRating(value))
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}★", self.0)
    }
}

/// Items under `filter`, in input order.
pub fn filter_by_category<'i, T: Categorized>(items: &'i [T], filter: &CategoryFilter) -> Vec<&'i T> {
    items
        .iter()
        .filter(|item| filter.matches(item.category_name()))
        .collect()
}

/// Items with exactly `rating` stars, or every item when `rating` is `None`.
pub fn filter_by_rating<T: Rated>(items: &[T], rating: Option<Rating>) -> Vec<&T> {
    items
        .iter()
        .filter(|item| rating.is_none_or(|rating| item.rating() == rating.get()))
        .collect()
}

/// Items whose name contains `query`, ignoring case. A blank query keeps everything.
pub fn search_by_name<'i, T: Named>(items: &'i [T], query: &str) -> Vec<&'i T> {
    let needle = query.trim().to_lowercase();

    items
        .iter()
        .filter(|item| needle.is_empty() || item.name().to_lowercase().contains(&needle))
        .collect()
}

/// Products that have not been soft-deleted.
pub fn exclude_deleted<'p, 'a>(products: &'p [Product<'a>]) -> Vec<&'p Product<'a>> {
    products.iter().filter(|product| !product.is_deleted).collect()
}

/// Parse a gateway date.
///
/// Accepts RFC 3339 timestamps, civil date-times and plain dates; values without an offset
/// are read as UTC.
pub fn parse_date(value: &str) -> Option<Timestamp> {
    let value = value.trim();

    if let Ok(timestamp) = value.parse::<Timestamp>() {
        return Some(timestamp);
    }

    if let Ok(datetime) = value.parse::<civil::DateTime>() {
        return datetime
            .to_zoned(TimeZone::UTC)
            .ok()
            .map(|zoned| zoned.timestamp());
    }

    value
        .parse::<civil::Date>()
        .ok()
        .and_then(|date| date.to_zoned(TimeZone::UTC).ok())
        .map(|zoned| zoned.timestamp())
}

/// Sort newest first. Items whose date is missing or unparseable go last, in their original
/// relative order. The sort is stable.
pub fn sort_by_date_descending<T, F>(mut items: Vec<T>, date_of: F) -> Vec<T>
where
    F: Fn(&T) -> Option<&str>,
{
    items.sort_by_cached_key(|item| {
        let timestamp = date_of(item).and_then(parse_date);

        (timestamp.is_none(), Reverse(timestamp))
    });

    items
}

/// Item count shown on a category tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    /// Tab label
    pub name: String,

    /// Number of items under the tab
    pub count: usize,
}

/// Counts per category: `"All"` with the total first, then each category in order of first
/// appearance. Items without a category only count towards `"All"`. `"All"` is reserved for
/// that tab, so items whose category is literally `"All"` are counted there only.
pub fn count_by_category<T: Categorized>(items: &[T]) -> Vec<CategoryCount> {
    let mut counts = vec![CategoryCount {
        name: ALL_CATEGORIES.to_string(),
        count: items.len(),
    }];

    for category in items
        .iter()
        .filter_map(Categorized::category_name)
        .filter(|category| *category != ALL_CATEGORIES)
    {
        match counts.iter_mut().skip(1).find(|entry| entry.name == category) {
            Some(entry) => entry.count += 1,
            None => counts.push(CategoryCount {
                name: category.to_string(),
                count: 1,
            }),
        }
    }

    counts
}

/// Number of items with a given star rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingCount {
    /// Star rating
    pub rating: Rating,

    /// Number of items with that rating
    pub count: usize,
}

/// Counts per star rating, from 5 stars down to 1. Out-of-range ratings are not counted.
pub fn count_by_rating<T: Rated>(items: &[T]) -> [RatingCount; 5] {
    Rating::DESCENDING.map(|rating| RatingCount {
        rating,
        count: items
            .iter()
            .filter(|item| item.rating() == rating.get())
            .count(),
    })
}
