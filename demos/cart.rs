//! Cart Example
//!
//! Loads a fixture catalog and cart, consolidates the cart and prints a receipt for the
//! selected rows, followed by the catalog category tabs and the newest reviews.
//!
//! Use `-f` to load a fixture set by name
//! Use `-s` to select product ids (comma separated); every row is selected when omitted
//! Use `--favorite` to toggle a kit in the favourites stored under `STORE_DIR`
//! Use `-o` to write the receipt to a file instead of stdout

use std::{fs::File, io, sync::Arc};

use anyhow::Result;
use clap::Parser;
use stemcart::{
    cart::selection::Selection,
    favorites::{FavoriteCategory, FavoritesManager},
    filters::{count_by_category, count_by_rating, exclude_deleted, sort_by_date_descending},
    fixtures::Fixture,
    products::ProductId,
    receipt::Receipt,
    utils::ExampleCartArgs,
};
use tracing_subscriber::EnvFilter;

/// Cart Example
#[tokio::main]
#[expect(clippy::print_stdout, reason = "Example code")]
pub async fn main() -> Result<()> {
    _ = dotenvy::dotenv();

    let args = ExampleCartArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&args.config.log_level)),
        )
        .with_target(true)
        .init();

    let fixture = Fixture::from_set(&args.fixture)?;
    let currency = fixture.currency()?;
    let items = fixture.line_items();

    let selection = if args.selected.is_empty() {
        Selection::of_items(&items)
    } else {
        args.selected
            .iter()
            .map(|id| ProductId::new(id.as_str()))
            .collect::<Selection>()
            .pruned(&items)
    };

    let receipt = Receipt::from_cart(&items, &selection, currency);

    if let Some(out) = args.out.as_deref() {
        receipt.write_to(File::create(out)?)?;
        println!("Receipt written to {out}");
    } else {
        let stdout = io::stdout();
        receipt.write_to(stdout.lock())?;
    }

    let visible: Vec<_> = exclude_deleted(fixture.products())
        .into_iter()
        .cloned()
        .collect();

    let tabs: Vec<String> = count_by_category(&visible)
        .into_iter()
        .map(|tab| format!("{} ({})", tab.name, tab.count))
        .collect();

    println!("Categories: {}", tabs.join(" | "));

    let chips: Vec<String> = count_by_rating(fixture.reviews())
        .into_iter()
        .map(|chip| format!("{} ({})", chip.rating, chip.count))
        .collect();

    println!("Ratings: {}", chips.join(" | "));

    let newest = sort_by_date_descending(fixture.reviews().to_vec(), |review| {
        Some(review.date.as_str())
    });

    for review in newest.iter().take(3) {
        println!("  {} ★{} {}", review.author, review.rating, review.content);
    }

    if let Some(favorite) = args.favorite.as_deref() {
        let manager = FavoritesManager::new(Arc::new(args.config.file_store()));
        let favorites = manager
            .toggle(FavoriteCategory::Kits, &ProductId::new(favorite))
            .await?;

        let kits: Vec<&str> = favorites
            .retain_favorites(fixture.products())
            .into_iter()
            .map(|product| product.name.as_str())
            .collect();

        println!("Favourite kits: {}", kits.join(", "));
    }

    Ok(())
}
