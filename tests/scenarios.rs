//! End-to-end cart, favourites and filter scenarios over the YAML fixtures.

use std::sync::Arc;

use rusty_money::{Money, iso::USD};
use serde_json::json;
use stemcart::{
    cart::{
        CartLineId, CartLineStatus, consolidate, product_ids,
        checkout::prepare_checkout_batch,
        removal::remove_line_item,
        selection::Selection,
        session::CartSession,
        totals::{compute_total, summarize},
    },
    favorites::{FavoriteCategory, FavoritesManager},
    filters::{
        CategoryFilter, Rating, count_by_category, exclude_deleted, filter_by_category,
        filter_by_rating, search_by_name, sort_by_date_descending,
    },
    fixtures::Fixture,
    gateway::{CartPage, Envelope, MockCartGateway},
    products::{Product, ProductId},
    receipt::Receipt,
    storage::FileStore,
};
use testresult::TestResult;

fn ids(values: &[&str]) -> Vec<ProductId> {
    values.iter().copied().map(ProductId::from).collect()
}

fn line_ids(values: &[&str]) -> Vec<CartLineId> {
    values.iter().copied().map(CartLineId::from).collect()
}

#[test]
fn worked_example_consolidates_and_totals() -> TestResult {
    let fixture = Fixture::from_set("worked_example")?;
    let items = fixture.line_items();

    assert_eq!(product_ids(&items), ids(&["P1", "P2"]));

    let shape: Vec<(usize, Vec<&str>)> = items
        .iter()
        .map(|item| {
            (
                item.quantity(),
                item.cart_line_ids().map(CartLineId::as_str).collect(),
            )
        })
        .collect();

    assert_eq!(shape, vec![(2, vec!["a", "b"]), (1, vec!["c"])]);

    let everything: Selection = ids(&["P1", "P2"]).into_iter().collect();

    assert_eq!(
        compute_total(&items, &everything, USD),
        Money::from_minor(36_00, USD)
    );

    Ok(())
}

#[test]
fn cancelled_line_drops_its_product() -> TestResult {
    let fixture = Fixture::from_set("worked_example")?;

    let mut lines = fixture.cart_lines().to_vec();

    for line in &mut lines {
        if line.id.as_str() == "c" {
            line.status = CartLineStatus::Cancel;
        }
    }

    let items = consolidate(&lines);
    let only_p2: Selection = ids(&["P2"]).into_iter().collect();

    assert_eq!(product_ids(&items), ids(&["P1"]));
    assert_eq!(compute_total(&items, &only_p2, USD), Money::from_minor(0, USD));

    Ok(())
}

#[test]
fn removing_a_product_reports_its_cart_lines() -> TestResult {
    let fixture = Fixture::from_set("worked_example")?;

    let removal = remove_line_item(fixture.line_items(), &ProductId::new("P1"));

    assert_eq!(product_ids(&removal.remaining), ids(&["P2"]));
    assert_eq!(removal.removed_cart_line_ids, line_ids(&["a", "b"]));

    Ok(())
}

#[test]
fn category_filter_all_and_named() -> TestResult {
    let fixture = Fixture::from_set("worked_example")?;

    let mut products: Vec<Product<'static>> = fixture.products().to_vec();

    if let [first, second] = products.as_mut_slice() {
        first.category_name = Some("kit".to_string());
        second.category_name = Some("lab".to_string());
    }

    let all: Vec<&str> = filter_by_category(&products, &CategoryFilter::from("All"))
        .into_iter()
        .map(|product| product.id.as_str())
        .collect();

    let labs: Vec<&str> = filter_by_category(&products, &CategoryFilter::from("lab"))
        .into_iter()
        .map(|product| product.id.as_str())
        .collect();

    assert_eq!(all, vec!["P1", "P2"]);
    assert_eq!(labs, vec!["P2"]);

    Ok(())
}

#[test]
fn storefront_cart_receipt_and_checkout_batch() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let items = fixture.line_items();

    assert_eq!(product_ids(&items), ids(&["K100", "L200", "C400"]));

    let quantities: Vec<usize> = items.iter().map(|item| item.quantity()).collect();

    assert_eq!(quantities, vec![3, 2, 1]);

    let selection = Selection::of_items(&items);
    let totals = summarize(&items, &selection, USD);

    // 3 × 19.99 + 2 × 30.00 + 1 × 45.00, the second lab keeps the first-seen price
    assert_eq!(totals.total, Money::from_minor(164_97, USD));
    assert_eq!(totals.quantity, 6);

    let receipt = Receipt::from_cart(&items, &selection, USD);
    let mut out = Vec::new();
    receipt.write_to(&mut out)?;

    assert!(String::from_utf8(out)?.contains("Young Engineer Combo"));

    let batch = prepare_checkout_batch(
        &items,
        &Selection::new().toggle_select(&ProductId::new("L200")),
        CartLineStatus::WaitingPaid,
    );

    assert_eq!(
        serde_json::to_value(&batch)?,
        json!({
            "status": "waiting_paid",
            "items": [
                { "_id": "6650a2", "cart_no": "CN-1002" },
                { "_id": "6650a9", "cart_no": "CN-1009" },
            ],
        })
    );

    Ok(())
}

#[test]
fn storefront_catalog_filters() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;

    let visible: Vec<Product<'static>> = exclude_deleted(fixture.products())
        .into_iter()
        .cloned()
        .collect();

    assert!(visible.iter().all(|product| product.id.as_str() != "L202"));

    let tabs: Vec<(String, usize)> = count_by_category(&visible)
        .into_iter()
        .map(|tab| (tab.name, tab.count))
        .collect();

    assert_eq!(
        tabs,
        vec![
            ("All".to_string(), 7),
            ("Robotics".to_string(), 3),
            ("Electronics".to_string(), 1),
            ("Chemistry".to_string(), 1),
            ("Biology".to_string(), 1),
        ]
    );

    let kits: Vec<&str> = search_by_name(&visible, "KIT")
        .into_iter()
        .map(|product| product.id.as_str())
        .collect();

    assert_eq!(kits, vec!["K100", "K102"]);

    Ok(())
}

#[test]
fn storefront_reviews_sort_and_filter() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;

    let newest: Vec<String> =
        sort_by_date_descending(fixture.reviews().to_vec(), |review| {
            Some(review.date.as_str())
        })
        .into_iter()
        .map(|review| review.id)
        .collect();

    assert_eq!(newest, vec!["r3", "r2", "r1", "r5", "r4"]);

    let five_stars: Vec<&str> = filter_by_rating(fixture.reviews(), Some(Rating::try_from(5_u8)?))
        .into_iter()
        .map(|review| review.id.as_str())
        .collect();

    assert_eq!(five_stars, vec!["r1", "r3"]);

    Ok(())
}

#[tokio::test]
async fn session_checkout_round_trip() -> TestResult {
    let page: Envelope<CartPage> = serde_json::from_value(json!({
        "data": {
            "pageData": [
                { "_id": "a", "product_id": "P1", "product_name": "Solar Car Kit", "price": 10.0, "price_paid": 8.0, "discount": 0.2, "status": "new", "cart_no": "CN-a" },
                { "_id": "b", "product_id": "P1", "product_name": "Solar Car Kit", "price": 10.0, "price_paid": 8.0, "discount": 0.2, "status": "new", "cart_no": "CN-b" },
                { "_id": "c", "product_id": "P2", "product_name": "Volcano Lab", "price": 20.0, "status": "new", "cart_no": "CN-c" },
                { "_id": "d", "product_id": "P3", "product_name": "Crystal Radio", "price": 18.0, "status": "completed", "cart_no": "CN-d" },
            ],
            "pageInfo": { "pageNum": 1, "pageSize": 10, "totalItems": 4 },
        }
    }))?;

    let mut gateway = MockCartGateway::new();

    gateway
        .expect_fetch_cart_lines()
        .times(1)
        .returning(move |_| Ok(page.data.clone()));
    gateway
        .expect_update_status()
        .withf(|update| update.len() == 1 && update.status == CartLineStatus::Completed)
        .times(1)
        .returning(|_| Ok(()));

    let mut session = CartSession::new(gateway, USD, 10);

    session.refresh().await?;
    session.select_all();

    assert_eq!(session.total(), Money::from_minor(36_00, USD));

    session.toggle_select(&ProductId::new("P1"));

    assert!(session.checkout(CartLineStatus::Completed).await?);
    assert_eq!(product_ids(session.items()), ids(&["P1"]));
    assert!(session.selection().is_empty());

    Ok(())
}

#[tokio::test]
async fn favorites_persist_across_store_instances() -> TestResult {
    let dir = tempfile::tempdir()?;

    let manager = FavoritesManager::new(Arc::new(FileStore::new(dir.path())));

    manager
        .toggle(FavoriteCategory::Labs, &ProductId::new("L200"))
        .await?;
    manager
        .toggle(FavoriteCategory::Labs, &ProductId::new("L201"))
        .await?;

    let reopened = FavoritesManager::new(Arc::new(FileStore::new(dir.path())));
    let labs = reopened.load(FavoriteCategory::Labs).await;

    assert_eq!(labs.ids(), ids(&["L200", "L201"]).as_slice());
    assert!(reopened.load(FavoriteCategory::Kits).await.is_empty());

    Ok(())
}
