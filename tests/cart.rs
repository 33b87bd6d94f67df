mod common;

use std::sync::Arc;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use storefront_store::{
    StoreError,
    entity::{CartItems, cart_items},
    services::{cart_service, catalog_service},
};

#[tokio::test]
async fn repeated_add_merges_into_one_row() -> anyhow::Result<()> {
    let store = common::fresh_store().await?;
    let user_id = common::create_customer(&store, "minh").await?;

    for _ in 0..3 {
        cart_service::add_to_cart(&store, user_id, 1, 1).await?;
    }

    let rows = CartItems::find()
        .filter(cart_items::Column::UserId.eq(user_id))
        .filter(cart_items::Column::ProductId.eq(1))
        .all(store.orm())
        .await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity, 3);

    let item = cart_service::add_to_cart(&store, user_id, 1, 4).await?;
    assert_eq!(item.quantity, 7);
    Ok(())
}

#[tokio::test]
async fn zero_quantity_deletes_the_row() -> anyhow::Result<()> {
    let store = common::fresh_store().await?;
    let user_id = common::create_customer(&store, "hoa").await?;
    cart_service::add_to_cart(&store, user_id, 1, 2).await?;
    cart_service::add_to_cart(&store, user_id, 3, 1).await?;

    assert!(cart_service::update_cart_quantity(&store, user_id, 1, 0).await?);

    let cart = cart_service::list_cart(&store, user_id).await?;
    assert!(cart.items.iter().all(|l| l.product_id != 1));
    assert_eq!(cart.items.len(), 1);

    // negative collapses to delete too
    assert!(cart_service::update_cart_quantity(&store, user_id, 3, -5).await?);
    assert!(cart_service::list_cart(&store, user_id).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn update_quantity_overwrites_and_soft_misses() -> anyhow::Result<()> {
    let store = common::fresh_store().await?;
    let user_id = common::create_customer(&store, "tuan").await?;
    cart_service::add_to_cart(&store, user_id, 2, 1).await?;

    assert!(cart_service::update_cart_quantity(&store, user_id, 2, 5).await?);
    let cart = cart_service::list_cart(&store, user_id).await?;
    assert_eq!(cart.items[0].quantity, 5);

    // no row for product 4, nothing is created
    assert!(!cart_service::update_cart_quantity(&store, user_id, 4, 2).await?);
    assert!(!cart_service::remove_from_cart(&store, user_id, 4).await?);
    assert_eq!(cart_service::list_cart(&store, user_id).await?.items.len(), 1);
    Ok(())
}

#[tokio::test]
async fn cart_lines_use_live_prices() -> anyhow::Result<()> {
    let store = common::fresh_store().await?;
    let user_id = common::create_customer(&store, "mai").await?;
    let category = catalog_service::add_category(&store, "Đồ chơi").await?;
    let product_id = common::create_product(&store, category.id, "Gấu bông", 100).await?;

    cart_service::add_to_cart(&store, user_id, product_id, 3).await?;
    assert_eq!(cart_service::cart_total(&store, user_id).await?, 300);

    catalog_service::update_product(
        &store,
        product_id,
        storefront_store::dto::products::UpdateProductRequest {
            name: "Gấu bông lớn".into(),
            price: 120,
            img: "bear.jpg".into(),
            category_id: category.id,
        },
    )
    .await?;

    let cart = cart_service::list_cart(&store, user_id).await?;
    assert_eq!(cart.items[0].name, "Gấu bông lớn");
    assert_eq!(cart.items[0].price, 120);
    assert_eq!(cart.items[0].line_total(), 360);
    assert_eq!(cart_service::cart_total(&store, user_id).await?, 360);
    assert_eq!(cart_service::cart_item_count(&store, user_id).await?, 3);
    Ok(())
}

#[tokio::test]
async fn add_rejects_bad_quantity_and_dangling_references() -> anyhow::Result<()> {
    let store = common::fresh_store().await?;
    let user_id = common::create_customer(&store, "khoa").await?;

    assert!(matches!(
        cart_service::add_to_cart(&store, user_id, 1, 0).await,
        Err(StoreError::Invalid(_))
    ));
    assert!(matches!(
        cart_service::add_to_cart(&store, user_id, 404, 1).await,
        Err(StoreError::MissingReference { entity: "product", id: 404 })
    ));
    assert!(matches!(
        cart_service::add_to_cart(&store, 404, 1, 1).await,
        Err(StoreError::MissingReference { entity: "user", id: 404 })
    ));
    assert_eq!(CartItems::find().count(store.orm()).await?, 0);
    Ok(())
}

#[tokio::test]
async fn clear_cart_only_touches_one_user() -> anyhow::Result<()> {
    let store = common::fresh_store().await?;
    let a = common::create_customer(&store, "an").await?;
    let b = common::create_customer(&store, "binh").await?;
    cart_service::add_to_cart(&store, a, 1, 1).await?;
    cart_service::add_to_cart(&store, a, 2, 1).await?;
    cart_service::add_to_cart(&store, b, 1, 1).await?;

    assert_eq!(cart_service::clear_cart(&store, a).await?, 2);
    assert!(cart_service::list_cart(&store, a).await?.is_empty());
    assert_eq!(cart_service::list_cart(&store, b).await?.items.len(), 1);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_for_one_user_do_not_lose_updates() -> anyhow::Result<()> {
    let store = Arc::new(common::fresh_store().await?);
    let user_id = common::create_customer(&store, "quang").await?;

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            cart_service::add_to_cart(&store, user_id, 5, 1).await
        }));
    }
    for task in tasks {
        task.await??;
    }

    let cart = cart_service::list_cart(&store, user_id).await?;
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 10);
    Ok(())
}
