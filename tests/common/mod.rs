#![allow(dead_code)]

use storefront_store::{
    Store,
    dto::{products::CreateProductRequest, users::RegisterRequest},
    models::Role,
    services::{catalog_service, user_service},
};

/// Fresh initialized store on its own in-memory database.
pub async fn fresh_store() -> anyhow::Result<Store> {
    let store = Store::open_in_memory().await?;
    store.initialize().await?;
    Ok(store)
}

pub async fn create_customer(store: &Store, username: &str) -> anyhow::Result<i64> {
    let user = user_service::add_user(
        store,
        RegisterRequest {
            username: username.to_string(),
            password: "secret".into(),
            role: Role::User,
        },
    )
    .await?;
    Ok(user.id)
}

pub async fn create_product(
    store: &Store,
    category_id: i64,
    name: &str,
    price: i64,
) -> anyhow::Result<i64> {
    let product = catalog_service::add_product(
        store,
        CreateProductRequest {
            name: name.to_string(),
            price,
            img: format!("file:///tmp/{name}.jpg"),
            category_id,
        },
    )
    .await?;
    Ok(product.id)
}
