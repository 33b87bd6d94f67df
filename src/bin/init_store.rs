use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_store::{
    Store, StoreConfig,
    services::{catalog_service, user_service},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,storefront_store=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = StoreConfig::from_env()?;
    let store = Store::open(&config).await?;
    store.initialize().await?;

    let categories = catalog_service::list_categories(&store).await?;
    let products = catalog_service::list_products(&store, None).await?;
    let users = user_service::list_users(&store).await?;
    tracing::info!(
        url = %config.database_url,
        categories = categories.len(),
        products = products.len(),
        users = users.len(),
        "store ready"
    );

    store.close().await?;
    Ok(())
}
