use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

use crate::config::StoreConfig;

const SCHEMA: &str = include_str!("../migrations/0001_storefront.sql");

/// Create a SeaORM connection for the configured SQLite file.
pub async fn create_orm_conn(config: &StoreConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.database_url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(1)
        .sqlx_logging(false);
    Database::connect(options).await
}

/// Runs the embedded schema. Every statement is `IF NOT EXISTS`, so this is
/// safe on every start.
pub async fn run_migrations<C: ConnectionTrait>(conn: &C) -> Result<(), DbErr> {
    let backend = conn.get_database_backend();
    // sqlx prepares one statement at a time, so split the file and run each
    // statement individually.
    for stmt in SCHEMA.split(';') {
        let stmt = stmt.trim();
        if stmt.is_empty() {
            continue;
        }
        let statement = format!("{stmt};");
        conn.execute(Statement::from_string(backend, statement))
            .await?;
    }
    tracing::debug!("schema ensured");
    Ok(())
}
