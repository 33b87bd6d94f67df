use std::env;

/// File the store lives in when nothing else is configured.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://storefront.db?mode=rwc";

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub database_url: String,
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 1,
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("STORE_DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let max_connections = env::var("STORE_MAX_CONNECTIONS")
            .ok()
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(1);
        if !database_url.starts_with("sqlite:") {
            anyhow::bail!("STORE_DATABASE_URL must be a sqlite url, got {database_url}");
        }
        Ok(Self {
            database_url,
            max_connections,
        })
    }

    /// Throwaway database that disappears with the connection pool.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }

    /// File-backed database at `path`, created if absent.
    pub fn at_path(path: impl AsRef<std::path::Path>) -> Self {
        Self {
            database_url: format!("sqlite://{}?mode=rwc", path.as_ref().display()),
            max_connections: 1,
        }
    }
}
