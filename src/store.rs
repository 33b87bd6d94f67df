use sea_orm::{DatabaseConnection, TransactionTrait};

use crate::{
    config::StoreConfig,
    db::{create_orm_conn, run_migrations},
    error::{StoreError, StoreResult},
    locks::UserLocks,
    seed,
};

/// Handle to one storefront database. Construct it once, pass it by
/// reference to the service functions, and `close` it when done.
pub struct Store {
    pub(crate) orm: DatabaseConnection,
    pub(crate) locks: UserLocks,
}

impl Store {
    pub async fn open(config: &StoreConfig) -> StoreResult<Self> {
        let orm = create_orm_conn(config).await?;
        tracing::debug!(url = %config.database_url, "store opened");
        Ok(Self {
            orm,
            locks: UserLocks::new(),
        })
    }

    pub async fn open_in_memory() -> StoreResult<Self> {
        Self::open(&StoreConfig::in_memory()).await
    }

    /// Creates the seven tables and the seed rows if they are missing.
    ///
    /// Idempotent: seeded catalog rows are inserted only when their id is
    /// free and the admin account only when no user named `admin` exists.
    /// Runs in one transaction, so a failure leaves nothing half-seeded.
    pub async fn initialize(&self) -> StoreResult<()> {
        let txn = self.orm.begin().await.map_err(StoreError::Init)?;
        run_migrations(&txn).await.map_err(StoreError::Init)?;
        seed::seed_catalog(&txn).await.map_err(StoreError::Init)?;
        seed::seed_admin(&txn).await.map_err(|err| match err {
            StoreError::Orm(db) => StoreError::Init(db),
            other => other,
        })?;
        txn.commit().await.map_err(StoreError::Init)?;

        tracing::info!("store initialized");
        Ok(())
    }

    pub fn orm(&self) -> &DatabaseConnection {
        &self.orm
    }

    pub async fn close(self) -> StoreResult<()> {
        self.orm.close().await?;
        tracing::debug!("store closed");
        Ok(())
    }
}
