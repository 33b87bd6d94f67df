use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store initialization failed: {0}")]
    Init(#[source] DbErr),

    #[error("Username {0} is already taken")]
    UsernameTaken(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid input: {0}")]
    Invalid(String),

    #[error("{entity} {id} does not exist")]
    MissingReference { entity: &'static str, id: i64 },

    #[error("ORM error: {0}")]
    Orm(#[from] DbErr),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    pub fn missing(entity: &'static str, id: i64) -> Self {
        StoreError::MissingReference { entity, id }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// True when the engine rejected a write because of a UNIQUE index.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    if let Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
        return true;
    }
    err.to_string().contains("UNIQUE constraint failed")
}
