//! Local storefront data store.
//!
//! Owns one SQLite file holding the catalog (categories, products), accounts
//! (users, profiles) and the transactional state (cart items, orders, order
//! items). Callers open a [`Store`], run [`Store::initialize`] once per
//! start, and call the functions in [`services`] with a reference to it.

pub mod config;
pub mod db;
pub mod dto;
pub mod entity;
pub mod error;
pub mod locks;
pub mod models;
pub mod password;
pub mod seed;
pub mod services;
pub mod store;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use store::Store;
