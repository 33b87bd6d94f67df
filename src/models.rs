use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::entity::orders::OrderStatus;
pub use crate::entity::users::Role;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub img: String,
    pub category_id: i64,
}

/// Account as handed to callers. The password hash stays inside the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: i64,
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i32,
}

/// Cart row joined with the product's current catalog data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub name: String,
    pub price: i64,
    pub img: String,
}

impl CartLine {
    pub fn line_total(&self) -> i64 {
        self.price * i64::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub shipping_name: Option<String>,
    pub shipping_phone: Option<String>,
    pub shipping_address: Option<String>,
}

/// Order item for display. `price` is the snapshot taken at checkout;
/// `name` and `img` come from the live catalog and are `None` once the
/// product has been deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price: i64,
    pub name: Option<String>,
    pub img: Option<String>,
}

impl OrderLine {
    pub fn line_total(&self) -> i64 {
        self.price * i64::from(self.quantity)
    }
}
