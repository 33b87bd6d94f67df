use serde::{Deserialize, Serialize};

use crate::models::{Order, OrderLine, OrderStatus};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutRequest {
    pub shipping_name: Option<String>,
    pub shipping_phone: Option<String>,
    pub shipping_address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderLine>,
}

/// One row of the admin order board.
#[derive(Debug, Clone, Serialize)]
pub struct CustomerOrder {
    pub order: Order,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}
