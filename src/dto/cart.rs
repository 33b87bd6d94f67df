use serde::Serialize;

use crate::models::CartLine;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CartList {
    pub items: Vec<CartLine>,
}

impl CartList {
    /// Sum of live price times quantity.
    pub fn total(&self) -> i64 {
        self.items.iter().map(CartLine::line_total).sum()
    }

    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|l| i64::from(l.quantity)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
