use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub price: i64,
    pub img: String,
    pub category_id: i64,
}

/// Full replacement of a product row, as the admin edit form submits it.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProductRequest {
    pub name: String,
    pub price: i64,
    pub img: String,
    pub category_id: i64,
}
