use serde::Deserialize;

use crate::models::Role;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateUserRequest {
    pub id: i64,
    pub username: String,
    /// `None` keeps the current password.
    pub password: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpsertProfileRequest {
    pub user_id: i64,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}
