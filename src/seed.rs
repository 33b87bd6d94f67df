use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
    Statement,
};

use crate::{
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Role},
    error::StoreResult,
    password::hash_password,
};

pub const ADMIN_USERNAME: &str = "admin";
const ADMIN_PASSWORD: &str = "123456";

pub const SEED_CATEGORIES: [(i64, &str); 5] = [
    (1, "Áo"),
    (2, "Giày"),
    (3, "Balo"),
    (4, "Mũ"),
    (5, "Túi"),
];

/// (id, name, price in VND, image key, category id)
pub const SEED_PRODUCTS: [(i64, &str, i64, &str, i64); 5] = [
    (1, "Áo thun Doreamon", 250_000, "aothun.jpg", 1),
    (2, "Giày sneaker", 1_100_000, "shoesDRM.jpg", 2),
    (3, "Balo thời trang", 490_000, "balo.jpg", 3),
    (4, "Mũ bảo hiểm thời trang", 120_000, "hat.jpg", 4),
    (5, "Túi đeo chéo dễ thương", 980_000, "tui.jpg", 5),
];

/// Inserts the fixed catalog rows, skipping any id that already exists so
/// admin edits to seeded rows survive a restart.
pub(crate) async fn seed_catalog<C: ConnectionTrait>(conn: &C) -> Result<(), DbErr> {
    let backend = conn.get_database_backend();
    for (id, name) in SEED_CATEGORIES {
        conn.execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO categories (id, name) VALUES (?, ?) ON CONFLICT (id) DO NOTHING",
            [id.into(), name.into()],
        ))
        .await?;
    }

    for (id, name, price, img, category_id) in SEED_PRODUCTS {
        conn.execute(Statement::from_sql_and_values(
            backend,
            r#"
            INSERT INTO products (id, name, price, img, category_id)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (id) DO NOTHING
            "#,
            [
                id.into(),
                name.into(),
                price.into(),
                img.into(),
                category_id.into(),
            ],
        ))
        .await?;
    }

    Ok(())
}

pub(crate) async fn seed_admin<C: ConnectionTrait>(conn: &C) -> StoreResult<()> {
    let exist = Users::find()
        .filter(UserCol::Username.eq(ADMIN_USERNAME))
        .one(conn)
        .await?;
    if exist.is_some() {
        return Ok(());
    }

    // Only hash when the row is missing.
    let admin = UserActive {
        username: Set(ADMIN_USERNAME.to_string()),
        password_hash: Set(hash_password(ADMIN_PASSWORD)?),
        role: Set(Role::Admin),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    tracing::info!(user_id = admin.id, "admin user created");
    Ok(())
}
