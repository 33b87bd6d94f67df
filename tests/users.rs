mod common;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use storefront_store::{
    StoreError,
    dto::users::{RegisterRequest, UpdateUserRequest, UpsertProfileRequest},
    entity::{CartItems, UserProfiles, Users, users},
    models::Role,
    services::{cart_service, order_service, profile_service, user_service},
};

#[tokio::test]
async fn duplicate_username_is_rejected() -> anyhow::Result<()> {
    let store = common::fresh_store().await?;
    common::create_customer(&store, "duc").await?;
    let before = Users::find().count(store.orm()).await?;

    let result = user_service::add_user(
        &store,
        RegisterRequest {
            username: "duc".into(),
            password: "other".into(),
            role: Role::User,
        },
    )
    .await;

    assert!(matches!(result, Err(StoreError::UsernameTaken(ref name)) if name == "duc"));
    assert_eq!(Users::find().count(store.orm()).await?, before);
    Ok(())
}

#[tokio::test]
async fn passwords_are_stored_hashed() -> anyhow::Result<()> {
    let store = common::fresh_store().await?;
    let id = common::create_customer(&store, "phuong").await?;

    let row = Users::find()
        .filter(users::Column::Id.eq(id))
        .one(store.orm())
        .await?
        .unwrap();
    assert_ne!(row.password_hash, "secret");
    assert!(row.password_hash.starts_with("$argon2"));

    let user = user_service::get_user_by_credentials(&store, "phuong", "secret")
        .await?
        .unwrap();
    assert_eq!(user.id, id);
    assert_eq!(user.role, Role::User);
    assert!(
        user_service::get_user_by_credentials(&store, "nobody", "secret")
            .await?
            .is_none()
    );
    Ok(())
}

#[tokio::test]
async fn update_user_renames_and_changes_password() -> anyhow::Result<()> {
    let store = common::fresh_store().await?;
    let id = common::create_customer(&store, "son").await?;

    let updated = user_service::update_user(
        &store,
        UpdateUserRequest {
            id,
            username: "son_admin".into(),
            password: Some("newpass".into()),
            role: Role::Admin,
        },
    )
    .await?;
    assert!(updated);

    assert!(
        user_service::get_user_by_credentials(&store, "son_admin", "secret")
            .await?
            .is_none()
    );
    let user = user_service::get_user_by_credentials(&store, "son_admin", "newpass")
        .await?
        .unwrap();
    assert_eq!(user.role, Role::Admin);

    // keeping the password
    user_service::update_user(
        &store,
        UpdateUserRequest {
            id,
            username: "son".into(),
            password: None,
            role: Role::User,
        },
    )
    .await?;
    assert!(
        user_service::get_user_by_credentials(&store, "son", "newpass")
            .await?
            .is_some()
    );
    Ok(())
}

#[tokio::test]
async fn rename_onto_existing_username_fails() -> anyhow::Result<()> {
    let store = common::fresh_store().await?;
    let id = common::create_customer(&store, "tam").await?;

    let result = user_service::update_user(
        &store,
        UpdateUserRequest {
            id,
            username: "admin".into(),
            password: None,
            role: Role::User,
        },
    )
    .await;
    assert!(matches!(result, Err(StoreError::UsernameTaken(_))));

    let user = user_service::get_user_by_id(&store, id).await?.unwrap();
    assert_eq!(user.username, "tam");

    let missing = user_service::update_user(
        &store,
        UpdateUserRequest {
            id: 4_040,
            username: "ghost".into(),
            password: None,
            role: Role::User,
        },
    )
    .await?;
    assert!(!missing);
    Ok(())
}

#[tokio::test]
async fn delete_user_drops_cart_and_profile_but_keeps_orders() -> anyhow::Result<()> {
    let store = common::fresh_store().await?;
    let id = common::create_customer(&store, "kim").await?;
    profile_service::upsert_user_profile(
        &store,
        UpsertProfileRequest {
            user_id: id,
            phone: Some("0911".into()),
            ..Default::default()
        },
    )
    .await?;
    cart_service::add_to_cart(&store, id, 1, 1).await?;
    order_service::place_order(&store, id, Default::default()).await?;
    cart_service::add_to_cart(&store, id, 2, 1).await?;

    assert!(user_service::delete_user(&store, id).await?);
    assert!(!user_service::delete_user(&store, id).await?);

    assert!(user_service::get_user_by_id(&store, id).await?.is_none());
    assert_eq!(CartItems::find().count(store.orm()).await?, 0);
    assert_eq!(UserProfiles::find().count(store.orm()).await?, 0);
    assert_eq!(order_service::list_orders_for_user(&store, id).await?.len(), 1);

    let users = user_service::list_users(&store).await?;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].username, "admin");
    Ok(())
}

#[tokio::test]
async fn profile_upsert_keeps_one_row_with_latest_values() -> anyhow::Result<()> {
    let store = common::fresh_store().await?;
    let id = common::create_customer(&store, "yen").await?;
    assert!(profile_service::get_user_profile(&store, id).await?.is_none());

    profile_service::upsert_user_profile(
        &store,
        UpsertProfileRequest {
            user_id: id,
            full_name: Some("Yến".into()),
            email: Some("yen@example.com".into()),
            phone: Some("0901".into()),
            address: Some("Hà Nội".into()),
        },
    )
    .await?;
    let latest = profile_service::upsert_user_profile(
        &store,
        UpsertProfileRequest {
            user_id: id,
            full_name: Some("Hoàng Yến".into()),
            phone: Some("0902".into()),
            ..Default::default()
        },
    )
    .await?;

    assert_eq!(UserProfiles::find().count(store.orm()).await?, 1);
    let stored = profile_service::get_user_profile(&store, id).await?.unwrap();
    assert_eq!(stored, latest);
    assert_eq!(stored.full_name.as_deref(), Some("Hoàng Yến"));
    assert_eq!(stored.phone.as_deref(), Some("0902"));
    assert!(stored.email.is_none());
    assert!(stored.address.is_none());
    Ok(())
}

#[tokio::test]
async fn profile_for_unknown_user_is_rejected() -> anyhow::Result<()> {
    let store = common::fresh_store().await?;
    let result = profile_service::upsert_user_profile(
        &store,
        UpsertProfileRequest {
            user_id: 77,
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(
        result,
        Err(StoreError::MissingReference { entity: "user", id: 77 })
    ));
    assert_eq!(UserProfiles::find().count(store.orm()).await?, 0);
    Ok(())
}

#[test]
fn roles_and_statuses_use_lowercase_text() {
    use storefront_store::models::OrderStatus;

    assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
    assert!("root".parse::<Role>().is_err());
    assert_eq!(OrderStatus::Processing.to_string(), "processing");
    assert_eq!("cancelled".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
    assert_eq!(
        serde_json::to_string(&OrderStatus::Shipped).unwrap(),
        "\"shipped\""
    );
}
