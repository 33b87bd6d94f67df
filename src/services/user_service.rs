use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::{
    dto::users::{RegisterRequest, UpdateUserRequest},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        user_profiles::Entity as UserProfiles,
        users::{
            ActiveModel as UserActive, Column as UserCol, Entity as Users, Model as UserModel,
        },
    },
    error::{StoreError, StoreResult, is_unique_violation},
    models::User,
    password::{hash_password, verify_password},
    store::Store,
};

pub async fn add_user(store: &Store, payload: RegisterRequest) -> StoreResult<User> {
    let RegisterRequest {
        username,
        password,
        role,
    } = payload;
    let username = validate_username(&username)?;
    validate_password(&password)?;

    let exist = Users::find()
        .filter(UserCol::Username.eq(username.as_str()))
        .one(&store.orm)
        .await?;
    if exist.is_some() {
        return Err(StoreError::UsernameTaken(username));
    }

    let password_hash = hash_password(&password)?;

    let user = UserActive {
        username: Set(username.clone()),
        password_hash: Set(password_hash),
        role: Set(role),
        ..Default::default()
    }
    .insert(&store.orm)
    .await
    .map_err(|err| {
        if is_unique_violation(&err) {
            StoreError::UsernameTaken(username.clone())
        } else {
            StoreError::Orm(err)
        }
    })?;

    tracing::info!(user_id = user.id, role = %user.role, "user created");
    Ok(user_from_entity(user))
}

/// Rewrites username and role, and the password when one is given.
/// Returns `false` when no user has this id.
pub async fn update_user(store: &Store, payload: UpdateUserRequest) -> StoreResult<bool> {
    let username = validate_username(&payload.username)?;
    if let Some(password) = payload.password.as_deref() {
        validate_password(password)?;
    }

    let existing = Users::find_by_id(payload.id).one(&store.orm).await?;
    let existing = match existing {
        Some(u) => u,
        None => {
            tracing::warn!(user_id = payload.id, "update of missing user");
            return Ok(false);
        }
    };

    let taken = Users::find()
        .filter(UserCol::Username.eq(username.as_str()))
        .filter(UserCol::Id.ne(payload.id))
        .one(&store.orm)
        .await?;
    if taken.is_some() {
        return Err(StoreError::UsernameTaken(username));
    }

    let mut active: UserActive = existing.into();
    active.username = Set(username.clone());
    active.role = Set(payload.role);
    if let Some(password) = payload.password.as_deref() {
        active.password_hash = Set(hash_password(password)?);
    }
    active.update(&store.orm).await.map_err(|err| {
        if is_unique_violation(&err) {
            StoreError::UsernameTaken(username.clone())
        } else {
            StoreError::Orm(err)
        }
    })?;

    tracing::info!(user_id = payload.id, "user updated");
    Ok(true)
}

/// Removes the user together with their cart rows and profile. Placed
/// orders stay as history.
pub async fn delete_user(store: &Store, id: i64) -> StoreResult<bool> {
    let _guard = store.locks.lock(id).await;
    let txn = store.orm.begin().await?;

    CartItems::delete_many()
        .filter(CartCol::UserId.eq(id))
        .exec(&txn)
        .await?;
    UserProfiles::delete_by_id(id).exec(&txn).await?;
    let result = Users::delete_by_id(id).exec(&txn).await?;

    if result.rows_affected == 0 {
        store.locks.forget(id);
        tracing::warn!(user_id = id, "delete of missing user");
        return Ok(false);
    }
    txn.commit().await?;
    store.locks.forget(id);

    tracing::info!(user_id = id, "user deleted");
    Ok(true)
}

pub async fn list_users(store: &Store) -> StoreResult<Vec<User>> {
    let users = Users::find()
        .order_by_asc(UserCol::Id)
        .all(&store.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();
    Ok(users)
}

pub async fn get_user_by_id(store: &Store, id: i64) -> StoreResult<Option<User>> {
    let user = Users::find_by_id(id)
        .one(&store.orm)
        .await?
        .map(user_from_entity);
    Ok(user)
}

/// Login check. Returns the user when the username exists and the password
/// matches its stored hash, `None` otherwise.
pub async fn get_user_by_credentials(
    store: &Store,
    username: &str,
    password: &str,
) -> StoreResult<Option<User>> {
    let user = Users::find()
        .filter(UserCol::Username.eq(username.trim()))
        .one(&store.orm)
        .await?;

    let user = match user {
        Some(u) => u,
        None => {
            tracing::warn!("login with unknown username");
            return Ok(None);
        }
    };

    if !verify_password(password, &user.password_hash) {
        tracing::warn!(user_id = user.id, "login with wrong password");
        return Ok(None);
    }

    tracing::info!(user_id = user.id, "user logged in");
    Ok(Some(user_from_entity(user)))
}

fn validate_username(username: &str) -> StoreResult<String> {
    let username = username.trim();
    if username.is_empty() {
        return Err(StoreError::Invalid("username must not be empty".into()));
    }
    Ok(username.to_string())
}

fn validate_password(password: &str) -> StoreResult<()> {
    if password.is_empty() {
        return Err(StoreError::Invalid("password must not be empty".into()));
    }
    Ok(())
}

fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        username: model.username,
        role: model.role,
    }
}
