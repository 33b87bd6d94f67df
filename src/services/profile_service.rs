use sea_orm::{ActiveModelTrait, EntityTrait, Set, TransactionTrait};

use crate::{
    dto::users::UpsertProfileRequest,
    entity::{
        user_profiles::{
            ActiveModel as ProfileActive, Entity as UserProfiles, Model as ProfileModel,
        },
        users::Entity as Users,
    },
    error::{StoreError, StoreResult},
    models::UserProfile,
    store::Store,
};

pub async fn get_user_profile(store: &Store, user_id: i64) -> StoreResult<Option<UserProfile>> {
    let profile = UserProfiles::find_by_id(user_id)
        .one(&store.orm)
        .await?
        .map(profile_from_entity);
    Ok(profile)
}

/// Inserts the profile or overwrites every field of the existing one, so a
/// `None` in the request clears that field.
pub async fn upsert_user_profile(
    store: &Store,
    payload: UpsertProfileRequest,
) -> StoreResult<UserProfile> {
    let txn = store.orm.begin().await?;

    if Users::find_by_id(payload.user_id).one(&txn).await?.is_none() {
        return Err(StoreError::missing("user", payload.user_id));
    }

    let existing = UserProfiles::find_by_id(payload.user_id).one(&txn).await?;
    let profile = match existing {
        Some(current) => {
            let mut active: ProfileActive = current.into();
            active.full_name = Set(payload.full_name);
            active.email = Set(payload.email);
            active.phone = Set(payload.phone);
            active.address = Set(payload.address);
            active.update(&txn).await?
        }
        None => {
            ProfileActive {
                user_id: Set(payload.user_id),
                full_name: Set(payload.full_name),
                email: Set(payload.email),
                phone: Set(payload.phone),
                address: Set(payload.address),
            }
            .insert(&txn)
            .await?
        }
    };

    txn.commit().await?;

    tracing::info!(user_id = profile.user_id, "profile saved");
    Ok(profile_from_entity(profile))
}

fn profile_from_entity(model: ProfileModel) -> UserProfile {
    UserProfile {
        user_id: model.user_id,
        full_name: model.full_name,
        email: model.email,
        phone: model.phone,
        address: model.address,
    }
}
