use std::collections::HashMap;

use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::{
    dto::orders::{CustomerOrder, UpdateOrderStatusRequest},
    entity::{
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        user_profiles::{Column as ProfileCol, Entity as UserProfiles},
        users::{Column as UserCol, Entity as Users},
    },
    error::StoreResult,
    services::order_service::{load_order_lines, order_from_entity},
    store::Store,
};

/// Overwrites the status of an order. Any status may follow any other.
/// Returns `false` when no order has this id.
pub async fn update_order_status(
    store: &Store,
    order_id: i64,
    payload: UpdateOrderStatusRequest,
) -> StoreResult<bool> {
    let existing = Orders::find_by_id(order_id).one(&store.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => {
            tracing::warn!(order_id, "status update of missing order");
            return Ok(false);
        }
    };

    let previous = existing.status;
    let mut active: OrderActive = existing.into();
    active.status = Set(payload.status);
    active.update(&store.orm).await?;

    tracing::info!(order_id, from = %previous, to = %payload.status, "order status updated");
    Ok(true)
}

/// Every order, newest first, with the customer's username and profile
/// contact data.
pub async fn list_all_orders_with_customer(store: &Store) -> StoreResult<Vec<CustomerOrder>> {
    let orders = Orders::find()
        .order_by_desc(OrderCol::Id)
        .all(&store.orm)
        .await?;
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let mut user_ids: Vec<i64> = orders.iter().map(|o| o.user_id).collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    let usernames: HashMap<i64, String> = Users::find()
        .filter(UserCol::Id.is_in(user_ids.clone()))
        .all(&store.orm)
        .await?
        .into_iter()
        .map(|u| (u.id, u.username))
        .collect();
    let profiles: HashMap<i64, _> = UserProfiles::find()
        .filter(ProfileCol::UserId.is_in(user_ids))
        .all(&store.orm)
        .await?
        .into_iter()
        .map(|p| (p.user_id, p))
        .collect();
    let mut lines = load_order_lines(&store.orm, &order_ids).await?;

    let items = orders
        .into_iter()
        .map(|order| {
            let profile = profiles.get(&order.user_id);
            CustomerOrder {
                username: usernames.get(&order.user_id).cloned(),
                full_name: profile.and_then(|p| p.full_name.clone()),
                email: profile.and_then(|p| p.email.clone()),
                items: lines.remove(&order.id).unwrap_or_default(),
                order: order_from_entity(order),
            }
        })
        .collect();
    Ok(items)
}
