use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

use crate::{
    dto::orders::{CheckoutRequest, OrderWithItems},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::{
            self, ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
            OrderStatus,
        },
        products::Column as ProdCol,
        users::Entity as Users,
    },
    error::{StoreError, StoreResult},
    models::{Order, OrderLine},
    services::cart_service::fetch_cart_lines,
    store::Store,
};

/// Turns the user's cart into an order and returns the new order id.
///
/// The order row, its items (each with the unit price read from the cart
/// join) and the cart clear commit together. An empty cart fails with
/// [`StoreError::EmptyCart`] before anything is written.
pub async fn place_order(
    store: &Store,
    user_id: i64,
    payload: CheckoutRequest,
) -> StoreResult<i64> {
    let _guard = store.locks.lock(user_id).await;
    let txn = store.orm.begin().await?;

    let lines = fetch_cart_lines(&txn, user_id).await?;
    if lines.is_empty() {
        return Err(StoreError::EmptyCart);
    }
    if Users::find_by_id(user_id).one(&txn).await?.is_none() {
        return Err(StoreError::missing("user", user_id));
    }

    let mut total_amount: i64 = 0;
    for line in &lines {
        total_amount = line
            .price
            .checked_mul(i64::from(line.quantity))
            .and_then(|amount| total_amount.checked_add(amount))
            .ok_or_else(|| StoreError::Invalid("order total overflow".into()))?;
    }

    let order = OrderActive {
        user_id: Set(user_id),
        total_amount: Set(total_amount),
        created_at: Set(Utc::now()),
        status: Set(OrderStatus::Pending),
        shipping_name: Set(normalize(payload.shipping_name)),
        shipping_phone: Set(normalize(payload.shipping_phone)),
        shipping_address: Set(normalize(payload.shipping_address)),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let items = lines.iter().map(|line| OrderItemActive {
        order_id: Set(order.id),
        product_id: Set(line.product_id),
        quantity: Set(line.quantity),
        price: Set(line.price),
        ..Default::default()
    });
    OrderItems::insert_many(items).exec(&txn).await?;

    // clear cart
    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    tracing::info!(
        user_id,
        order_id = order.id,
        total_amount,
        lines = lines.len(),
        "order placed"
    );
    Ok(order.id)
}

/// Orders of one user, newest first, each with its items.
pub async fn list_orders_for_user(store: &Store, user_id: i64) -> StoreResult<Vec<OrderWithItems>> {
    let orders = Orders::find()
        .filter(OrderCol::UserId.eq(user_id))
        .order_by_desc(OrderCol::Id)
        .all(&store.orm)
        .await?;

    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let mut lines = load_order_lines(&store.orm, &ids).await?;

    let items = orders
        .into_iter()
        .map(|order| OrderWithItems {
            items: lines.remove(&order.id).unwrap_or_default(),
            order: order_from_entity(order),
        })
        .collect();
    Ok(items)
}

pub async fn get_order(store: &Store, order_id: i64) -> StoreResult<Option<OrderWithItems>> {
    let order = match Orders::find_by_id(order_id).one(&store.orm).await? {
        Some(o) => o,
        None => return Ok(None),
    };

    let mut lines = load_order_lines(&store.orm, &[order.id]).await?;
    Ok(Some(OrderWithItems {
        items: lines.remove(&order.id).unwrap_or_default(),
        order: order_from_entity(order),
    }))
}

#[derive(Debug, FromQueryResult)]
struct OrderItemWithProductRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    quantity: i32,
    price: i64,
    name: Option<String>,
    img: Option<String>,
}

/// Items of the given orders keyed by order id. Price is the stored
/// snapshot; name and image are joined from the live catalog.
pub(crate) async fn load_order_lines<C: ConnectionTrait>(
    conn: &C,
    order_ids: &[i64],
) -> Result<HashMap<i64, Vec<OrderLine>>, DbErr> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = OrderItems::find()
        .select_only()
        .columns([
            OrderItemCol::Id,
            OrderItemCol::OrderId,
            OrderItemCol::ProductId,
            OrderItemCol::Quantity,
            OrderItemCol::Price,
        ])
        .column(ProdCol::Name)
        .column(ProdCol::Img)
        .join(JoinType::LeftJoin, order_items::Relation::Products.def())
        .filter(OrderItemCol::OrderId.is_in(order_ids.iter().copied()))
        .order_by_asc(OrderItemCol::Id)
        .into_model::<OrderItemWithProductRow>()
        .all(conn)
        .await?;

    let mut grouped: HashMap<i64, Vec<OrderLine>> = HashMap::new();
    for row in rows {
        grouped.entry(row.order_id).or_default().push(OrderLine {
            id: row.id,
            product_id: row.product_id,
            quantity: row.quantity,
            price: row.price,
            name: row.name,
            img: row.img,
        });
    }
    Ok(grouped)
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        total_amount: model.total_amount,
        created_at: model.created_at,
        status: model.status,
        shipping_name: model.shipping_name,
        shipping_phone: model.shipping_phone,
        shipping_address: model.shipping_address,
    }
}
