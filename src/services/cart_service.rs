use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

use crate::{
    dto::cart::CartList,
    entity::{
        cart_items::{
            self, ActiveModel as CartActive, Column as CartCol, Entity as CartItems,
            Model as CartModel,
        },
        products::{Column as ProdCol, Entity as Products},
        users::Entity as Users,
    },
    error::{StoreError, StoreResult},
    models::{CartItem, CartLine},
    store::Store,
};

#[derive(Debug, FromQueryResult)]
struct CartWithProductRow {
    cart_id: i64,
    product_id: i64,
    quantity: i32,
    name: String,
    price: i64,
    img: String,
}

/// Cart rows of `user_id` joined with current product data. Rows whose
/// product no longer exists are left out.
pub(crate) async fn fetch_cart_lines<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
) -> Result<Vec<CartLine>, DbErr> {
    let rows = CartItems::find()
        .select_only()
        .column_as(CartCol::Id, "cart_id")
        .column(CartCol::ProductId)
        .column(CartCol::Quantity)
        .column(ProdCol::Name)
        .column(ProdCol::Price)
        .column(ProdCol::Img)
        .join(JoinType::InnerJoin, cart_items::Relation::Products.def())
        .filter(CartCol::UserId.eq(user_id))
        .order_by_asc(CartCol::Id)
        .into_model::<CartWithProductRow>()
        .all(conn)
        .await?;

    let lines = rows
        .into_iter()
        .map(|row| CartLine {
            id: row.cart_id,
            product_id: row.product_id,
            quantity: row.quantity,
            name: row.name,
            price: row.price,
            img: row.img,
        })
        .collect();
    Ok(lines)
}

pub async fn list_cart(store: &Store, user_id: i64) -> StoreResult<CartList> {
    let items = fetch_cart_lines(&store.orm, user_id).await?;
    tracing::debug!(user_id, lines = items.len(), "cart listed");
    Ok(CartList { items })
}

/// Live total of the cart: current product price times quantity.
pub async fn cart_total(store: &Store, user_id: i64) -> StoreResult<i64> {
    Ok(list_cart(store, user_id).await?.total())
}

/// Sum of quantities, for the cart badge.
pub async fn cart_item_count(store: &Store, user_id: i64) -> StoreResult<i64> {
    Ok(list_cart(store, user_id).await?.item_count())
}

/// Adds `quantity` units of a product. A second add of the same product
/// increments the existing row instead of creating another one.
pub async fn add_to_cart(
    store: &Store,
    user_id: i64,
    product_id: i64,
    quantity: i32,
) -> StoreResult<CartItem> {
    if quantity < 1 {
        return Err(StoreError::Invalid(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let _guard = store.locks.lock(user_id).await;
    let txn = store.orm.begin().await?;

    if Products::find_by_id(product_id).one(&txn).await?.is_none() {
        return Err(StoreError::missing("product", product_id));
    }
    if Users::find_by_id(user_id).one(&txn).await?.is_none() {
        return Err(StoreError::missing("user", user_id));
    }

    let exist = CartItems::find()
        .filter(CartCol::UserId.eq(user_id))
        .filter(CartCol::ProductId.eq(product_id))
        .one(&txn)
        .await?;

    let cart_item = if let Some(item) = exist {
        let merged = item
            .quantity
            .checked_add(quantity)
            .ok_or_else(|| StoreError::Invalid("quantity overflow".to_string()))?;
        let mut active: CartActive = item.into();
        active.quantity = Set(merged);
        active.update(&txn).await?
    } else {
        CartActive {
            user_id: Set(user_id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            ..Default::default()
        }
        .insert(&txn)
        .await?
    };

    txn.commit().await?;

    tracing::info!(
        user_id,
        product_id,
        quantity = cart_item.quantity,
        "cart item added"
    );
    Ok(cart_item_from_entity(cart_item))
}

/// Sets the quantity of a cart row. Zero or less removes the row. Returns
/// `false` when the user has no row for this product.
pub async fn update_cart_quantity(
    store: &Store,
    user_id: i64,
    product_id: i64,
    quantity: i32,
) -> StoreResult<bool> {
    if quantity <= 0 {
        return remove_from_cart(store, user_id, product_id).await;
    }

    let _guard = store.locks.lock(user_id).await;
    let result = CartItems::update_many()
        .col_expr(CartCol::Quantity, Expr::value(quantity))
        .filter(CartCol::UserId.eq(user_id))
        .filter(CartCol::ProductId.eq(product_id))
        .exec(&store.orm)
        .await?;

    if result.rows_affected == 0 {
        tracing::warn!(user_id, product_id, "quantity update on missing cart row");
        return Ok(false);
    }
    tracing::info!(user_id, product_id, quantity, "cart quantity updated");
    Ok(true)
}

pub async fn remove_from_cart(store: &Store, user_id: i64, product_id: i64) -> StoreResult<bool> {
    let _guard = store.locks.lock(user_id).await;
    let result = CartItems::delete_many()
        .filter(CartCol::UserId.eq(user_id))
        .filter(CartCol::ProductId.eq(product_id))
        .exec(&store.orm)
        .await?;

    if result.rows_affected == 0 {
        return Ok(false);
    }
    tracing::info!(user_id, product_id, "cart item removed");
    Ok(true)
}

/// Empties the cart and returns how many rows were removed.
pub async fn clear_cart(store: &Store, user_id: i64) -> StoreResult<u64> {
    let _guard = store.locks.lock(user_id).await;
    let result = CartItems::delete_many()
        .filter(CartCol::UserId.eq(user_id))
        .exec(&store.orm)
        .await?;

    tracing::info!(user_id, removed = result.rows_affected, "cart cleared");
    Ok(result.rows_affected)
}

fn cart_item_from_entity(model: CartModel) -> CartItem {
    CartItem {
        id: model.id,
        user_id: model.user_id,
        product_id: model.product_id,
        quantity: model.quantity,
    }
}
