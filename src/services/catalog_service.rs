use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};

use crate::{
    dto::products::{CreateProductRequest, UpdateProductRequest},
    entity::{
        categories::{
            ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories,
            Model as CategoryModel,
        },
        products::{
            self, ActiveModel as ProductActive, Column as ProdCol, Entity as Products,
            Model as ProductModel,
        },
    },
    error::{StoreError, StoreResult},
    models::{Category, Product},
    store::Store,
};

pub async fn list_categories(store: &Store) -> StoreResult<Vec<Category>> {
    let items = Categories::find()
        .order_by_asc(CategoryCol::Id)
        .all(&store.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();
    Ok(items)
}

pub async fn get_category(store: &Store, id: i64) -> StoreResult<Option<Category>> {
    let category = Categories::find_by_id(id)
        .one(&store.orm)
        .await?
        .map(category_from_entity);
    Ok(category)
}

pub async fn add_category(store: &Store, name: &str) -> StoreResult<Category> {
    let name = validate_name(name)?;
    let category = CategoryActive {
        name: Set(name),
        ..Default::default()
    }
    .insert(&store.orm)
    .await?;

    tracing::info!(category_id = category.id, "category created");
    Ok(category_from_entity(category))
}

/// Returns `false` when no category has this id.
pub async fn update_category(store: &Store, id: i64, name: &str) -> StoreResult<bool> {
    let name = validate_name(name)?;
    let result = Categories::update_many()
        .col_expr(CategoryCol::Name, Expr::value(name))
        .filter(CategoryCol::Id.eq(id))
        .exec(&store.orm)
        .await?;

    if result.rows_affected == 0 {
        tracing::warn!(category_id = id, "update of missing category");
        return Ok(false);
    }
    tracing::info!(category_id = id, "category updated");
    Ok(true)
}

/// Deletes the category's products first, then the category itself, in
/// one transaction. Returns `false` when the category did not exist.
pub async fn delete_category(store: &Store, id: i64) -> StoreResult<bool> {
    let txn = store.orm.begin().await?;

    let products = Products::delete_many()
        .filter(ProdCol::CategoryId.eq(id))
        .exec(&txn)
        .await?;
    let category = Categories::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    if category.rows_affected == 0 {
        tracing::warn!(category_id = id, "delete of missing category");
        return Ok(false);
    }
    tracing::info!(
        category_id = id,
        products_removed = products.rows_affected,
        "category deleted"
    );
    Ok(true)
}

/// All products, or only those of `category_id` when given.
pub async fn list_products(store: &Store, category_id: Option<i64>) -> StoreResult<Vec<Product>> {
    let mut finder = Products::find();
    if let Some(category_id) = category_id {
        finder = finder.filter(ProdCol::CategoryId.eq(category_id));
    }

    let items = finder
        .order_by_asc(ProdCol::Id)
        .all(&store.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();
    Ok(items)
}

pub async fn list_products_by_category(
    store: &Store,
    category_id: i64,
) -> StoreResult<Vec<Product>> {
    list_products(store, Some(category_id)).await
}

pub async fn get_product(store: &Store, id: i64) -> StoreResult<Option<Product>> {
    let product = Products::find_by_id(id)
        .one(&store.orm)
        .await?
        .map(product_from_entity);
    Ok(product)
}

pub async fn add_product(store: &Store, payload: CreateProductRequest) -> StoreResult<Product> {
    let name = validate_name(&payload.name)?;
    validate_price(payload.price)?;
    ensure_category(store, payload.category_id).await?;

    let product = ProductActive {
        name: Set(name),
        price: Set(payload.price),
        img: Set(payload.img),
        category_id: Set(payload.category_id),
        ..Default::default()
    }
    .insert(&store.orm)
    .await?;

    tracing::info!(product_id = product.id, category_id = product.category_id, "product created");
    Ok(product_from_entity(product))
}

/// Overwrites every column of the product. Returns `false` when no product
/// has this id.
pub async fn update_product(
    store: &Store,
    id: i64,
    payload: UpdateProductRequest,
) -> StoreResult<bool> {
    let name = validate_name(&payload.name)?;
    validate_price(payload.price)?;

    if Products::find_by_id(id).one(&store.orm).await?.is_none() {
        tracing::warn!(product_id = id, "update of missing product");
        return Ok(false);
    }
    ensure_category(store, payload.category_id).await?;

    let result = Products::update_many()
        .col_expr(ProdCol::Name, Expr::value(name))
        .col_expr(ProdCol::Price, Expr::value(payload.price))
        .col_expr(ProdCol::Img, Expr::value(payload.img))
        .col_expr(ProdCol::CategoryId, Expr::value(payload.category_id))
        .filter(ProdCol::Id.eq(id))
        .exec(&store.orm)
        .await?;

    if result.rows_affected == 0 {
        tracing::warn!(product_id = id, "update of missing product");
        return Ok(false);
    }
    tracing::info!(product_id = id, "product updated");
    Ok(true)
}

/// Removes the product row only. Cart rows pointing at it drop out of cart
/// listings; order items keep their snapshot price.
pub async fn delete_product(store: &Store, id: i64) -> StoreResult<bool> {
    let result = Products::delete_by_id(id).exec(&store.orm).await?;

    if result.rows_affected == 0 {
        tracing::warn!(product_id = id, "delete of missing product");
        return Ok(false);
    }
    tracing::info!(product_id = id, "product deleted");
    Ok(true)
}

#[derive(Debug, FromQueryResult)]
struct ProductWithCategoryRow {
    id: i64,
    name: String,
    price: i64,
    img: String,
    category_id: i64,
    category_name: String,
}

/// Case-insensitive substring match on the product name or the name of its
/// category. A blank keyword matches every product with a category.
///
/// The keyword is trimmed and matched literally: `%` and `_` are plain
/// characters, not wildcards.
pub async fn search_products(store: &Store, keyword: &str) -> StoreResult<Vec<Product>> {
    let needle = keyword.trim().to_lowercase();

    // SQLite LIKE only folds ASCII, so the match runs here to cover
    // Vietnamese names.
    let rows = Products::find()
        .select_only()
        .columns([
            ProdCol::Id,
            ProdCol::Name,
            ProdCol::Price,
            ProdCol::Img,
            ProdCol::CategoryId,
        ])
        .column_as(CategoryCol::Name, "category_name")
        .join(JoinType::InnerJoin, products::Relation::Categories.def())
        .order_by_asc(ProdCol::Id)
        .into_model::<ProductWithCategoryRow>()
        .all(&store.orm)
        .await?;

    let items: Vec<Product> = rows
        .into_iter()
        .filter(|row| {
            needle.is_empty()
                || row.name.to_lowercase().contains(&needle)
                || row.category_name.to_lowercase().contains(&needle)
        })
        .map(|row| Product {
            id: row.id,
            name: row.name,
            price: row.price,
            img: row.img,
            category_id: row.category_id,
        })
        .collect();

    tracing::debug!(keyword, hits = items.len(), "product search");
    Ok(items)
}

async fn ensure_category(store: &Store, category_id: i64) -> StoreResult<()> {
    let exist = Categories::find_by_id(category_id).one(&store.orm).await?;
    if exist.is_none() {
        return Err(StoreError::missing("category", category_id));
    }
    Ok(())
}

fn validate_name(name: &str) -> StoreResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::Invalid("name must not be empty".into()));
    }
    Ok(name.to_string())
}

fn validate_price(price: i64) -> StoreResult<()> {
    if price < 0 {
        return Err(StoreError::Invalid("price must not be negative".into()));
    }
    Ok(())
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
    }
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        price: model.price,
        img: model.img,
        category_id: model.category_id,
    }
}
