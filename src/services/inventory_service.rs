use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::entity::products::{ActiveModel, Column, Model as ProductModel};
use crate::entity::Products;
use crate::error::{BotError, BotResult};
use crate::models::Product;
use crate::state::AppState;

/// Full listing, lowest quantity first so shortages surface at the top.
pub async fn list_products(state: &AppState) -> BotResult<Vec<Product>> {
    let items = Products::find()
        .order_by_asc(Column::Quantity)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();
    Ok(items)
}

pub async fn get_product(state: &AppState, id: i64) -> BotResult<Product> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(product_from_entity);
    match product {
        Some(p) => Ok(p),
        None => Err(BotError::NotFound),
    }
}

pub async fn create_product(
    state: &AppState,
    name: String,
    quantity: i32,
    category: Option<String>,
) -> BotResult<Product> {
    let active = ActiveModel {
        name: Set(name),
        quantity: Set(quantity),
        category: Set(category),
        added_at: Set(Utc::now()),
        ..Default::default()
    };
    let product = active.insert(&state.orm).await?;
    Ok(product_from_entity(product))
}

pub async fn rename_product(state: &AppState, id: i64, name: String) -> BotResult<Product> {
    let existing = find_entity(state, id).await?;
    let mut active: ActiveModel = existing.into();
    active.name = Set(name);
    let product = active.update(&state.orm).await?;
    Ok(product_from_entity(product))
}

pub async fn set_quantity(state: &AppState, id: i64, quantity: i32) -> BotResult<Product> {
    let existing = find_entity(state, id).await?;
    let mut active: ActiveModel = existing.into();
    active.quantity = Set(quantity);
    let product = active.update(&state.orm).await?;
    Ok(product_from_entity(product))
}

pub async fn set_category(
    state: &AppState,
    id: i64,
    category: Option<String>,
) -> BotResult<Product> {
    let existing = find_entity(state, id).await?;
    let mut active: ActiveModel = existing.into();
    active.category = Set(category);
    let product = active.update(&state.orm).await?;
    Ok(product_from_entity(product))
}

/// Delete and return the removed row so the caller can echo it back.
pub async fn delete_product(state: &AppState, id: i64) -> BotResult<Product> {
    let existing = find_entity(state, id).await?;
    let product = product_from_entity(existing.clone());
    let active: ActiveModel = existing.into();
    active.delete(&state.orm).await?;
    Ok(product)
}

/// Case-insensitive substring match over name OR category, in scan order.
/// The backing store's LIKE is only case-insensitive for ASCII, so the
/// filter runs in-process to keep the match uniform.
pub async fn search_products(state: &AppState, term: &str) -> BotResult<Vec<Product>> {
    let needle = term.trim().to_lowercase();
    let items = Products::find()
        .all(&state.orm)
        .await?
        .into_iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.category
                    .as_deref()
                    .map(|c| c.to_lowercase().contains(&needle))
                    .unwrap_or(false)
        })
        .map(product_from_entity)
        .collect();
    Ok(items)
}

pub async fn low_stock(state: &AppState, threshold: i32) -> BotResult<Vec<Product>> {
    let items = Products::find()
        .filter(Column::Quantity.lt(threshold))
        .order_by_asc(Column::Quantity)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();
    Ok(items)
}

async fn find_entity(state: &AppState, id: i64) -> BotResult<ProductModel> {
    match Products::find_by_id(id).one(&state.orm).await? {
        Some(p) => Ok(p),
        None => Err(BotError::NotFound),
    }
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        quantity: model.quantity,
        category: model.category,
        added_at: model.added_at,
    }
}
