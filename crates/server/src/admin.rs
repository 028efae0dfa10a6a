//! Catalog administration endpoints

use api_types::{
    admin::{
        CategoryNew, Created, OfferStatus, PackageNew, PackageUpdate, ProductNew, ProductUpdate,
    },
    credit::CreditPackage,
    product::Product,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{CreditPackagePatch, NewCreditPackage, NewProduct, ProductPatch};

use crate::{
    ServerError,
    credits::package_view,
    products::product_view,
    server::ServerState,
    validation::{parse_amount, parse_uuid},
};

pub async fn category_new(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let id = state
        .engine
        .new_category(&payload.name, &payload.description)
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn package_new(
    State(state): State<ServerState>,
    Json(payload): Json<PackageNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let price = parse_amount(&payload.price, "price")?;
    let cmd = NewCreditPackage::new(payload.name, price, payload.reward_points)
        .description(payload.description);
    let id = state.engine.new_credit_package(cmd).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn package_update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PackageUpdate>,
) -> Result<Json<CreditPackage>, ServerError> {
    let package_id = parse_uuid(&id, "package id")?;
    let price = payload
        .price
        .as_deref()
        .map(|raw| parse_amount(raw, "price"))
        .transpose()?;

    let patch = CreditPackagePatch {
        name: payload.name,
        description: payload.description,
        price,
        reward_points: payload.reward_points,
        is_active: payload.is_active,
    };
    let package = state
        .engine
        .update_credit_package(package_id, patch)
        .await?;
    Ok(Json(package_view(package)))
}

pub async fn product_new(
    State(state): State<ServerState>,
    Json(payload): Json<ProductNew>,
) -> Result<(StatusCode, Json<Created>), ServerError> {
    let mut cmd = NewProduct::new(payload.name, payload.point_cost, payload.stock_quantity)
        .description(payload.description)
        .in_offer_pool(payload.is_in_offer_pool)
        .image_url(payload.image_url);
    if let Some(raw) = payload.category_id.as_deref() {
        cmd = cmd.category_id(parse_uuid(raw, "category_id")?);
    }
    let id = state.engine.new_product(cmd).await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

pub async fn product_update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> Result<Json<Product>, ServerError> {
    let product_id = parse_uuid(&id, "product id")?;
    let category_id = match (payload.clear_category, payload.category_id.as_deref()) {
        (true, Some(_)) => {
            return Err(ServerError::Generic(
                "category_id and clear_category are mutually exclusive".to_string(),
            ));
        }
        (true, None) => Some(None),
        (false, Some(raw)) => Some(Some(parse_uuid(raw, "category_id")?)),
        (false, None) => None,
    };

    let patch = ProductPatch {
        name: payload.name,
        description: payload.description,
        category_id,
        point_cost: payload.point_cost,
        stock_quantity: payload.stock_quantity,
        is_active: payload.is_active,
        is_in_offer_pool: payload.is_in_offer_pool,
        image_url: payload.image_url,
    };
    let product = state.engine.update_product(product_id, patch).await?;
    Ok(Json(product_view(product)))
}

pub async fn product_offer_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<OfferStatus>,
) -> Result<Json<Product>, ServerError> {
    let product_id = parse_uuid(&id, "product id")?;
    let product = state
        .engine
        .set_offer_status(product_id, payload.is_in_offer_pool)
        .await?;
    Ok(Json(product_view(product)))
}
