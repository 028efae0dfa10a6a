//! Credit package endpoints

use api_types::{
    Page, PageQuery,
    credit::{CreditPackage, PurchaseCreated, PurchaseRequest},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::PurchaseCmd;

use crate::{
    ServerError,
    server::ServerState,
    validation::{pagination, parse_amount, parse_uuid},
};

pub(crate) fn package_view(package: engine::CreditPackage) -> CreditPackage {
    CreditPackage {
        id: package.id,
        name: package.name,
        description: package.description,
        price: package.price.to_string(),
        reward_points: package.reward_points,
        is_active: package.is_active,
        created_at: package.created_at,
        updated_at: package.updated_at,
    }
}

/// Convert an already captured payment into points.
pub async fn purchase(
    State(state): State<ServerState>,
    Json(payload): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseCreated>), ServerError> {
    let user_id = parse_uuid(&payload.user_id, "user_id")?;
    let package_id = parse_uuid(&payload.package_id, "package_id")?;
    let amount_paid = parse_amount(&payload.amount_paid, "amount_paid")?;

    let mut cmd = PurchaseCmd::new(user_id, package_id, amount_paid).deadline(state.deadline());
    if let Some(key) = payload.idempotency_key {
        cmd = cmd.idempotency_key(key);
    }
    let purchase_id = state.engine.purchase_package(cmd).await?;

    Ok((StatusCode::CREATED, Json(PurchaseCreated { purchase_id })))
}

pub async fn list_packages(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<CreditPackage>>, ServerError> {
    let page = state
        .engine
        .credit_packages(pagination(query.page, query.size)?)
        .await?;

    Ok(Json(Page {
        items: page.items.into_iter().map(package_view).collect(),
        total: page.total,
        page: page.page,
        size: page.size,
    }))
}

pub async fn get_package(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<CreditPackage>, ServerError> {
    let package_id = parse_uuid(&id, "package id")?;
    let package = state.engine.credit_package(package_id).await?;
    Ok(Json(package_view(package)))
}
