//! User balance and history endpoints

use api_types::{
    Page, PageQuery, credit::CreditPurchase, product::PointRedemption, user::User,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::{
    ServerError,
    server::ServerState,
    validation::{pagination, parse_uuid},
};

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<User>, ServerError> {
    let user = state.engine.user(parse_uuid(&id, "user id")?).await?;
    Ok(Json(User {
        id: user.id,
        email: user.email,
        name: user.name,
        point_balance: user.point_balance,
        created_at: user.created_at,
    }))
}

pub async fn purchases(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<CreditPurchase>>, ServerError> {
    let user_id = parse_uuid(&id, "user id")?;
    let page = state
        .engine
        .purchases_for_user(user_id, pagination(query.page, query.size)?)
        .await?;

    Ok(Json(Page {
        items: page
            .items
            .into_iter()
            .map(|purchase| CreditPurchase {
                id: purchase.id,
                credit_package_id: purchase.credit_package_id,
                amount_paid: purchase.amount_paid.to_string(),
                points_awarded: purchase.points_awarded,
                purchased_at: purchase.purchased_at,
                status: purchase.status.as_str().to_string(),
            })
            .collect(),
        total: page.total,
        page: page.page,
        size: page.size,
    }))
}

pub async fn redemptions(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<PointRedemption>>, ServerError> {
    let user_id = parse_uuid(&id, "user id")?;
    let page = state
        .engine
        .redemptions_for_user(user_id, pagination(query.page, query.size)?)
        .await?;

    Ok(Json(Page {
        items: page
            .items
            .into_iter()
            .map(|redemption| PointRedemption {
                id: redemption.id,
                product_id: redemption.product_id,
                points_used: redemption.points_used,
                quantity: redemption.quantity,
                redeemed_at: redemption.redeemed_at,
                status: redemption.status.as_str().to_string(),
            })
            .collect(),
        total: page.total,
        page: page.page,
        size: page.size,
    }))
}
