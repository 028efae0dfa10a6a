//! Product endpoints: listing, search and redemption

use api_types::{
    Page,
    product::{
        ListQuery, Product, ProductSummary, RedeemRequest, RedemptionCreated, SearchQuery,
    },
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use engine::{CategoryFilter, ProductFilter, RedeemCmd};

use crate::{
    ServerError,
    server::ServerState,
    validation::{pagination, parse_uuid, require_quantity},
};

pub(crate) fn product_view(product: engine::Product) -> Product {
    Product {
        id: product.id,
        name: product.name,
        description: product.description,
        category_id: product.category_id,
        point_cost: product.point_cost,
        stock_quantity: product.stock_quantity,
        is_active: product.is_active,
        is_in_offer_pool: product.is_in_offer_pool,
        image_url: product.image_url,
        created_at: product.created_at,
        updated_at: product.updated_at,
    }
}

pub(crate) fn summary_view(summary: engine::ProductSummary) -> ProductSummary {
    ProductSummary {
        id: summary.id,
        name: summary.name,
        description: summary.description,
        point_cost: summary.point_cost,
        stock_quantity: summary.stock_quantity,
        image_url: summary.image_url,
    }
}

/// Spend points on a product.
pub async fn redeem(
    State(state): State<ServerState>,
    Json(payload): Json<RedeemRequest>,
) -> Result<(StatusCode, Json<RedemptionCreated>), ServerError> {
    let user_id = parse_uuid(&payload.user_id, "user_id")?;
    let product_id = parse_uuid(&payload.product_id, "product_id")?;
    let quantity = require_quantity(payload.quantity)?;

    let mut cmd = RedeemCmd::new(user_id, product_id, quantity).deadline(state.deadline());
    if let Some(key) = payload.idempotency_key {
        cmd = cmd.idempotency_key(key);
    }
    let redemption_id = state.engine.redeem_product(cmd).await?;

    Ok((StatusCode::CREATED, Json(RedemptionCreated { redemption_id })))
}

pub async fn search(
    State(state): State<ServerState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<ProductSummary>>, ServerError> {
    let term = query.q.as_deref().map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Err(ServerError::Generic("q is required".to_string()));
    }
    let results = state
        .engine
        .search_products(term, pagination(query.page, query.size)?)
        .await?;
    Ok(Json(results.into_iter().map(summary_view).collect()))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Product>>, ServerError> {
    let category = match query.category_id.as_deref().map(str::trim) {
        None | Some("") => CategoryFilter::Any,
        Some("none") => CategoryFilter::Uncategorized,
        Some(raw) => CategoryFilter::Is(parse_uuid(raw, "category_id")?),
    };
    let filter = ProductFilter {
        is_active: query.is_active,
        is_in_offer_pool: query.is_in_offer_pool,
        category,
    };

    let page = state
        .engine
        .products(pagination(query.page, query.size)?, filter)
        .await?;
    Ok(Json(Page {
        items: page.items.into_iter().map(product_view).collect(),
        total: page.total,
        page: page.page,
        size: page.size,
    }))
}
