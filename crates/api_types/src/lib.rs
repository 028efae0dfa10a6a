use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `?page&size` query parameters shared by list endpoints.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub size: Option<u64>,
}

/// One page of a listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub size: u64,
}

/// Error envelope: `{"error": {"code": "...", "message": "..."}}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

pub mod credit {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchaseRequest {
        pub user_id: String,
        pub package_id: String,
        /// Decimal string, e.g. `"25.00"`.
        pub amount_paid: String,
        pub idempotency_key: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PurchaseCreated {
        pub purchase_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CreditPackage {
        pub id: Uuid,
        pub name: String,
        pub description: String,
        pub price: String,
        pub reward_points: i64,
        pub is_active: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CreditPurchase {
        pub id: Uuid,
        pub credit_package_id: Uuid,
        pub amount_paid: String,
        pub points_awarded: i64,
        pub purchased_at: DateTime<Utc>,
        pub status: String,
    }
}

pub mod product {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RedeemRequest {
        pub user_id: String,
        pub product_id: String,
        pub quantity: i64,
        pub idempotency_key: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RedemptionCreated {
        pub redemption_id: Uuid,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SearchQuery {
        pub q: Option<String>,
        pub page: Option<u64>,
        pub size: Option<u64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ListQuery {
        pub page: Option<u64>,
        pub size: Option<u64>,
        pub is_active: Option<bool>,
        pub is_in_offer_pool: Option<bool>,
        /// A category UUID, or `none` for uncategorized products.
        pub category_id: Option<String>,
    }

    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct ProductSummary {
        pub id: Uuid,
        pub name: String,
        pub description: String,
        pub point_cost: i64,
        pub stock_quantity: i64,
        pub image_url: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Product {
        pub id: Uuid,
        pub name: String,
        pub description: String,
        pub category_id: Option<Uuid>,
        pub point_cost: i64,
        pub stock_quantity: i64,
        pub is_active: bool,
        pub is_in_offer_pool: bool,
        pub image_url: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PointRedemption {
        pub id: Uuid,
        pub product_id: Uuid,
        pub points_used: i64,
        pub quantity: i64,
        pub redeemed_at: DateTime<Utc>,
        pub status: String,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct User {
        pub id: Uuid,
        pub email: String,
        pub name: String,
        pub point_balance: i64,
        pub created_at: DateTime<Utc>,
    }
}

pub mod recommendation {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecommendationRequest {
        pub user_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Recommendation {
        pub user_id: Uuid,
        pub point_balance: i64,
        pub category_id: Uuid,
        pub category_name: String,
        pub min_points: i64,
        pub max_points: i64,
        pub reasoning: String,
        /// `gemini` or `fallback_rules`.
        pub provider: String,
        pub products: Vec<super::product::ProductSummary>,
    }
}

pub mod admin {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        #[serde(default)]
        pub description: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Created {
        pub id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PackageNew {
        pub name: String,
        #[serde(default)]
        pub description: String,
        pub price: String,
        pub reward_points: i64,
    }

    /// Only the supplied fields are changed.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PackageUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub price: Option<String>,
        pub reward_points: Option<i64>,
        pub is_active: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProductNew {
        pub name: String,
        #[serde(default)]
        pub description: String,
        pub category_id: Option<String>,
        pub point_cost: i64,
        pub stock_quantity: i64,
        #[serde(default)]
        pub is_in_offer_pool: bool,
        #[serde(default)]
        pub image_url: String,
    }

    /// Only the supplied fields are changed. `clear_category` detaches the
    /// product from its category.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ProductUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
        pub category_id: Option<String>,
        #[serde(default)]
        pub clear_category: bool,
        pub point_cost: Option<i64>,
        pub stock_quantity: Option<i64>,
        pub is_active: Option<bool>,
        pub is_in_offer_pool: Option<bool>,
        pub image_url: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct OfferStatus {
        pub is_in_offer_pool: bool,
    }
}
