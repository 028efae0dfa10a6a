//! Command structs for engine operations.
//!
//! These types group parameters for write operations (purchase, redeem,
//! catalog admin), keeping call sites readable and avoiding long argument
//! lists. Inputs are expected to be shape-validated by the caller; the engine
//! re-checks the invariants it owns.

use tokio::time::Instant;
use uuid::Uuid;

use crate::Money;

/// Convert a captured payment into points.
#[derive(Clone, Debug)]
pub struct PurchaseCmd {
    pub user_id: Uuid,
    pub package_id: Uuid,
    pub amount_paid: Money,
    pub idempotency_key: Option<String>,
    pub deadline: Option<Instant>,
}

impl PurchaseCmd {
    #[must_use]
    pub fn new(user_id: Uuid, package_id: Uuid, amount_paid: Money) -> Self {
        Self {
            user_id,
            package_id,
            amount_paid,
            idempotency_key: None,
            deadline: None,
        }
    }

    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    /// Abort (and roll back) if the unit of work has not committed by then.
    #[must_use]
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Spend points on `quantity` units of a product.
#[derive(Clone, Debug)]
pub struct RedeemCmd {
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    pub idempotency_key: Option<String>,
    pub deadline: Option<Instant>,
}

impl RedeemCmd {
    #[must_use]
    pub fn new(user_id: Uuid, product_id: Uuid, quantity: i64) -> Self {
        Self {
            user_id,
            product_id,
            quantity,
            idempotency_key: None,
            deadline: None,
        }
    }

    #[must_use]
    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

/// Create a credit package. New packages start active.
#[derive(Clone, Debug)]
pub struct NewCreditPackage {
    pub name: String,
    pub description: String,
    pub price: Money,
    pub reward_points: i64,
}

impl NewCreditPackage {
    #[must_use]
    pub fn new(name: impl Into<String>, price: Money, reward_points: i64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            price,
            reward_points,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Partial update of a credit package; `None` fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct CreditPackagePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Money>,
    pub reward_points: Option<i64>,
    pub is_active: Option<bool>,
}

impl CreditPackagePatch {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn price(mut self, price: Money) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub fn reward_points(mut self, reward_points: i64) -> Self {
        self.reward_points = Some(reward_points);
        self
    }

    #[must_use]
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.reward_points.is_none()
            && self.is_active.is_none()
    }
}

/// Create a product. New products start active.
#[derive(Clone, Debug)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category_id: Option<Uuid>,
    pub point_cost: i64,
    pub stock_quantity: i64,
    pub is_in_offer_pool: bool,
    pub image_url: String,
}

impl NewProduct {
    #[must_use]
    pub fn new(name: impl Into<String>, point_cost: i64, stock_quantity: i64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            category_id: None,
            point_cost,
            stock_quantity,
            is_in_offer_pool: false,
            image_url: String::new(),
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn in_offer_pool(mut self, in_offer_pool: bool) -> Self {
        self.is_in_offer_pool = in_offer_pool;
        self
    }

    #[must_use]
    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }
}

/// Partial update of a product; `None` fields are left untouched.
///
/// `category_id: Some(None)` clears the category.
#[derive(Clone, Debug, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Option<Uuid>>,
    pub point_cost: Option<i64>,
    pub stock_quantity: Option<i64>,
    pub is_active: Option<bool>,
    pub is_in_offer_pool: Option<bool>,
    pub image_url: Option<String>,
}

impl ProductPatch {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: Option<Uuid>) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn point_cost(mut self, point_cost: i64) -> Self {
        self.point_cost = Some(point_cost);
        self
    }

    #[must_use]
    pub fn stock_quantity(mut self, stock_quantity: i64) -> Self {
        self.stock_quantity = Some(stock_quantity);
        self
    }

    #[must_use]
    pub fn is_active(mut self, is_active: bool) -> Self {
        self.is_active = Some(is_active);
        self
    }

    #[must_use]
    pub fn in_offer_pool(mut self, in_offer_pool: bool) -> Self {
        self.is_in_offer_pool = Some(in_offer_pool);
        self
    }

    #[must_use]
    pub fn image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = Some(image_url.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
            && self.point_cost.is_none()
            && self.stock_quantity.is_none()
            && self.is_active.is_none()
            && self.is_in_offer_pool.is_none()
            && self.image_url.is_none()
    }
}

/// Category filter for product listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    Any,
    /// Products without a category.
    Uncategorized,
    Is(Uuid),
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ProductFilter {
    pub is_active: Option<bool>,
    pub is_in_offer_pool: Option<bool>,
    pub category: CategoryFilter,
}
