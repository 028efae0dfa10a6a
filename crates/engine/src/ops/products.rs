use chrono::Utc;
use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, prelude::*,
    sea_query::{Expr, Func, LikeExpr},
};
use uuid::Uuid;

use crate::{
    CategoryFilter, EngineError, NewProduct, Paginated, Pagination, Product, ProductFilter,
    ProductPatch, ProductSummary, Resource, ResultEngine, products, search_key,
    util::{normalize_required_name, normalize_text, require_non_negative, require_positive},
};

use super::Engine;

/// `%term%` with LIKE wildcards in the term escaped.
fn contains_pattern(term: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

fn redeemable() -> Condition {
    Condition::all()
        .add(products::Column::IsActive.eq(true))
        .add(products::Column::IsInOfferPool.eq(true))
}

impl Engine {
    /// Create an active product.
    pub async fn new_product(&self, cmd: NewProduct) -> ResultEngine<Uuid> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: normalize_required_name(&cmd.name, "product")?,
            description: normalize_text(&cmd.description),
            category_id: cmd.category_id,
            point_cost: require_positive(cmd.point_cost, "point_cost")?,
            stock_quantity: require_non_negative(cmd.stock_quantity, "stock_quantity")?,
            is_active: true,
            is_in_offer_pool: cmd.is_in_offer_pool,
            image_url: normalize_text(&cmd.image_url),
            created_at: now,
            updated_at: now,
        };
        if let Some(category_id) = product.category_id {
            self.require_category(&self.database, category_id).await?;
        }
        products::ActiveModel::from(&product)
            .insert(&self.database)
            .await?;
        tracing::info!(product_id = %product.id, "product created");

        self.invalidate_search_cache();
        Ok(product.id)
    }

    /// Apply the fields set in `patch` while holding the product row lock.
    ///
    /// Cached search pages are dropped after the commit and before returning.
    pub async fn update_product(
        &self,
        product_id: Uuid,
        patch: ProductPatch,
    ) -> ResultEngine<Product> {
        if patch.is_empty() {
            return Err(EngineError::Validation("no fields to update".to_string()));
        }
        let product = self
            .with_tx(None, |engine, db_tx| {
                Box::pin(engine.apply_product_patch(db_tx, product_id, patch))
            })
            .await?;

        self.invalidate_search_cache();
        Ok(product)
    }

    /// Add a product to, or remove it from, the redeemable offer pool.
    pub async fn set_offer_status(
        &self,
        product_id: Uuid,
        in_offer_pool: bool,
    ) -> ResultEngine<Product> {
        self.update_product(product_id, ProductPatch::default().in_offer_pool(in_offer_pool))
            .await
    }

    async fn apply_product_patch(
        &self,
        db_tx: &DatabaseTransaction,
        product_id: Uuid,
        patch: ProductPatch,
    ) -> ResultEngine<Product> {
        let model = self.lock_product(db_tx, product_id).await?;
        let mut active: products::ActiveModel = model.into();

        if let Some(name) = patch.name.as_deref() {
            active.name = ActiveValue::Set(normalize_required_name(name, "product")?);
        }
        if let Some(description) = patch.description.as_deref() {
            active.description = ActiveValue::Set(normalize_text(description));
        }
        if let Some(category_id) = patch.category_id {
            if let Some(id) = category_id {
                self.require_category(db_tx, id).await?;
            }
            active.category_id = ActiveValue::Set(category_id.map(|id| id.to_string()));
        }
        if let Some(point_cost) = patch.point_cost {
            active.point_cost = ActiveValue::Set(require_positive(point_cost, "point_cost")?);
        }
        if let Some(stock_quantity) = patch.stock_quantity {
            active.stock_quantity =
                ActiveValue::Set(require_non_negative(stock_quantity, "stock_quantity")?);
        }
        if let Some(is_active) = patch.is_active {
            active.is_active = ActiveValue::Set(is_active);
        }
        if let Some(in_offer_pool) = patch.is_in_offer_pool {
            active.is_in_offer_pool = ActiveValue::Set(in_offer_pool);
        }
        if let Some(image_url) = patch.image_url.as_deref() {
            active.image_url = ActiveValue::Set(normalize_text(image_url));
        }
        active.updated_at = ActiveValue::Set(Utc::now());

        let updated = active.update(db_tx).await?;
        tracing::info!(product_id = %product_id, "product updated");
        Product::try_from(updated)
    }

    pub async fn product(&self, product_id: Uuid) -> ResultEngine<Product> {
        let model = products::Entity::find_by_id(product_id.to_string())
            .one(&self.database)
            .await?
            .ok_or(EngineError::NotFound(Resource::Product))?;
        Product::try_from(model)
    }

    /// Products matching `filter`, newest first.
    pub async fn products(
        &self,
        pagination: Pagination,
        filter: ProductFilter,
    ) -> ResultEngine<Paginated<Product>> {
        let mut condition = Condition::all();
        if let Some(is_active) = filter.is_active {
            condition = condition.add(products::Column::IsActive.eq(is_active));
        }
        if let Some(in_offer_pool) = filter.is_in_offer_pool {
            condition = condition.add(products::Column::IsInOfferPool.eq(in_offer_pool));
        }
        match filter.category {
            CategoryFilter::Any => {}
            CategoryFilter::Uncategorized => {
                condition = condition.add(products::Column::CategoryId.is_null());
            }
            CategoryFilter::Is(id) => {
                condition = condition.add(products::Column::CategoryId.eq(id.to_string()));
            }
        }

        let query = products::Entity::find().filter(condition);
        let total = query.clone().count(&self.database).await?;
        let items = query
            .order_by_desc(products::Column::CreatedAt)
            .order_by_desc(products::Column::Id)
            .offset(pagination.offset())
            .limit(pagination.size())
            .all(&self.database)
            .await?
            .into_iter()
            .map(Product::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(Paginated::new(items, total, pagination))
    }

    /// Redeemable products of one category, cheapest first.
    pub async fn products_by_category(
        &self,
        category_id: Uuid,
        pagination: Pagination,
    ) -> ResultEngine<Vec<Product>> {
        products::Entity::find()
            .filter(redeemable())
            .filter(products::Column::CategoryId.eq(category_id.to_string()))
            .order_by_asc(products::Column::PointCost)
            .order_by_asc(products::Column::Name)
            .offset(pagination.offset())
            .limit(pagination.size())
            .all(&self.database)
            .await?
            .into_iter()
            .map(Product::try_from)
            .collect()
    }

    /// Case-insensitive substring search over name and description of
    /// redeemable products.
    ///
    /// Results are cache-aside: a hit never touches the store, a non-empty miss
    /// is stored for the configured TTL. Cache failures count as misses.
    pub async fn search_products(
        &self,
        query: &str,
        pagination: Pagination,
    ) -> ResultEngine<Vec<ProductSummary>> {
        let term = query.trim().to_lowercase();
        if term.is_empty() {
            return Err(EngineError::Validation(
                "search query must not be empty".to_string(),
            ));
        }

        let key = search_key(&term, pagination.page(), pagination.size());
        match self.catalog_cache.get(&key) {
            Ok(Some(hit)) => {
                tracing::debug!(%key, "search cache hit");
                return Ok(hit);
            }
            Ok(None) => {}
            Err(err) => tracing::warn!(%err, %key, "search cache read failed"),
        }

        let pattern = contains_pattern(&term);
        let matches = Condition::any()
            .add(Expr::expr(Func::lower(Expr::col(products::Column::Name))).like(pattern.clone()))
            .add(Expr::expr(Func::lower(Expr::col(products::Column::Description))).like(pattern));

        let results = products::Entity::find()
            .filter(redeemable())
            .filter(matches)
            .order_by_asc(products::Column::Name)
            .order_by_asc(products::Column::Id)
            .offset(pagination.offset())
            .limit(pagination.size())
            .all(&self.database)
            .await?
            .into_iter()
            .map(|model| Product::try_from(model).map(|product| product.summary()))
            .collect::<ResultEngine<Vec<_>>>()?;

        if !results.is_empty()
            && let Err(err) = self.catalog_cache.put(&key, results.clone(), self.search_ttl)
        {
            tracing::warn!(%err, %key, "search cache write failed");
        }
        Ok(results)
    }
}
