use chrono::Utc;
use sea_orm::{ActiveValue, DatabaseTransaction, PaginatorTrait, QueryOrder, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{
    CreditPackage, CreditPackagePatch, EngineError, Money, NewCreditPackage, Paginated,
    Pagination, Resource, ResultEngine, credit_packages,
    util::{normalize_required_name, normalize_text, require_positive},
};

use super::Engine;

fn require_positive_price(price: Money) -> ResultEngine<Money> {
    if !price.is_positive() {
        return Err(EngineError::Validation("price must be > 0".to_string()));
    }
    Ok(price)
}

impl Engine {
    /// Create an active credit package.
    pub async fn new_credit_package(&self, cmd: NewCreditPackage) -> ResultEngine<Uuid> {
        let now = Utc::now();
        let package = CreditPackage {
            id: Uuid::new_v4(),
            name: normalize_required_name(&cmd.name, "package")?,
            description: normalize_text(&cmd.description),
            price: require_positive_price(cmd.price)?,
            reward_points: require_positive(cmd.reward_points, "reward_points")?,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        credit_packages::ActiveModel::from(&package)
            .insert(&self.database)
            .await?;
        tracing::info!(package_id = %package.id, "credit package created");
        Ok(package.id)
    }

    /// Apply the fields set in `patch`. The package row is locked, so the
    /// change cannot interleave with a purchase validating the old price.
    pub async fn update_credit_package(
        &self,
        package_id: Uuid,
        patch: CreditPackagePatch,
    ) -> ResultEngine<CreditPackage> {
        if patch.is_empty() {
            return Err(EngineError::Validation("no fields to update".to_string()));
        }
        self.with_tx(None, |engine, db_tx| {
            Box::pin(engine.apply_package_patch(db_tx, package_id, patch))
        })
        .await
    }

    async fn apply_package_patch(
        &self,
        db_tx: &DatabaseTransaction,
        package_id: Uuid,
        patch: CreditPackagePatch,
    ) -> ResultEngine<CreditPackage> {
        let model = self.lock_credit_package(db_tx, package_id).await?;
        let mut active: credit_packages::ActiveModel = model.into();

        if let Some(name) = patch.name.as_deref() {
            active.name = ActiveValue::Set(normalize_required_name(name, "package")?);
        }
        if let Some(description) = patch.description.as_deref() {
            active.description = ActiveValue::Set(normalize_text(description));
        }
        if let Some(price) = patch.price {
            active.price_minor = ActiveValue::Set(require_positive_price(price)?.minor());
        }
        if let Some(reward_points) = patch.reward_points {
            active.reward_points =
                ActiveValue::Set(require_positive(reward_points, "reward_points")?);
        }
        if let Some(is_active) = patch.is_active {
            active.is_active = ActiveValue::Set(is_active);
        }
        active.updated_at = ActiveValue::Set(Utc::now());

        let updated = active.update(db_tx).await?;
        tracing::info!(package_id = %package_id, "credit package updated");
        CreditPackage::try_from(updated)
    }

    pub async fn credit_package(&self, package_id: Uuid) -> ResultEngine<CreditPackage> {
        let model = credit_packages::Entity::find_by_id(package_id.to_string())
            .one(&self.database)
            .await?
            .ok_or(EngineError::NotFound(Resource::CreditPackage))?;
        CreditPackage::try_from(model)
    }

    /// Packages, newest first.
    pub async fn credit_packages(
        &self,
        pagination: Pagination,
    ) -> ResultEngine<Paginated<CreditPackage>> {
        let query = credit_packages::Entity::find();
        let total = query.clone().count(&self.database).await?;
        let items = query
            .order_by_desc(credit_packages::Column::CreatedAt)
            .order_by_desc(credit_packages::Column::Id)
            .offset(pagination.offset())
            .limit(pagination.size())
            .all(&self.database)
            .await?
            .into_iter()
            .map(CreditPackage::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(Paginated::new(items, total, pagination))
    }
}
