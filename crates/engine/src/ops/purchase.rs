use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    Conflict, CreditPackage, CreditPurchase, EngineError, HistoryStatus, InvalidState,
    PurchaseCmd, ResultEngine, credit_purchases, users,
    util::{normalize_idempotency_key, parse_uuid},
};

use super::Engine;

impl Engine {
    /// Convert a captured payment into points.
    ///
    /// Locks the package, checks it is active and that `amount_paid` equals its
    /// price exactly, then locks the user, credits `reward_points` and records
    /// one purchase row. Returns the purchase id.
    ///
    /// With an idempotency key, a replay returns the id of the first purchase
    /// and changes nothing.
    pub async fn purchase_package(&self, cmd: PurchaseCmd) -> ResultEngine<Uuid> {
        if !cmd.amount_paid.is_positive() {
            return Err(EngineError::Validation(
                "amount_paid must be > 0".to_string(),
            ));
        }
        self.with_tx(cmd.deadline, |engine, db_tx| {
            Box::pin(engine.apply_purchase(db_tx, cmd))
        })
        .await
    }

    pub(super) async fn apply_purchase(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: PurchaseCmd,
    ) -> ResultEngine<Uuid> {
        let idempotency_key = normalize_idempotency_key(cmd.idempotency_key.as_deref());

        let package = CreditPackage::try_from(self.lock_credit_package(db_tx, cmd.package_id).await?)?;
        if !package.is_active {
            return Err(EngineError::InvalidState(InvalidState::PackageInactive));
        }
        if package.price != cmd.amount_paid {
            tracing::debug!(
                package_id = %package.id,
                price = %package.price,
                paid = %cmd.amount_paid,
                "purchase rejected: amount mismatch"
            );
            return Err(EngineError::Conflict(Conflict::AmountMismatch));
        }

        self.lock_user(db_tx, cmd.user_id).await?;

        if let Some(key) = idempotency_key.as_deref()
            && let Some(existing) = find_purchase_by_key(db_tx, cmd.user_id, key).await?
        {
            tracing::info!(user_id = %cmd.user_id, purchase_id = %existing, "purchase replayed");
            return Ok(existing);
        }

        let now = Utc::now();
        let purchase = CreditPurchase {
            id: Uuid::new_v4(),
            user_id: cmd.user_id,
            credit_package_id: package.id,
            amount_paid: cmd.amount_paid,
            points_awarded: package.reward_points,
            purchased_at: now,
            status: HistoryStatus::Completed,
            idempotency_key,
        };

        if let Err(err) = credit_purchases::ActiveModel::from(&purchase).insert(db_tx).await {
            if let Some(key) = purchase.idempotency_key.as_deref()
                && let Some(existing) = find_purchase_by_key(db_tx, cmd.user_id, key).await?
            {
                return Ok(existing);
            }
            return Err(err.into());
        }

        users::Entity::update_many()
            .col_expr(
                users::Column::PointBalance,
                Expr::col(users::Column::PointBalance).add(package.reward_points),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(cmd.user_id.to_string()))
            .exec(db_tx)
            .await?;

        tracing::info!(
            user_id = %cmd.user_id,
            package_id = %package.id,
            purchase_id = %purchase.id,
            points = package.reward_points,
            "credit package purchased"
        );
        Ok(purchase.id)
    }
}

async fn find_purchase_by_key(
    db_tx: &DatabaseTransaction,
    user_id: Uuid,
    key: &str,
) -> ResultEngine<Option<Uuid>> {
    let existing = credit_purchases::Entity::find()
        .filter(credit_purchases::Column::UserId.eq(user_id.to_string()))
        .filter(credit_purchases::Column::IdempotencyKey.eq(key.to_string()))
        .one(db_tx)
        .await?;
    existing
        .map(|model| parse_uuid(&model.id, "purchase"))
        .transpose()
}
