use chrono::Utc;
use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{
    Conflict, EngineError, HistoryStatus, InvalidState, PointRedemption, Product, RedeemCmd,
    ResultEngine, point_redemptions, products, users,
    util::{normalize_idempotency_key, parse_uuid},
};

use super::Engine;

impl Engine {
    /// Spend points on `quantity` units of a product.
    ///
    /// Locks the product, checks it is active, offered and in stock, then locks
    /// the user and checks the balance. Balance, stock and the redemption row
    /// are written in the same unit of work, so either all of them change or
    /// none does. Returns the redemption id.
    pub async fn redeem_product(&self, cmd: RedeemCmd) -> ResultEngine<Uuid> {
        if cmd.quantity < 1 {
            return Err(EngineError::Validation("quantity must be >= 1".to_string()));
        }
        self.with_tx(cmd.deadline, |engine, db_tx| {
            Box::pin(engine.apply_redemption(db_tx, cmd))
        })
        .await
    }

    pub(super) async fn apply_redemption(
        &self,
        db_tx: &DatabaseTransaction,
        cmd: RedeemCmd,
    ) -> ResultEngine<Uuid> {
        let idempotency_key = normalize_idempotency_key(cmd.idempotency_key.as_deref());

        let product = Product::try_from(self.lock_product(db_tx, cmd.product_id).await?)?;
        if !product.is_active {
            return Err(EngineError::InvalidState(InvalidState::ProductInactive));
        }
        if !product.is_in_offer_pool {
            return Err(EngineError::InvalidState(InvalidState::ProductNotOffered));
        }

        if product.stock_quantity < cmd.quantity {
            // A replay must succeed even after the first call drained the stock.
            if let Some(key) = idempotency_key.as_deref()
                && let Some(existing) = find_redemption_by_key(db_tx, cmd.user_id, key).await?
            {
                return Ok(existing);
            }
            return Err(EngineError::Conflict(Conflict::InsufficientStock));
        }

        let user = self.lock_user(db_tx, cmd.user_id).await?;

        if let Some(key) = idempotency_key.as_deref()
            && let Some(existing) = find_redemption_by_key(db_tx, cmd.user_id, key).await?
        {
            tracing::info!(user_id = %cmd.user_id, redemption_id = %existing, "redemption replayed");
            return Ok(existing);
        }

        let points_needed = product
            .point_cost
            .checked_mul(cmd.quantity)
            .ok_or_else(|| EngineError::Validation("quantity too large".to_string()))?;
        if user.point_balance < points_needed {
            return Err(EngineError::Conflict(Conflict::InsufficientPoints));
        }

        let now = Utc::now();
        let redemption = PointRedemption {
            id: Uuid::new_v4(),
            user_id: cmd.user_id,
            product_id: product.id,
            points_used: points_needed,
            quantity: cmd.quantity,
            redeemed_at: now,
            status: HistoryStatus::Completed,
            idempotency_key,
        };

        if let Err(err) = point_redemptions::ActiveModel::from(&redemption)
            .insert(db_tx)
            .await
        {
            if let Some(key) = redemption.idempotency_key.as_deref()
                && let Some(existing) = find_redemption_by_key(db_tx, cmd.user_id, key).await?
            {
                return Ok(existing);
            }
            return Err(err.into());
        }

        users::Entity::update_many()
            .col_expr(
                users::Column::PointBalance,
                Expr::col(users::Column::PointBalance).sub(points_needed),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(cmd.user_id.to_string()))
            .exec(db_tx)
            .await?;

        products::Entity::update_many()
            .col_expr(
                products::Column::StockQuantity,
                Expr::col(products::Column::StockQuantity).sub(cmd.quantity),
            )
            .col_expr(products::Column::UpdatedAt, Expr::value(now))
            .filter(products::Column::Id.eq(product.id.to_string()))
            .exec(db_tx)
            .await?;

        tracing::info!(
            user_id = %cmd.user_id,
            product_id = %product.id,
            redemption_id = %redemption.id,
            quantity = cmd.quantity,
            points = points_needed,
            "product redeemed"
        );
        Ok(redemption.id)
    }
}

async fn find_redemption_by_key(
    db_tx: &DatabaseTransaction,
    user_id: Uuid,
    key: &str,
) -> ResultEngine<Option<Uuid>> {
    let existing = point_redemptions::Entity::find()
        .filter(point_redemptions::Column::UserId.eq(user_id.to_string()))
        .filter(point_redemptions::Column::IdempotencyKey.eq(key.to_string()))
        .one(db_tx)
        .await?;
    existing
        .map(|model| parse_uuid(&model.id, "redemption"))
        .transpose()
}
