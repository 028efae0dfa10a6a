use sea_orm::{DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{
    CreditPurchase, HistoryStatus, Paginated, Pagination, PointRedemption, ResultEngine,
    credit_purchases, point_redemptions,
};

use super::Engine;

/// Balance of one user next to the totals recomputed from history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LedgerAudit {
    pub point_balance: i64,
    pub points_credited: i64,
    pub points_spent: i64,
    /// `point_balance == points_credited - points_spent`
    pub consistent: bool,
}

impl Engine {
    /// Purchases of a user, newest first.
    pub async fn purchases_for_user(
        &self,
        user_id: Uuid,
        pagination: Pagination,
    ) -> ResultEngine<Paginated<CreditPurchase>> {
        self.user(user_id).await?;
        let query = credit_purchases::Entity::find()
            .filter(credit_purchases::Column::UserId.eq(user_id.to_string()));
        let total = query.clone().count(&self.database).await?;
        let items = query
            .order_by_desc(credit_purchases::Column::PurchasedAt)
            .order_by_desc(credit_purchases::Column::Id)
            .offset(pagination.offset())
            .limit(pagination.size())
            .all(&self.database)
            .await?
            .into_iter()
            .map(CreditPurchase::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(Paginated::new(items, total, pagination))
    }

    /// Redemptions of a user, newest first.
    pub async fn redemptions_for_user(
        &self,
        user_id: Uuid,
        pagination: Pagination,
    ) -> ResultEngine<Paginated<PointRedemption>> {
        self.user(user_id).await?;
        let query = point_redemptions::Entity::find()
            .filter(point_redemptions::Column::UserId.eq(user_id.to_string()));
        let total = query.clone().count(&self.database).await?;
        let items = query
            .order_by_desc(point_redemptions::Column::RedeemedAt)
            .order_by_desc(point_redemptions::Column::Id)
            .offset(pagination.offset())
            .limit(pagination.size())
            .all(&self.database)
            .await?
            .into_iter()
            .map(PointRedemption::try_from)
            .collect::<ResultEngine<Vec<_>>>()?;
        Ok(Paginated::new(items, total, pagination))
    }

    /// Recompute a user's balance from completed history rows and compare it
    /// with the stored one. The user row is locked for the whole read, so a
    /// concurrent purchase cannot land between the balance and the sums.
    pub async fn audit_user_ledger(&self, user_id: Uuid) -> ResultEngine<LedgerAudit> {
        self.with_tx(None, |engine, db_tx| {
            Box::pin(engine.replay_user_ledger(db_tx, user_id))
        })
        .await
    }

    async fn replay_user_ledger(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<LedgerAudit> {
        // Purchases and redemptions take this lock before writing, so the sums
        // below cannot move while it is held.
        let user = self.lock_user(db_tx, user_id).await?;

        let completed = HistoryStatus::Completed.as_str();
        let purchases = credit_purchases::Entity::find()
            .filter(credit_purchases::Column::UserId.eq(user_id.to_string()))
            .filter(credit_purchases::Column::Status.eq(completed))
            .all(db_tx)
            .await?;
        let redemptions = point_redemptions::Entity::find()
            .filter(point_redemptions::Column::UserId.eq(user_id.to_string()))
            .filter(point_redemptions::Column::Status.eq(completed))
            .all(db_tx)
            .await?;

        let points_credited: i64 = purchases.iter().map(|p| p.points_awarded).sum();
        let points_spent: i64 = redemptions.iter().map(|r| r.points_used).sum();
        let consistent = user.point_balance == points_credited - points_spent;
        if !consistent {
            tracing::warn!(
                user_id = %user_id,
                point_balance = user.point_balance,
                points_credited,
                points_spent,
                "ledger drift detected"
            );
        }

        Ok(LedgerAudit {
            point_balance: user.point_balance,
            points_credited,
            points_spent,
            consistent,
        })
    }
}
