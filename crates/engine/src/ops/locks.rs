//! Exclusive row locks taken at the start of a unit of work.
//!
//! Paths that touch both a catalog row and a user row lock the catalog row
//! first. `lock_exclusive` renders `FOR UPDATE` on Postgres and nothing on
//! SQLite, where the single-connection pool serializes units of work instead.

use sea_orm::{DatabaseTransaction, QuerySelect, prelude::*};
use uuid::Uuid;

use crate::{EngineError, Resource, ResultEngine, credit_packages, products, users};

use super::Engine;

impl Engine {
    pub(super) async fn lock_credit_package(
        &self,
        db_tx: &DatabaseTransaction,
        package_id: Uuid,
    ) -> ResultEngine<credit_packages::Model> {
        credit_packages::Entity::find_by_id(package_id.to_string())
            .lock_exclusive()
            .one(db_tx)
            .await?
            .ok_or(EngineError::NotFound(Resource::CreditPackage))
    }

    pub(super) async fn lock_product(
        &self,
        db_tx: &DatabaseTransaction,
        product_id: Uuid,
    ) -> ResultEngine<products::Model> {
        products::Entity::find_by_id(product_id.to_string())
            .lock_exclusive()
            .one(db_tx)
            .await?
            .ok_or(EngineError::NotFound(Resource::Product))
    }

    pub(super) async fn lock_user(
        &self,
        db_tx: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .lock_exclusive()
            .one(db_tx)
            .await?
            .ok_or(EngineError::NotFound(Resource::User))
    }
}
