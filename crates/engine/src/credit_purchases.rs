//! `CreditPurchase` history rows: one per successful package purchase.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{HistoryStatus, Money, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreditPurchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub credit_package_id: Uuid,
    pub amount_paid: Money,
    pub points_awarded: i64,
    pub purchased_at: DateTime<Utc>,
    pub status: HistoryStatus,
    pub idempotency_key: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "credit_purchases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub credit_package_id: String,
    pub amount_paid_minor: i64,
    pub points_awarded: i64,
    pub purchased_at: DateTimeUtc,
    pub status: String,
    pub idempotency_key: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::credit_packages::Entity",
        from = "Column::CreditPackageId",
        to = "super::credit_packages::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    CreditPackages,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::credit_packages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditPackages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CreditPurchase> for ActiveModel {
    fn from(value: &CreditPurchase) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.to_string()),
            credit_package_id: ActiveValue::Set(value.credit_package_id.to_string()),
            amount_paid_minor: ActiveValue::Set(value.amount_paid.minor()),
            points_awarded: ActiveValue::Set(value.points_awarded),
            purchased_at: ActiveValue::Set(value.purchased_at),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            idempotency_key: ActiveValue::Set(value.idempotency_key.clone()),
        }
    }
}

impl TryFrom<Model> for CreditPurchase {
    type Error = crate::EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "purchase")?,
            user_id: parse_uuid(&model.user_id, "user")?,
            credit_package_id: parse_uuid(&model.credit_package_id, "package")?,
            amount_paid: Money::from_minor(model.amount_paid_minor),
            points_awarded: model.points_awarded,
            purchased_at: model.purchased_at,
            status: HistoryStatus::try_from(model.status.as_str())?,
            idempotency_key: model.idempotency_key,
        })
    }
}
