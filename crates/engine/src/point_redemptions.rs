//! `PointRedemption` history rows: one per successful redemption.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{HistoryStatus, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointRedemption {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    /// Always `point_cost × quantity` at the time of redemption.
    pub points_used: i64,
    pub quantity: i64,
    pub redeemed_at: DateTime<Utc>,
    pub status: HistoryStatus,
    pub idempotency_key: Option<String>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "point_redemptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub points_used: i64,
    pub quantity: i64,
    pub redeemed_at: DateTimeUtc,
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
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Products,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&PointRedemption> for ActiveModel {
    fn from(value: &PointRedemption) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            user_id: ActiveValue::Set(value.user_id.to_string()),
            product_id: ActiveValue::Set(value.product_id.to_string()),
            points_used: ActiveValue::Set(value.points_used),
            quantity: ActiveValue::Set(value.quantity),
            redeemed_at: ActiveValue::Set(value.redeemed_at),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            idempotency_key: ActiveValue::Set(value.idempotency_key.clone()),
        }
    }
}

impl TryFrom<Model> for PointRedemption {
    type Error = crate::EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "redemption")?,
            user_id: parse_uuid(&model.user_id, "user")?,
            product_id: parse_uuid(&model.product_id, "product")?,
            points_used: model.points_used,
            quantity: model.quantity,
            redeemed_at: model.redeemed_at,
            status: HistoryStatus::try_from(model.status.as_str())?,
            idempotency_key: model.idempotency_key,
        })
    }
}
