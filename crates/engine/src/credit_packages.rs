//! Credit packages: cash price → reward points.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{Money, ResultEngine, util::parse_uuid};

/// A purchasable bundle of points.
///
/// A package is only sold while `is_active` and only for exactly `price`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreditPackage {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub reward_points: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "credit_packages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: String,
    pub price_minor: i64,
    pub reward_points: i64,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::credit_purchases::Entity")]
    CreditPurchases,
}

impl Related<super::credit_purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditPurchases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&CreditPackage> for ActiveModel {
    fn from(value: &CreditPackage) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            description: ActiveValue::Set(value.description.clone()),
            price_minor: ActiveValue::Set(value.price.minor()),
            reward_points: ActiveValue::Set(value.reward_points),
            is_active: ActiveValue::Set(value.is_active),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for CreditPackage {
    type Error = crate::EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "package")?,
            name: model.name,
            description: model.description,
            price: Money::from_minor(model.price_minor),
            reward_points: model.reward_points,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
