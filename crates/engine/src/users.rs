//! The module contains the `User` struct and the `users` table.
//!
//! `point_balance` is only ever changed by the purchase and redemption
//! transactions, always together with one history row.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{ResultEngine, util::parse_uuid};

/// A loyalty program member.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub point_balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, name: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            name,
            point_balance: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub point_balance: i64,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::credit_purchases::Entity")]
    CreditPurchases,
    #[sea_orm(has_many = "super::point_redemptions::Entity")]
    PointRedemptions,
}

impl Related<super::credit_purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreditPurchases.def()
    }
}

impl Related<super::point_redemptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PointRedemptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&User> for ActiveModel {
    fn from(value: &User) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            email: ActiveValue::Set(value.email.clone()),
            name: ActiveValue::Set(value.name.clone()),
            point_balance: ActiveValue::Set(value.point_balance),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for User {
    type Error = crate::EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "user")?,
            email: model.email,
            name: model.name,
            point_balance: model.point_balance,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
