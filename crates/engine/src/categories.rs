//! Product categories.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::products::Entity")]
    Products,
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Category> for ActiveModel {
    fn from(value: &Category) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            description: ActiveValue::Set(value.description.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Category {
    type Error = crate::EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "category")?,
            name: model.name,
            description: model.description,
            created_at: model.created_at,
        })
    }
}
