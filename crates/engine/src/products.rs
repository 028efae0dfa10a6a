//! Redeemable products.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use uuid::Uuid;

use crate::{ResultEngine, util::parse_uuid};

/// A product that can be bought with points.
///
/// Redeemable only when `is_active && is_in_offer_pool` and enough stock is
/// left. `stock_quantity` is decremented by redemptions, everything else is
/// admin metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category_id: Option<Uuid>,
    pub point_cost: i64,
    pub stock_quantity: i64,
    pub is_active: bool,
    pub is_in_offer_pool: bool,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            point_cost: self.point_cost,
            stock_quantity: self.stock_quantity,
            image_url: self.image_url.clone(),
        }
    }
}

/// The searchable projection of a product, the unit stored in the catalog
/// cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub point_cost: i64,
    pub stock_quantity: i64,
    pub image_url: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: String,
    pub category_id: Option<String>,
    pub point_cost: i64,
    pub stock_quantity: i64,
    pub is_active: bool,
    pub is_in_offer_pool: bool,
    pub image_url: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Categories,
    #[sea_orm(has_many = "super::point_redemptions::Entity")]
    PointRedemptions,
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::point_redemptions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PointRedemptions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Product> for ActiveModel {
    fn from(value: &Product) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            description: ActiveValue::Set(value.description.clone()),
            category_id: ActiveValue::Set(value.category_id.map(|id| id.to_string())),
            point_cost: ActiveValue::Set(value.point_cost),
            stock_quantity: ActiveValue::Set(value.stock_quantity),
            is_active: ActiveValue::Set(value.is_active),
            is_in_offer_pool: ActiveValue::Set(value.is_in_offer_pool),
            image_url: ActiveValue::Set(value.image_url.clone()),
            created_at: ActiveValue::Set(value.created_at),
            updated_at: ActiveValue::Set(value.updated_at),
        }
    }
}

impl TryFrom<Model> for Product {
    type Error = crate::EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        let category_id = match model.category_id.as_deref() {
            Some(raw) => Some(parse_uuid(raw, "category")?),
            None => None,
        };
        Ok(Self {
            id: parse_uuid(&model.id, "product")?,
            name: model.name,
            description: model.description,
            category_id,
            point_cost: model.point_cost,
            stock_quantity: model.stock_quantity,
            is_active: model.is_active,
            is_in_offer_pool: model.is_in_offer_pool,
            image_url: model.image_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
