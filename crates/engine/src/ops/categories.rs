use chrono::Utc;
use sea_orm::{QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    Category, EngineError, Resource, ResultEngine, categories,
    util::{normalize_required_name, normalize_text},
};

use super::Engine;

impl Engine {
    pub async fn new_category(&self, name: &str, description: &str) -> ResultEngine<Uuid> {
        let category = Category {
            id: Uuid::new_v4(),
            name: normalize_required_name(name, "category")?,
            description: normalize_text(description),
            created_at: Utc::now(),
        };
        categories::ActiveModel::from(&category)
            .insert(&self.database)
            .await?;
        Ok(category.id)
    }

    /// All categories, ordered by name.
    pub async fn categories(&self) -> ResultEngine<Vec<Category>> {
        categories::Entity::find()
            .order_by_asc(categories::Column::Name)
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }

    pub async fn category(&self, category_id: Uuid) -> ResultEngine<Category> {
        let model = categories::Entity::find_by_id(category_id.to_string())
            .one(&self.database)
            .await?
            .ok_or(EngineError::NotFound(Resource::Category))?;
        Category::try_from(model)
    }

    pub(super) async fn require_category<C: ConnectionTrait>(
        &self,
        db: &C,
        category_id: Uuid,
    ) -> ResultEngine<()> {
        let exists = categories::Entity::find_by_id(category_id.to_string())
            .one(db)
            .await?
            .is_some();
        if !exists {
            return Err(EngineError::NotFound(Resource::Category));
        }
        Ok(())
    }
}
