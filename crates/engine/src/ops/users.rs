use chrono::Utc;
use sea_orm::{SqlErr, prelude::*};
use uuid::Uuid;

use crate::{
    Conflict, EngineError, Resource, ResultEngine, User, users,
    util::{normalize_email, normalize_required_name},
};

use super::Engine;

impl Engine {
    /// Register a member with an empty balance.
    ///
    /// The unique index on `email` decides between concurrent registrations;
    /// the loser gets `Conflict::DuplicateEmail`.
    pub async fn new_user(&self, email: &str, name: &str) -> ResultEngine<Uuid> {
        let email = normalize_email(email)?;
        let name = normalize_required_name(name, "user")?;
        self.with_tx(None, |_engine, db_tx| {
            Box::pin(async move {
                let user = User::new(email, name, Utc::now());
                users::ActiveModel::from(&user)
                    .insert(db_tx)
                    .await
                    .map_err(|err| match err.sql_err() {
                        Some(SqlErr::UniqueConstraintViolation(_)) => {
                            EngineError::Conflict(Conflict::DuplicateEmail)
                        }
                        _ => err.into(),
                    })?;
                tracing::info!(user_id = %user.id, "user created");
                Ok(user.id)
            })
        })
        .await
    }

    pub async fn user(&self, user_id: Uuid) -> ResultEngine<User> {
        let model = users::Entity::find_by_id(user_id.to_string())
            .one(&self.database)
            .await?
            .ok_or(EngineError::NotFound(Resource::User))?;
        User::try_from(model)
    }
}
