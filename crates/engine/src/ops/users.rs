use chrono::Utc;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, User, UserRole, children, families, users,
    util::normalize_required_name,
};

use super::{AccessLevel, Engine, with_tx};

impl Engine {
    /// Creates a family and returns its id.
    pub async fn create_family(&self, name: &str) -> ResultEngine<Uuid> {
        let name = normalize_required_name(name, "family")?;
        with_tx!(self, |db_tx| {
            let id = Uuid::new_v4();
            let family = families::ActiveModel {
                id: ActiveValue::Set(id.to_string()),
                name: ActiveValue::Set(name),
                created_at: ActiveValue::Set(Utc::now()),
            };
            family.insert(&db_tx).await?;
            Ok(id)
        })
    }

    /// Creates a login. `family_id` must exist when given.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
        family_id: Option<Uuid>,
    ) -> ResultEngine<User> {
        let username = normalize_required_name(username, "user")?;
        if password.is_empty() {
            return Err(EngineError::InvalidState(
                "password must not be empty".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.clone())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(username));
            }
            if let Some(family_id) = family_id
                && families::Entity::find_by_id(family_id.to_string())
                    .one(&db_tx)
                    .await?
                    .is_none()
            {
                return Err(EngineError::NotFound(format!("family {family_id}")));
            }

            let user = users::ActiveModel {
                username: ActiveValue::Set(username.clone()),
                password: ActiveValue::Set(password.to_string()),
                role: ActiveValue::Set(role.as_str().to_string()),
                family_id: ActiveValue::Set(family_id.map(|id| id.to_string())),
            };
            user.insert(&db_tx).await?;
            Ok(User {
                username,
                role,
                family_id,
            })
        })
    }

    /// Returns the user when the credentials match.
    pub async fn authenticate(&self, username: &str, password: &str) -> ResultEngine<Option<User>> {
        if username.is_empty() || password.is_empty() {
            return Ok(None);
        }
        let model = users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?;
        match model {
            Some(model) if model.password == password => Ok(Some(User::try_from(model)?)),
            _ => Ok(None),
        }
    }

    /// Links a child login to a child record of the parent's family.
    pub async fn link_child_user(
        &self,
        child_id: Uuid,
        child_username: &str,
        user_id: &str,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let (child, _) = self
                .require_child(&db_tx, child_id, user_id, AccessLevel::Manage)
                .await?;
            let login = self.require_user(&db_tx, child_username).await?;
            if login.role != UserRole::Child || login.family_id != Some(child.family_id) {
                return Err(EngineError::Forbidden(format!(
                    "{child_username} is not a child login of this family"
                )));
            }

            let active = children::ActiveModel {
                id: ActiveValue::Set(child.id.to_string()),
                user_id: ActiveValue::Set(Some(login.username)),
                ..Default::default()
            };
            active.update(&db_tx).await?;
            Ok(())
        })
    }
}
