//! Users table.
//!
//! The engine identifies users by `username`. A user belongs to at most one
//! family and is either a parent or a child.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError,
    util::{impl_str_enum, parse_optional_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Parent,
    Child,
}

impl_str_enum!(UserRole, "user role", {
    Parent => "parent",
    Child => "child",
});

/// An authenticated user, without credentials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub role: UserRole,
    pub family_id: Option<Uuid>,
}

impl User {
    pub fn is_parent(&self) -> bool {
        self.role == UserRole::Parent
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
    pub role: String,
    pub family_id: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::families::Entity",
        from = "Column::FamilyId",
        to = "super::families::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Family,
}

impl Related<super::families::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Family.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            role: UserRole::try_from(model.role.as_str())?,
            family_id: parse_optional_uuid(model.family_id.as_deref(), "family")?,
            username: model.username,
        })
    }
}
