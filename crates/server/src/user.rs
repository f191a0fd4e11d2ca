//! Current user endpoint.

use api_types::user::{UserRole as ApiRole, UserView};
use axum::{Extension, Json};
use engine::{User, UserRole};

pub async fn me(Extension(user): Extension<User>) -> Json<UserView> {
    Json(UserView {
        username: user.username,
        role: match user.role {
            UserRole::Parent => ApiRole::Parent,
            UserRole::Child => ApiRole::Child,
        },
        family_id: user.family_id,
    })
}
