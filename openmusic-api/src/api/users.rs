//! User registration endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::extract::{require_non_empty, Payload, Validate};
use super::{created, data, ApiResult, Reply};
use crate::models::NewUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UserPayload {
    pub username: String,
    pub fullname: String,
}

impl Validate for UserPayload {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("username", &self.username)?;
        require_non_empty("fullname", &self.fullname)
    }
}

/// POST /users
pub async fn post_user(
    State(state): State<AppState>,
    Payload(payload): Payload<UserPayload>,
) -> ApiResult<Reply> {
    let user_id = state
        .services
        .users
        .add_user(NewUser {
            username: payload.username,
            fullname: payload.fullname,
        })
        .await?;

    Ok(created("User added", json!({ "userId": user_id })))
}

/// GET /users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Reply> {
    let user = state.services.users.get_user(&id).await?;
    Ok(data(StatusCode::OK, json!({ "user": user })))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(post_user))
        .route("/users/:id", get(get_user))
}
