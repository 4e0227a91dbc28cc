//! Collaborator management endpoints
//!
//! Only the playlist owner may add or remove collaborators; collaborators
//! themselves cannot.

use axum::{extract::State, http::StatusCode, routing::post, Router};
use serde::Deserialize;
use serde_json::json;

use super::extract::{require_non_empty, CurrentUser, Payload, Validate};
use super::{created, message, ApiResult, Reply};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationPayload {
    pub playlist_id: String,
    pub user_id: String,
}

impl Validate for CollaborationPayload {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("playlistId", &self.playlist_id)?;
        require_non_empty("userId", &self.user_id)
    }
}

/// POST /collaborations
pub async fn post_collaboration(
    State(state): State<AppState>,
    CurrentUser(owner_id): CurrentUser,
    Payload(payload): Payload<CollaborationPayload>,
) -> ApiResult<Reply> {
    let services = &state.services;
    services
        .playlists
        .verify_playlist_owner(&payload.playlist_id, &owner_id)
        .await?;
    services.users.verify_user_exists(&payload.user_id).await?;

    let collaboration_id = services
        .collaborations
        .add_collaborator(&payload.playlist_id, &payload.user_id)
        .await?;

    Ok(created(
        "Collaboration added",
        json!({ "collaborationId": collaboration_id }),
    ))
}

/// DELETE /collaborations
pub async fn delete_collaboration(
    State(state): State<AppState>,
    CurrentUser(owner_id): CurrentUser,
    Payload(payload): Payload<CollaborationPayload>,
) -> ApiResult<Reply> {
    let services = &state.services;
    services
        .playlists
        .verify_playlist_owner(&payload.playlist_id, &owner_id)
        .await?;
    services
        .collaborations
        .delete_collaborator(&payload.playlist_id, &payload.user_id)
        .await?;

    Ok(message(StatusCode::OK, "Collaboration deleted"))
}

pub fn collaboration_routes() -> Router<AppState> {
    Router::new().route(
        "/collaborations",
        post(post_collaboration).delete(delete_collaboration),
    )
}
