//! Album endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::extract::{require_non_empty, require_year, Payload, Validate};
use super::{created, data, message, ApiResult, Reply};
use crate::models::{AlbumUpdate, NewAlbum};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AlbumPayload {
    pub name: String,
    pub year: i32,
}

impl Validate for AlbumPayload {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("name", &self.name)?;
        require_year(self.year)
    }
}

/// Body of PUT /albums/:id; absent fields keep their stored value
#[derive(Debug, Default, Deserialize)]
pub struct AlbumEditPayload {
    pub name: Option<String>,
    pub year: Option<i32>,
}

impl Validate for AlbumEditPayload {
    fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name {
            require_non_empty("name", name)?;
        }
        if let Some(year) = self.year {
            require_year(year)?;
        }
        Ok(())
    }
}

impl From<AlbumEditPayload> for AlbumUpdate {
    fn from(payload: AlbumEditPayload) -> Self {
        AlbumUpdate {
            name: payload.name,
            year: payload.year,
        }
    }
}

/// POST /albums
pub async fn post_album(
    State(state): State<AppState>,
    Payload(payload): Payload<AlbumPayload>,
) -> ApiResult<Reply> {
    let album_id = state
        .services
        .albums
        .add_album(NewAlbum {
            name: payload.name,
            year: payload.year,
        })
        .await?;

    Ok(created("Album added", json!({ "albumId": album_id })))
}

/// GET /albums/:id
pub async fn get_album(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Reply> {
    let album = state.services.albums.get_album_by_id(&id).await?;
    Ok(data(StatusCode::OK, json!({ "album": album })))
}

/// PUT /albums/:id
pub async fn put_album(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(payload): Payload<AlbumEditPayload>,
) -> ApiResult<Reply> {
    state.services.albums.edit_album(&id, payload.into()).await?;
    Ok(message(StatusCode::OK, "Album updated"))
}

/// DELETE /albums/:id
pub async fn delete_album(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Reply> {
    state.services.albums.delete_album(&id).await?;
    Ok(message(StatusCode::OK, "Album deleted"))
}

pub fn album_routes() -> Router<AppState> {
    Router::new()
        .route("/albums", post(post_album))
        .route(
            "/albums/:id",
            get(get_album).put(put_album).delete(delete_album),
        )
}
