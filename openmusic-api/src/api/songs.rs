//! Song endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::extract::{
    nullable, require_non_empty, require_non_negative, require_year, Payload, Validate,
};
use super::{created, data, message, ApiResult, Reply};
use crate::models::{NewSong, SongFilter, SongUpdate};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongPayload {
    pub title: String,
    pub year: i32,
    pub genre: String,
    pub performer: String,
    pub duration: Option<i32>,
    pub album_id: Option<String>,
}

impl Validate for SongPayload {
    fn validate(&self) -> Result<(), String> {
        require_non_empty("title", &self.title)?;
        require_year(self.year)?;
        require_non_empty("genre", &self.genre)?;
        require_non_empty("performer", &self.performer)?;
        if let Some(duration) = self.duration {
            require_non_negative("duration", duration)?;
        }
        Ok(())
    }
}

impl From<SongPayload> for NewSong {
    fn from(payload: SongPayload) -> Self {
        NewSong {
            title: payload.title,
            year: payload.year,
            genre: payload.genre,
            performer: payload.performer,
            duration: payload.duration,
            album_id: payload.album_id,
        }
    }
}

/// Body of PUT /songs/:id
///
/// Absent fields keep their stored value; `duration` and `albumId` may be
/// set to `null` to clear them.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongEditPayload {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub performer: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub duration: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub album_id: Option<Option<String>>,
}

impl Validate for SongEditPayload {
    fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            require_non_empty("title", title)?;
        }
        if let Some(year) = self.year {
            require_year(year)?;
        }
        if let Some(genre) = &self.genre {
            require_non_empty("genre", genre)?;
        }
        if let Some(performer) = &self.performer {
            require_non_empty("performer", performer)?;
        }
        if let Some(Some(duration)) = self.duration {
            require_non_negative("duration", duration)?;
        }
        Ok(())
    }
}

impl From<SongEditPayload> for SongUpdate {
    fn from(payload: SongEditPayload) -> Self {
        SongUpdate {
            title: payload.title,
            year: payload.year,
            genre: payload.genre,
            performer: payload.performer,
            duration: payload.duration,
            album_id: payload.album_id,
        }
    }
}

/// POST /songs
pub async fn post_song(
    State(state): State<AppState>,
    Payload(payload): Payload<SongPayload>,
) -> ApiResult<Reply> {
    let song_id = state.services.songs.add_song(payload.into()).await?;
    Ok(created("Song added", json!({ "songId": song_id })))
}

/// GET /songs?title=&performer=
pub async fn get_songs(
    State(state): State<AppState>,
    Query(filter): Query<SongFilter>,
) -> ApiResult<Reply> {
    let songs = state.services.songs.get_songs(&filter).await?;
    Ok(data(StatusCode::OK, json!({ "songs": songs })))
}

/// GET /songs/:id
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Reply> {
    let song = state.services.songs.get_song(&id).await?;
    Ok(data(StatusCode::OK, json!({ "song": song })))
}

/// PUT /songs/:id
pub async fn put_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Payload(payload): Payload<SongEditPayload>,
) -> ApiResult<Reply> {
    state.services.songs.edit_song(&id, payload.into()).await?;
    Ok(message(StatusCode::OK, "Song updated"))
}

/// DELETE /songs/:id
pub async fn delete_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Reply> {
    state.services.songs.delete_song(&id).await?;
    Ok(message(StatusCode::OK, "Song deleted"))
}

pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/songs", get(get_songs).post(post_song))
        .route("/songs/:id", get(get_song).put(put_song).delete(delete_song))
}
