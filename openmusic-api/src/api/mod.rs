//! HTTP API handlers
//!
//! Successful responses use the envelope
//! `{"status":"success","message":...,"data":{...}}` where either `message`
//! or `data` may be absent.

pub mod albums;
pub mod collaborations;
pub mod error;
pub mod extract;
pub mod health;
pub mod playlists;
pub mod songs;
pub mod users;

pub use albums::album_routes;
pub use collaborations::collaboration_routes;
pub use error::{ApiError, ApiResult};
pub use extract::{
    CurrentUser, Payload, Validate, AUTH_SIGNATURE_HEADER, AUTH_TIMESTAMP_HEADER, USER_ID_HEADER,
};
pub use health::health_routes;
pub use playlists::playlist_routes;
pub use songs::song_routes;
pub use users::user_routes;

use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

/// Handler response: status code plus JSON envelope
pub type Reply = (StatusCode, Json<Value>);

pub(crate) fn data(status: StatusCode, data: Value) -> Reply {
    (status, Json(json!({ "status": "success", "data": data })))
}

pub(crate) fn message(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "status": "success", "message": message })))
}

pub(crate) fn created(message: &str, data: Value) -> Reply {
    (
        StatusCode::CREATED,
        Json(json!({ "status": "success", "message": message, "data": data })),
    )
}
