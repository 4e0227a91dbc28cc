//! Request extractors: caller identity and validated JSON payloads

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use openmusic_common::{auth, Error};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use tracing::debug;

use super::ApiError;
use crate::AppState;

/// Header carrying the caller's user id, set by the gateway
pub const USER_ID_HEADER: &str = "x-user-id";

/// Unix epoch milliseconds at which the gateway signed the identity
pub const AUTH_TIMESTAMP_HEADER: &str = "x-auth-timestamp";

/// Gateway signature over the user id and timestamp
pub const AUTH_SIGNATURE_HEADER: &str = "x-auth-signature";

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Id of a registered user making the request
///
/// Rejects with 401 when any identity header is missing, when the signature
/// does not verify against the shared secret, or when the id names no user.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = header(parts, USER_ID_HEADER).ok_or(ApiError::Unauthenticated)?;
        let timestamp = header(parts, AUTH_TIMESTAMP_HEADER)
            .and_then(|value| value.parse::<i64>().ok())
            .ok_or(ApiError::Unauthenticated)?;
        let signature = header(parts, AUTH_SIGNATURE_HEADER).ok_or(ApiError::Unauthenticated)?;

        if let Err(e) = auth::verify_identity(
            user_id,
            timestamp,
            signature,
            &state.auth_secret,
            auth::now_millis(),
        ) {
            debug!(user_id, error = %e, "Rejected caller identity");
            return Err(ApiError::Unauthenticated);
        }

        match state.services.users.verify_user_exists(user_id).await {
            Ok(()) => Ok(CurrentUser(user_id.to_string())),
            Err(Error::NotFound(_)) => Err(ApiError::Unauthenticated),
            Err(e) => Err(e.into()),
        }
    }
}

/// Field constraints checked after deserialization
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// JSON body that deserialized and passed [`Validate`]
///
/// Both failure kinds reject with 400.
#[derive(Debug)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::InvalidPayload(rejection.body_text()))?;

        value.validate().map_err(ApiError::InvalidPayload)?;
        Ok(Payload(value))
    }
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("\"{}\" is not allowed to be empty", field));
    }
    Ok(())
}

pub(crate) fn require_year(value: i32) -> Result<(), String> {
    if !(1000..=9999).contains(&value) {
        return Err("\"year\" must be between 1000 and 9999".to_string());
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &str, value: i32) -> Result<(), String> {
    if value < 0 {
        return Err(format!("\"{}\" must be greater than or equal to 0", field));
    }
    Ok(())
}

/// Distinguishes an absent field (`None`) from an explicit `null`
/// (`Some(None)`); pair with `#[serde(default)]`
pub(crate) fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "nullable")]
        duration: Option<Option<i32>>,
    }

    #[test]
    fn test_nullable_distinguishes_absent_from_null() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"duration":null}"#).unwrap();
        let value: Patch = serde_json::from_str(r#"{"duration":240}"#).unwrap();

        assert_eq!(absent.duration, None);
        assert_eq!(null.duration, Some(None));
        assert_eq!(value.duration, Some(Some(240)));
    }

    #[test]
    fn test_field_rules() {
        assert!(require_non_empty("name", "Fearless").is_ok());
        assert_eq!(
            require_non_empty("name", "  ").unwrap_err(),
            "\"name\" is not allowed to be empty"
        );
        assert!(require_year(2008).is_ok());
        assert!(require_year(999).is_err());
        assert!(require_non_negative("duration", 0).is_ok());
        assert!(require_non_negative("duration", -1).is_err());
    }
}
