//! Client identity extraction.
//!
//! TLS termination and certificate verification live in front of the
//! relay; the verified certificate common name arrives in a trusted
//! header. A request without one never reaches ingestion.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use scap_relay_core::AppError;

use crate::error::HttpAppError;

/// Header carrying the verified client certificate common name.
pub const CLIENT_CN_HEADER: &str = "x-ssl-client-cn";

/// Verified client identity for the current request.
#[derive(Debug, Clone)]
pub struct ClientIdentity(pub String);

impl<S> FromRequestParts<S> for ClientIdentity
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let common_name = parts
            .headers
            .get(CLIENT_CN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match common_name {
            Some(cn) => Ok(ClientIdentity(cn.to_string())),
            None => Err(HttpAppError(AppError::Authentication(
                "could not establish client identity from the request".to_string(),
            ))),
        }
    }
}
