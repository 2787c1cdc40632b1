// src/middleware/auth_extractor.rs
use actix_web::{dev::Payload, http::header, web, Error, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use uuid::Uuid;

use crate::errors::ApiError;
use crate::services::token_service::TokenService;

/// Header set on the login response and accepted back as an alternative to `Authorization`.
pub const AUTH_TOKEN_HEADER: &str = "auth-token";

/// Caller whose bearer token verified against the process secret.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

fn bearer_token(req: &HttpRequest) -> Result<&str, ApiError> {
    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| ApiError::Unauthorized("Invalid header format".to_string()))?;
        return value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Invalid auth header format".to_string()));
    }

    match req.headers().get(AUTH_TOKEN_HEADER) {
        Some(value) => value
            .to_str()
            .map(str::trim)
            .map_err(|_| ApiError::Unauthorized("Invalid header format".to_string())),
        None => Err(ApiError::Unauthorized("Access denied".to_string())),
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .ok_or_else(|| ApiError::Internal("token service not configured".to_string()))?;

    let token = bearer_token(req)?;
    let user_id = tokens.verify(token)?;
    Ok(AuthenticatedUser { user_id })
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<AuthenticatedUser, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = authenticate(req).map_err(|e| {
            log::warn!("{} {} rejected: {}", req.method(), req.path(), e);
            Error::from(e)
        });
        ready(result)
    }
}
