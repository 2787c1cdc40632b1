use actix_web::{post, web, HttpResponse};
use serde_json::{Map, Value};

use crate::dtos::auth_dtos::{RegisterOut, TokenOut};
use crate::errors::ApiResult;
use crate::middleware::auth_extractor::AUTH_TOKEN_HEADER;
use crate::services::auth_services::AuthService;

/// POST /api/user/register
#[post("/user/register")]
pub async fn register(
    svc: web::Data<AuthService>,
    body: web::Json<Map<String, Value>>,
) -> ApiResult<HttpResponse> {
    let user = svc.register(&body).await?;
    Ok(HttpResponse::Ok().json(RegisterOut { user: user.into() }))
}

/// POST /api/user/login
/// The token is returned in the body and in the `auth-token` header.
#[post("/user/login")]
pub async fn login(
    svc: web::Data<AuthService>,
    body: web::Json<Map<String, Value>>,
) -> ApiResult<HttpResponse> {
    let token = svc.login(&body).await?;
    Ok(HttpResponse::Ok()
        .insert_header((AUTH_TOKEN_HEADER, token.clone()))
        .json(TokenOut { token }))
}
