pub mod config;
pub mod dtos;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod validation;

use std::sync::Arc;

use actix_web::{error::JsonPayloadError, web};

use crate::errors::ApiError;
use crate::handlers::auth_handlers::{login, register};
use crate::handlers::post_handlers::{create_post, delete_post, get_post, list_posts};
use crate::handlers::storage_handlers::serve_thumbnail;
use crate::repositories::{PostRepository, UserRepository};
use crate::services::auth_services::AuthService;
use crate::services::post_service::PostService;
use crate::services::token_service::TokenService;
use crate::services::upload_service::UploadService;

/// Shared, read-only services handed to every worker.
#[derive(Clone)]
pub struct AppState {
    pub auth: web::Data<AuthService>,
    pub posts: web::Data<PostService>,
    pub tokens: web::Data<TokenService>,
    pub uploads: web::Data<UploadService>,
}

impl AppState {
    pub fn new(
        tokens: TokenService,
        uploads: UploadService,
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
    ) -> Self {
        Self {
            auth: web::Data::new(AuthService::new(users, tokens.clone())),
            posts: web::Data::new(PostService::new(posts, uploads.clone())),
            tokens: web::Data::new(tokens),
            uploads: web::Data::new(uploads),
        }
    }
}

fn json_error(err: JsonPayloadError) -> ApiError {
    match err {
        JsonPayloadError::Deserialize(e) if e.is_data() => {
            ApiError::Validation("\"value\" must be of type object".to_string())
        }
        other => ApiError::Validation(format!("Invalid JSON payload: {}", other)),
    }
}

/// Registers app data and every route.
pub fn configure_app(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.app_data(state.auth.clone())
        .app_data(state.posts.clone())
        .app_data(state.tokens.clone())
        .app_data(state.uploads.clone())
        .app_data(web::JsonConfig::default().error_handler(|err, req| {
            log::warn!("{} {} bad json: {}", req.method(), req.path(), err);
            json_error(err).into()
        }))
        .service(
            web::scope("/api")
                .service(register)    // POST /api/user/register
                .service(login)       // POST /api/user/login
                .service(list_posts)  // GET /api/post
                .service(create_post) // POST /api/post
                .service(get_post)    // GET /api/post/{post_id}
                .service(delete_post), // DELETE /api/post/{post_id}
        )
        .service(serve_thumbnail); // GET /storage/{filename}
}
