// src/services/auth_services.rs - register and login flows
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::errors::{ApiError, ApiResult};
use crate::models::user::{NewUser, User};
use crate::repositories::UserRepository;
use crate::services::password::{hash_password, verify_password};
use crate::services::token_service::TokenService;
use crate::validation::{Credentials, Registration};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    /// Validate → check email is free → hash → insert. The hash is computed before anything
    /// is written, so a failure never leaves a partial user behind.
    pub async fn register(&self, payload: &Map<String, Value>) -> ApiResult<User> {
        let registration = Registration::from_payload(payload)?;

        if self.users.find_by_email(&registration.email).await?.is_some() {
            log::warn!("registration refused, email already in use");
            return Err(ApiError::Conflict("Email already exists".to_string()));
        }

        let password_hash = hash_password(registration.password).await?;

        // The unique index still catches a concurrent registration that passed the check above.
        let user = self
            .users
            .create(NewUser {
                name: registration.name,
                email: registration.email,
                password_hash,
            })
            .await?;

        log::info!("user {} registered", user.id);
        Ok(user)
    }

    /// Unknown email and wrong password fail the same way.
    pub async fn login(&self, payload: &Map<String, Value>) -> ApiResult<String> {
        let credentials = Credentials::from_payload(payload)?;

        let Some(user) = self.users.find_by_email(&credentials.email).await? else {
            log::warn!("login failed: unknown email");
            return Err(ApiError::InvalidCredentials);
        };

        if !verify_password(credentials.password, user.password.clone()).await? {
            log::warn!("login failed: wrong password for user {}", user.id);
            return Err(ApiError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id)?;
        log::info!("user {} logged in", user.id);
        Ok(token)
    }
}
