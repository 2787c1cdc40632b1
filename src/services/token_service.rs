// src/services/token_service.rs
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::errors::{ApiError, ApiResult};
use crate::models::user::JwtClaims;

/// Issues and checks HS256 bearer tokens. The secret is fixed for the life of the process.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, subject: Uuid) -> ApiResult<String> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| ApiError::Internal("token lifetime out of range".to_string()))?;
        let claims = JwtClaims {
            sub: subject.to_string(),
            iat: now.timestamp() as usize,
            exp: expires.timestamp() as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("failed to sign token: {}", e)))
    }

    /// Returns the subject of a well-signed, unexpired token.
    pub fn verify(&self, token: &str) -> ApiResult<Uuid> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<JwtClaims>(token, &self.decoding, &validation).map_err(|e| {
            log::debug!("token rejected: {}", e);
            ApiError::Unauthorized("Invalid token".to_string())
        })?;

        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret-with-enough-bytes-0001", Duration::hours(1))
    }

    #[test]
    fn issued_token_verifies_to_subject() {
        let svc = service();
        let id = Uuid::new_v4();
        let token = svc.issue(id).unwrap();
        assert_eq!(svc.verify(&token).unwrap(), id);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let other = TokenService::new("another-secret-entirely-different", Duration::hours(1));
        let token = other.issue(Uuid::new_v4()).unwrap();
        assert!(matches!(service().verify(&token), Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn rejects_malformed_token() {
        assert!(service().verify("not.a.jwt").is_err());
        assert!(service().verify("").is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let expired = TokenService::new("test-secret-with-enough-bytes-0001", Duration::hours(-2));
        let token = expired.issue(Uuid::new_v4()).unwrap();
        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let svc = TokenService::new("test-secret-with-enough-bytes-0001", Duration::days(100_000_000));
        assert!(matches!(svc.issue(Uuid::new_v4()), Err(ApiError::Internal(_))));
    }

    #[test]
    fn rejects_non_uuid_subject() {
        let claims = JwtClaims {
            sub: "not-a-uuid".to_string(),
            iat: Utc::now().timestamp() as usize,
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret-with-enough-bytes-0001"),
        )
        .unwrap();
        assert!(service().verify(&token).is_err());
    }
}
