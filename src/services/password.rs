//! Salted bcrypt hashing. Both calls run on the blocking pool.
use crate::errors::{ApiError, ApiResult};

/// Work factor for new hashes.
pub const HASH_COST: u32 = 10;

pub async fn hash_password(plaintext: String) -> ApiResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, HASH_COST))
        .await
        .map_err(|e| ApiError::Internal(format!("hashing task failed: {}", e)))?
        .map_err(|e| ApiError::Internal(format!("failed to hash password: {}", e)))
}

/// `false` for a wrong password and for a hash that cannot be parsed.
pub async fn verify_password(plaintext: String, hash: String) -> ApiResult<bool> {
    let outcome = tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &hash))
        .await
        .map_err(|e| ApiError::Internal(format!("verify task failed: {}", e)))?;

    match outcome {
        Ok(valid) => Ok(valid),
        Err(e) => {
            log::warn!("stored password hash rejected by bcrypt: {}", e);
            Ok(false)
        }
    }
}
