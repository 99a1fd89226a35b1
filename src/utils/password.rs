use crate::error::{AppError, AppResult};
use bcrypt::{hash, verify};

const SALT_ROUNDS: u32 = 12;

pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, SALT_ROUNDS)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    verify(password, hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {}", e)))
}
