use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::Rng;

use crate::error::{AppError, AppResult};

fn hashing_error(e: argon2::password_hash::Error) -> AppError {
    AppError::Internal {
        source: anyhow::anyhow!("Password hashing failed: {}", e),
    }
}

/// Hash a password using Argon2id with a random 16-byte salt
///
/// # Returns
/// * `AppResult<String>` - The PHC-formatted hash or an error
///
/// # Example
/// ```ignore
/// let hashed = hash_password("My_secure_password1")?;
/// ```
pub fn hash_password(password: &str) -> AppResult<String> {
    let mut salt_bytes = [0u8; 16];
    rand::rng().fill(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes).map_err(hashing_error)?;

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(hashing_error)?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against a hash
///
/// # Returns
/// * `AppResult<bool>` - True if password matches, false otherwise
pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(hashing_error)?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// [`hash_password`] on the blocking thread pool.
pub async fn hash_password_blocking(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

/// [`verify_password`] on the blocking thread pool.
pub async fn verify_password_blocking(password: String, password_hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &password_hash)).await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let hash = hash_password("Test_password_123").expect("Failed to hash password");

        assert!(!hash.is_empty());
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("Test_password_123").expect("Failed to hash password");

        assert!(verify_password("Test_password_123", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_different_hashes_for_same_password() {
        let hash1 = hash_password("Test_password_123").unwrap();
        let hash2 = hash_password("Test_password_123").unwrap();

        // Different salts should produce different hashes
        assert_ne!(hash1, hash2);
        assert!(verify_password("Test_password_123", &hash1).unwrap());
        assert!(verify_password("Test_password_123", &hash2).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("whatever", "not-a-phc-string").is_err());
    }

    #[tokio::test]
    async fn test_blocking_wrappers() {
        let hash = hash_password_blocking("Async_pass1".to_string()).await.unwrap();
        assert!(
            verify_password_blocking("Async_pass1".to_string(), hash)
                .await
                .unwrap()
        );
    }
}
