use anyhow::Context;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

/// Salted Argon2 hash in PHC string form. Runs on the blocking pool.
pub async fn hash_password(plain: String) -> anyhow::Result<String> {
    tokio::task::spawn_blocking(move || hash_blocking(&plain))
        .await
        .context("password hashing task")?
}

/// `Ok(false)` on mismatch; `Err` only when `hash` is not a PHC string.
pub async fn verify_password(plain: String, hash: String) -> anyhow::Result<bool> {
    tokio::task::spawn_blocking(move || verify_blocking(&plain, &hash))
        .await
        .context("password verification task")?
}

fn hash_blocking(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

fn verify_blocking(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_and_verify() {
        let hash = hash_password("TestPassword123".into()).await.unwrap();
        assert_ne!(hash, "TestPassword123");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("TestPassword123".into(), hash).await.unwrap());
    }

    #[tokio::test]
    async fn same_password_hashes_differently() {
        let a = hash_password("longenough1".into()).await.unwrap();
        let b = hash_password("longenough1".into()).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn verify_rejects_wrong_password() {
        let hash = hash_password("correct-horse-battery-staple".into()).await.unwrap();
        assert!(!verify_password("WrongPass".into(), hash).await.unwrap());
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        assert!(verify_blocking("anything", "not-a-valid-hash").is_err());
    }
}
