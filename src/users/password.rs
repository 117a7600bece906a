use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

// The process secret is mixed in as an argon2 pepper.
fn hasher(secret: &str) -> anyhow::Result<Argon2<'_>> {
    Argon2::new_with_secret(
        secret.as_bytes(),
        Algorithm::default(),
        Version::default(),
        Params::default(),
    )
    .map_err(|e| {
        error!(error = %e, "argon2 init error");
        anyhow::anyhow!(e.to_string())
    })
}

pub fn hash_password(plain: &str, secret: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher(secret)?
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

pub fn verify_password(plain: &str, hash: &str, secret: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(hasher(secret)?
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
