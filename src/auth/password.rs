use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn hash_password(plain: &str) -> anyhow::Result<String> {
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

pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Counts characters, not bytes.
pub fn is_long_enough(plain: &str) -> bool {
    plain.chars().count() >= MIN_PASSWORD_LEN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortest_accepted_password_verifies() {
        let password = "x".repeat(MIN_PASSWORD_LEN);
        assert!(is_long_enough(&password));
        let hash = hash_password(&password).expect("hash");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password(&password, &hash).expect("verify"));
    }

    #[test]
    fn login_passwords_are_not_trimmed() {
        let hash = hash_password("secret1").expect("hash");
        assert!(!verify_password(" secret1 ", &hash).unwrap());
        assert!(!verify_password("SECRET1", &hash).unwrap());
    }

    #[test]
    fn two_users_with_one_password_get_distinct_hashes() {
        let alice = hash_password("secret1").unwrap();
        let bob = hash_password("secret1").unwrap();
        assert_ne!(alice, bob);
        assert!(!alice.contains("secret1"));
    }

    #[test]
    fn unreadable_stored_hash_is_an_error() {
        assert!(verify_password("secret1", "").is_err());
        assert!(verify_password("secret1", "secret1").is_err());
    }

    #[test]
    fn length_gate() {
        for len in 0..MIN_PASSWORD_LEN {
            assert!(!is_long_enough(&"x".repeat(len)), "length {} should fail", len);
        }
        assert!(is_long_enough("secret"));
        assert!(is_long_enough("ääääää"));
        assert!(!is_long_enough("äääää"));
    }
}
