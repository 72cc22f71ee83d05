use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::CryptoError;

#[cfg(not(test))]
pub const PBKDF2_ITERATIONS: u32 = 600_000;
// Unit tests hash many passwords in debug builds.
#[cfg(test)]
pub const PBKDF2_ITERATIONS: u32 = 1_000;

pub const HASH_LENGTH: usize = 32;
pub const SALT_LENGTH: usize = 16;

/// A password hash and the salt it was derived with, both base64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub hash: String,
    pub salt: String,
}

/// Hash a password with a fresh random salt using PBKDF2-SHA256
pub fn hash_password(password: &str) -> PasswordHash {
    let salt = generate_salt();
    let hash = derive(password, &salt);
    PasswordHash {
        hash: STANDARD.encode(hash),
        salt: STANDARD.encode(salt),
    }
}

/// Check a password against a stored hash and salt in constant time.
pub fn verify_password(password: &str, stored: &PasswordHash) -> Result<bool, CryptoError> {
    let salt = STANDARD
        .decode(&stored.salt)
        .map_err(|_| CryptoError::CorruptedCredential)?;
    let expected = STANDARD
        .decode(&stored.hash)
        .map_err(|_| CryptoError::CorruptedCredential)?;

    let actual = derive(password, &salt);
    Ok(actual[..].ct_eq(&expected[..]).into())
}

fn derive(password: &str, salt: &[u8]) -> [u8; HASH_LENGTH] {
    let mut out = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut out);
    out
}

/// Generate a cryptographically random salt
pub fn generate_salt() -> [u8; SALT_LENGTH] {
    use rand::RngCore;
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_verifies() {
        let stored = hash_password("doctor123");
        assert!(verify_password("doctor123", &stored).unwrap());
    }

    #[test]
    fn wrong_password_rejected() {
        let stored = hash_password("doctor123");
        assert!(!verify_password("doctor124", &stored).unwrap());
        assert!(!verify_password("", &stored).unwrap());
    }

    #[test]
    fn same_password_gets_different_salts() {
        let a = hash_password("same");
        let b = hash_password("same");
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn corrupted_salt_is_an_error() {
        let mut stored = hash_password("pw");
        stored.salt = "***not base64***".into();
        assert!(verify_password("pw", &stored).is_err());
    }

    #[test]
    fn generate_salt_is_random() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
