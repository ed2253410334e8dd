use rand::distr::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

const SALT_BYTES: usize = 16;
const TOKEN_LENGTH: usize = 48;

/// Hashes a password with a fresh random salt
///
/// ### Returns
///
/// A string of the form `<salt hex>$<sha256 hex>`
pub fn hash_password(password: &str) -> String {
    let salt: [u8; SALT_BYTES] = rand::rng().random();
    let salt = hex::encode(salt);
    let digest = digest(&salt, password);
    format!("{salt}${digest}")
}

/// Checks a password against a value produced by [`hash_password`]
///
/// The digests are compared in constant time. Malformed stored values never
/// verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, expected)) = stored.split_once('$') else {
        return false;
    };
    let Ok(expected) = hex::decode(expected) else {
        return false;
    };
    digest_bytes(salt, password).ct_eq(&expected).into()
}

/// Generates a random session token
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

fn digest_bytes(salt: &str, password: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize().to_vec()
}

fn digest(salt: &str, password: &str) -> String {
    hex::encode(digest_bytes(salt, password))
}
