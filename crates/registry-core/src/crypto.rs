use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use tracing::warn;
use zeroize::Zeroizing;

use crate::error::ValidationError;

pub const PBKDF2_ITERATIONS: u32 = 600_000;
pub const SALT_LEN: usize = 32;
pub const DERIVED_KEY_LEN: usize = 32;
pub const SEPARATOR: char = '$';

// Unset and corrupt credentials still run one derivation against this salt.
const DUMMY_SALT: [u8; SALT_LEN] = [0u8; SALT_LEN];

pub fn derive_key(password: &str, salt: &[u8]) -> Zeroizing<[u8; DERIVED_KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key[..]);
    key
}

pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Constant-time comparison of the derived and stored keys.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Administrator credential in its persisted `salt_hex$key_hex` form.
///
/// The empty string is the unset state. Whatever string was read from disk is
/// kept verbatim so a malformed value round-trips through `save` unchanged.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn unset() -> Self {
        Self(String::new())
    }

    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Hash `password` under a fresh random salt.
    pub fn derive(password: &str) -> Result<Self, ValidationError> {
        if password.is_empty() {
            return Err(ValidationError::EmptyPassword);
        }
        let salt = generate_salt();
        let key = derive_key(password, &salt);
        Ok(Self(format!(
            "{}{}{}",
            hex::encode(salt),
            SEPARATOR,
            hex::encode(&key[..])
        )))
    }

    pub fn is_set(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn as_encoded(&self) -> &str {
        &self.0
    }

    /// Never fails: unset, malformed and wrong all come back `false`.
    pub fn verify(&self, candidate: &str) -> bool {
        match self.decode() {
            Some((salt, stored)) => {
                let derived = derive_key(candidate, &salt);
                constant_time_eq(&derived[..], &stored)
            }
            None => {
                if self.is_set() {
                    warn!("stored administrator credential is malformed; rejecting");
                }
                let _ = std::hint::black_box(derive_key(candidate, &DUMMY_SALT));
                false
            }
        }
    }

    fn decode(&self) -> Option<(Vec<u8>, Zeroizing<Vec<u8>>)> {
        let (salt_hex, key_hex) = self.0.split_once(SEPARATOR)?;
        let salt = hex::decode(salt_hex).ok()?;
        let key = hex::decode(key_hex).ok()?;
        Some((salt, Zeroizing::new(key)))
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_set() { "set" } else { "unset" };
        f.debug_tuple("Credential").field(&state).finish()
    }
}
