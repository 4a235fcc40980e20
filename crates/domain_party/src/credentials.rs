//! Password storage
//!
//! Stored form: `sha256$<rounds>$<salt hex>$<digest hex>`. The digest is the
//! SHA-256 of salt and password, re-hashed `rounds` times.

use std::fmt;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::PartyError;

const SCHEME: &str = "sha256";
const ROUNDS: u32 = 10_000;
const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;

/// Salted, iterated password digest
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PasswordHash(String);

/// Decoded fields of a stored hash
struct Fields {
    rounds: u32,
    salt: Vec<u8>,
    digest: Vec<u8>,
}

impl Fields {
    fn decode(stored: &str) -> Option<Self> {
        let mut parts = stored.split('$');
        if parts.next()? != SCHEME {
            return None;
        }
        let rounds = parts.next()?.parse::<u32>().ok().filter(|r| *r > 0)?;
        let salt = hex::decode(parts.next()?).ok().filter(|s| !s.is_empty())?;
        let digest = hex::decode(parts.next()?).ok().filter(|d| d.len() == DIGEST_LEN)?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { rounds, salt, digest })
    }
}

impl PasswordHash {
    /// Hashes a plain-text password with a fresh random salt
    pub fn derive(password: &str) -> Self {
        let mut salt = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt);
        let digest = stretch(&salt, password, ROUNDS);
        Self(format!(
            "{}${}${}${}",
            SCHEME,
            ROUNDS,
            hex::encode(salt),
            hex::encode(digest)
        ))
    }

    /// Wraps a previously stored hash after checking every field decodes
    pub fn parse(stored: impl Into<String>) -> Result<Self, PartyError> {
        let stored = stored.into();
        if Fields::decode(&stored).is_none() {
            return Err(PartyError::invalid("malformed password hash"));
        }
        Ok(Self(stored))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks a candidate password in constant time
    pub fn verify(&self, password: &str) -> bool {
        let Some(fields) = Fields::decode(&self.0) else {
            return false;
        };
        let actual = stretch(&fields.salt, password, fields.rounds);
        actual.as_slice().ct_eq(&fields.digest).into()
    }
}

impl TryFrom<String> for PasswordHash {
    type Error = PartyError;

    fn try_from(stored: String) -> Result<Self, Self::Error> {
        Self::parse(stored)
    }
}

impl From<PasswordHash> for String {
    fn from(hash: PasswordHash) -> Self {
        hash.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(..)")
    }
}

fn stretch(salt: &[u8], password: &str, rounds: u32) -> Vec<u8> {
    let mut digest = Sha256::new()
        .chain_update(salt)
        .chain_update(password.as_bytes())
        .finalize()
        .to_vec();
    for _ in 1..rounds {
        digest = Sha256::new()
            .chain_update(salt)
            .chain_update(&digest)
            .finalize()
            .to_vec();
    }
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_and_verify() {
        let hash = PasswordHash::derive("univida2024");
        assert!(hash.verify("univida2024"));
        assert!(!hash.verify("univida2025"));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(PasswordHash::derive("same"), PasswordHash::derive("same"));
    }

    #[test]
    fn test_parse_round_trip() {
        let hash = PasswordHash::derive("abc");
        let parsed = PasswordHash::parse(hash.as_str()).unwrap();
        assert!(parsed.verify("abc"));
        assert!(PasswordHash::parse("md5$1$00$00").is_err());
    }

    #[test]
    fn test_parse_rejects_undecodable_fields() {
        let digest = "00".repeat(DIGEST_LEN);
        assert!(PasswordHash::parse(format!("sha256$1$ab${digest}")).is_ok());
        assert!(PasswordHash::parse(format!("sha256$1$aé0${digest}")).is_err());
        assert!(PasswordHash::parse(format!("sha256$1$zz${digest}")).is_err());
        assert!(PasswordHash::parse("sha256$1$ab$00").is_err());
        assert!(PasswordHash::parse(format!("sha256$0$ab${digest}")).is_err());
        assert!(PasswordHash::parse(format!("sha256$1$ab${digest}$extra")).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let hash = PasswordHash::derive("abc");
        let json = serde_json::to_string(&hash).unwrap();
        let back: PasswordHash = serde_json::from_str(&json).unwrap();
        assert!(back.verify("abc"));
        assert!(serde_json::from_str::<PasswordHash>("\"sha256$1$aé0$00\"").is_err());
    }

    #[test]
    fn test_debug_hides_digest() {
        let hash = PasswordHash::derive("abc");
        assert_eq!(format!("{:?}", hash), "PasswordHash(..)");
    }
}
