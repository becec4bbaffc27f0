//! License key derivation and comparison.
//!
//! Derivation pipeline: SHA-256 over `"<identity>:<product>"`, base64 the
//! digest, uppercase, strip everything outside `[A-Z0-9]`, cycle the
//! remainder up to 16 characters and group them `XXXX-XXXX-XXXX-XXXX`.

use crate::error::{LicenseError, LicenseResult};
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of alphanumeric characters in a key.
pub const KEY_CHARS: usize = 16;

/// Characters per hyphen-separated group.
pub const GROUP_LEN: usize = 4;

/// Separator between identity and product name in the hash input.
const INPUT_SEPARATOR: char = ':';

/// A formatted license key: four groups of four characters from `[A-Z0-9]`,
/// separated by hyphens (19 characters total).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LicenseKey(String);

impl LicenseKey {
    /// Derives the license key for an identity/product pair.
    ///
    /// Pure and deterministic: no randomness, no external state. Empty
    /// inputs are hashed like any other string and still yield a
    /// well-formed key.
    #[must_use]
    pub fn derive(identity: &str, product_name: &str) -> Self {
        let combined = format!("{identity}{INPUT_SEPARATOR}{product_name}");
        let digest = Sha256::digest(combined.as_bytes());
        let encoded = BASE64.encode(digest);

        let stripped: String = encoded
            .to_ascii_uppercase()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();

        // Cycling covers the (theoretical) case of fewer than 16 usable
        // characters surviving the strip.
        let mut formatted = String::with_capacity(KEY_CHARS + KEY_CHARS / GROUP_LEN - 1);
        for (i, c) in stripped.chars().cycle().take(KEY_CHARS).enumerate() {
            if i > 0 && i % GROUP_LEN == 0 {
                formatted.push('-');
            }
            formatted.push(c);
        }
        Self(formatted)
    }

    /// Checks a candidate key against the derivation for the given pair.
    ///
    /// Comparison is case-insensitive and exact: no partial or fuzzy
    /// matches.
    #[must_use]
    pub fn verify(candidate: &str, identity: &str, product_name: &str) -> bool {
        Self::derive(identity, product_name).matches(candidate)
    }

    /// Case-insensitive comparison of this key against a candidate string.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.0.eq_ignore_ascii_case(candidate)
    }

    /// Validates an externally supplied key string (admin imports).
    ///
    /// Normalizes to uppercase; surrounding whitespace is tolerated.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::InvalidKeyFormat`] unless the input has the
    /// `XXXX-XXXX-XXXX-XXXX` shape.
    pub fn parse(raw: &str) -> LicenseResult<Self> {
        let normalized = raw.trim().to_ascii_uppercase();
        let groups: Vec<&str> = normalized.split('-').collect();
        let well_formed = groups.len() == KEY_CHARS / GROUP_LEN
            && groups
                .iter()
                .all(|g| g.len() == GROUP_LEN && g.bytes().all(|b| b.is_ascii_alphanumeric()));
        if !well_formed {
            return Err(LicenseError::InvalidKeyFormat(raw.to_string()));
        }
        Ok(Self(normalized))
    }

    /// Returns the formatted key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LicenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LicenseKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
