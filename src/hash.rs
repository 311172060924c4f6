// Copyright (c) 2025 Chetan Conikee <conikee@gmail.com>
// Licensed under the MIT License

//! Blake3 cache keys for analysis results.
//!
//! A key covers the analyzed text and the serialized analysis options, with a
//! length prefix on the text so the two parts cannot run into each other.

use crate::error::{LintError, Result};
use serde::Serialize;
use std::fmt;

/// A Blake3 digest identifying one (text, options) analysis request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey([u8; 32]);

impl CacheKey {
    /// Computes the key for `text` analyzed with `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be serialized.
    pub fn compute<T: Serialize>(text: &str, options: &T) -> Result<Self> {
        let options_json = serde_json::to_vec(options).map_err(|e| {
            LintError::invalid_format("cache key", format!("Failed to serialize options: {e}"))
        })?;

        let mut hasher = blake3::Hasher::new();
        hasher.update(b"ANALYZE:");
        hasher.update(&(text.len() as u64).to_le_bytes());
        hasher.update(text.as_bytes());
        hasher.update(&options_json);
        Ok(Self(*hasher.finalize().as_bytes()))
    }

    /// Returns the key as a hexadecimal string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Shortened hex form for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..6])
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_is_deterministic() {
        let options = json!({ "minSeverity": "warning" });
        let a = CacheKey::compute("WIP: draft", &options).unwrap();
        let b = CacheKey::compute("WIP: draft", &options).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_hex().len(), 64);
        assert_eq!(a.short().len(), 12);
    }

    #[test]
    fn test_key_depends_on_text_and_options() {
        let options = json!({ "minSeverity": "warning" });
        let base = CacheKey::compute("WIP: draft", &options).unwrap();
        assert_ne!(base, CacheKey::compute("WIP: drafts", &options).unwrap());
        assert_ne!(base, CacheKey::compute("WIP: draft", &json!({})).unwrap());
    }

    #[test]
    fn test_display_format() {
        let key = CacheKey::compute("", &json!(null)).unwrap();
        assert_eq!(format!("{key}"), key.to_hex());
    }
}
