//! API key wrapper that stays out of logs and error text.

use std::fmt;
use zeroize::Zeroize;

pub const MIN_BARE_REDACT_LEN: usize = 8;

/// API key for the vision provider.
///
/// There is deliberately no `Display`; use [`Credential::expose`] at the
/// single place the key is put on the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Returns `None` for empty or whitespace-only keys
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let mut key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            key.zeroize();
            return None;
        }
        if trimmed.len() != key.len() {
            let owned = trimmed.to_string();
            key.zeroize();
            return Some(Self(owned));
        }
        Some(Self(key))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Mask the key in `text`.
    ///
    /// `key=<key>` query spans are always masked. Bare occurrences are
    /// masked only for keys of at least [`MIN_BARE_REDACT_LEN`] chars, so a
    /// short key cannot mangle ordinary words.
    pub fn redact(&self, text: &str) -> String {
        let masked = text.replace(&format!("key={}", self.0), "key=***");
        if self.0.chars().count() < MIN_BARE_REDACT_LEN {
            return masked;
        }
        masked.replace(self.0.as_str(), "***")
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl Drop for Credential {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
