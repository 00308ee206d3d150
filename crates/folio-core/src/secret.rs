//! Credential strings that never show up in logs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string that is redacted when formatted and zeroed on drop.
///
/// Holds API tokens and SMTP passwords loaded from config or the environment.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
    inner: String,
}

impl SecretString {
    /// Wrap a secret value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: value.into(),
        }
    }

    /// Read the first non-empty variable among `names`.
    pub fn from_env(names: &[&str]) -> Option<Self> {
        crate::env::get_any(names).map(Self::new)
    }

    /// Expose the secret value. Only call this at the point of use.
    pub fn expose_secret(&self) -> &str {
        &self.inner
    }

    /// Check if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.inner.as_bytes(), other.inner.as_bytes());
        a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
    }
}

impl Eq for SecretString {}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::new)
    }
}

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Verbatim so `Config::save` round-trips; `config show` masks separately
        self.inner.serialize(serializer)
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_redacted() {
        let secret = SecretString::new("hf_abcdef");
        assert_eq!(format!("{:?}", secret), "[REDACTED]");
        assert_eq!(format!("{}", secret), "[REDACTED]");
        assert_eq!(secret.expose_secret(), "hf_abcdef");
    }

    #[test]
    fn test_secret_equality() {
        assert_eq!(SecretString::new("pw"), SecretString::new("pw"));
        assert_ne!(SecretString::new("pw"), SecretString::new("pw2"));
        assert_ne!(SecretString::new("pw"), SecretString::new("px"));
    }

    #[test]
    fn test_secret_serde_roundtrips_value() {
        let secret: SecretString = serde_json::from_str("\"token\"").unwrap();
        assert_eq!(serde_json::to_string(&secret).unwrap(), "\"token\"");
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("FOLIO_TEST_SECRET", "s3cret");
        let secret = SecretString::from_env(&["FOLIO_TEST_SECRET_MISSING", "FOLIO_TEST_SECRET"]);
        assert_eq!(secret.unwrap().expose_secret(), "s3cret");
        assert!(SecretString::from_env(&["FOLIO_TEST_SECRET_MISSING"]).is_none());
    }
}
