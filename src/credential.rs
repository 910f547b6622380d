use std::fmt::{Debug, Formatter};

use crate::utils::Redact;

/// Credential pair for the story server.
///
/// `key_id` identifies the consumer and appears in request paths;
/// `secret_key` never leaves the process and never appears in logs.
#[derive(Clone)]
pub struct Credential {
    /// Key id assigned by the story server.
    pub key_id: String,
    /// Secret key matching the key id.
    pub secret_key: String,
}

impl Credential {
    /// Create a new credential.
    pub fn new(key_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            secret_key: secret_key.into(),
        }
    }
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("key_id", &self.key_id)
            .field("secret_key", &Redact::from(&self.secret_key))
            .finish()
    }
}

/// SigningCredential is the trait used by signers as the signing key.
pub trait SigningCredential: Clone + Debug + Send + Sync + 'static {
    /// Check if the credential is valid.
    fn is_valid(&self) -> bool;
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.key_id.is_empty() && !self.secret_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let cred = Credential::new(
            "23u73reqmzh4x4y0ujyanv0r",
            "1ce48e640809f8622647ae8b75f7970ad8733c207b31c901e8134c5c652bce6c",
        );
        let out = format!("{cred:?}");

        assert!(out.contains("23u73reqmzh4x4y0ujyanv0r"));
        assert!(!out.contains("1ce48e640809f8622647ae8b75f7970a"));
        assert!(out.contains("1ce***e6c"));
    }

    #[test]
    fn test_is_valid() {
        assert!(Credential::new("key", "secret").is_valid());
        assert!(!Credential::new("", "secret").is_valid());
        assert!(!Credential::new("key", "").is_valid());
    }
}
