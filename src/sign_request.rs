use std::fmt;
use std::fmt::Write;
use std::str::FromStr;

use http::header::{HeaderName, AUTHORIZATION, DATE};
use http::HeaderValue;
use log::debug;

use crate::credential::Credential;
use crate::hash::{base64_hmac_sha1, base64_hmac_sha256};
use crate::{Context, Error, Result};

/// Algorithms supported by the signature scheme.
///
/// HMAC-SHA1 is the default for wire compatibility with existing story
/// servers; new deployments may negotiate HMAC-SHA256.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// `hmac-sha1`, the legacy protocol default.
    #[default]
    HmacSha1,
    /// `hmac-sha256`.
    HmacSha256,
}

impl SignatureAlgorithm {
    /// Compute the base64-encoded digest of `content` keyed by `key`.
    pub fn digest(&self, key: &[u8], content: &[u8]) -> String {
        match self {
            SignatureAlgorithm::HmacSha1 => base64_hmac_sha1(key, content),
            SignatureAlgorithm::HmacSha256 => base64_hmac_sha256(key, content),
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureAlgorithm::HmacSha1 => write!(f, "hmac-sha1"),
            SignatureAlgorithm::HmacSha256 => write!(f, "hmac-sha256"),
        }
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hmac-sha1" => Ok(SignatureAlgorithm::HmacSha1),
            "hmac-sha256" => Ok(SignatureAlgorithm::HmacSha256),
            _ => Err(Error::unsupported_algorithm(format!(
                "unsupported signature algorithm: {s}"
            ))),
        }
    }
}

/// SignRequest is the trait used to produce an authenticated request.
#[async_trait::async_trait]
pub trait SignRequest: fmt::Debug + Send + Sync + 'static {
    /// Credential used by this signer.
    type Credential: Send + Sync;

    /// Sign the request in place.
    async fn sign_request(
        &self,
        ctx: &Context,
        parts: &mut http::request::Parts,
        credential: &Self::Credential,
    ) -> Result<()>;
}

/// RequestSigner that implements the story server `Signature` header scheme.
///
/// The signing string is built from the signed headers as `"<name>: <value>"`
/// pairs joined by newline in header-name sort order, HMACed with the secret
/// key and base64 encoded. The resulting authorization header has the form:
///
/// ```text
/// Signature keyId="<keyId>",algorithm="<alg>",headers="<names>",signature="<base64>"
/// ```
///
/// Only the `date` header is signed by default. Every signed header must
/// already be present on the request.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    algorithm: SignatureAlgorithm,
    headers_to_sign: Vec<HeaderName>,
}

impl Default for RequestSigner {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSigner {
    /// Create a signer with the default algorithm and signed header set.
    pub fn new() -> Self {
        Self {
            algorithm: SignatureAlgorithm::default(),
            headers_to_sign: vec![DATE],
        }
    }

    /// Use the given signature algorithm.
    pub fn with_algorithm(mut self, algorithm: SignatureAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sign the given header in addition to the defaults.
    pub fn with_signed_header(mut self, name: HeaderName) -> Self {
        self.headers_to_sign.push(name);
        self
    }

    /// Build the canonical signing string from the request headers.
    ///
    /// Fails when a header in the signed set is absent: a signature over a
    /// partial header set would verify against a different request.
    fn string_to_sign(&self, parts: &http::request::Parts) -> Result<(String, Vec<&HeaderName>)> {
        let mut names: Vec<&HeaderName> = self.headers_to_sign.iter().collect();
        names.sort_unstable_by(|a, b| a.as_str().cmp(b.as_str()));

        let mut s = String::new();
        for (idx, name) in names.iter().enumerate() {
            let value = parts
                .headers
                .get(*name)
                .ok_or_else(|| Error::missing_header(format!("header {name} is not set")))?;

            if idx != 0 {
                s.push('\n');
            }
            write!(&mut s, "{}: {}", name, value.to_str()?)
                .map_err(|e| Error::unexpected("failed to build signing string").with_source(e))?;
        }

        Ok((s, names))
    }
}

#[async_trait::async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _ctx: &Context,
        parts: &mut http::request::Parts,
        credential: &Self::Credential,
    ) -> Result<()> {
        let (string_to_sign, names) = self.string_to_sign(parts)?;
        debug!("string to sign: {}", &string_to_sign);

        let signature = self
            .algorithm
            .digest(credential.secret_key.as_bytes(), string_to_sign.as_bytes());

        let header_list = names
            .iter()
            .map(|n| n.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        parts.headers.insert(AUTHORIZATION, {
            let mut value: HeaderValue = format!(
                "Signature keyId=\"{}\",algorithm=\"{}\",headers=\"{}\",signature=\"{}\"",
                credential.key_id, self.algorithm, header_list, signature
            )
            .parse()?;
            value.set_sensitive(true);

            value
        });

        Ok(())
    }
}
