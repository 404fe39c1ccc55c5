//! Request-scoped credential data: the raw certificate chain and the
//! attributes the native validator extracts from its VOMS extension.

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

pub const SSL_CLIENT_CERT_KEY: &str = "SSL_CLIENT_CERT";
pub const SSL_CLIENT_CERT_CHAIN_PREFIX: &str = "SSL_CLIENT_CERT_CHAIN_";

/// End-entity certificate plus ordered intermediates. Opaque byte blobs at
/// this layer (PEM or DER is the validator collaborator's contract); owned by
/// the request being processed and discarded after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateChain {
    pub cert: Vec<u8>,
    pub chain: Vec<Vec<u8>>,
}

impl CertificateChain {
    pub fn new(cert: impl Into<Vec<u8>>, chain: Vec<Vec<u8>>) -> Self {
        Self { cert: cert.into(), chain }
    }

    /// Collect certificate material from mod_ssl-style environment pairs:
    /// `SSL_CLIENT_CERT` for the end-entity certificate and
    /// `SSL_CLIENT_CERT_CHAIN_<n>` for the intermediates, ordered by `<n>`.
    pub fn from_ssl_env<'a, I>(env: I) -> Result<Self, AuthError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut cert: Option<Vec<u8>> = None;
        let mut chain: Vec<(usize, Vec<u8>)> = Vec::new();
        for (key, value) in env {
            if key == SSL_CLIENT_CERT_KEY {
                cert = Some(value.as_bytes().to_vec());
            } else if let Some(suffix) = key.strip_prefix(SSL_CLIENT_CERT_CHAIN_PREFIX) {
                let idx = suffix.parse::<usize>().unwrap_or(usize::MAX);
                chain.push((idx, value.as_bytes().to_vec()));
            }
        }
        let Some(cert) = cert else {
            return Err(AuthError::MalformedChain("SSL_CLIENT_CERT is not present".into()));
        };
        chain.sort_by_key(|(idx, _)| *idx);
        Ok(Self { cert, chain: chain.into_iter().map(|(_, c)| c).collect() })
    }
}

/// Attributes asserted by a validated VOMS extension. Immutable; lives for a
/// single authentication attempt. The FQAN order is the one the VOMS server
/// signed and drives policy precedence downstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VomsAttributes {
    /// Subject DN of the holder.
    pub user: String,
    /// Issuer DN of the holder's certificate.
    pub userca: String,
    pub server: String,
    pub serverca: String,
    pub voname: String,
    pub uri: String,
    pub version: i32,
    pub serial: String,
    pub not_before: String,
    pub not_after: String,
    #[serde(default)]
    pub fqans: Vec<String>,
}
