//! Core Master Builder

use super::CertificateMasterBuilder;

#[cfg(feature = "keystore")]
use super::KeystoreMasterBuilder;

/// Unified entry point for certificate and keystore operations
pub struct Certkit;

impl Certkit {
    /// Entry point for certificate decoding.
    /// Example: `Certkit::certificate().decode_text(&pem)?`
    #[must_use]
    pub fn certificate() -> CertificateMasterBuilder {
        CertificateMasterBuilder
    }

    /// Entry point for keystore operations.
    /// Example: `Certkit::keystore().read_key_pair(path, "secret")?`
    #[cfg(feature = "keystore")]
    #[must_use]
    pub fn keystore() -> KeystoreMasterBuilder {
        KeystoreMasterBuilder::default()
    }
}
