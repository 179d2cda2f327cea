//! Certificate Master Builder

use certkit_certificate::{Certificate, Result};
use std::io::Read;
use std::path::Path;

/// Master builder for certificate decoding
pub struct CertificateMasterBuilder;

impl CertificateMasterBuilder {
    /// Decode DER, PEM or base64 bytes; empty input is `None`
    pub fn decode(self, bytes: &[u8]) -> Result<Option<Certificate>> {
        certkit_certificate::decode_bytes(Some(bytes))
    }

    /// Decode PEM or bare base64 text; blank text is `None`
    pub fn decode_text(self, text: &str) -> Result<Option<Certificate>> {
        certkit_certificate::decode_str(Some(text))
    }

    /// Decode the certificate stored in a file
    pub fn decode_file(self, path: impl AsRef<Path>) -> Result<Certificate> {
        certkit_certificate::decode_file(Some(path.as_ref()))
    }

    /// Decode every certificate in a stream, in stream order
    pub fn decode_chain(self, source: impl Read) -> Result<Vec<Certificate>> {
        certkit_certificate::decode_chain(source)
    }
}
