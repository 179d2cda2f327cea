//! Error types for keystore operations

use crate::format::KeystoreFormat;
use certkit_certificate::CertificateError;

/// Keystore errors
#[derive(Debug, thiserror::Error)]
pub enum KeystoreError {
    /// Reading or writing the keystore failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The content is not a well formed keystore of the expected format
    #[error("Invalid {format} keystore: {message}")]
    Format {
        /// Format being decoded
        format: KeystoreFormat,
        /// What was wrong
        message: String,
    },

    /// The keystore integrity digest did not match, usually a wrong password
    #[error("Keystore was tampered with, or password was incorrect")]
    IntegrityCheckFailed,

    /// A private key could not be recovered with the given password
    #[error("Cannot recover key: password was incorrect")]
    WrongKeyPassword,

    /// The content is a keystore of a different format than requested
    #[error("Expected a {expected} keystore but found {found}")]
    FormatMismatch {
        /// Requested format
        expected: KeystoreFormat,
        /// Format found by inspecting the content
        found: KeystoreFormat,
    },

    /// An entry cannot be stored in this keystore format
    #[error("Entry {alias:?} cannot be stored in a {format} keystore: {reason}")]
    UnsupportedEntry {
        /// Alias of the entry
        alias: String,
        /// Target format
        format: KeystoreFormat,
        /// Why the entry does not fit
        reason: String,
    },

    /// No private key entry under the given alias
    #[error("No key pair with alias {0:?}")]
    UnknownAlias(String),

    /// PKCS12 container error
    #[error("PKCS12 error: {0}")]
    Pkcs12(#[from] p12_keystore::error::Error),

    /// Certificate material inside the keystore, or key pair resolution
    #[error(transparent)]
    Certificate(#[from] CertificateError),

    /// ASN.1 encoding or decoding of key material failed
    #[error("Encoding error: {0}")]
    Encoding(#[from] der::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl KeystoreError {
    /// Create a format error
    pub fn format(format: KeystoreFormat, message: impl Into<String>) -> Self {
        Self::Format {
            format,
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub(crate) fn unsupported_entry(
        alias: &str,
        format: KeystoreFormat,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnsupportedEntry {
            alias: alias.to_string(),
            format,
            reason: reason.into(),
        }
    }
}

/// Result type for keystore operations
pub type Result<T> = std::result::Result<T, KeystoreError>;
