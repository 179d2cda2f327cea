//! Error types for certificate resolution

/// Certificate resolution errors
#[derive(Debug, thiserror::Error)]
pub enum CertificateError {
    /// A required argument was absent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error while reading certificate material
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Text input was not base64
    #[error("String is not a valid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// ASN.1 structure of the certificate could not be decoded
    #[error("Certificate decoding error: {0}")]
    Decoding(#[from] der::Error),

    /// Input is not certificate material
    #[error("Certificate parsing error: {0}")]
    Parsing(String),

    /// Input ended before a certificate was found
    #[error("No certificate found in input")]
    NoCertificate,

    /// A keystore holds no private key entry
    #[error("No key pair found in keystore")]
    NoKeyPair,

    /// A keystore holds more than one private key entry
    #[error("More than one key pair found in keystore")]
    MultipleKeyPairs,

    /// A distinguished name string could not be parsed
    #[error("Invalid distinguished name: {0}")]
    InvalidName(String),
}

impl CertificateError {
    /// Create a parsing error
    pub fn parsing(msg: impl Into<String>) -> Self {
        Self::Parsing(msg.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result type for certificate operations
pub type Result<T> = std::result::Result<T, CertificateError>;
