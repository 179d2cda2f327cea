//! # Certkit - Certificate and Keystore Resolution
//!
//! Decode X.509 certificates from whatever encoding they arrive in, match
//! them against references from signed messages, and read key pairs from
//! Java and PKCS12 keystores.
//!
//! ## Features
//!
//! Both resolvers are feature-gated:
//!
//! - `certificate` - certificate decoding (DER, PEM, bare base64) and
//!   identity predicates (subject key identifier, issuer and serial,
//!   thumbprint)
//! - `keystore` - JKS, JCEKS and PKCS12 loading, saving and key pair
//!   resolution (enables `certificate`)
//! - `full` - everything
//!
//! ```toml
//! [dependencies]
//! certkit = { version = "0.1", features = ["full"] }
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use certkit::Certkit;
//! use certkit::KeystoreFormat;
//!
//! let cert = Certkit::certificate().decode_text(&pem)?;
//!
//! let key_pair = Certkit::keystore()
//!     .with_format(KeystoreFormat::Pkcs12)
//!     .read_key_pair("signing.p12", "secret")?;
//! ```

#![forbid(unsafe_code)]

mod master;

#[cfg(feature = "certificate")]
pub use master::Certkit;

#[cfg(feature = "certificate")]
pub use master::CertificateMasterBuilder;

#[cfg(feature = "keystore")]
pub use master::KeystoreMasterBuilder;

// Certificate resolver
#[cfg(feature = "certificate")]
#[cfg_attr(docsrs, doc(cfg(feature = "certificate")))]
pub use certkit_certificate as certificate;

#[cfg(feature = "certificate")]
#[cfg_attr(docsrs, doc(cfg(feature = "certificate")))]
pub use certkit_certificate::{
    decode_bytes, decode_chain, decode_file, decode_reader, decode_str, encode_pem,
    has_issuer_and_serial, has_subject_key_identifier, has_thumbprint, issuer_common_name,
    issuer_name, parse_name, subject_common_name, subject_name, subject_serial_number,
    Certificate, CertificateError, Name, SerialNumber,
};

// Keystore resolver
#[cfg(feature = "keystore")]
#[cfg_attr(docsrs, doc(cfg(feature = "keystore")))]
pub use certkit_keystore as keystore;

#[cfg(feature = "keystore")]
#[cfg_attr(docsrs, doc(cfg(feature = "keystore")))]
pub use certkit_keystore::{
    KeyPair, Keystore, KeystoreEntry, KeystoreError, KeystoreFormat, KeystoreSettings,
};

/// Prelude module for convenient imports
pub mod prelude {
    #[cfg(feature = "certificate")]
    pub use crate::{Certificate, CertificateError, Certkit};

    #[cfg(feature = "keystore")]
    pub use crate::{KeyPair, Keystore, KeystoreError, KeystoreFormat};
}
