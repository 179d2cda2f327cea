//! # certkit_certificate
//!
//! Lenient X.509 certificate decoding and identity matching.
//!
//! Certificates are accepted as DER, as PEM (with or without text around the
//! block) and as bare base64. Empty input is "no certificate" rather than an
//! error, malformed input always fails:
//!
//! ```rust,ignore
//! use certkit_certificate::{decode_str, subject_common_name};
//!
//! assert!(decode_str(Some("  "))?.is_none());
//! let cert = decode_str(Some(&pem_text))?.ok_or("no certificate")?;
//! println!("{:?}", subject_common_name(&cert));
//! ```
//!
//! Identity predicates answer whether a certificate matches a reference
//! taken from another message: a subject key identifier, an issuer name
//! plus serial number, or a thumbprint computed with a caller supplied
//! digest.

#![forbid(unsafe_code)]

mod certificate;
pub mod decoder;
pub mod error;
mod identity;
pub mod name;
mod text;

pub use certificate::Certificate;
pub use decoder::{decode_bytes, decode_chain, decode_file, decode_reader, CertificateDecoder};
pub use error::{CertificateError, Result};
pub use identity::{
    has_issuer_and_serial, has_subject_key_identifier, has_thumbprint, issuer_common_name,
    issuer_name, subject_common_name, subject_name, subject_serial_number,
};
pub use text::{decode_str, encode_pem};

pub use x509_cert::name::Name;
pub use x509_cert::serial_number::SerialNumber;

/// Parse a distinguished name written most specific RDN first, e.g. to build
/// the issuer for [`has_issuer_and_serial`].
pub fn parse_name(text: &str) -> Result<Name> {
    name::parse(text)
}
