//! Decoded X.509 certificate value

use crate::error::Result;
use const_oid::db::rfc5280::ID_CE_SUBJECT_KEY_IDENTIFIER;
use const_oid::ObjectIdentifier;
use der::Decode;
use x509_cert::ext::pkix::SubjectKeyIdentifier;
use x509_cert::ext::Extension;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;

/// An immutable X.509 certificate.
///
/// Holds the exact DER bytes the certificate was decoded from next to the
/// parsed structure, so re-encoding never depends on the ASN.1 encoder
/// reproducing the original byte for byte.
#[derive(Clone, Debug)]
pub struct Certificate {
    der: Vec<u8>,
    inner: x509_cert::Certificate,
}

impl Certificate {
    /// Parse a certificate from a single DER encoded structure.
    ///
    /// Trailing bytes after the certificate are rejected.
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self> {
        let der = der.into();
        let inner = x509_cert::Certificate::from_der(&der)?;
        Ok(Self { der, inner })
    }

    /// Raw DER encoding
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }

    /// Consume the certificate returning its DER encoding
    pub fn into_der(self) -> Vec<u8> {
        self.der
    }

    /// Parsed certificate structure
    pub fn x509(&self) -> &x509_cert::Certificate {
        &self.inner
    }

    /// Certificate serial number
    pub fn serial_number(&self) -> &SerialNumber {
        &self.inner.tbs_certificate.serial_number
    }

    /// Subject distinguished name
    pub fn subject(&self) -> &Name {
        &self.inner.tbs_certificate.subject
    }

    /// Issuer distinguished name
    pub fn issuer(&self) -> &Name {
        &self.inner.tbs_certificate.issuer
    }

    /// Key identifier carried in the subject key identifier extension
    pub fn subject_key_identifier(&self) -> Option<Vec<u8>> {
        let ext = self.extension(&ID_CE_SUBJECT_KEY_IDENTIFIER)?;
        SubjectKeyIdentifier::from_der(ext.extn_value.as_bytes())
            .ok()
            .map(|ski| ski.0.into_bytes())
    }

    /// First extension with the given identifier
    pub fn extension(&self, oid: &ObjectIdentifier) -> Option<&Extension> {
        self.inner
            .tbs_certificate
            .extensions
            .as_ref()?
            .iter()
            .find(|ext| &ext.extn_id == oid)
    }

    /// PEM armored form, see [`crate::encode_pem`]
    pub fn to_pem(&self) -> String {
        crate::encode_pem(self)
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}

impl AsRef<[u8]> for Certificate {
    fn as_ref(&self) -> &[u8] {
        &self.der
    }
}

impl TryFrom<&[u8]> for Certificate {
    type Error = crate::CertificateError;

    fn try_from(der: &[u8]) -> Result<Self> {
        Self::from_der(der)
    }
}
