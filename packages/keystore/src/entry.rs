//! Keystore entries

use crate::codec::protector;
use crate::error::Result;
use crate::key_pair::KeyPair;
use certkit_certificate::Certificate;
use chrono::{DateTime, Utc};
use std::fmt;
use zeroize::Zeroizing;

/// How a private key is held inside a keystore
#[derive(Clone)]
pub enum ProtectedKey {
    /// `EncryptedPrivateKeyInfo` under the JKS key protector
    Jks(Vec<u8>),
    /// `EncryptedPrivateKeyInfo` under PBEWithMD5AndTripleDES
    Jceks(Vec<u8>),
    /// Plain PKCS#8; PKCS12 encrypts its key bags as part of the container
    Unsealed(Zeroizing<Vec<u8>>),
}

impl ProtectedKey {
    /// Recover the PKCS#8 key, verifying `password` where the key is sealed.
    pub fn unseal(&self, password: &str) -> Result<Zeroizing<Vec<u8>>> {
        match self {
            Self::Jks(sealed) => protector::unseal_jks(sealed, password),
            Self::Jceks(sealed) => protector::unseal_jceks(sealed, password),
            Self::Unsealed(key) => Ok(key.clone()),
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::Jks(_) => "JKS protected key",
            Self::Jceks(_) => "JCEKS protected key",
            Self::Unsealed(_) => "unprotected key",
        }
    }
}

impl fmt::Debug for ProtectedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jks(sealed) => f.debug_tuple("Jks").field(&sealed.len()).finish(),
            Self::Jceks(sealed) => f.debug_tuple("Jceks").field(&sealed.len()).finish(),
            Self::Unsealed(_) => f.write_str("Unsealed(<redacted>)"),
        }
    }
}

/// A private key with its certificate chain
#[derive(Debug, Clone)]
pub struct PrivateKeyEntry {
    pub(crate) key: ProtectedKey,
    pub(crate) chain: Vec<Certificate>,
    pub(crate) created: Option<DateTime<Utc>>,
}

impl PrivateKeyEntry {
    /// Build an entry from an already protected key
    pub fn new(key: ProtectedKey, chain: Vec<Certificate>) -> Self {
        Self {
            key,
            chain,
            created: Some(Utc::now()),
        }
    }

    /// Protected key material
    pub fn key(&self) -> &ProtectedKey {
        &self.key
    }

    /// Certificate chain, leaf first
    pub fn chain(&self) -> &[Certificate] {
        &self.chain
    }

    /// Creation date, when the format records one
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    /// Recover the key pair using the entry password
    pub fn key_pair(&self, password: &str) -> Result<KeyPair> {
        let key = self.key.unseal(password)?;
        Ok(KeyPair::from_zeroizing(key, self.chain.clone()))
    }
}

/// A certificate trusted as-is
#[derive(Debug, Clone)]
pub struct TrustedCertificateEntry {
    pub(crate) certificate: Certificate,
    pub(crate) created: Option<DateTime<Utc>>,
}

impl TrustedCertificateEntry {
    /// Wrap a certificate
    pub fn new(certificate: Certificate) -> Self {
        Self {
            certificate,
            created: Some(Utc::now()),
        }
    }

    /// The certificate
    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// Creation date, when the format records one
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }
}

/// A JCEKS secret key, kept as its serialized sealed object
#[derive(Clone)]
pub struct SecretKeyEntry {
    pub(crate) sealed: Vec<u8>,
    pub(crate) created: Option<DateTime<Utc>>,
}

impl SecretKeyEntry {
    /// Serialized `SealedObject` bytes as stored in the keystore
    pub fn sealed_object(&self) -> &[u8] {
        &self.sealed
    }

    /// Creation date
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }
}

impl fmt::Debug for SecretKeyEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretKeyEntry")
            .field("sealed_len", &self.sealed.len())
            .field("created", &self.created)
            .finish()
    }
}

/// One aliased keystore entry
#[derive(Debug, Clone)]
pub enum KeystoreEntry {
    /// Private key with certificate chain
    PrivateKey(PrivateKeyEntry),
    /// Trusted certificate
    TrustedCertificate(TrustedCertificateEntry),
    /// Secret (symmetric) key, JCEKS only
    SecretKey(SecretKeyEntry),
}

impl KeystoreEntry {
    /// Whether this entry holds a private key and certificate chain
    pub fn is_key_pair(&self) -> bool {
        matches!(self, Self::PrivateKey(_))
    }

    /// Creation date, when the format records one
    pub fn created(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::PrivateKey(entry) => entry.created,
            Self::TrustedCertificate(entry) => entry.created,
            Self::SecretKey(entry) => entry.created,
        }
    }

    pub(crate) fn kind(&self) -> &'static str {
        match self {
            Self::PrivateKey(_) => "private key",
            Self::TrustedCertificate(_) => "trusted certificate",
            Self::SecretKey(_) => "secret key",
        }
    }
}
