//! Keystore container formats and magic number detection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use std::str::FromStr;

const JKS_MAGIC: [u8; 4] = [0xFE, 0xED, 0xFE, 0xED];
const JCEKS_MAGIC: [u8; 4] = [0xCE, 0xCE, 0xCE, 0xCE];

/// Supported keystore container formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeystoreFormat {
    /// Java KeyStore
    Jks,
    /// Java Cryptography Extension KeyStore
    Jceks,
    /// PKCS#12 / PFX
    Pkcs12,
}

impl KeystoreFormat {
    /// Magic number at the start of the container, if the format has one
    pub fn magic(self) -> Option<[u8; 4]> {
        match self {
            Self::Jks => Some(JKS_MAGIC),
            Self::Jceks => Some(JCEKS_MAGIC),
            Self::Pkcs12 => None,
        }
    }

    /// Provider name of the format
    pub fn name(self) -> &'static str {
        match self {
            Self::Jks => "JKS",
            Self::Jceks => "JCEKS",
            Self::Pkcs12 => "PKCS12",
        }
    }

    /// Classify content by its first four bytes.
    ///
    /// PKCS12 has no magic number of its own, so anything that is not a
    /// JKS or JCEKS header is classified as PKCS12 and left for the PKCS12
    /// decoder to accept or reject.
    pub fn detect(header: &[u8]) -> Self {
        match header.get(..4) {
            Some(magic) if magic == JKS_MAGIC => Self::Jks,
            Some(magic) if magic == JCEKS_MAGIC => Self::Jceks,
            _ => Self::Pkcs12,
        }
    }
}

/// Read the leading bytes of `source` and classify them.
///
/// Consumes up to four bytes; callers that need the full content afterwards
/// should buffer the source first (see [`crate::load`]).
pub fn detect_format<R: Read>(source: R) -> std::io::Result<KeystoreFormat> {
    let mut header = Vec::with_capacity(4);
    source.take(4).read_to_end(&mut header)?;
    Ok(KeystoreFormat::detect(&header))
}

impl fmt::Display for KeystoreFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for KeystoreFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "JKS" => Ok(Self::Jks),
            "JCEKS" => Ok(Self::Jceks),
            "PKCS12" | "P12" | "PFX" => Ok(Self::Pkcs12),
            other => Err(format!("Unknown keystore format: {other}")),
        }
    }
}
