//! Settings controlling how keystores protect data when saved

use p12_keystore::{EncryptionAlgorithm, MacAlgorithm};
use serde::{Deserialize, Serialize};

/// Encryption applied to PKCS12 key and certificate bags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pkcs12Encryption {
    /// PBES2 with PBKDF2-HMAC-SHA256 and AES-256-CBC
    Aes256Cbc,
    /// PBE with SHA-1 and 3-key triple DES
    TripleDes,
    /// PBE with SHA-1 and 40-bit RC2, only for very old consumers
    Rc2_40,
}

impl From<Pkcs12Encryption> for EncryptionAlgorithm {
    fn from(value: Pkcs12Encryption) -> Self {
        match value {
            Pkcs12Encryption::Aes256Cbc => EncryptionAlgorithm::PbeWithHmacSha256AndAes256,
            Pkcs12Encryption::TripleDes => EncryptionAlgorithm::PbeWithShaAnd3KeyTripleDesCbc,
            Pkcs12Encryption::Rc2_40 => EncryptionAlgorithm::PbeWithShaAnd40BitRc4Cbc,
        }
    }
}

/// Integrity MAC of a PKCS12 file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pkcs12Mac {
    /// HMAC-SHA256
    HmacSha256,
    /// HMAC-SHA1
    HmacSha1,
}

impl From<Pkcs12Mac> for MacAlgorithm {
    fn from(value: Pkcs12Mac) -> Self {
        match value {
            Pkcs12Mac::HmacSha256 => MacAlgorithm::HmacSha256,
            Pkcs12Mac::HmacSha1 => MacAlgorithm::HmacSha1,
        }
    }
}

/// Protection settings used when a keystore is written.
///
/// Loading never depends on these; every format records the algorithms it
/// was written with.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeystoreSettings {
    /// Encryption of PKCS12 bags
    #[serde(default = "default_pkcs12_encryption")]
    pub pkcs12_encryption: Pkcs12Encryption,
    /// PBE iterations of PKCS12 bag encryption
    #[serde(default = "default_pkcs12_iterations")]
    pub pkcs12_encryption_iterations: u64,
    /// PKCS12 integrity MAC
    #[serde(default = "default_pkcs12_mac")]
    pub pkcs12_mac: Pkcs12Mac,
    /// Key derivation iterations of the PKCS12 MAC
    #[serde(default = "default_pkcs12_iterations")]
    pub pkcs12_mac_iterations: u64,
    /// Iterations of the JCEKS key derivation (keytool uses 200000)
    #[serde(default = "default_jceks_iterations")]
    pub jceks_iterations: u32,
}

fn default_pkcs12_encryption() -> Pkcs12Encryption {
    Pkcs12Encryption::Aes256Cbc
}

fn default_pkcs12_mac() -> Pkcs12Mac {
    Pkcs12Mac::HmacSha256
}

fn default_pkcs12_iterations() -> u64 {
    10_000
}

fn default_jceks_iterations() -> u32 {
    200_000
}

impl Default for KeystoreSettings {
    fn default() -> Self {
        Self {
            pkcs12_encryption: default_pkcs12_encryption(),
            pkcs12_encryption_iterations: default_pkcs12_iterations(),
            pkcs12_mac: default_pkcs12_mac(),
            pkcs12_mac_iterations: default_pkcs12_iterations(),
            jceks_iterations: default_jceks_iterations(),
        }
    }
}

impl KeystoreSettings {
    /// Settings readable by consumers without PBES2 support
    pub fn legacy() -> Self {
        Self {
            pkcs12_encryption: Pkcs12Encryption::TripleDes,
            pkcs12_encryption_iterations: 2048,
            pkcs12_mac: Pkcs12Mac::HmacSha1,
            pkcs12_mac_iterations: 2048,
            jceks_iterations: default_jceks_iterations(),
        }
    }

    /// Low iteration counts for tests and throwaway stores
    pub fn fast() -> Self {
        Self {
            pkcs12_encryption_iterations: 1,
            pkcs12_mac_iterations: 1,
            jceks_iterations: 1,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_modern() {
        let settings = KeystoreSettings::default();
        assert_eq!(settings.pkcs12_encryption, Pkcs12Encryption::Aes256Cbc);
        assert_eq!(settings.pkcs12_mac, Pkcs12Mac::HmacSha256);
        assert_eq!(settings.jceks_iterations, 200_000);
    }

    #[test]
    fn legacy_uses_sha1_mac() {
        let settings = KeystoreSettings::legacy();
        assert_eq!(
            EncryptionAlgorithm::from(settings.pkcs12_encryption),
            EncryptionAlgorithm::PbeWithShaAnd3KeyTripleDesCbc
        );
        assert_eq!(MacAlgorithm::from(settings.pkcs12_mac), MacAlgorithm::HmacSha1);
    }
}
