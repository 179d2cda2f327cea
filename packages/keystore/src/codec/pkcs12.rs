//! PKCS12 containers through `p12-keystore`

use crate::config::KeystoreSettings;
use crate::entry::{KeystoreEntry, PrivateKeyEntry, ProtectedKey, TrustedCertificateEntry};
use crate::error::{KeystoreError, Result};
use crate::format::KeystoreFormat;
use certkit_certificate::Certificate;
use p12_keystore::{KeyStore, KeyStoreEntry, PrivateKeyChain};
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use zeroize::Zeroizing;

/// Decode a PKCS12 file, verifying its MAC with `password`.
///
/// Keys come out decrypted; PKCS12 protects them with the same password
/// as the container.
pub(crate) fn decode(data: &[u8], password: &str) -> Result<BTreeMap<String, KeystoreEntry>> {
    let store = KeyStore::from_pkcs12(data, password)?;

    let mut entries = BTreeMap::new();
    for (alias, entry) in store.entries() {
        let entry = match entry {
            KeyStoreEntry::PrivateKeyChain(key_chain) => {
                KeystoreEntry::PrivateKey(PrivateKeyEntry {
                    key: ProtectedKey::Unsealed(Zeroizing::new(key_chain.key().to_vec())),
                    chain: key_chain
                        .chain()
                        .iter()
                        .map(|cert| Certificate::from_der(cert.as_der()))
                        .collect::<certkit_certificate::Result<Vec<_>>>()?,
                    created: None,
                })
            }
            KeyStoreEntry::Certificate(cert) => {
                KeystoreEntry::TrustedCertificate(TrustedCertificateEntry {
                    certificate: Certificate::from_der(cert.as_der())?,
                    created: None,
                })
            }
        };
        tracing::trace!(alias = %alias, kind = entry.kind(), "Read PKCS12 entry");
        entries.insert(alias.clone(), entry);
    }
    Ok(entries)
}

/// Encode entries as PKCS12 protected by `password`
pub(crate) fn encode<'e>(
    entries: impl IntoIterator<Item = (&'e String, &'e KeystoreEntry)>,
    password: &str,
    settings: &KeystoreSettings,
) -> Result<Vec<u8>> {
    let mut store = KeyStore::new();
    for (alias, entry) in entries {
        let entry = match entry {
            KeystoreEntry::PrivateKey(key_entry) => {
                let ProtectedKey::Unsealed(key) = &key_entry.key else {
                    return Err(KeystoreError::unsupported_entry(
                        alias,
                        KeystoreFormat::Pkcs12,
                        format!("holds a {}", key_entry.key.kind()),
                    ));
                };
                KeyStoreEntry::PrivateKeyChain(key_chain(alias, key, &key_entry.chain)?)
            }
            KeystoreEntry::TrustedCertificate(cert_entry) => KeyStoreEntry::Certificate(
                p12_keystore::Certificate::from_der(cert_entry.certificate.as_der())?,
            ),
            KeystoreEntry::SecretKey(_) => {
                return Err(KeystoreError::unsupported_entry(
                    alias,
                    KeystoreFormat::Pkcs12,
                    "secret keys need JCEKS",
                ))
            }
        };
        store.add_entry(alias, entry);
    }

    let bytes = store
        .writer(password)
        .encryption_algorithm(settings.pkcs12_encryption.into())
        .encryption_iterations(settings.pkcs12_encryption_iterations)
        .mac_algorithm(settings.pkcs12_mac.into())
        .mac_iterations(settings.pkcs12_mac_iterations)
        .write()?;
    Ok(bytes)
}

fn key_chain(alias: &str, key: &[u8], chain: &[Certificate]) -> Result<PrivateKeyChain> {
    let leaf = chain.first().ok_or_else(|| {
        KeystoreError::unsupported_entry(
            alias,
            KeystoreFormat::Pkcs12,
            "a private key needs at least one certificate",
        )
    })?;
    // links the key bag to the bag of its leaf certificate
    let local_key_id = Sha1::digest(leaf.as_der());
    let certs = chain
        .iter()
        .map(|cert| p12_keystore::Certificate::from_der(cert.as_der()))
        .collect::<p12_keystore::Result<Vec<_>>>()?;
    Ok(PrivateKeyChain::new(key, local_key_id, certs))
}
