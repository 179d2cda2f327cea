//! In-memory keystore

use crate::codec::{self, jks};
use crate::config::KeystoreSettings;
use crate::entry::{KeystoreEntry, PrivateKeyEntry, ProtectedKey, TrustedCertificateEntry};
use crate::error::{KeystoreError, Result};
use crate::format::KeystoreFormat;
use crate::key_pair::KeyPair;
use certkit_certificate::{Certificate, CertificateError};
use std::collections::BTreeMap;
use std::io::Write;
use zeroize::Zeroizing;

/// Aliased keystore entries in one container format.
///
/// JKS and JCEKS treat aliases case-insensitively and store them lower
/// cased; PKCS12 keeps aliases as given.
#[derive(Debug, Clone)]
pub struct Keystore {
    format: KeystoreFormat,
    entries: BTreeMap<String, KeystoreEntry>,
    settings: KeystoreSettings,
}

impl Keystore {
    /// Create an empty keystore
    pub fn new(format: KeystoreFormat) -> Self {
        Self {
            format,
            entries: BTreeMap::new(),
            settings: KeystoreSettings::default(),
        }
    }

    pub(crate) fn from_entries(
        format: KeystoreFormat,
        entries: BTreeMap<String, KeystoreEntry>,
    ) -> Self {
        let mut keystore = Self::new(format);
        for (alias, entry) in entries {
            keystore.set_entry(&alias, entry);
        }
        keystore
    }

    /// Replace the settings used when this keystore is written or keys are sealed
    pub fn with_settings(mut self, settings: KeystoreSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Container format
    pub fn format(&self) -> KeystoreFormat {
        self.format
    }

    /// Protection settings
    pub fn settings(&self) -> &KeystoreSettings {
        &self.settings
    }

    fn normalize<'a>(&self, alias: &'a str) -> std::borrow::Cow<'a, str> {
        match self.format {
            KeystoreFormat::Jks | KeystoreFormat::Jceks => alias.to_lowercase().into(),
            KeystoreFormat::Pkcs12 => alias.into(),
        }
    }

    /// Aliases in sorted order
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in alias order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &KeystoreEntry)> {
        self.entries.iter().map(|(alias, entry)| (alias.as_str(), entry))
    }

    /// Entry stored under `alias`
    pub fn entry(&self, alias: &str) -> Option<&KeystoreEntry> {
        self.entries.get(&*self.normalize(alias))
    }

    /// Whether an entry exists under `alias`
    pub fn contains_alias(&self, alias: &str) -> bool {
        self.entry(alias).is_some()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the keystore has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store `entry` under `alias`, returning the entry it replaced
    pub fn set_entry(&mut self, alias: &str, entry: KeystoreEntry) -> Option<KeystoreEntry> {
        let alias = self.normalize(alias).into_owned();
        let previous = self.entries.insert(alias.clone(), entry);
        if previous.is_some() {
            tracing::debug!(format = %self.format, alias = %alias, "Replaced keystore entry");
        }
        previous
    }

    /// Remove and return the entry under `alias`
    pub fn remove_entry(&mut self, alias: &str) -> Option<KeystoreEntry> {
        let alias = self.normalize(alias);
        self.entries.remove(&*alias)
    }

    /// Store a key pair, protecting the key with `entry_password`.
    ///
    /// PKCS12 keys are protected by the container password when written,
    /// so `entry_password` is not used for that format.
    pub fn set_key_pair(
        &mut self,
        alias: &str,
        key_pair: &KeyPair,
        entry_password: &str,
    ) -> Result<()> {
        if key_pair.chain().is_empty() {
            return Err(KeystoreError::unsupported_entry(
                alias,
                self.format,
                "a private key needs at least one certificate",
            ));
        }
        let key = match self.format {
            KeystoreFormat::Jks | KeystoreFormat::Jceks => jks::seal(
                self.format,
                key_pair.private_key(),
                entry_password,
                self.settings.jceks_iterations,
            )?,
            KeystoreFormat::Pkcs12 => {
                ProtectedKey::Unsealed(Zeroizing::new(key_pair.private_key().to_vec()))
            }
        };
        let entry = PrivateKeyEntry::new(key, key_pair.chain().to_vec());
        self.set_entry(alias, KeystoreEntry::PrivateKey(entry));
        Ok(())
    }

    /// Recover the key pair stored under `alias` using `entry_password`
    pub fn key_pair(&self, alias: &str, entry_password: &str) -> Result<KeyPair> {
        match self.entry(alias) {
            Some(KeystoreEntry::PrivateKey(entry)) => entry.key_pair(entry_password),
            _ => Err(KeystoreError::UnknownAlias(alias.to_string())),
        }
    }

    /// Trusted certificate stored under `alias`
    pub fn trusted_certificate(&self, alias: &str) -> Option<&Certificate> {
        match self.entry(alias)? {
            KeystoreEntry::TrustedCertificate(entry) => Some(entry.certificate()),
            _ => None,
        }
    }

    /// Store a trusted certificate under `alias`
    pub fn set_trusted_certificate(&mut self, alias: &str, certificate: Certificate) {
        self.set_entry(
            alias,
            KeystoreEntry::TrustedCertificate(TrustedCertificateEntry::new(certificate)),
        );
    }

    /// Alias of the one private key entry.
    ///
    /// Every entry is inspected: no private key fails with
    /// [`CertificateError::NoKeyPair`], more than one with
    /// [`CertificateError::MultipleKeyPairs`].
    pub fn single_key_pair_alias(&self) -> Result<&str> {
        let mut key_aliases = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_key_pair())
            .map(|(alias, _)| alias.as_str());
        let alias = key_aliases.next().ok_or(CertificateError::NoKeyPair)?;
        if key_aliases.next().is_some() {
            return Err(CertificateError::MultipleKeyPairs.into());
        }
        Ok(alias)
    }

    /// Encode the keystore, protected by `password`
    pub fn to_bytes(&self, password: &str) -> Result<Vec<u8>> {
        codec::encode(self.format, &self.entries, password, &self.settings)
    }

    /// Encode the keystore into `destination`
    pub fn write_to(&self, mut destination: impl Write, password: &str) -> Result<()> {
        let bytes = self.to_bytes(password)?;
        destination.write_all(&bytes)?;
        destination.flush()?;
        tracing::debug!(
            format = %self.format,
            entries = self.entries.len(),
            bytes = bytes.len(),
            "Wrote keystore"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certkit_certificate::decode_bytes;

    const PKCS8: &[u8] = &[0x30, 0x03, 0x02, 0x01, 0x00];

    fn certificate() -> Certificate {
        decode_bytes(Some(&include_bytes!("../tests/resources/partyc.cert")[..]))
            .unwrap()
            .unwrap()
    }

    #[test]
    fn jks_aliases_are_case_insensitive() {
        let mut keystore = Keystore::new(KeystoreFormat::Jks);
        keystore.set_trusted_certificate("PartyC", certificate());
        assert_eq!(keystore.aliases().collect::<Vec<_>>(), ["partyc"]);
        assert!(keystore.contains_alias("PARTYC"));
        assert!(keystore.trusted_certificate("partyC").is_some());
    }

    #[test]
    fn pkcs12_aliases_keep_case() {
        let mut keystore = Keystore::new(KeystoreFormat::Pkcs12);
        keystore.set_trusted_certificate("PartyC", certificate());
        assert!(keystore.contains_alias("PartyC"));
        assert!(!keystore.contains_alias("partyc"));
    }

    #[test]
    fn single_key_pair_alias_counts_every_entry() {
        let mut keystore = Keystore::new(KeystoreFormat::Jks).with_settings(KeystoreSettings::fast());
        keystore.set_trusted_certificate("ca", certificate());
        assert!(matches!(
            keystore.single_key_pair_alias(),
            Err(KeystoreError::Certificate(CertificateError::NoKeyPair))
        ));

        let pair = KeyPair::new(PKCS8, vec![certificate()]);
        keystore.set_key_pair("first", &pair, "pw").unwrap();
        assert_eq!(keystore.single_key_pair_alias().unwrap(), "first");

        keystore.set_key_pair("second", &pair, "pw").unwrap();
        assert!(matches!(
            keystore.single_key_pair_alias(),
            Err(KeystoreError::Certificate(CertificateError::MultipleKeyPairs))
        ));
    }

    #[test]
    fn key_pair_round_trips_through_sealing() {
        for format in [KeystoreFormat::Jks, KeystoreFormat::Jceks, KeystoreFormat::Pkcs12] {
            let mut keystore = Keystore::new(format).with_settings(KeystoreSettings::fast());
            let pair = KeyPair::new(PKCS8, vec![certificate()]);
            keystore.set_key_pair("key", &pair, "entry").unwrap();

            let recovered = keystore.key_pair("key", "entry").unwrap();
            assert_eq!(recovered.private_key(), PKCS8);
            assert_eq!(recovered.chain(), pair.chain());
        }
    }

    #[test]
    fn wrong_entry_password_is_rejected() {
        let mut keystore = Keystore::new(KeystoreFormat::Jks);
        let pair = KeyPair::new(PKCS8, vec![certificate()]);
        keystore.set_key_pair("key", &pair, "entry").unwrap();
        assert!(matches!(
            keystore.key_pair("key", "other"),
            Err(KeystoreError::WrongKeyPassword)
        ));
    }

    #[test]
    fn key_pair_needs_a_chain() {
        let mut keystore = Keystore::new(KeystoreFormat::Pkcs12);
        let pair = KeyPair::new(PKCS8, Vec::new());
        assert!(matches!(
            keystore.set_key_pair("key", &pair, "pw"),
            Err(KeystoreError::UnsupportedEntry { .. })
        ));
    }

    #[test]
    fn missing_or_non_key_alias() {
        let mut keystore = Keystore::new(KeystoreFormat::Jks);
        keystore.set_trusted_certificate("ca", certificate());
        assert!(matches!(keystore.key_pair("ca", "pw"), Err(KeystoreError::UnknownAlias(_))));
        assert!(matches!(keystore.key_pair("nope", "pw"), Err(KeystoreError::UnknownAlias(_))));
        assert!(keystore.remove_entry("CA").is_some());
        assert!(keystore.is_empty());
    }
}
