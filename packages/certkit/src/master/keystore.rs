//! Keystore Master Builder

use certkit_keystore::{KeyPair, Keystore, KeystoreFormat, KeystoreSettings, Result};
use std::path::Path;

/// Master builder for keystore operations.
///
/// Without [`with_format`](Self::with_format) the format is detected from
/// the file content.
#[derive(Debug, Clone, Default)]
pub struct KeystoreMasterBuilder {
    format: Option<KeystoreFormat>,
    settings: Option<KeystoreSettings>,
}

impl KeystoreMasterBuilder {
    /// Require keystores to be in `format`
    #[must_use]
    pub fn with_format(mut self, format: KeystoreFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Protection settings for keystores created or saved through this builder
    #[must_use]
    pub fn with_settings(mut self, settings: KeystoreSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Empty keystore in the chosen format, PKCS12 if none was chosen
    pub fn create(self) -> Keystore {
        let keystore = Keystore::new(self.format.unwrap_or(KeystoreFormat::Pkcs12));
        match self.settings {
            Some(settings) => keystore.with_settings(settings),
            None => keystore,
        }
    }

    /// Load a keystore file
    pub fn load(self, path: impl AsRef<Path>, password: &str) -> Result<Keystore> {
        let keystore = match self.format {
            Some(format) => certkit_keystore::load_file_as(format, path.as_ref(), password)?,
            None => certkit_keystore::load_file(path.as_ref(), password)?,
        };
        Ok(match self.settings {
            Some(settings) => keystore.with_settings(settings),
            None => keystore,
        })
    }

    /// Save `keystore` to a file
    pub fn save(self, keystore: &Keystore, path: impl AsRef<Path>, password: &str) -> Result<()> {
        match self.settings {
            Some(settings) => {
                let keystore = keystore.clone().with_settings(settings);
                certkit_keystore::save(&keystore, path.as_ref(), password)
            }
            None => certkit_keystore::save(keystore, path.as_ref(), password),
        }
    }

    /// Whether the file is a keystore that opens with `password`
    pub fn check(self, path: impl AsRef<Path>, password: &str) -> bool {
        match self.format {
            Some(format) => certkit_keystore::check_as(path.as_ref(), password, format),
            None => certkit_keystore::check(path.as_ref(), password),
        }
    }

    /// The single key pair of a keystore file
    pub fn read_key_pair(self, path: impl AsRef<Path>, password: &str) -> Result<KeyPair> {
        let keystore = self.load(path, password)?;
        let alias = keystore.single_key_pair_alias()?;
        keystore.key_pair(alias, password)
    }

    /// Alias of the single key pair of a keystore file
    pub fn key_pair_alias(self, path: impl AsRef<Path>, password: &str) -> Result<String> {
        let keystore = self.load(path, password)?;
        Ok(keystore.single_key_pair_alias()?.to_string())
    }
}
