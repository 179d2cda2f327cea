//! Binary keystore formats

pub(crate) mod data;
pub(crate) mod jks;
pub(crate) mod pkcs12;
pub(crate) mod protector;
pub(crate) mod sealed_object;

use crate::config::KeystoreSettings;
use crate::entry::KeystoreEntry;
use crate::error::Result;
use crate::format::KeystoreFormat;
use std::collections::BTreeMap;

/// Decode `data` as `format`, verifying integrity with `password`
pub(crate) fn decode(
    format: KeystoreFormat,
    data: &[u8],
    password: &str,
) -> Result<BTreeMap<String, KeystoreEntry>> {
    match format {
        KeystoreFormat::Jks | KeystoreFormat::Jceks => jks::decode(format, data, password),
        KeystoreFormat::Pkcs12 => pkcs12::decode(data, password),
    }
}

/// Encode entries as `format`, protected by `password`
pub(crate) fn encode<'e>(
    format: KeystoreFormat,
    entries: impl IntoIterator<Item = (&'e String, &'e KeystoreEntry)>,
    password: &str,
    settings: &KeystoreSettings,
) -> Result<Vec<u8>> {
    match format {
        KeystoreFormat::Jks | KeystoreFormat::Jceks => jks::encode(format, entries, password),
        KeystoreFormat::Pkcs12 => pkcs12::encode(entries, password, settings),
    }
}
