//! Loading, saving and key pair resolution

use crate::codec;
use crate::error::{KeystoreError, Result};
use crate::format::KeystoreFormat;
use crate::key_pair::KeyPair;
use crate::keystore::Keystore;
use certkit_certificate::subject_common_name;
use std::fs::{self, File};
use std::io::{BufReader, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Alias of the key pair in [`save_key_pair_pkcs12`] when the leaf has no CN
const FALLBACK_ALIAS: &str = "1";

fn read_all(mut source: impl Read) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    source.read_to_end(&mut data)?;
    Ok(data)
}

/// Load a keystore of whichever format `data` is in.
///
/// Content without a JKS or JCEKS magic number is decoded as PKCS12.
pub fn load_bytes(data: &[u8], password: &str) -> Result<Keystore> {
    let format = KeystoreFormat::detect(data);
    tracing::debug!(%format, bytes = data.len(), "Detected keystore format");
    decode(format, data, password)
}

/// Load a keystore in `format`, failing if `data` is in another format
pub fn load_bytes_as(format: KeystoreFormat, data: &[u8], password: &str) -> Result<Keystore> {
    let found = KeystoreFormat::detect(data);
    if found != format {
        return Err(KeystoreError::FormatMismatch {
            expected: format,
            found,
        });
    }
    decode(format, data, password)
}

fn decode(format: KeystoreFormat, data: &[u8], password: &str) -> Result<Keystore> {
    let entries = codec::decode(format, data, password)?;
    tracing::debug!(%format, entries = entries.len(), "Loaded keystore");
    Ok(Keystore::from_entries(format, entries))
}

/// Load a keystore from a stream, detecting its format
pub fn load(source: impl Read, password: &str) -> Result<Keystore> {
    load_bytes(&read_all(source)?, password)
}

/// Load a keystore of a specific format from a stream
pub fn load_as(format: KeystoreFormat, source: impl Read, password: &str) -> Result<Keystore> {
    load_bytes_as(format, &read_all(source)?, password)
}

/// Load a keystore file, detecting its format
pub fn load_file(path: &Path, password: &str) -> Result<Keystore> {
    load(BufReader::new(File::open(path)?), password)
}

/// Load a keystore file of a specific format
pub fn load_file_as(format: KeystoreFormat, path: &Path, password: &str) -> Result<Keystore> {
    load_as(format, BufReader::new(File::open(path)?), password)
}

/// Write `keystore` to `path`, replacing any existing file atomically.
///
/// The content goes to a temporary file next to `path` which is then
/// renamed over it, so readers never see a partly written keystore.
pub fn save(keystore: &Keystore, path: &Path, password: &str) -> Result<()> {
    let bytes = keystore.to_bytes(password)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(&bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;

    tracing::debug!(
        format = %keystore.format(),
        path = %path.display(),
        entries = keystore.len(),
        "Saved keystore"
    );
    Ok(())
}

fn is_readable_file(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => true,
        Ok(_) => {
            tracing::debug!(path = %path.display(), "Keystore path is not a regular file");
            false
        }
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "Keystore path is not accessible");
            false
        }
    }
}

/// Whether `path` is a keystore that opens with `password`
pub fn check(path: &Path, password: &str) -> bool {
    if !is_readable_file(path) {
        return false;
    }
    match load_file(path, password) {
        Ok(_) => true,
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "Keystore check failed");
            false
        }
    }
}

/// Whether `path` is a `format` keystore that opens with `password`
pub fn check_as(path: &Path, password: &str, format: KeystoreFormat) -> bool {
    if !is_readable_file(path) {
        return false;
    }
    match load_file_as(format, path, password) {
        Ok(_) => true,
        Err(err) => {
            tracing::debug!(
                path = %path.display(),
                %format,
                error = %err,
                "Keystore check failed"
            );
            false
        }
    }
}

/// Read the single key pair of a keystore.
///
/// The keystore must hold exactly one private key entry, and the key must
/// be protected with the keystore password.
pub fn read_key_pair(source: impl Read, password: &str) -> Result<KeyPair> {
    let keystore = load(source, password)?;
    let alias = keystore.single_key_pair_alias()?;
    tracing::debug!(format = %keystore.format(), alias = %alias, "Resolved key pair");
    keystore.key_pair(alias, password)
}

/// [`read_key_pair`] on a file
pub fn read_key_pair_file(path: &Path, password: &str) -> Result<KeyPair> {
    read_key_pair(BufReader::new(File::open(path)?), password)
}

/// Alias of the single key pair of a keystore
pub fn key_pair_alias(source: impl Read, password: &str) -> Result<String> {
    let keystore = load(source, password)?;
    Ok(keystore.single_key_pair_alias()?.to_string())
}

/// [`key_pair_alias`] on a file
pub fn key_pair_alias_file(path: &Path, password: &str) -> Result<String> {
    key_pair_alias(BufReader::new(File::open(path)?), password)
}

/// Write `key_pair` as a PKCS12 keystore holding only that key pair.
///
/// The entry alias is the subject CN of the leaf certificate.
pub fn save_key_pair_pkcs12(
    key_pair: &KeyPair,
    destination: impl Write,
    password: &str,
) -> Result<()> {
    let alias = key_pair
        .certificate()
        .and_then(subject_common_name)
        .unwrap_or_else(|| FALLBACK_ALIAS.to_string());

    let mut keystore = Keystore::new(KeystoreFormat::Pkcs12);
    keystore.set_key_pair(&alias, key_pair, password)?;
    keystore.write_to(destination, password)
}
