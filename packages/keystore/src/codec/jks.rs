//! JKS and JCEKS container encoding
//!
//! Both formats share one layout and differ only in magic number, the
//! private key protector and JCEKS' support for secret keys:
//!
//! ```text
//! magic u32 | version u32 | count u32
//! count * ( tag u32 | alias UTF | date u64 | body )
//! SHA-1( UTF-16BE(password) | "Mighty Aphrodite" | everything above )
//! ```

use super::data::{DataReader, DataWriter};
use super::protector::{self, EncryptedPrivateKeyInfo};
use super::sealed_object::read_serialized_object;
use crate::entry::{
    KeystoreEntry, PrivateKeyEntry, ProtectedKey, SecretKeyEntry, TrustedCertificateEntry,
};
use crate::error::{KeystoreError, Result};
use crate::format::KeystoreFormat;
use certkit_certificate::Certificate;
use chrono::{DateTime, Utc};
use der::Decode;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;

const VERSION_1: u32 = 1;
const VERSION_2: u32 = 2;

const TAG_PRIVATE_KEY: u32 = 1;
const TAG_TRUSTED_CERT: u32 = 2;
const TAG_SECRET_KEY: u32 = 3;

const CERT_TYPE: &str = "X.509";
const INTEGRITY_SALT: &[u8] = b"Mighty Aphrodite";
const DIGEST_LEN: usize = 20;

fn integrity_digest(password: &str, body: &[u8]) -> impl AsRef<[u8]> {
    let mut hasher = Sha1::new();
    for unit in password.encode_utf16() {
        hasher.update(unit.to_be_bytes());
    }
    hasher.update(INTEGRITY_SALT);
    hasher.update(body);
    hasher.finalize()
}

fn date_from_millis(millis: u64) -> Option<DateTime<Utc>> {
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

fn millis(created: Option<DateTime<Utc>>) -> u64 {
    let created = created.unwrap_or_else(Utc::now);
    u64::try_from(created.timestamp_millis()).unwrap_or(0)
}

/// Decode a JKS or JCEKS keystore and verify its integrity digest
pub(crate) fn decode(
    format: KeystoreFormat,
    data: &[u8],
    password: &str,
) -> Result<BTreeMap<String, KeystoreEntry>> {
    let mut reader = DataReader::new(data, format);

    let magic = reader.u32()?.to_be_bytes();
    if Some(magic) != format.magic() {
        return Err(reader.error(format!("bad magic number {}", hex::encode_upper(magic))));
    }
    let version = reader.u32()?;
    if version != VERSION_1 && version != VERSION_2 {
        return Err(reader.error(format!("unsupported version {version}")));
    }

    let count = reader.u32()?;
    let mut entries = BTreeMap::new();
    for _ in 0..count {
        let tag = reader.u32()?;
        let alias = reader.utf()?;
        let created = date_from_millis(reader.u64()?);

        let entry = match tag {
            TAG_PRIVATE_KEY => {
                let sealed = reader.block()?.to_vec();
                let key = match format {
                    KeystoreFormat::Jceks => ProtectedKey::Jceks(sealed),
                    _ => ProtectedKey::Jks(sealed),
                };
                let chain_len = reader.u32()?;
                let mut chain = Vec::new();
                for _ in 0..chain_len {
                    chain.push(read_certificate(&mut reader, version)?);
                }
                KeystoreEntry::PrivateKey(PrivateKeyEntry {
                    key,
                    chain,
                    created,
                })
            }
            TAG_TRUSTED_CERT => KeystoreEntry::TrustedCertificate(TrustedCertificateEntry {
                certificate: read_certificate(&mut reader, version)?,
                created,
            }),
            TAG_SECRET_KEY if format == KeystoreFormat::Jceks => {
                KeystoreEntry::SecretKey(SecretKeyEntry {
                    sealed: read_serialized_object(&mut reader)?.to_vec(),
                    created,
                })
            }
            other => return Err(reader.error(format!("unknown entry tag {other}"))),
        };

        tracing::trace!(%format, alias = %alias, kind = entry.kind(), "Read keystore entry");
        if entries.insert(alias.clone(), entry).is_some() {
            tracing::warn!(%format, alias = %alias, "Duplicate alias, keeping the last entry");
        }
    }

    let expected = integrity_digest(password, reader.consumed());
    let stored = reader.bytes(DIGEST_LEN)?;
    if expected.as_ref() != stored {
        return Err(KeystoreError::IntegrityCheckFailed);
    }
    if !reader.remaining().is_empty() {
        tracing::warn!(
            %format,
            trailing = reader.remaining().len(),
            "Ignoring data after keystore digest"
        );
    }

    Ok(entries)
}

fn read_certificate(reader: &mut DataReader<'_>, version: u32) -> Result<Certificate> {
    if version == VERSION_2 {
        let cert_type = reader.utf()?;
        if cert_type != CERT_TYPE {
            return Err(reader.error(format!("unsupported certificate type {cert_type:?}")));
        }
    }
    let der = reader.block()?;
    Ok(Certificate::from_der(der)?)
}

/// Encode entries as a version 2 JKS or JCEKS keystore
pub(crate) fn encode<'e>(
    format: KeystoreFormat,
    entries: impl IntoIterator<Item = (&'e String, &'e KeystoreEntry)>,
    password: &str,
) -> Result<Vec<u8>> {
    let magic = format
        .magic()
        .ok_or_else(|| KeystoreError::internal(format!("{format} is not a JKS style format")))?;

    let entries: Vec<_> = entries.into_iter().collect();
    let count = u32::try_from(entries.len())
        .map_err(|_| KeystoreError::internal("too many entries"))?;

    let mut writer = DataWriter::new();
    writer.bytes(&magic);
    writer.u32(VERSION_2);
    writer.u32(count);

    for (alias, entry) in entries {
        match entry {
            KeystoreEntry::PrivateKey(key_entry) => {
                let sealed = match (&key_entry.key, format) {
                    (ProtectedKey::Jks(sealed), KeystoreFormat::Jks)
                    | (ProtectedKey::Jceks(sealed), KeystoreFormat::Jceks) => sealed,
                    (key, _) => {
                        return Err(KeystoreError::unsupported_entry(
                            alias,
                            format,
                            format!("holds a {}", key.kind()),
                        ))
                    }
                };
                // Refuse to write something the loader would not read back
                EncryptedPrivateKeyInfo::from_der(sealed)?;

                writer.u32(TAG_PRIVATE_KEY);
                writer.utf(alias)?;
                writer.u64(millis(key_entry.created));
                writer.block(sealed)?;
                let chain_len = u32::try_from(key_entry.chain.len())
                    .map_err(|_| KeystoreError::internal("certificate chain too long"))?;
                writer.u32(chain_len);
                for cert in &key_entry.chain {
                    write_certificate(&mut writer, cert)?;
                }
            }
            KeystoreEntry::TrustedCertificate(cert_entry) => {
                writer.u32(TAG_TRUSTED_CERT);
                writer.utf(alias)?;
                writer.u64(millis(cert_entry.created));
                write_certificate(&mut writer, &cert_entry.certificate)?;
            }
            KeystoreEntry::SecretKey(secret) => {
                if format != KeystoreFormat::Jceks {
                    return Err(KeystoreError::unsupported_entry(
                        alias,
                        format,
                        "secret keys need JCEKS",
                    ));
                }
                writer.u32(TAG_SECRET_KEY);
                writer.utf(alias)?;
                writer.u64(millis(secret.created));
                writer.bytes(&secret.sealed);
            }
        }
    }

    let digest = integrity_digest(password, writer.as_slice());
    writer.bytes(digest.as_ref());
    Ok(writer.into_inner())
}

fn write_certificate(writer: &mut DataWriter, cert: &Certificate) -> Result<()> {
    writer.utf(CERT_TYPE)?;
    writer.block(cert.as_der())
}

/// Seal a PKCS#8 key for storage in `format`
pub(crate) fn seal(
    format: KeystoreFormat,
    pkcs8: &[u8],
    password: &str,
    jceks_iterations: u32,
) -> Result<ProtectedKey> {
    match format {
        KeystoreFormat::Jks => protector::seal_jks(pkcs8, password).map(ProtectedKey::Jks),
        KeystoreFormat::Jceks => {
            protector::seal_jceks(pkcs8, password, jceks_iterations).map(ProtectedKey::Jceks)
        }
        KeystoreFormat::Pkcs12 => Err(KeystoreError::internal(
            "PKCS12 keys are not sealed individually",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_round_trip() {
        let encoded = encode(KeystoreFormat::Jks, Vec::new(), "changeit").unwrap();
        assert_eq!(&encoded[..4], &[0xFE, 0xED, 0xFE, 0xED]);
        assert_eq!(encoded.len(), 12 + DIGEST_LEN);
        assert!(decode(KeystoreFormat::Jks, &encoded, "changeit").unwrap().is_empty());
    }

    #[test]
    fn wrong_password_fails_integrity() {
        let encoded = encode(KeystoreFormat::Jceks, Vec::new(), "changeit").unwrap();
        assert!(matches!(
            decode(KeystoreFormat::Jceks, &encoded, "changeme"),
            Err(KeystoreError::IntegrityCheckFailed)
        ));
    }

    #[test]
    fn magic_must_match_format() {
        let encoded = encode(KeystoreFormat::Jceks, Vec::new(), "pw").unwrap();
        match decode(KeystoreFormat::Jks, &encoded, "pw") {
            Err(KeystoreError::Format { message, .. }) => {
                assert!(message.ends_with("CECECECE"), "{message}")
            }
            other => panic!("Expected Format error, got {other:?}"),
        }
    }

    #[test]
    fn truncated_store_is_format_error() {
        let encoded = encode(KeystoreFormat::Jks, Vec::new(), "pw").unwrap();
        assert!(matches!(
            decode(KeystoreFormat::Jks, &encoded[..encoded.len() - 1], "pw"),
            Err(KeystoreError::Format { .. })
        ));
    }

    #[test]
    fn secret_keys_need_jceks() {
        let entry = KeystoreEntry::SecretKey(SecretKeyEntry {
            sealed: vec![0xAC, 0xED, 0x00, 0x05, 0x70],
            created: None,
        });
        let alias = String::from("shared");
        assert!(matches!(
            encode(KeystoreFormat::Jks, [(&alias, &entry)], "pw"),
            Err(KeystoreError::UnsupportedEntry { .. })
        ));
        let encoded = encode(KeystoreFormat::Jceks, [(&alias, &entry)], "pw").unwrap();
        let decoded = decode(KeystoreFormat::Jceks, &encoded, "pw").unwrap();
        assert!(matches!(decoded.get("shared"), Some(KeystoreEntry::SecretKey(_))));
    }
}
