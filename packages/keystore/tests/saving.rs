//! Writing keystores and exporting key pairs

use certkit_certificate::subject_common_name;
use certkit_keystore::{
    check, check_as, key_pair_alias, load_bytes, load_file, read_key_pair, read_key_pair_file,
    save, save_key_pair_pkcs12, Keystore, KeystoreEntry, KeystoreError, KeystoreFormat,
    KeystoreSettings,
};
use std::path::PathBuf;
use tempfile::TempDir;

fn resource(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("resources")
        .join(name)
}

#[test]
fn test_jks_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("copy.jks");

    let keystore = load_file(&resource("keyandcert.jks"), "keyandcert").unwrap();
    save(&keystore, &path, "newpass").unwrap();

    assert!(check_as(&path, "newpass", KeystoreFormat::Jks));
    assert!(!check(&path, "keyandcert"));

    let reloaded = load_file(&path, "newpass").unwrap();
    assert_eq!(reloaded.aliases().collect::<Vec<_>>(), ["ca", "partya"]);
    // the entry keeps its own password and creation date
    let pair = reloaded.key_pair("partya", "keypair").unwrap();
    assert_eq!(pair.chain().len(), 1);
    assert_eq!(
        reloaded.entry("partya").unwrap().created(),
        keystore.entry("partya").unwrap().created()
    );
}

#[test]
fn test_jceks_save_preserves_secret_keys() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("copy.jceks");

    let keystore = load_file(&resource("keypair.jceks"), "keypair").unwrap();
    save(&keystore, &path, "keypair").unwrap();

    let reloaded = load_file(&path, "keypair").unwrap();
    let (Some(KeystoreEntry::SecretKey(before)), Some(KeystoreEntry::SecretKey(after))) =
        (keystore.entry("shared"), reloaded.entry("shared"))
    else {
        panic!("secret key entry lost");
    };
    assert_eq!(before.sealed_object(), after.sealed_object());

    let pair = read_key_pair_file(&path, "keypair").unwrap();
    assert_eq!(
        pair.certificate().and_then(subject_common_name).as_deref(),
        Some("partyd.examples.certkit.org")
    );
}

#[test]
fn test_pkcs12_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("copy.p12");

    let keystore = load_file(&resource("keyandcert.p12"), "keyandcert")
        .unwrap()
        .with_settings(KeystoreSettings::fast());
    save(&keystore, &path, "other").unwrap();

    let pair = read_key_pair_file(&path, "other").unwrap();
    assert_eq!(pair.chain().len(), 2);
    let original = keystore.key_pair("partyc", "ignored").unwrap();
    assert_eq!(pair.private_key(), original.private_key());

    let reloaded = load_file(&path, "other").unwrap();
    assert!(reloaded.trusted_certificate("ca").is_some());
}

#[test]
fn test_legacy_pkcs12_settings() {
    let keystore = load_file(&resource("singlekey.p12"), "singlekey")
        .unwrap()
        .with_settings(KeystoreSettings::legacy());
    let bytes = keystore.to_bytes("legacy").unwrap();
    let reloaded = load_bytes(&bytes, "legacy").unwrap();
    assert_eq!(reloaded.single_key_pair_alias().unwrap(), "singlekey");
}

#[test]
fn test_save_overwrites_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.jks");

    let mut keystore = Keystore::new(KeystoreFormat::Jks);
    save(&keystore, &path, "pw").unwrap();
    assert!(load_file(&path, "pw").unwrap().is_empty());

    let trusted = load_file(&resource("trustedcerts.jks"), "trusted").unwrap();
    let ca = trusted.trusted_certificate("ca").unwrap().clone();
    keystore.set_trusted_certificate("CA", ca);
    save(&keystore, &path, "pw").unwrap();
    assert!(load_file(&path, "pw").unwrap().contains_alias("ca"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_failed_save_keeps_previous_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.p12");
    std::fs::copy(resource("keyandcert.p12"), &path).unwrap();
    let before = std::fs::read(&path).unwrap();

    let jceks = load_file(&resource("keypair.jceks"), "keypair").unwrap();
    let mut keystore = Keystore::new(KeystoreFormat::Pkcs12);
    keystore.set_entry("shared", jceks.entry("shared").unwrap().clone());

    assert!(save(&keystore, &path, "keyandcert").is_err());
    assert_eq!(std::fs::read(&path).unwrap(), before);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    assert!(check(&path, "keyandcert"));
}

#[test]
fn test_convert_key_pair_between_formats() {
    let pair = read_key_pair_file(&resource("singlekey.p12"), "singlekey").unwrap();

    for format in [KeystoreFormat::Jks, KeystoreFormat::Jceks] {
        let mut keystore = Keystore::new(format).with_settings(KeystoreSettings::fast());
        keystore.set_key_pair("SingleKey", &pair, "changeit").unwrap();

        let bytes = keystore.to_bytes("changeit").unwrap();
        assert_eq!(load_bytes(&bytes, "changeit").unwrap().format(), format);

        let converted = read_key_pair(bytes.as_slice(), "changeit").unwrap();
        assert_eq!(converted.private_key(), pair.private_key());
        assert_eq!(converted.chain(), pair.chain());
        assert_eq!(key_pair_alias(bytes.as_slice(), "changeit").unwrap(), "singlekey");
    }
}

#[test]
fn test_unsealed_key_does_not_fit_jks() {
    let source = load_file(&resource("keyandcert.p12"), "keyandcert").unwrap();
    let entry = source.entry("partyc").unwrap().clone();

    let mut keystore = Keystore::new(KeystoreFormat::Jks);
    keystore.set_entry("partyc", entry);
    assert!(matches!(
        keystore.to_bytes("pw"),
        Err(KeystoreError::UnsupportedEntry {
            format: KeystoreFormat::Jks,
            ..
        })
    ));
}

#[test]
fn test_secret_key_does_not_fit_pkcs12() {
    let source = load_file(&resource("sharedkey.jceks"), "sharedkey").unwrap();
    let entry = source.entry("sharedkey").unwrap().clone();

    let mut keystore = Keystore::new(KeystoreFormat::Pkcs12);
    keystore.set_entry("sharedkey", entry);
    assert!(matches!(
        keystore.to_bytes("pw"),
        Err(KeystoreError::UnsupportedEntry { .. })
    ));
}

#[test]
fn test_save_key_pair_pkcs12() {
    let pair = read_key_pair_file(&resource("keyandcert.p12"), "keyandcert").unwrap();

    let mut exported = Vec::new();
    save_key_pair_pkcs12(&pair, &mut exported, "export").unwrap();

    let keystore = load_bytes(&exported, "export").unwrap();
    assert_eq!(keystore.format(), KeystoreFormat::Pkcs12);
    assert_eq!(keystore.len(), 1);
    assert_eq!(
        key_pair_alias(exported.as_slice(), "export").unwrap(),
        "partyc.examples.certkit.org"
    );

    let reread = read_key_pair(exported.as_slice(), "export").unwrap();
    assert_eq!(reread.private_key(), pair.private_key());
    assert_eq!(reread.chain(), pair.chain());
}
