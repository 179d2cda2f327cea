//! Private key protection of JKS and JCEKS entries
//!
//! Both formats store a private key as a PKCS#8 `EncryptedPrivateKeyInfo`.
//! JKS uses Sun's proprietary SHA-1 keystream protector, JCEKS uses
//! PBEWithMD5AndTripleDES. Neither is strong; they are implemented for
//! interoperability only.

use crate::error::{KeystoreError, Result};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use const_oid::ObjectIdentifier;
use der::asn1::{Any, AnyRef, OctetString};
use der::{Decode, Encode, Sequence, Tag, Tagged};
use des::TdesEde3;
use md5::Md5;
use sha1::{Digest, Sha1};
use spki::AlgorithmIdentifierOwned;
use zeroize::Zeroizing;

/// Sun JKS key protector
pub(crate) const JKS_KEY_PROTECTOR: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.42.2.17.1.1");
/// PBEWithMD5AndTripleDES as used by JCEKS
pub(crate) const PBE_WITH_MD5_AND_TRIPLE_DES: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.3.6.1.4.1.42.2.19.1");

const SHA1_LEN: usize = 20;
const JCEKS_SALT_LEN: usize = 8;

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub(crate) struct EncryptedPrivateKeyInfo {
    pub encryption_algorithm: AlgorithmIdentifierOwned,
    pub encrypted_data: OctetString,
}

#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
struct PbeParameter {
    salt: OctetString,
    iteration_count: u32,
}

/// Password bytes as JKS digests them: UTF-16 big endian
fn jks_password(password: &str) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(
        password
            .encode_utf16()
            .flat_map(|unit| unit.to_be_bytes())
            .collect(),
    )
}

/// Keystream of the JKS protector: SHA-1 chained over the salt
fn jks_keystream(password: &[u8], salt: &[u8], len: usize) -> Zeroizing<Vec<u8>> {
    let mut stream = Zeroizing::new(Vec::with_capacity(len + SHA1_LEN));
    let mut block = salt.to_vec();
    while stream.len() < len {
        block = Sha1::new()
            .chain_update(password)
            .chain_update(&block)
            .finalize()
            .to_vec();
        stream.extend_from_slice(&block);
    }
    stream.truncate(len);
    stream
}

fn xor(data: &[u8], stream: &[u8]) -> Zeroizing<Vec<u8>> {
    Zeroizing::new(data.iter().zip(stream).map(|(a, b)| a ^ b).collect())
}

/// Encrypt PKCS#8 key bytes the way JKS stores them
pub(crate) fn seal_jks(pkcs8: &[u8], password: &str) -> Result<Vec<u8>> {
    let password = jks_password(password);
    let salt: [u8; SHA1_LEN] = rand::random();
    let stream = jks_keystream(&password, &salt, pkcs8.len());
    let check = Sha1::new()
        .chain_update(password.as_slice())
        .chain_update(pkcs8)
        .finalize();

    let mut data = Vec::with_capacity(pkcs8.len() + 2 * SHA1_LEN);
    data.extend_from_slice(&salt);
    data.extend_from_slice(&xor(pkcs8, &stream));
    data.extend_from_slice(&check);

    EncryptedPrivateKeyInfo {
        encryption_algorithm: AlgorithmIdentifierOwned {
            oid: JKS_KEY_PROTECTOR,
            parameters: Some(Any::null()),
        },
        encrypted_data: OctetString::new(data)?,
    }
    .to_der()
    .map_err(Into::into)
}

/// Recover PKCS#8 key bytes from a JKS protected key
pub(crate) fn unseal_jks(protected: &[u8], password: &str) -> Result<Zeroizing<Vec<u8>>> {
    let info = EncryptedPrivateKeyInfo::from_der(protected)?;
    expect_algorithm(&info, JKS_KEY_PROTECTOR)?;

    let data = info.encrypted_data.as_bytes();
    if data.len() < 2 * SHA1_LEN {
        return Err(KeystoreError::internal("JKS protected key is too short"));
    }
    let (salt, rest) = data.split_at(SHA1_LEN);
    let (encrypted, check) = rest.split_at(rest.len() - SHA1_LEN);

    let password = jks_password(password);
    let stream = jks_keystream(&password, salt, encrypted.len());
    let plain = xor(encrypted, &stream);

    let digest = Sha1::new()
        .chain_update(password.as_slice())
        .chain_update(plain.as_slice())
        .finalize();
    if digest.as_slice() != check {
        return Err(KeystoreError::WrongKeyPassword);
    }
    Ok(plain)
}

/// Password bytes for PBEWithMD5AndTripleDES, which only accepts printable ASCII
fn jceks_password(password: &str) -> Result<&[u8]> {
    if password.bytes().all(|b| (0x20..0x7F).contains(&b)) {
        Ok(password.as_bytes())
    } else {
        Err(KeystoreError::internal(
            "JCEKS key passwords must be printable ASCII",
        ))
    }
}

/// Derive the 3DES key and IV from password, salt and iteration count
fn jceks_derive(password: &[u8], salt: &[u8], iterations: u32) -> Zeroizing<Vec<u8>> {
    let mut salt = salt.to_vec();
    if salt[..4] == salt[4..] {
        // Java's provider only partly inverts the first half; keep its result
        for i in 0..2 {
            let tmp = salt[i];
            salt[i] = salt[3 - i];
            salt[2] = tmp;
        }
    }

    let mut derived = Zeroizing::new(Vec::with_capacity(32));
    for half in salt.chunks(4) {
        let mut digest = half.to_vec();
        for _ in 0..iterations.max(1) {
            digest = Md5::new()
                .chain_update(&digest)
                .chain_update(password)
                .finalize()
                .to_vec();
        }
        derived.extend_from_slice(&digest);
    }
    derived
}

fn jceks_cipher_parts(derived: &[u8]) -> (&[u8], &[u8]) {
    derived.split_at(24)
}

/// Encrypt PKCS#8 key bytes the way JCEKS stores them
pub(crate) fn seal_jceks(pkcs8: &[u8], password: &str, iterations: u32) -> Result<Vec<u8>> {
    let password = jceks_password(password)?;
    let salt: [u8; JCEKS_SALT_LEN] = rand::random();
    let derived = jceks_derive(password, &salt, iterations.max(1));
    let (key, iv) = jceks_cipher_parts(&derived);

    let encrypted = cbc::Encryptor::<TdesEde3>::new_from_slices(key, &iv[..8])
        .map_err(|e| KeystoreError::internal(format!("3DES setup failed: {e}")))?
        .encrypt_padded_vec_mut::<Pkcs7>(pkcs8);

    let parameters = PbeParameter {
        salt: OctetString::new(salt.to_vec())?,
        iteration_count: iterations.max(1),
    };
    EncryptedPrivateKeyInfo {
        encryption_algorithm: AlgorithmIdentifierOwned {
            oid: PBE_WITH_MD5_AND_TRIPLE_DES,
            parameters: Some(Any::encode_from(&parameters)?),
        },
        encrypted_data: OctetString::new(encrypted)?,
    }
    .to_der()
    .map_err(Into::into)
}

/// Recover PKCS#8 key bytes from a JCEKS protected key
pub(crate) fn unseal_jceks(protected: &[u8], password: &str) -> Result<Zeroizing<Vec<u8>>> {
    let info = EncryptedPrivateKeyInfo::from_der(protected)?;
    expect_algorithm(&info, PBE_WITH_MD5_AND_TRIPLE_DES)?;

    let parameters = info
        .encryption_algorithm
        .parameters
        .as_ref()
        .ok_or_else(|| KeystoreError::internal("PBE parameters are missing"))?
        .decode_as::<PbeParameter>()?;
    if parameters.salt.as_bytes().len() != JCEKS_SALT_LEN {
        return Err(KeystoreError::internal("PBE salt must be 8 bytes"));
    }

    let password = jceks_password(password)?;
    let derived = jceks_derive(
        password,
        parameters.salt.as_bytes(),
        parameters.iteration_count,
    );
    let (key, iv) = jceks_cipher_parts(&derived);

    let plain = cbc::Decryptor::<TdesEde3>::new_from_slices(key, &iv[..8])
        .map_err(|e| KeystoreError::internal(format!("3DES setup failed: {e}")))?
        .decrypt_padded_vec_mut::<Pkcs7>(info.encrypted_data.as_bytes())
        .map_err(|_| KeystoreError::WrongKeyPassword)?;
    let plain = Zeroizing::new(plain);

    // Padding can survive a wrong password by chance; the key must still be DER
    match AnyRef::from_der(&plain) {
        Ok(any) if any.tag() == Tag::Sequence => Ok(plain),
        _ => Err(KeystoreError::WrongKeyPassword),
    }
}

fn expect_algorithm(info: &EncryptedPrivateKeyInfo, expected: ObjectIdentifier) -> Result<()> {
    let found = info.encryption_algorithm.oid;
    if found == expected {
        Ok(())
    } else {
        Err(KeystoreError::internal(format!(
            "unsupported key protection algorithm {found}"
        )))
    }
}
