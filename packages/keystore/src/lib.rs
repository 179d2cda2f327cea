//! # certkit_keystore
//!
//! Load, inspect, edit and save JKS, JCEKS and PKCS12 keystores, and
//! resolve the single key pair a keystore holds.
//!
//! The format is detected from the content: JKS and JCEKS start with a
//! magic number, anything else is handed to the PKCS12 decoder.
//!
//! ```rust,ignore
//! use certkit_keystore::{check, read_key_pair_file};
//!
//! if check(path, "secret") {
//!     let key_pair = read_key_pair_file(path, "secret")?;
//!     println!("{} certificates", key_pair.chain().len());
//! }
//! ```
//!
//! A keystore with no private key, or with more than one, has no key pair
//! to resolve; both cases are reported as errors without unsealing any
//! key.

#![forbid(unsafe_code)]

mod codec;
pub mod config;
pub mod entry;
pub mod error;
pub mod format;
mod key_pair;
mod keystore;
mod resolver;

pub use config::{KeystoreSettings, Pkcs12Encryption, Pkcs12Mac};
pub use entry::{
    KeystoreEntry, PrivateKeyEntry, ProtectedKey, SecretKeyEntry, TrustedCertificateEntry,
};
pub use error::{KeystoreError, Result};
pub use format::{detect_format, KeystoreFormat};
pub use key_pair::KeyPair;
pub use keystore::Keystore;
pub use resolver::{
    check, check_as, key_pair_alias, key_pair_alias_file, load, load_as, load_bytes,
    load_bytes_as, load_file, load_file_as, read_key_pair, read_key_pair_file, save,
    save_key_pair_pkcs12,
};
