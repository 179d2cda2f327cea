//! Master builder for all certkit operations
//!
//! Unified entry point, split by resolver.

#[cfg(feature = "certificate")]
mod certificate;
#[cfg(feature = "certificate")]
mod core;
#[cfg(feature = "keystore")]
mod keystore;

#[cfg(feature = "certificate")]
pub use self::core::Certkit;

#[cfg(feature = "certificate")]
pub use certificate::CertificateMasterBuilder;

#[cfg(feature = "keystore")]
pub use keystore::KeystoreMasterBuilder;
