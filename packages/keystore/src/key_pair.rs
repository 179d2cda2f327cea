//! Private key plus certificate chain

use certkit_certificate::Certificate;
use std::fmt;
use zeroize::Zeroizing;

/// A private key with its certificate chain, leaf certificate first.
///
/// The key is held as PKCS#8 `PrivateKeyInfo` DER and wiped on drop.
#[derive(Clone)]
pub struct KeyPair {
    private_key: Zeroizing<Vec<u8>>,
    chain: Vec<Certificate>,
}

impl KeyPair {
    /// Create a key pair from PKCS#8 DER and a chain ordered leaf first
    pub fn new(private_key_pkcs8: impl Into<Vec<u8>>, chain: Vec<Certificate>) -> Self {
        Self {
            private_key: Zeroizing::new(private_key_pkcs8.into()),
            chain,
        }
    }

    pub(crate) fn from_zeroizing(private_key: Zeroizing<Vec<u8>>, chain: Vec<Certificate>) -> Self {
        Self { private_key, chain }
    }

    /// PKCS#8 `PrivateKeyInfo` DER of the private key
    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }

    /// Certificate chain, leaf first
    pub fn chain(&self) -> &[Certificate] {
        &self.chain
    }

    /// The leaf certificate
    pub fn certificate(&self) -> Option<&Certificate> {
        self.chain.first()
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("private_key", &"<redacted>")
            .field("chain_length", &self.chain.len())
            .finish()
    }
}
