//! Secret keying material and the keyed bucket hash built on it.
//!
//! Bucket placement is SipHash-2-4 over the raw key bytes, keyed with a
//! 128-bit secret. Without the secret an adversary cannot predict which
//! bucket a key lands in, so crafted keys cannot pile into one chain.

use crate::error::{Result, TableError};
use core::fmt;
use core::hash::Hasher;
use siphasher::sip::SipHasher24;

/// Length of the secret in bytes.
pub const SECRET_LEN: usize = 16;

/// 128-bit key for the bucket hash. `Debug` never prints the bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret([u8; SECRET_LEN]);

impl Secret {
    pub const fn new(bytes: [u8; SECRET_LEN]) -> Self {
        Secret(bytes)
    }

    /// Draw a fresh secret from the thread-local, OS-seeded RNG.
    pub fn random() -> Self {
        Secret(rand::random::<[u8; SECRET_LEN]>())
    }

    /// Parse 32 hex digits.
    pub fn from_hex(s: &str) -> Result<Self> {
        let mut bytes = [0u8; SECRET_LEN];
        hex::decode_to_slice(s.trim(), &mut bytes)
            .map_err(|_| TableError::InvalidArgument("secret must be 32 hex digits"))?;
        Ok(Secret(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; SECRET_LEN] {
        &self.0
    }
}

impl From<[u8; SECRET_LEN]> for Secret {
    fn from(bytes: [u8; SECRET_LEN]) -> Self {
        Secret(bytes)
    }
}

impl TryFrom<&[u8]> for Secret {
    type Error = TableError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        <[u8; SECRET_LEN]>::try_from(bytes)
            .map(Secret)
            .map_err(|_| TableError::InvalidArgument("secret must be exactly 16 bytes"))
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// SipHash-2-4 keyed with a [`Secret`].
#[derive(Clone)]
pub(crate) struct KeyedHasher {
    key: [u8; SECRET_LEN],
}

impl KeyedHasher {
    pub(crate) fn new(secret: &Secret) -> Self {
        Self {
            key: *secret.as_bytes(),
        }
    }

    /// Hash the raw bytes; no length prefix is mixed in.
    #[inline]
    pub(crate) fn hash(&self, key: &[u8]) -> u64 {
        let mut h = SipHasher24::new_with_key(&self.key);
        h.write(key);
        h.finish()
    }

    /// Bucket index for `key` in a table of `bucket_count` buckets.
    /// `bucket_count` must be non-zero.
    #[inline]
    pub(crate) fn bucket(&self, key: &[u8], bucket_count: usize) -> usize {
        (self.hash(key) % bucket_count as u64) as usize
    }
}

impl fmt::Debug for KeyedHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyedHasher(SipHash-2-4)")
    }
}
