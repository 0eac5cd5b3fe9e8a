//! KeyedHashTable: public API over `BucketChains` and `KeyedHasher`.

use crate::bucket_chains::{BucketChains, EntryKey};
use crate::buffer::copy_bytes;
use crate::error::{Result, TableError};
use crate::secret::{KeyedHasher, Secret};
use core::fmt;
use core::ops::Deref;

/// Fixed-bucket chained hash table from byte strings to byte strings.
///
/// Keys and values are copied in on insert/update and owned by the table.
/// The bucket count is chosen at creation and never changes.
pub struct KeyedHashTable {
    hasher: KeyedHasher,
    chains: BucketChains,
}

/// Borrowed view of a stored value.
///
/// The borrow keeps the table immutable, so the handle cannot outlive the
/// next `update`, `delete` or `destroy` of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueHandle<'a> {
    bytes: &'a [u8],
}

impl<'a> ValueHandle<'a> {
    /// The stored value bytes, borrowed from the table.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Length of the stored value in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false for a live entry; values are never empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl Deref for ValueHandle<'_> {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        self.bytes
    }
}

impl AsRef<[u8]> for ValueHandle<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

fn require_key(key: &[u8]) -> Result<()> {
    if key.is_empty() {
        return Err(TableError::InvalidArgument("key must not be empty"));
    }
    Ok(())
}

fn require_value(value: &[u8]) -> Result<()> {
    if value.is_empty() {
        return Err(TableError::InvalidArgument("value must not be empty"));
    }
    Ok(())
}

impl KeyedHashTable {
    /// Create a table with `bucket_count` empty chains keyed by `secret`.
    pub fn create(bucket_count: usize, secret: Secret) -> Result<Self> {
        if bucket_count == 0 {
            return Err(TableError::InvalidArgument("bucket count must be non-zero"));
        }
        let chains = BucketChains::with_buckets(bucket_count)?;
        log::debug!("created keyed table with {bucket_count} buckets");
        Ok(Self {
            hasher: KeyedHasher::new(&secret),
            chains,
        })
    }

    /// Release every entry and the bucket array. Returns the number of
    /// entries that were still live.
    pub fn destroy(mut self) -> usize {
        let released = self.chains.release_all();
        log::debug!(
            "destroyed keyed table ({} buckets, {released} entries released)",
            self.chains.bucket_count()
        );
        released
    }

    pub fn bucket_count(&self) -> usize {
        self.chains.bucket_count()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.len() == 0
    }

    #[inline]
    fn bucket_of(&self, key: &[u8]) -> usize {
        self.hasher.bucket(key, self.chains.bucket_count())
    }

    fn lookup(&self, key: &[u8]) -> Option<EntryKey> {
        self.chains.find(self.bucket_of(key), key)
    }

    /// Insert a new pair. Never overwrites: an existing key yields
    /// `DuplicateKey` and leaves the stored value alone.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        require_key(key)?;
        require_value(value)?;
        let bucket = self.bucket_of(key);
        if self.chains.find(bucket, key).is_some() {
            return Err(TableError::DuplicateKey);
        }
        // Both copies must succeed before the table is touched.
        let value = copy_bytes(value)?;
        let key = copy_bytes(key)?;
        self.chains.push_back(bucket, key, value);
        Ok(())
    }

    pub fn retrieve(&self, key: &[u8]) -> Result<ValueHandle<'_>> {
        require_key(key)?;
        let k = self.lookup(key).ok_or(TableError::NotFound)?;
        let entry = self.chains.get(k).ok_or(TableError::NotFound)?;
        Ok(ValueHandle {
            bytes: &entry.value,
        })
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        !key.is_empty() && self.lookup(key).is_some()
    }

    /// Replace the value stored under `key`.
    ///
    /// The replacement buffer is allocated and filled before the old one is
    /// released, so an `AllocationFailure` leaves the previous value intact.
    pub fn update(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        require_key(key)?;
        require_value(value)?;
        let k = self.lookup(key).ok_or(TableError::NotFound)?;
        let fresh = copy_bytes(value)?;
        let entry = self.chains.get_mut(k).ok_or(TableError::NotFound)?;
        let old = core::mem::replace(&mut entry.value, fresh);
        drop(old);
        Ok(())
    }

    /// Remove `key` and release its buffers.
    pub fn delete(&mut self, key: &[u8]) -> Result<()> {
        require_key(key)?;
        let k = self.lookup(key).ok_or(TableError::NotFound)?;
        self.chains.unlink(k).ok_or(TableError::NotFound)?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn chains(&self) -> &BucketChains {
        &self.chains
    }

    #[cfg(test)]
    pub(crate) fn bucket_index(&self, key: &[u8]) -> usize {
        self.bucket_of(key)
    }
}

impl fmt::Debug for KeyedHashTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedHashTable")
            .field("bucket_count", &self.bucket_count())
            .field("len", &self.len())
            .field("hasher", &self.hasher)
            .finish()
    }
}
