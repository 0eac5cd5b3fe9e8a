//! BucketChains: structural layer holding entries in a generational arena
//! and threading them into one doubly linked chain per bucket.
//!
//! Chain links are arena keys, not owning pointers: the arena owns every
//! entry, and `prev`/`next` are back-references used only to unlink in
//! O(1). This layer never hashes; callers pass the bucket index.

use crate::buffer::filled_vec;
use crate::error::Result;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Stable, generational reference to an entry in the arena.
    pub(crate) struct EntryKey;
}

#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) key: Box<[u8]>,
    pub(crate) value: Box<[u8]>,
    pub(crate) bucket: usize,
    prev: Option<EntryKey>,
    next: Option<EntryKey>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Chain {
    head: Option<EntryKey>,
    tail: Option<EntryKey>,
}

#[derive(Debug)]
pub(crate) struct BucketChains {
    chains: Vec<Chain>,
    entries: SlotMap<EntryKey, Entry>,
}

impl BucketChains {
    /// `bucket_count` empty chains. The caller guarantees it is non-zero.
    pub(crate) fn with_buckets(bucket_count: usize) -> Result<Self> {
        Ok(Self {
            chains: filled_vec(bucket_count, Chain::default())?,
            entries: SlotMap::with_key(),
        })
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.chains.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// First entry in `bucket` whose key equals `key` in length and bytes.
    pub(crate) fn find(&self, bucket: usize, key: &[u8]) -> Option<EntryKey> {
        let mut cur = self.chains[bucket].head;
        while let Some(k) = cur {
            let e = &self.entries[k];
            if e.key.len() == key.len() && *e.key == *key {
                return Some(k);
            }
            cur = e.next;
        }
        None
    }

    /// Append a new entry at the tail of `bucket`'s chain.
    pub(crate) fn push_back(
        &mut self,
        bucket: usize,
        key: Box<[u8]>,
        value: Box<[u8]>,
    ) -> EntryKey {
        let old_tail = self.chains[bucket].tail;
        let k = self.entries.insert(Entry {
            key,
            value,
            bucket,
            prev: old_tail,
            next: None,
        });
        match old_tail {
            Some(t) => self.entries[t].next = Some(k),
            None => self.chains[bucket].head = Some(k),
        }
        self.chains[bucket].tail = Some(k);
        k
    }

    /// Unlink `k` from its chain and hand the entry back to the caller.
    pub(crate) fn unlink(&mut self, k: EntryKey) -> Option<Entry> {
        let entry = self.entries.remove(k)?;
        let chain = &mut self.chains[entry.bucket];
        match entry.prev {
            Some(p) => self.entries[p].next = entry.next,
            None => chain.head = entry.next,
        }
        match entry.next {
            Some(n) => self.entries[n].prev = entry.prev,
            None => chain.tail = entry.prev,
        }
        Some(entry)
    }

    pub(crate) fn get(&self, k: EntryKey) -> Option<&Entry> {
        self.entries.get(k)
    }

    pub(crate) fn get_mut(&mut self, k: EntryKey) -> Option<&mut Entry> {
        self.entries.get_mut(k)
    }

    /// Walk every chain head to tail, unlinking and dropping each entry.
    /// Returns how many entries were released.
    pub(crate) fn release_all(&mut self) -> usize {
        let mut released = 0;
        for bucket in 0..self.chains.len() {
            while let Some(head) = self.chains[bucket].head {
                if self.unlink(head).is_none() {
                    break;
                }
                released += 1;
            }
        }
        debug_assert!(self.entries.is_empty());
        released
    }

    /// Keys of `bucket` in chain order.
    #[cfg(test)]
    pub(crate) fn chain_keys(&self, bucket: usize) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        let mut cur = self.chains[bucket].head;
        while let Some(k) = cur {
            out.push(self.entries[k].key.to_vec());
            cur = self.entries[k].next;
        }
        out
    }

    /// Panics unless every link is consistent in both directions, every entry
    /// sits in the chain its `bucket` names, and every entry is reachable.
    #[cfg(test)]
    pub(crate) fn check_links(&self) {
        let mut reached = 0usize;
        for (bucket, chain) in self.chains.iter().enumerate() {
            let mut prev: Option<EntryKey> = None;
            let mut cur = chain.head;
            while let Some(k) = cur {
                let e = self.entries.get(k).expect("chain link to a live entry");
                assert_eq!(e.bucket, bucket, "entry linked into the wrong bucket");
                assert_eq!(e.prev, prev, "prev link does not mirror next link");
                reached += 1;
                prev = Some(k);
                cur = e.next;
            }
            assert_eq!(chain.tail, prev, "tail is not the last entry");
        }
        assert_eq!(reached, self.entries.len(), "unreachable entries in arena");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(s: &str) -> Box<[u8]> {
        s.as_bytes().into()
    }

    fn owned(keys: &[&str]) -> Vec<Vec<u8>> {
        keys.iter().map(|k| k.as_bytes().to_vec()).collect()
    }

    fn filled(keys: &[&str]) -> (BucketChains, Vec<EntryKey>) {
        let mut c = BucketChains::with_buckets(2).unwrap();
        let ks = keys
            .iter()
            .map(|k| c.push_back(0, bytes(k), bytes("v")))
            .collect();
        (c, ks)
    }

    /// Invariant: appends preserve insertion order within a bucket and leave
    /// other buckets empty.
    #[test]
    fn push_back_appends_at_tail() {
        let (c, _) = filled(&["a", "b", "c"]);
        assert_eq!(c.chain_keys(0), owned(&["a", "b", "c"]));
        assert!(c.chain_keys(1).is_empty());
        assert_eq!(c.len(), 3);
        c.check_links();
    }

    /// Invariant: removing a middle entry joins its neighbours directly.
    #[test]
    fn unlink_middle_relinks_neighbours() {
        let (mut c, ks) = filled(&["a", "b", "c"]);
        let e = c.unlink(ks[1]).unwrap();
        assert_eq!(&*e.key, b"b");
        assert_eq!(c.chain_keys(0), owned(&["a", "c"]));
        c.check_links();
    }

    /// Invariant: removing the head moves the head; removing the tail moves
    /// the tail; removing the last entry empties the chain.
    #[test]
    fn unlink_head_and_tail() {
        let (mut c, ks) = filled(&["a", "b", "c"]);
        c.unlink(ks[0]).unwrap();
        assert_eq!(c.chain_keys(0), owned(&["b", "c"]));
        c.check_links();
        c.unlink(ks[2]).unwrap();
        assert_eq!(c.chain_keys(0), owned(&["b"]));
        c.check_links();
        c.unlink(ks[1]).unwrap();
        assert!(c.chain_keys(0).is_empty());
        assert_eq!(c.len(), 0);
        c.check_links();

        // The emptied chain accepts new entries at the head again.
        c.push_back(0, bytes("d"), bytes("v"));
        assert_eq!(c.chain_keys(0), owned(&["d"]));
        c.check_links();
    }

    /// Invariant: stale keys never resolve, even after their slot is reused.
    #[test]
    fn stale_key_does_not_alias_new_entry() {
        let (mut c, ks) = filled(&["old"]);
        c.unlink(ks[0]).unwrap();
        let fresh = c.push_back(0, bytes("new"), bytes("v"));
        assert_ne!(ks[0], fresh);
        assert!(c.get(ks[0]).is_none());
        assert!(c.unlink(ks[0]).is_none());
        c.check_links();
    }

    /// Invariant: equality is by length and bytes; a prefix does not match.
    #[test]
    fn find_compares_length_and_content() {
        let (c, ks) = filled(&["ab", "abc", "a\0"]);
        assert_eq!(c.find(0, b"abc"), Some(ks[1]));
        assert_eq!(c.find(0, b"ab"), Some(ks[0]));
        assert_eq!(c.find(0, b"a\0"), Some(ks[2]));
        assert_eq!(c.find(0, b"a"), None);
        assert_eq!(c.find(1, b"ab"), None);
    }

    #[test]
    fn release_all_counts_every_entry() {
        let mut c = BucketChains::with_buckets(3).unwrap();
        for (i, k) in ["a", "b", "c", "d", "e"].iter().enumerate() {
            c.push_back(i % 3, bytes(k), bytes("v"));
        }
        assert_eq!(c.release_all(), 5);
        assert_eq!(c.len(), 0);
        for b in 0..3 {
            assert!(c.chain_keys(b).is_empty());
        }
        c.check_links();
    }
}
