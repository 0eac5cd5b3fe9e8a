//! keyed-table: a fixed-bucket, chained hash table over byte strings whose
//! bucket placement is keyed with a secret to resist hash flooding.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small byte-string map whose addressing an attacker cannot
//!   steer, with exact ownership and failure semantics for every call.
//! - Layers:
//!   - BucketChains: structural layer; a `slotmap` arena owns every
//!     entry, and each bucket threads its entries into a doubly linked
//!     chain whose links are generational arena keys.
//!   - KeyedHasher: SipHash-2-4 keyed with a 128-bit `Secret`, reduced
//!     modulo the bucket count.
//!   - KeyedHashTable: public API; validates input, copies buffers in
//!     fallibly and drives the two layers above.
//!
//! Constraints
//! - Bucket count is fixed at creation; there is no resizing.
//! - Keys and values are non-empty `&[u8]`, copied in and owned by the
//!   table. Equality is by length and bytes.
//! - Duplicate inserts fail; insert never overwrites.
//! - Every failure is returned as a `TableError` and leaves the table as
//!   it was.
//! - Single-threaded: mutation takes `&mut self`; share a table only
//!   behind your own lock.
//!
//! Ownership
//! - table -> arena -> entry -> key/value buffers, strictly tree-shaped.
//!   `prev`/`next` are arena keys used to unlink in O(1), never owners.
//! - `retrieve` hands out a `ValueHandle` borrowing the value buffer, so
//!   the borrow checker rejects holding it across `update`/`delete`.
//!
//! Allocation
//! - Buffers and the bucket array are obtained with `try_reserve_exact`
//!   and surface exhaustion as `AllocationFailure`.
//! - `update` builds the replacement buffer before dropping the old one;
//!   a failed update leaves the previous value readable.
//!
//! Notes and non-goals
//! - No iteration, persistence, resizing or generic key/value types.
//! - The library never writes diagnostics itself; it emits `log` records
//!   at debug level for create/destroy only.

mod bucket_chains;
mod buffer;
pub mod error;
mod keyed_hash_table;
mod keyed_hash_table_proptest;
pub mod secret;

// Public surface
pub use error::{Result, TableError};
pub use keyed_hash_table::{KeyedHashTable, ValueHandle};
pub use secret::{Secret, SECRET_LEN};
