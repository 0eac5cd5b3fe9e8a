// Allocation-failure behavior of KeyedHashTable.
//
// This binary installs a global allocator that refuses exactly one request
// size. Every table buffer of that size fails to allocate, which drives the
// `AllocationFailure` paths of insert and update.
// Invariants exercised:
// - A failed update leaves the previous value retrievable.
// - A failed insert leaves the table as it was (len, presence, neighbours).
// - The table remains usable after either failure.
use keyed_table::{KeyedHashTable, Secret, TableError};
use std::alloc::{GlobalAlloc, Layout, System};
use std::ptr;

const REFUSED_SIZE: usize = 777_777;

struct RefuseOneSize;

unsafe impl GlobalAlloc for RefuseOneSize {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout.size() == REFUSED_SIZE {
            return ptr::null_mut();
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static ALLOC: RefuseOneSize = RefuseOneSize;

// A buffer of exactly REFUSED_SIZE cannot be allocated in this binary, so
// callers borrow a prefix of a larger one.
fn oversized() -> Vec<u8> {
    vec![0x5A; REFUSED_SIZE + 1]
}

fn table() -> KeyedHashTable {
    KeyedHashTable::create(2, Secret::new(*b"0123456789abcdef")).unwrap()
}

// Test: update allocates before it releases.
// Verifies: AllocationFailure is reported and the old value survives.
#[test]
fn failed_update_keeps_old_value() {
    let mut t = table();
    t.insert(b"k", b"old").unwrap();
    let big = oversized();

    assert_eq!(
        t.update(b"k", &big[..REFUSED_SIZE]),
        Err(TableError::AllocationFailure {
            bytes: REFUSED_SIZE
        })
    );
    assert_eq!(&*t.retrieve(b"k").unwrap(), b"old");
    assert_eq!(t.len(), 1);

    // Still usable: an allocatable update goes through.
    t.update(b"k", &big[..REFUSED_SIZE - 1]).unwrap();
    assert_eq!(t.retrieve(b"k").unwrap().len(), REFUSED_SIZE - 1);
}

// Test: insert copies both buffers before touching the table.
// Verifies: failure on the value or on the key leaves len and presence
// unchanged; the key can be inserted later.
#[test]
fn failed_insert_leaves_table_unchanged() {
    let mut t = table();
    t.insert(b"existing", b"v").unwrap();
    let big = oversized();

    assert_eq!(
        t.insert(b"new", &big[..REFUSED_SIZE]),
        Err(TableError::AllocationFailure {
            bytes: REFUSED_SIZE
        })
    );
    assert_eq!(t.len(), 1);
    assert!(!t.contains_key(b"new"));

    // The key copy failing must not leave the already-copied value behind.
    assert_eq!(
        t.insert(&big[..REFUSED_SIZE], b"v"),
        Err(TableError::AllocationFailure {
            bytes: REFUSED_SIZE
        })
    );
    assert_eq!(t.len(), 1);
    assert!(!t.contains_key(&big[..REFUSED_SIZE]));
    assert_eq!(&*t.retrieve(b"existing").unwrap(), b"v");

    t.insert(b"new", b"later").unwrap();
    assert_eq!(&*t.retrieve(b"new").unwrap(), b"later");
    assert_eq!(t.destroy(), 2);
}
