//! Fallible copies of caller-supplied bytes into table-owned buffers.

use crate::error::{Result, TableError};

/// Copy `src` into a freshly allocated buffer of exactly `src.len()` bytes.
///
/// Reports `AllocationFailure` instead of aborting when the allocator
/// refuses the request.
pub(crate) fn copy_bytes(src: &[u8]) -> Result<Box<[u8]>> {
    let mut buf: Vec<u8> = Vec::new();
    buf.try_reserve_exact(src.len())
        .map_err(|_| TableError::allocation(src.len()))?;
    buf.extend_from_slice(src);
    Ok(buf.into_boxed_slice())
}

/// Allocate `len` copies of `fill` without aborting on exhaustion.
pub(crate) fn filled_vec<T: Clone>(len: usize, fill: T) -> Result<Vec<T>> {
    let mut v: Vec<T> = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| TableError::allocation(len.saturating_mul(core::mem::size_of::<T>())))?;
    v.resize(len, fill);
    Ok(v)
}
