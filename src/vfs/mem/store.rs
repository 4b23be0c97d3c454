//! Growable byte buffer backing one in-memory file.

use tracing::trace;

use crate::core::{FsError, Result};

/// A resizable byte buffer with random-access read, write and truncate.
///
/// The allocated buffer is the capacity; the logical size is tracked separately and is
/// never inferred from the capacity. When a write or truncate needs more room than the
/// capacity, the buffer is reallocated to `max(capacity * 2, required)`, the live bytes are
/// copied over and the old buffer is dropped. Shrinking only moves the logical size.
///
/// Bytes exposed by growing past the current size (a write beyond the end, or a truncate
/// upwards) always read as zero, even when the capacity already held older content.
///
/// ### Example
/// ```
/// use wfs_kit::ByteStore;
///
/// let mut store = ByteStore::with_capacity(4);
/// store.write(b"hello", 0).unwrap();
/// assert_eq!(store.len(), 5);
/// assert_eq!(store.capacity(), 8);
///
/// let mut buf = [0u8; 3];
/// assert_eq!(store.read(&mut buf, 2), 3);
/// assert_eq!(&buf, b"llo");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ByteStore {
    buf: Vec<u8>, // allocated capacity, fully initialized
    len: usize,   // logical size
}

impl ByteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            len: 0,
        }
    }

    /// Logical size in bytes.
    pub fn len(&self) -> u64 {
        self.len as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// The live content.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Copies bytes starting at `offset` into `buf` and returns how many were copied.
    /// Returns `0` when `offset` is at or past the end.
    pub fn read(&self, buf: &mut [u8], offset: u64) -> usize {
        let Ok(offset) = usize::try_from(offset) else {
            return 0;
        };
        if offset >= self.len {
            return 0;
        }
        let n = buf.len().min(self.len - offset);
        buf[..n].copy_from_slice(&self.buf[offset..offset + n]);
        n
    }

    /// Writes all of `data` at `offset`, growing the store as needed. Never writes short.
    pub fn write(&mut self, data: &[u8], offset: u64) -> Result<usize> {
        let start = to_index(offset)?;
        let end = start
            .checked_add(data.len())
            .ok_or_else(|| FsError::invalid("write: offset out of range"))?;
        self.reserve(end)?;
        if start > self.len {
            self.buf[self.len..start].fill(0);
        }
        self.buf[start..end].copy_from_slice(data);
        self.len = self.len.max(end);
        Ok(data.len())
    }

    /// Sets the logical size to `size`. Capacity is kept when shrinking.
    pub fn truncate(&mut self, size: u64) -> Result<()> {
        let size = to_index(size)?;
        if size > self.len {
            self.reserve(size)?;
            self.buf[self.len..size].fill(0);
        }
        self.len = size;
        Ok(())
    }

    fn reserve(&mut self, required: usize) -> Result<()> {
        let capacity = self.buf.len();
        if required <= capacity {
            return Ok(());
        }
        let grown = capacity.saturating_mul(2).max(required);
        trace!(from = capacity, to = grown, "reallocating byte store");

        let mut next = Vec::new();
        next.try_reserve_exact(grown)
            .map_err(|_| FsError::invalid(format!("cannot allocate {grown} bytes")))?;
        next.extend_from_slice(&self.buf[..self.len]);
        next.resize(grown, 0);
        self.buf = next;
        Ok(())
    }
}

fn to_index(offset: u64) -> Result<usize> {
    usize::try_from(offset).map_err(|_| FsError::invalid(format!("offset {offset} out of range")))
}
