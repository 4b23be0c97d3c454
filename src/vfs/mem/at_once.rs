//! Read-once scratch files backed by pooled buffers.

use std::io;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use tracing::trace;

use crate::{EntryType, FileInfo};

const POOLED_CAPACITY: usize = 1024;
const MAX_IDLE: usize = 16;

/// A pool of reusable buffers for [`AtOnceFile`]s.
///
/// At most 16 idle buffers are kept, and buffers that grew past 1024 bytes are dropped
/// instead of pooled. Cloning the pool shares it.
#[derive(Debug, Clone, Default)]
pub struct BufferPool {
    buffers: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an empty at-once file using a buffer from the pool.
    pub fn open<S: Into<String>>(&self, name: S) -> AtOnceFile {
        AtOnceFile {
            pool: self.clone(),
            name: name.into(),
            data: self.take(),
            off: 0,
        }
    }

    /// Number of idle buffers.
    pub fn idle(&self) -> usize {
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn take(&self) -> Vec<u8> {
        self.buffers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(POOLED_CAPACITY))
    }

    /// Keeps `buf` for reuse unless it outgrew the pooled size or the pool is full.
    fn give(&self, mut buf: Vec<u8>) {
        if buf.capacity() > POOLED_CAPACITY {
            trace!(capacity = buf.capacity(), "dropping oversized buffer");
            return;
        }
        let mut buffers = self.buffers.lock().unwrap_or_else(PoisonError::into_inner);
        if buffers.len() < MAX_IDLE {
            buf.clear();
            buffers.push(buf);
        }
    }
}

/// An anonymous in-memory file whose reads consume the data.
///
/// Writes append. When the buffer runs out of room, the consumed prefix is dropped first and
/// the buffer is only reallocated (to `capacity * 2 + n`) if that is not enough. The buffer
/// goes back to its pool when the file is closed or dropped.
///
/// ### Example
/// ```
/// use std::io::{Read, Write};
/// use wfs_kit::BufferPool;
///
/// let pool = BufferPool::new();
/// let mut file = pool.open("body");
/// file.write_all(b"payload").unwrap();
///
/// let mut out = String::new();
/// file.read_to_string(&mut out).unwrap();
/// assert_eq!(out, "payload");
/// file.close();
/// assert_eq!(pool.idle(), 1);
/// ```
#[derive(Debug)]
pub struct AtOnceFile {
    pool: BufferPool,
    name: String,
    data: Vec<u8>,
    off: usize,
}

impl AtOnceFile {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bytes written and not read yet.
    pub fn len(&self) -> usize {
        self.data.len() - self.off
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stat(&self) -> FileInfo {
        FileInfo::new(
            self.name.clone(),
            EntryType::File,
            self.len() as u64,
            0o666,
            SystemTime::now(),
        )
    }

    /// Discards the content and returns the buffer to the pool.
    pub fn close(self) {}
}

impl io::Read for AtOnceFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.off >= self.data.len() {
            self.data.clear();
            self.off = 0;
            return Ok(0);
        }
        let n = buf.len().min(self.data.len() - self.off);
        buf[..n].copy_from_slice(&self.data[self.off..self.off + n]);
        self.off += n;
        Ok(n)
    }
}

impl io::Write for AtOnceFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = buf.len();
        let capacity = self.data.capacity();
        if n > capacity - self.data.len() {
            let unread = self.data.len() - self.off;
            if n <= capacity - unread {
                self.data.drain(..self.off);
            } else {
                let grown = capacity * 2 + n;
                trace!(from = capacity, to = grown, "growing at-once file");
                let mut next = Vec::with_capacity(grown);
                next.extend_from_slice(&self.data[self.off..]);
                self.data = next;
            }
            self.off = 0;
        }
        self.data.extend_from_slice(buf);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for AtOnceFile {
    fn drop(&mut self) {
        self.pool.give(std::mem::take(&mut self.data));
    }
}
