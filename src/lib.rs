//! A small, pluggable filesystem kit for Rust.
//! Provides one filesystem contract with two interchangeable backends: a pass-through to a
//! real host directory and a fully in-memory tree. Ideal for tests, sandboxes and tools that
//! want to swap storage without touching their logic.
//!
//! ### Overview
//!
//! `wfs-kit` defines the generic `FsBackend` trait (open, mkdir, remove, rename, stat, read_dir)
//! and the `FsFile` descriptor trait (cursor and positional I/O, seek, truncate, close).
//! Recursive helpers such as `mkdir_all` and `remove_all` are written once against the trait and
//! work on every backend.
//!
//! **Key ideas**:
//! - **Abstraction**: `DirFS` maps to a host directory, `MemFS` keeps everything in memory.
//! - **Shared content**: several `MemFile` descriptors on one file see each other's writes but
//!   keep their own cursors.
//! - **One error taxonomy**: both backends report failures through `FsError`.
//! - **Extras**: per-process temp directories (`fs::TempRoot`), JSON documents
//!   (`fs::load_json`, `fs::save_json`) and pooled at-once files (`AtOnceFile`).
//!
//! ### Example
//!
//! ```
//! use wfs_kit::{FsBackend, FsFile, MemFS};
//!
//! let fs = MemFS::new();
//! fs.mkdir_all("/var/log", 0o755).unwrap();
//! fs.write_file("/var/log/app.log", b"started\n").unwrap();
//!
//! let mut file = fs.open("/var/log/app.log").unwrap();
//! let mut content = Vec::new();
//! file.read_to_end(&mut content).unwrap();
//! assert_eq!(content, b"started\n");
//! ```

mod core;
mod error;
pub mod fs;
mod vfs;

pub use crate::core::{
    DEFAULT_DIR_MODE, DEFAULT_FILE_MODE, FileIo, FsBackend, FsFile, OpenOptions, Result, utils,
};
pub use error::FsError;
pub use vfs::{
    AtOnceFile, BufferPool, ByteStore, DirEntry, DirFS, DirFile, EntryType, FileInfo, MemFS,
    MemFile,
};
