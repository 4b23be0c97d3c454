mod dir_entry;
mod dir_fs;
mod entry;
mod mem;
mod mem_fs;

pub use dir_entry::DirEntry;
pub use dir_fs::{DirFS, DirFile};
pub use entry::{EntryType, FileInfo};
pub use mem::{AtOnceFile, BufferPool, ByteStore, MemFile};
pub use mem_fs::MemFS;
