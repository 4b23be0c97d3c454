//! In-memory storage engine: byte stores, the node tree and descriptors over it.

mod at_once;
mod file;
pub(crate) mod node;
mod store;

pub use at_once::{AtOnceFile, BufferPool};
pub use file::MemFile;
pub use store::ByteStore;
