use crate::EntryType;

/// An item returned by `read_dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    name: String,
    kind: EntryType,
}

impl DirEntry {
    pub fn new<S: Into<String>>(name: S, kind: EntryType) -> DirEntry {
        DirEntry {
            name: name.into(),
            kind,
        }
    }

    /// Base name of the entry, without its parent path.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> EntryType {
        self.kind
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryType::Directory
    }
}
