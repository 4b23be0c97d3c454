use std::time::SystemTime;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntryType {
    File,
    Directory,
}

/// Metadata snapshot of a file or directory.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    name: String,
    entry_type: EntryType,
    size: u64,
    mode: u32,
    mod_time: SystemTime,
}

impl FileInfo {
    pub fn new<S: Into<String>>(
        name: S,
        entry_type: EntryType,
        size: u64,
        mode: u32,
        mod_time: SystemTime,
    ) -> FileInfo {
        FileInfo {
            name: name.into(),
            entry_type,
            size,
            mode,
            mod_time,
        }
    }

    pub(crate) fn from_metadata<S: Into<String>>(name: S, md: &std::fs::Metadata) -> FileInfo {
        let entry_type = if md.is_dir() {
            EntryType::Directory
        } else {
            EntryType::File
        };
        FileInfo {
            name: name.into(),
            entry_type,
            size: md.len(),
            mode: host_mode(md),
            mod_time: md.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        }
    }

    /// Base name of the entry.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    /// Length in bytes. Zero for in-memory directories.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Permission bits.
    pub fn mode(&self) -> u32 {
        self.mode
    }

    pub fn mod_time(&self) -> SystemTime {
        self.mod_time
    }

    pub fn is_file(&self) -> bool {
        self.entry_type == EntryType::File
    }

    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Directory
    }
}

#[cfg(unix)]
fn host_mode(md: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    md.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn host_mode(md: &std::fs::Metadata) -> u32 {
    if md.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}
