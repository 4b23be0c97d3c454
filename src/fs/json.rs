//! JSON documents stored on any backend.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::{FsBackend, FsFile, OpenOptions};

/// Decodes the JSON document stored at `path`.
pub fn load_json<T, F, P>(fs: &F, path: P) -> Result<T>
where
    T: DeserializeOwned,
    F: FsBackend + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut file = fs
        .open(path)
        .with_context(|| format!("failed to open '{}'", path.display()))?;
    let value = serde_json::from_reader(file.io())
        .with_context(|| format!("failed to decode '{}'", path.display()))?;
    file.close()?;
    Ok(value)
}

/// Writes `value` as JSON to `path`, creating or truncating the file.
/// The document ends with a newline.
pub fn save_json<T, F, P>(fs: &F, path: P, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FsBackend + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut file = fs
        .open_file(
            path,
            OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true),
        )
        .with_context(|| format!("failed to create '{}'", path.display()))?;

    let mut out = file.io();
    serde_json::to_writer(&mut out, value)
        .with_context(|| format!("failed to encode '{}'", path.display()))?;
    out.write_all(b"\n")?;
    file.close()?;
    Ok(())
}
