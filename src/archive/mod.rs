// In: src/archive/mod.rs

//! Access to the members of an `.smlm` container and the loader that walks them.
//!
//! The container itself is a plain zip file read through the `zip` crate. The
//! loader only needs "give me the bytes of member X", so that is the whole of
//! the `ArchiveSource` trait; an in-memory implementation is provided for
//! callers that already hold the members.

use std::collections::BTreeMap;
use std::io::{Read, Seek};

use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::SmlmError;

/// Upper bound on the buffer reserved up front for one member. The size a zip
/// header declares is untrusted; reads beyond this grow the buffer as needed.
const PREALLOC_LIMIT: u64 = 16 * 1024 * 1024;

pub mod image;
pub mod loader;

pub use image::{ImageData, ImageDecoder, ImageFormat, SniffingImageDecoder};
pub use loader::{import_smlm, ArchiveLoader, EntryData, LoadedArchive, LoadedEntry};

/// Read access to the named members of an archive.
pub trait ArchiveSource {
    /// Names of all members, in container order.
    fn entry_names(&self) -> Vec<String>;

    /// Reads a member in full.
    ///
    /// # Errors
    /// `MissingArchiveEntry` if no member has that name; container or I/O
    /// errors otherwise.
    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, SmlmError>;
}

impl<R: Read + Seek> ArchiveSource for ZipArchive<R> {
    fn entry_names(&self) -> Vec<String> {
        self.file_names().map(str::to_string).collect()
    }

    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, SmlmError> {
        let mut file = match self.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => {
                return Err(SmlmError::MissingArchiveEntry(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let mut buf = Vec::with_capacity(capacity_hint(file.size()));
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }
}

fn capacity_hint(declared_size: u64) -> usize {
    usize::try_from(declared_size.min(PREALLOC_LIMIT)).unwrap_or(0)
}

/// Archive members held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> &mut Self {
        self.entries.insert(name.into(), bytes.into());
        self
    }
}

impl ArchiveSource for MemoryArchive {
    fn entry_names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>, SmlmError> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| SmlmError::MissingArchiveEntry(name.to_string()))
    }
}
