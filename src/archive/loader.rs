// In: src/archive/loader.rs

//! The archive orchestrator.
//!
//! `ArchiveLoader` reads `manifest.json` once, then walks `files` in declared
//! order and dispatches on each entry's type:
//!
//! * `table` -> format resolution, table decoding, statistics
//! * `image` -> the configured `ImageDecoder`
//! * anything else -> logged and skipped
//!
//! Results are returned as a fresh `Vec<LoadedEntry>`; the parsed manifest is
//! never mutated. A payload that the manifest lists but the archive lacks is
//! logged and skipped. Every other entry-level failure follows the configured
//! `EntryFailurePolicy`. Manifest-level failures always abort before any entry
//! is touched.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use zip::ZipArchive;

use super::image::{ImageData, ImageDecoder, SniffingImageDecoder};
use super::ArchiveSource;
use crate::config::{EntryFailurePolicy, LoaderConfig};
use crate::error::SmlmError;
use crate::manifest::{parse_manifest, EntryKind, FileEntry, Manifest, MANIFEST_ENTRY_NAME};
use crate::table::{decode_table, select_decoder, TableData, TableDecoder};

//==================================================================================
// 1. Result Types
//==================================================================================

/// The decoded payload of one entry.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryData {
    Table(TableData),
    Image(ImageData),
}

/// A manifest entry paired with its decoded payload, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedEntry {
    pub entry: FileEntry,
    /// `None` for skipped entries: unknown types, missing payloads, and
    /// failures tolerated under `EntryFailurePolicy::Skip`.
    pub data: Option<EntryData>,
}

impl LoadedEntry {
    pub fn table(&self) -> Option<&TableData> {
        match &self.data {
            Some(EntryData::Table(table)) => Some(table),
            _ => None,
        }
    }

    pub fn image(&self) -> Option<&ImageData> {
        match &self.data {
            Some(EntryData::Image(image)) => Some(image),
            _ => None,
        }
    }
}

/// Everything a load produces: the manifest as parsed, and one `LoadedEntry`
/// per manifest file entry, in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedArchive {
    pub manifest: Manifest,
    pub entries: Vec<LoadedEntry>,
}

impl LoadedArchive {
    /// Decoded tables in manifest order, with their entry names.
    pub fn tables(&self) -> impl Iterator<Item = (&str, &TableData)> {
        self.entries
            .iter()
            .filter_map(|e| e.table().map(|t| (e.entry.name.as_str(), t)))
    }
}

//==================================================================================
// 2. The Loader
//==================================================================================

pub struct ArchiveLoader {
    config: LoaderConfig,
    decoder: Box<dyn TableDecoder>,
    image_decoder: Box<dyn ImageDecoder>,
}

impl ArchiveLoader {
    /// Builds a loader, selecting its table decoder once from `config`.
    pub fn new(config: LoaderConfig) -> Self {
        let decoder = select_decoder(config.decode_strategy);
        Self {
            config,
            decoder,
            image_decoder: Box::new(SniffingImageDecoder),
        }
    }

    /// Replaces the image collaborator.
    pub fn with_image_decoder(mut self, image_decoder: Box<dyn ImageDecoder>) -> Self {
        self.image_decoder = image_decoder;
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Name of the table decoder selected at construction.
    pub fn decoder_name(&self) -> &'static str {
        self.decoder.name()
    }

    /// Opens the archive at `path`, loads it, and closes it again on every exit path.
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<LoadedArchive, SmlmError> {
        let path = path.as_ref();
        log::info!("Opening archive {}", path.display());
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;
        self.load(&mut archive)
    }

    /// Loads an archive held entirely in memory.
    pub fn load_bytes(&self, bytes: &[u8]) -> Result<LoadedArchive, SmlmError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        self.load(&mut archive)
    }

    /// Loads every entry of an already-open archive.
    pub fn load<A: ArchiveSource + ?Sized>(&self, archive: &mut A) -> Result<LoadedArchive, SmlmError> {
        let manifest_bytes = match archive.read_entry(MANIFEST_ENTRY_NAME) {
            Err(SmlmError::MissingArchiveEntry(_)) => {
                return Err(SmlmError::InvalidManifest(format!(
                    "no {} found in the archive",
                    MANIFEST_ENTRY_NAME
                )))
            }
            result => result?,
        };
        let manifest = parse_manifest(&manifest_bytes)?;

        let mut entries = Vec::with_capacity(manifest.files.len());
        for (index, entry) in manifest.files.iter().enumerate() {
            let data = match self.load_entry(archive, &manifest, entry) {
                Ok(data) => data,
                Err(e) if e.is_missing_payload() => {
                    log::error!("Did not find {} in the archive, skipping", entry.name);
                    None
                }
                Err(e) => match self.config.entry_failure {
                    EntryFailurePolicy::Abort => {
                        return Err(SmlmError::EntryFailed {
                            entry: entry.name.clone(),
                            source: Box::new(e),
                        })
                    }
                    EntryFailurePolicy::Skip => {
                        log::warn!("Skipping entry {} ('{}'): {}", index, entry.name, e);
                        None
                    }
                },
            };
            entries.push(LoadedEntry {
                entry: entry.clone(),
                data,
            });
        }

        Ok(LoadedArchive { manifest, entries })
    }

    fn load_entry<A: ArchiveSource + ?Sized>(
        &self,
        archive: &mut A,
        manifest: &Manifest,
        entry: &FileEntry,
    ) -> Result<Option<EntryData>, SmlmError> {
        match &entry.kind {
            EntryKind::Table => {
                let table = self.load_table(archive, manifest, entry)?;
                Ok(Some(EntryData::Table(table)))
            }
            EntryKind::Image => self.load_image(archive, manifest, entry),
            EntryKind::Other(kind) => {
                let reason = SmlmError::UnrecognizedEntryType(kind.clone());
                log::info!("{}, ignoring '{}'", reason, entry.name);
                Ok(None)
            }
        }
    }

    fn load_table<A: ArchiveSource + ?Sized>(
        &self,
        archive: &mut A,
        manifest: &Manifest,
        entry: &FileEntry,
    ) -> Result<TableData, SmlmError> {
        log::info!("Loading table {}", entry.name);
        let spec = manifest.format_for(entry)?;
        // An unsupported mode fails the entry whether or not its payload exists.
        spec.mode()?;

        let rows = entry.rows.ok_or_else(|| {
            SmlmError::InvalidManifest(format!("table entry '{}' has no 'rows'", entry.name))
        })?;
        let format_key = entry.format.as_deref().unwrap_or_default();

        let bytes = archive.read_entry(&entry.name)?;
        log::info!("Loading table file {}: {} bytes", entry.name, bytes.len());

        let table = decode_table(self.decoder.as_ref(), format_key, spec, &bytes, rows)?;
        log::info!("Table file loaded: {} ({} rows)", entry.name, table.rows());
        Ok(table)
    }

    fn load_image<A: ArchiveSource + ?Sized>(
        &self,
        archive: &mut A,
        manifest: &Manifest,
        entry: &FileEntry,
    ) -> Result<Option<EntryData>, SmlmError> {
        if !self.config.decode_images {
            log::info!("Image decoding disabled, skipping {}", entry.name);
            return Ok(None);
        }
        if let Some(spec) = entry.format.as_ref().and_then(|key| manifest.formats.get(key)) {
            spec.mode()?;
        }

        let bytes = archive.read_entry(&entry.name)?;
        let image = self.image_decoder.decode(&entry.name, bytes)?;
        log::info!("Image file loaded: {}", entry.name);
        Ok(Some(EntryData::Image(image)))
    }
}

impl Default for ArchiveLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

/// Loads an `.smlm` file with the default configuration.
pub fn import_smlm(path: impl AsRef<Path>) -> Result<LoadedArchive, SmlmError> {
    ArchiveLoader::default().load_path(path)
}
