//! File-based storage backend

use crate::{
    error::{Result, StorageError},
    schemas::{decode_array, ARRAY_EXTENSION, HEADER_SIZE},
    traits::{BackingReader, RawArray, Source},
};

use memmap2::Mmap;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Root directory of each backing table
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceRoots {
    /// Galaxy property table
    pub properties: PathBuf,
    /// Position table
    pub positions: PathBuf,
    /// Snip path table
    pub snip_paths: PathBuf,
    /// Interpolated track table
    pub tracks: PathBuf,
}

impl SourceRoots {
    /// Lay the four tables out as subdirectories of one base directory
    pub fn under<P: AsRef<Path>>(base: P) -> Self {
        let base = base.as_ref();
        Self {
            properties: base.join(Source::Properties.as_str()),
            positions: base.join(Source::Positions.as_str()),
            snip_paths: base.join(Source::SnipPaths.as_str()),
            tracks: base.join(Source::Tracks.as_str()),
        }
    }

    /// Root directory for one source
    pub fn root(&self, source: Source) -> &Path {
        match source {
            Source::Properties => &self.properties,
            Source::Positions => &self.positions,
            Source::SnipPaths => &self.snip_paths,
            Source::Tracks => &self.tracks,
        }
    }
}

/// File-based backing reader.
///
/// Each key is one `.hlar` file below the source's root; `/` in a key maps
/// to a subdirectory (`Snepshot_0003/Coordinates` →
/// `<snip_paths>/Snepshot_0003/Coordinates.hlar`). Files are memory-mapped
/// for the duration of a single read.
#[derive(Debug, Clone)]
pub struct FileReader {
    roots: SourceRoots,
}

impl FileReader {
    /// Create a reader over the given table roots
    pub fn new(roots: SourceRoots) -> Self {
        Self { roots }
    }

    /// Table roots
    pub fn roots(&self) -> &SourceRoots {
        &self.roots
    }

    /// Path of the file holding `key` in `source`
    pub fn array_path(&self, source: Source, key: &str) -> PathBuf {
        let mut path = self.roots.root(source).to_path_buf();
        for part in key.split('/').filter(|p| !p.is_empty()) {
            path.push(part);
        }
        path.set_extension(ARRAY_EXTENSION);
        path
    }
}

impl BackingReader for FileReader {
    fn read_raw(&self, source: Source, key: &str) -> Result<RawArray> {
        let path = self.array_path(source, key);
        log::debug!("reading {} from {}", key, path.display());

        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::not_found(source, key));
            }
            Err(e) => return Err(e.into()),
        };

        let len = file.metadata()?.len() as usize;
        if len < HEADER_SIZE {
            return Err(StorageError::invalid_format(format!(
                "{} is too small to be an array file ({} bytes)",
                path.display(),
                len
            )));
        }

        // Safety: the catalog files are read-only inputs and are not
        // modified while a read is in progress.
        let mmap = unsafe { Mmap::map(&file) }?;
        decode_array(&mmap)
    }

    fn describe(&self) -> String {
        format!("array files under {}", self.roots.properties.display())
    }
}
