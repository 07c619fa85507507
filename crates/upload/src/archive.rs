//! Gzip-compressed tarball assembly.
//!
//! The archive is built entirely in memory. Every file's parent directories
//! get a directory entry of their own, emitted once, ahead of the first
//! file placed beneath them.

use crate::error::{Error, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use tar::{EntryType, Header};
use tracing::debug;

/// Incrementally builds a `.tar.gz` archive in memory.
pub struct ArchiveBuilder {
    builder: tar::Builder<GzEncoder<Vec<u8>>>,
    directories: HashSet<PathBuf>,
    entries: usize,
}

impl std::fmt::Debug for ArchiveBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveBuilder")
            .field("directories", &self.directories.len())
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    /// Start an empty archive.
    #[must_use]
    pub fn new() -> Self {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        Self {
            builder: tar::Builder::new(encoder),
            directories: HashSet::new(),
            entries: 0,
        }
    }

    /// Number of file entries added so far.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries
    }

    /// Whether no file entries have been added.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Add an in-memory blob at `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dest` is not a valid archive path or the entry
    /// cannot be written.
    pub fn add_bytes(&mut self, dest: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
        let dest = dest.as_ref();
        self.add_parent_directories(dest)?;

        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_mtime(unix_now());
        self.builder
            .append_data(&mut header, dest, contents)
            .map_err(|e| Error::archive_io(format!("Failed to add entry: {e}"), dest, e))?;

        self.entries += 1;
        debug!(dest = %dest.display(), bytes = contents.len(), "Added archive entry");
        Ok(())
    }

    /// Copy the file at `src` into the archive at `dest`.
    ///
    /// # Errors
    ///
    /// Returns an error if `src` cannot be opened or read, or the entry
    /// cannot be written.
    pub fn add_file(&mut self, src: &Path, dest: impl AsRef<Path>) -> Result<()> {
        let dest = dest.as_ref();
        let file = File::open(src)
            .map_err(|e| Error::archive_io(format!("Failed to open file: {e}"), src, e))?;
        let metadata = file
            .metadata()
            .map_err(|e| Error::archive_io(format!("Failed to read file metadata: {e}"), src, e))?;
        if !metadata.is_file() {
            return Err(Error::archive(
                "Only regular files can be archived",
                Some(src.to_path_buf()),
            ));
        }

        self.add_parent_directories(dest)?;

        let mut header = Header::new_gnu();
        header.set_metadata(&metadata);
        header.set_entry_type(EntryType::Regular);
        self.builder
            .append_data(&mut header, dest, file)
            .map_err(|e| Error::archive_io(format!("Failed to add file: {e}"), src, e))?;

        self.entries += 1;
        debug!(
            src = %src.display(),
            dest = %dest.display(),
            bytes = metadata.len(),
            "Added file to archive"
        );
        Ok(())
    }

    /// Finish the tar stream and the gzip member, returning the bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the trailing blocks cannot be written.
    pub fn finish(self) -> Result<Vec<u8>> {
        let encoder = self
            .builder
            .into_inner()
            .map_err(|e| Error::archive(format!("Failed to finish archive: {e}"), None))?;
        let bytes = encoder.finish()?;
        debug!(entries = self.entries, bytes = bytes.len(), "Finished archive");
        Ok(bytes)
    }

    fn add_parent_directories(&mut self, dest: &Path) -> Result<()> {
        let Some(parent) = dest.parent() else {
            return Ok(());
        };

        let mut ancestors: Vec<&Path> = parent
            .ancestors()
            .filter(|dir| !dir.as_os_str().is_empty())
            .collect();
        ancestors.reverse();

        for dir in ancestors {
            if !self.directories.insert(dir.to_path_buf()) {
                continue;
            }
            let mut header = Header::new_gnu();
            header.set_entry_type(EntryType::Directory);
            header.set_size(0);
            header.set_mode(0o755);
            header.set_mtime(unix_now());
            self.builder
                .append_data(&mut header, dir, std::io::empty())
                .map_err(|e| Error::archive_io(format!("Failed to add directory: {e}"), dir, e))?;
        }
        Ok(())
    }
}

fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
