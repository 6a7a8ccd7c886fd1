//! Memory-mapped output file with finalize-or-discard semantics.
//!
//! Used to persist an [`crate::metadata::assembly::Assembly`] after the native checksum and
//! CRCs have been written back into its header. If the [`Output`] is dropped before
//! [`Output::finalize`] is called (an early `?` return, for instance) the partially written
//! file is removed again, so a failed run never leaves a truncated image on disk.

use std::path::{Path, PathBuf};

use memmap2::{MmapMut, MmapOptions};

use crate::{Error, Result};

/// A memory-mapped output file.
///
/// The file is created at its final path with the requested size and mapped for writing.
/// Dropping the value without finalizing it deletes the file.
pub struct Output {
    /// The memory mapping of the target file
    mmap: MmapMut,

    /// The target path
    target_path: PathBuf,

    /// Whether the file has been finalized
    finalized: bool,
}

impl Output {
    /// Creates a new memory-mapped output file of `size` bytes at `target_path`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::WriteMmapFailed`] if the file cannot be created, resized or
    /// mapped. A zero `size` is rejected because an empty file cannot be mapped.
    pub fn create<P: AsRef<Path>>(target_path: P, size: u64) -> Result<Self> {
        let target_path = target_path.as_ref().to_path_buf();

        if size == 0 {
            return Err(Error::WriteMmapFailed {
                message: "Cannot map an empty output file".to_string(),
            });
        }

        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&target_path)
            .map_err(|e| Error::WriteMmapFailed {
                message: format!("Failed to create target file: {e}"),
            })?;

        file.set_len(size).map_err(|e| Error::WriteMmapFailed {
            message: format!("Failed to set file size: {e}"),
        })?;

        let mmap = unsafe {
            MmapOptions::new()
                .map_mut(&file)
                .map_err(|e| Error::WriteMmapFailed {
                    message: format!("Failed to create memory mapping: {e}"),
                })?
        };

        Ok(Self {
            mmap,
            target_path,
            finalized: false,
        })
    }

    /// Writes data at a specific offset in the file.
    ///
    /// # Errors
    /// Returns [`crate::Error::WriteMmapFailed`] if the write would exceed file bounds.
    pub fn write_at(&mut self, offset: u64, data: &[u8]) -> Result<()> {
        let start = usize::try_from(offset).map_err(|_| Error::WriteMmapFailed {
            message: format!("Offset {offset} does not fit the address space"),
        })?;
        let end = start + data.len();

        if end > self.mmap.len() {
            return Err(Error::WriteMmapFailed {
                message: format!(
                    "Write would exceed file size: offset={}, len={}, file_size={}",
                    offset,
                    data.len(),
                    self.mmap.len()
                ),
            });
        }

        self.mmap[start..end].copy_from_slice(data);
        Ok(())
    }

    /// Writes a little-endian u32 at a specific offset.
    ///
    /// # Errors
    /// Returns [`crate::Error::WriteMmapFailed`] if the write would exceed file bounds.
    pub fn write_u32_le_at(&mut self, offset: u64, value: u32) -> Result<()> {
        self.write_at(offset, &value.to_le_bytes())
    }

    /// Gets the total size of the file.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.mmap.len() as u64
    }

    /// Gets the target path where the file is created.
    #[must_use]
    pub fn target_path(&self) -> &Path {
        &self.target_path
    }

    /// Flushes all pending writes and keeps the file.
    ///
    /// # Errors
    /// Returns [`crate::Error::WriteMmapFailed`] if the flush fails; the file is then removed
    /// when the value is dropped.
    pub fn finalize(mut self) -> Result<()> {
        self.mmap.flush().map_err(|e| Error::WriteMmapFailed {
            message: format!("Failed to flush memory mapping: {e}"),
        })?;

        self.finalized = true;
        Ok(())
    }
}

impl Drop for Output {
    fn drop(&mut self) {
        if !self.finalized {
            let _ = self.mmap.flush();
            let _ = std::fs::remove_file(&self.target_path);
        }
    }
}
