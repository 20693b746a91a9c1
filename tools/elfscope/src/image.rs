//! Read-only file images backed by a private memory mapping.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, trace, warn};
use memmap2::{Mmap, MmapOptions};
use thiserror::Error;

/// Failure to bring a file into memory.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file does not exist.
    #[error("{}: no such file", path.display())]
    NotFound {
        /// Path that was opened.
        path: PathBuf,
    },
    /// The file exists but cannot be read.
    #[error("{}: permission denied", path.display())]
    PermissionDenied {
        /// Path that was opened.
        path: PathBuf,
    },
    /// Any other failure while sizing or mapping the file.
    #[error("{}: {source}", path.display())]
    Io {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }
}

/// A whole file mapped read-only into memory.
///
/// The mapping is released when the image is dropped.
#[derive(Debug)]
pub struct Image {
    path: PathBuf,
    map: Option<Mmap>,
}

impl Image {
    /// Opens `path` and maps its full extent read-only and private.
    ///
    /// Zero-length files are not mapped; they yield an empty image.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the file cannot be opened, is not a regular
    /// file, or cannot be mapped.
    pub fn open(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|e| LoadError::from_io(path, e))?;
        let meta = file.metadata().map_err(|e| LoadError::from_io(path, e))?;
        if !meta.is_file() {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            });
        }

        if meta.len() == 0 {
            warn!("{} is empty", path.display());
            return Ok(Self {
                path: path.to_path_buf(),
                map: None,
            });
        }

        // SAFETY: the mapping is private and never written through. The file
        // must not be truncated by another process while it is mapped.
        let map = unsafe { MmapOptions::new().map_copy_read_only(&file) }
            .map_err(|e| LoadError::from_io(path, e))?;
        debug!("mapped {} ({} bytes)", path.display(), map.len());

        Ok(Self {
            path: path.to_path_buf(),
            map: Some(map),
        })
    }

    /// The mapped bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        self.map.as_deref().unwrap_or(&[])
    }

    /// Size of the image in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    /// Returns `true` for an empty file.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Path the image was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        if self.map.take().is_some() {
            trace!("unmapped {}", self.path.display());
        }
    }
}
