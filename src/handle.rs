//! File-backed transient image handles.
//!
//! A capture produces raw image bytes that need a displayable reference with
//! a bounded lifetime: the handle writes the bytes to a file and removes that
//! file again when dropped, so replacing a handle (or tearing the session
//! down) releases the previous image instead of leaking it. `persist` opts a
//! handle out of cleanup by moving the file to a caller-owned path.

use std::fs;
use std::path::{Path, PathBuf};

use crate::Result;

/// A releasable reference to one captured image on disk.
#[derive(Debug)]
pub struct ImageHandle {
    path: PathBuf,
    len: u64,
    persisted: bool,
}

impl ImageHandle {
    /// Write image bytes to `path` and wrap them in a handle.
    ///
    /// The parent directory must already exist. The file is removed when the
    /// handle is dropped unless [`persist`](Self::persist) is called first.
    pub fn from_bytes(path: PathBuf, bytes: &[u8]) -> Result<Self> {
        fs::write(&path, bytes)?;
        Ok(Self {
            path,
            len: bytes.len() as u64,
            persisted: false,
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the image payload in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Move the backing file to `dest` and disarm the drop cleanup.
    ///
    /// The session directory usually lives under the system temp dir, which
    /// may be a different filesystem than `dest`; rename cannot cross
    /// filesystems, so failures fall back to copy + remove.
    pub fn persist(mut self, dest: &Path) -> Result<PathBuf> {
        if let Err(e) = fs::rename(&self.path, dest) {
            log::debug!(
                "rename {} -> {} failed ({}), copying instead",
                self.path.display(),
                dest.display(),
                e
            );
            fs::copy(&self.path, dest)?;
            fs::remove_file(&self.path)?;
        }
        self.persisted = true;
        Ok(dest.to_path_buf())
    }
}

/// Persist a mobile/desktop pair, keeping the pair atomic: if the second
/// persist fails, the first output file is removed again so no lone image is
/// left behind.
pub fn persist_pair(
    mobile: ImageHandle,
    desktop: ImageHandle,
    mobile_dest: &Path,
    desktop_dest: &Path,
) -> Result<(PathBuf, PathBuf)> {
    let mobile_path = mobile.persist(mobile_dest)?;
    match desktop.persist(desktop_dest) {
        Ok(desktop_path) => Ok((mobile_path, desktop_path)),
        Err(e) => {
            let _ = fs::remove_file(&mobile_path);
            Err(e)
        }
    }
}

impl Drop for ImageHandle {
    fn drop(&mut self) {
        if self.persisted {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            // Nothing to do about it at drop time; the file may already be gone
            log::warn!("failed to release image {}: {}", self.path.display(), e);
        }
    }
}
