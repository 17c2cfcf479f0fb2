// storage.rs

use std::path::{Path, PathBuf};
use std::{fmt, fs, io};

use log::*;

const PROBE_NAME: &str = ".probe";

/// Errors from the persistence layer. Callers that need to distinguish
/// kinds (disabled saves vs. rejected writes) match on these; everything
/// else lets them bubble into an `anyhow::Error`.
#[derive(Debug)]
pub enum StoreError {
    /// The medium failed its self-test and all writes are disabled.
    Unavailable(String),
    Read(io::Error),
    Write(io::Error),
    Encode(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(e) => write!(f, "storage unavailable: {e}"),
            StoreError::Read(e) => write!(f, "storage read failed: {e}"),
            StoreError::Write(e) => write!(f, "storage write failed: {e}"),
            StoreError::Encode(e) => write!(f, "record encoding failed: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Key-value blob store backed by one file per key inside a data directory.
/// A handle that failed its self-test still works: reads yield nothing and
/// writes fail fast, so save actions degrade instead of killing the process.
#[derive(Debug)]
pub struct Storage {
    dir: Option<PathBuf>,
}

impl Storage {
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        if let Err(e) = fs::create_dir_all(&dir) {
            return Err(StoreError::Unavailable(format!(
                "cannot create {d}: {e}",
                d = dir.display()
            )));
        }

        // Self-test: the medium must take a write before we trust it.
        let probe = dir.join(PROBE_NAME);
        if let Err(e) = fs::write(&probe, b"ok") {
            return Err(StoreError::Unavailable(format!("self-test write: {e}")));
        }
        let back = match fs::read(&probe) {
            Ok(b) => b,
            Err(e) => return Err(StoreError::Unavailable(format!("self-test read: {e}"))),
        };
        let _ = fs::remove_file(&probe);
        if back != b"ok" {
            return Err(StoreError::Unavailable("self-test readback mismatch".into()));
        }

        info!("Storage ready at {d}", d = dir.display());
        Ok(Storage { dir: Some(dir) })
    }

    /// Degraded handle for when the self-test failed at startup.
    pub fn unavailable() -> Self {
        Storage { dir: None }
    }

    pub fn is_available(&self) -> bool {
        self.dir.is_some()
    }

    pub fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = match &self.dir {
            Some(d) => d.join(key),
            None => return Ok(None),
        };
        match fs::read(&path) {
            Ok(b) => Ok(Some(b)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Read(e)),
        }
    }

    /// Replaces the whole blob under `key` in one step: the new value is
    /// written aside and renamed over, so a rejected write leaves the old
    /// value intact.
    pub fn set_raw(&self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        let path = match &self.dir {
            Some(d) => d.join(key),
            None => {
                return Err(StoreError::Unavailable(
                    "medium failed self-test, writes disabled".into(),
                ))
            }
        };
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, data).map_err(StoreError::Write)?;
        fs::rename(&tmp, &path).map_err(StoreError::Write)?;
        Ok(())
    }
}


// EOF
