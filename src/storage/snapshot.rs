use crate::core::Blockchain;
use crate::error::Result;
use crate::utils::{deserialize, serialize};
use log::info;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// On-disk copy of the canonical chain, rewritten whole after every change.
#[derive(Debug, Clone)]
pub struct ChainSnapshot {
    path: PathBuf,
}

impl ChainSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> ChainSnapshot {
        ChainSnapshot { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Writes to a sibling temp file first so a crash never leaves half a chain.
    pub fn save(&self, chain: &Blockchain) -> Result<()> {
        let bytes = serialize(chain)?;
        let staging = self.path.with_extension("tmp");
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&staging, &bytes)?;
        fs::rename(&staging, &self.path)?;
        info!(
            "Saved {} blocks ({} bytes) to {}",
            chain.len(),
            bytes.len(),
            self.path.display()
        );
        Ok(())
    }

    /// `Ok(None)` when no snapshot has been written yet.
    pub fn load(&self) -> Result<Option<Blockchain>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(deserialize(&bytes)?))
    }
}
