use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Content identity of a verified binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryIdentity {
    pub path: PathBuf,
    pub sha256: String,
}

impl BinaryIdentity {
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("read binary {}", path.display()))?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let hash = hasher.finalize();
        let sha256 = hex::encode(hash);
        Ok(Self {
            path: path.to_path_buf(),
            sha256,
        })
    }
}
