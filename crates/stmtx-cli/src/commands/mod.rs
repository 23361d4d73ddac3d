//! Subcommands and the file handling they share.

pub mod banks;
pub mod batch;
pub mod config;
pub mod extract;
pub mod output;

use std::path::{Path, PathBuf};

use tracing::debug;

use stmtx_core::StmtxConfig;

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("stmtx")
        .join("config.json")
}

/// Config from `path`, else from the default location, else built-in defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<StmtxConfig> {
    if let Some(path) = path {
        return Ok(StmtxConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        Ok(StmtxConfig::from_file(&default_path)?)
    } else {
        Ok(StmtxConfig::default())
    }
}

/// Whether `path` looks like a statement the CLI can read.
pub fn is_supported(path: &Path) -> bool {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    matches!(extension.as_str(), "pdf" | "txt")
}
