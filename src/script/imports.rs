//! Raw SQL import files appended after creation statements

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{DdlGenError, Result};
use crate::util::read_file_with_encoding_fallback;

/// Contents of one import file, loaded once per run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportScript {
    pub path: PathBuf,
    pub contents: String,
}

impl ImportScript {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// Load all import files in order; any unreadable file fails the run
pub fn load_import_scripts(paths: &[PathBuf]) -> Result<Vec<ImportScript>> {
    paths.iter().map(|path| load_import_script(path)).collect()
}

fn load_import_script(path: &Path) -> Result<ImportScript> {
    let contents =
        read_file_with_encoding_fallback(path).map_err(|e| DdlGenError::ImportFileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
    debug!("Loaded import file {} ({} bytes)", path.display(), contents.len());
    Ok(ImportScript::new(path, contents))
}
