//! Assemble and write per-dialect script files

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{DdlGenError, Result};

/// File name for a dialect identifier: `@` removed, lower-cased, `.sql` appended
pub fn script_file_name(identifier: &str) -> String {
    format!("{}.sql", identifier.trim().replace('@', "").to_lowercase())
}

/// Join rendered statements into the final file contents.
///
/// Formatted scripts separate statements with a blank line. The result
/// always ends with a newline unless it is empty.
pub fn assemble_script(chunks: &[String], format: bool) -> String {
    let separator = if format { "\n\n" } else { "\n" };
    let mut script = chunks.join(separator);
    if !script.is_empty() && !script.ends_with('\n') {
        script.push('\n');
    }
    script
}

/// Write a script in one call, creating the parent directory if needed
pub fn write_script(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DdlGenError::OutputWriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    std::fs::write(path, contents).map_err(|e| DdlGenError::OutputWriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Lower-case hex SHA-256 of the script contents
pub fn checksum(contents: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(contents.as_bytes());
    hex::encode(hasher.finalize())
}
