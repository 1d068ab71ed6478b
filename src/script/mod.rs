//! Script files: import loading and output writing

mod imports;
mod writer;

pub use imports::{load_import_scripts, ImportScript};
pub use writer::{assemble_script, checksum, script_file_name, write_script};
