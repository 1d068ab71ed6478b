//! rust-ddlgen: DDL script generation for multiple SQL dialects
//!
//! This library turns entity definitions into one create (and optionally
//! drop) script per target dialect, e.g. `PostgreSQL@13` or `MySQL`.

pub mod coordinator;
pub mod dialect;
pub mod emit;
pub mod error;
pub mod filter;
pub mod model;
pub mod options;
pub mod project;
pub mod script;
mod util;

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

pub use coordinator::{ExecutionCoordinator, RunReport, ScriptOutcome};
pub use dialect::{DialectRegistry, DialectStrategy};
pub use error::{DdlGenError, GenerationError};
pub use options::{Action, ExecutionOptions, Phase};

use model::{EntityDefinition, NamespaceGroup};

/// Options for generating DDL from a project file
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Path to the .ddlproj file
    pub project_path: PathBuf,
    /// Output directory override
    pub output_dir: Option<PathBuf>,
    /// Dialect identifiers; replaces the project's list when not empty
    pub dialects: Vec<String>,
    /// Generate drop statements before creation statements
    pub create_drop: Option<bool>,
    pub halt_on_error: Option<bool>,
}

/// Generate DDL scripts for a project file
pub fn generate_ddl(options: GenerateOptions) -> Result<RunReport> {
    info!("Generating DDL for project: {}", options.project_path.display());

    // Step 1: Parse the project file and apply overrides
    let mut project = project::parse_ddlproj(&options.project_path)?;
    if let Some(output_dir) = options.output_dir {
        project.output_dir = output_dir;
    }
    if !options.dialects.is_empty() {
        project.dialects = options.dialects;
    }
    if let Some(create_drop) = options.create_drop {
        project.action = Action::from_create_drop(create_drop);
    }
    if let Some(halt_on_error) = options.halt_on_error {
        project.halt_on_error = halt_on_error;
    }

    if project.dialects.is_empty() {
        return Err(DdlGenError::InvalidProjectFormat {
            message: "no dialects configured".to_string(),
        }
        .into());
    }

    // Step 2: Load entity definitions
    let sources = project::load_entity_files(&project.entity_files)?;
    info!(
        "Found {} entities in {} files.",
        sources.entity_count(),
        project.entity_files.len()
    );

    // Step 3: Build the schema model and generate every target
    let execution_options = project.execution_options();
    let report = generate_scripts(
        sources.entities,
        sources.namespaces,
        &project.dialects,
        &execution_options,
    )?;

    info!(
        "Generated {} scripts with {} errors",
        report.scripts.len(),
        report.errors.len() + report.resolution_errors.len()
    );
    Ok(report)
}

/// Generate scripts from entity definitions already in memory
pub fn generate_scripts(
    entities: Vec<EntityDefinition>,
    namespaces: Vec<NamespaceGroup>,
    dialects: &[String],
    options: &ExecutionOptions,
) -> error::Result<RunReport> {
    let model = model::build_model(entities, namespaces)?;
    let registry = DialectRegistry::with_builtins();
    let coordinator = ExecutionCoordinator::new(&registry, options)?;
    coordinator.run(&model, dialects)
}
