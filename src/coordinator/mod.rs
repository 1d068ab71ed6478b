//! Run all dialect targets and apply the error policy
//!
//! Each target moves through `Dropping -> Creating -> Done` (dropping is
//! skipped for create-only runs). Statements are collected in memory and
//! the script is written once at the end, so a halted target leaves no file
//! behind.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use tracing::{debug, error, info, warn};

use crate::dialect::{DialectRegistry, DialectStrategy};
use crate::emit::emit;
use crate::error::{DdlGenError, GenerationError, Result};
use crate::filter::{filter_for, resolve_filter_config, SchemaFilterConfig};
use crate::model::SchemaModel;
use crate::options::{ExecutionOptions, Phase};
use crate::script::{
    assemble_script, checksum, load_import_scripts, script_file_name, write_script, ImportScript,
};

/// A script written for one dialect target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutcome {
    /// Dialect identifier as requested (e.g., "PostgreSQL@13")
    pub dialect: String,
    pub path: PathBuf,
    /// Number of statements (import scripts count as one each)
    pub statement_count: usize,
    /// SHA-256 of the file contents, lower-case hex
    pub checksum: String,
}

/// Result of a completed run
#[derive(Debug, Default)]
pub struct RunReport {
    pub scripts: Vec<ScriptOutcome>,
    /// Statement failures collected when not halting on error, in order
    pub errors: Vec<GenerationError>,
    /// Dialect identifiers that could not be resolved when not halting on error
    pub resolution_errors: Vec<DdlGenError>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.resolution_errors.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetState {
    Dropping,
    Creating,
    Done,
}

impl From<Phase> for TargetState {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Drop => TargetState::Dropping,
            Phase::Create => TargetState::Creating,
        }
    }
}

impl fmt::Display for TargetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetState::Dropping => write!(f, "dropping"),
            TargetState::Creating => write!(f, "creating"),
            TargetState::Done => write!(f, "done"),
        }
    }
}

/// Drives generation of every requested dialect from one shared model
pub struct ExecutionCoordinator<'a> {
    registry: &'a DialectRegistry,
    options: &'a ExecutionOptions,
    filter: SchemaFilterConfig,
}

impl<'a> ExecutionCoordinator<'a> {
    /// Create a coordinator using the filter provider named in the settings
    pub fn new(registry: &'a DialectRegistry, options: &'a ExecutionOptions) -> Result<Self> {
        let filter = resolve_filter_config(options.settings())?;
        Ok(Self::with_filter(registry, options, filter))
    }

    /// Create a coordinator with an explicit filter configuration
    pub fn with_filter(
        registry: &'a DialectRegistry,
        options: &'a ExecutionOptions,
        filter: SchemaFilterConfig,
    ) -> Self {
        Self {
            registry,
            options,
            filter,
        }
    }

    /// Generate one script per dialect identifier.
    ///
    /// With halt-on-error the first statement failure is returned and no
    /// further target is generated. Otherwise failures are collected into the
    /// report. A dialect that cannot be resolved only skips its own target:
    /// with halt-on-error the first such failure is returned once all other
    /// targets ran, otherwise it is collected into the report as well.
    pub fn run(&self, model: &SchemaModel, dialects: &[String]) -> Result<RunReport> {
        check_distinct_files(dialects)?;
        let imports = load_import_scripts(self.options.import_files())?;

        let mut report = RunReport::default();

        for identifier in dialects {
            let dialect = match self.registry.resolve_with(identifier, self.options.settings()) {
                Ok(dialect) => dialect,
                Err(e) => {
                    error!("{}", e);
                    report.resolution_errors.push(e);
                    continue;
                }
            };

            let (outcome, errors) =
                self.run_target(identifier, dialect.as_ref(), model, &imports)?;
            report.scripts.push(outcome);
            report.errors.extend(errors);
        }

        if self.options.halt_on_error() && !report.resolution_errors.is_empty() {
            return Err(report.resolution_errors.remove(0));
        }
        Ok(report)
    }

    /// Generate and write the script for a single resolved dialect
    pub fn run_target(
        &self,
        identifier: &str,
        dialect: &dyn DialectStrategy,
        model: &SchemaModel,
        imports: &[ImportScript],
    ) -> Result<(ScriptOutcome, Vec<GenerationError>)> {
        info!("Generating DDL for {} ({})", identifier, dialect.display_name());

        let mut statements = Vec::new();
        let mut errors = Vec::new();

        for &phase in self.options.action().phases() {
            debug!("{}: {}", identifier, TargetState::from(phase));
            let filtered = filter_for(phase, model, Some(&self.filter));

            for result in emit(phase, &filtered, dialect, self.options, imports) {
                match result {
                    Ok(statement) => statements.push(statement),
                    Err(e) if self.options.halt_on_error() => {
                        error!("{}", e);
                        return Err(e.into());
                    }
                    Err(e) => {
                        warn!("{}", e);
                        errors.push(e);
                    }
                }
            }
        }

        let contents = assemble_script(&statements, self.options.format());
        let path = self.options.output_dir().join(script_file_name(identifier));
        write_script(&path, &contents)?;

        debug!("{}: {}", identifier, TargetState::Done);
        info!(
            "Wrote {} statements to {}",
            statements.len(),
            path.display()
        );

        Ok((
            ScriptOutcome {
                dialect: identifier.to_string(),
                path,
                statement_count: statements.len(),
                checksum: checksum(&contents),
            },
            errors,
        ))
    }
}

/// Identifiers differing only in case or `@` placement would share a file
fn check_distinct_files(dialects: &[String]) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::with_capacity(dialects.len());
    for identifier in dialects {
        let file_name = script_file_name(identifier);
        if let Some(first) = seen.get(&file_name) {
            return Err(DdlGenError::DuplicateTargetError {
                first: first.to_string(),
                second: identifier.clone(),
                file_name,
            });
        }
        seen.insert(file_name, identifier.as_str());
    }
    Ok(())
}
