//! Error types for rust-ddlgen

use std::path::PathBuf;
use thiserror::Error;

use crate::dialect::DatabaseVersion;
use crate::options::Phase;

/// Result alias used throughout the generation pipeline
pub type Result<T> = std::result::Result<T, DdlGenError>;

/// Errors that can occur while generating DDL scripts
#[derive(Error, Debug)]
pub enum DdlGenError {
    #[error("Failed to read project file: {path}")]
    ProjectReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse project file: {path}")]
    ProjectParseError {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Invalid project file format: {message}")]
    InvalidProjectFormat { message: String },

    #[error("Failed to read entity file: {path}")]
    EntityFileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse entity file: {path}")]
    EntityFileParseError {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("Invalid entity file {path}: {message}")]
    InvalidEntityFile { path: PathBuf, message: String },

    #[error("Failed to read import file: {path}")]
    ImportFileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not resolve dialect '{identifier}': {reason}")]
    DialectResolutionError {
        identifier: String,
        #[source]
        reason: ResolutionFailure,
    },

    #[error("Duplicate {kind} '{name}' in entity definitions")]
    DuplicateEntityError { kind: &'static str, name: String },

    #[error("Entity '{entity}' references unknown entity '{target}'")]
    DanglingReferenceError { entity: String, target: String },

    #[error("Invalid entity '{entity}': {message}")]
    InvalidEntityError { entity: String, message: String },

    #[error("Dialects '{first}' and '{second}' would both be written to {file_name}")]
    DuplicateTargetError {
        first: String,
        second: String,
        file_name: String,
    },

    #[error("Invalid schema filter configuration: {message}")]
    FilterConfigError { message: String },

    #[error(transparent)]
    GenerationError(#[from] GenerationError),

    #[error("Failed to write DDL script to {path}")]
    OutputWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DdlGenError {
    pub(crate) fn invalid_entity(entity: impl Into<String>, message: impl Into<String>) -> Self {
        DdlGenError::InvalidEntityError {
            entity: entity.into(),
            message: message.into(),
        }
    }
}

/// Why a dialect identifier could not be turned into a strategy
#[derive(Error, Debug)]
pub enum ResolutionFailure {
    #[error("unknown dialect family '{0}'")]
    UnknownFamily(String),

    #[error("version '{0}' is not a non-negative integer")]
    MalformedVersion(String),

    #[error("dialect construction failed")]
    Construction(#[source] ConstructionError),
}

/// Failure raised by a dialect factory
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("{family} {version} is below the minimum supported version {minimum}")]
    UnsupportedVersion {
        family: &'static str,
        version: DatabaseVersion,
        minimum: DatabaseVersion,
    },

    #[error("invalid value '{value}' for setting '{key}'")]
    InvalidSetting { key: String, value: String },
}

/// Low-level cause of a single failed statement
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatementError {
    #[error("foreign key {constraint} on {table} references {referenced}, which is not selected for this phase")]
    DanglingForeignKey {
        constraint: String,
        table: String,
        referenced: String,
    },

    #[error("column {column} of {table} has type {sql_type}, which {dialect} cannot represent")]
    UnsupportedType {
        table: String,
        column: String,
        sql_type: String,
        dialect: String,
    },
}

/// A statement that could not be generated for one dialect target
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{phase} statement failed for {dialect}: {cause}\n  Statement: {sql}")]
pub struct GenerationError {
    /// Dialect the statement was rendered for (e.g., "PostgreSQL 13.0")
    pub dialect: String,
    pub phase: Phase,
    /// The statement text as far as it could be rendered
    pub sql: String,
    #[source]
    pub cause: StatementError,
    /// Qualified name of the entity the statement belongs to
    pub entity: Option<String>,
}
