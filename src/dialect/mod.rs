//! SQL dialect strategies
//!
//! A dialect is selected by an identifier of the form `Family` or
//! `Family@Major` (e.g., `PostgreSQL@13`) and resolved through a
//! [`DialectRegistry`] into a shared, immutable [`DialectStrategy`].

mod h2;
mod keywords;
mod mysql;
mod oracle;
mod postgres;
mod registry;
mod sqlserver;
mod types;

use std::fmt;

pub use h2::H2Dialect;
pub use mysql::{MysqlDialect, MysqlFlavor};
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use registry::{DialectFactory, DialectRegistry};
pub use sqlserver::SqlServerDialect;
pub use types::LogicalType;

use crate::error::{ConstructionError, ResolutionFailure};

/// A database version; only the major part is selectable from identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatabaseVersion {
    major: u32,
    minor: u32,
}

impl DatabaseVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }
}

impl fmt::Display for DatabaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Parsed dialect identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectSpec {
    family: String,
    major: Option<u32>,
}

impl DialectSpec {
    /// Parse `Family` or `Family@Major`, splitting on the first `@`
    pub fn parse(identifier: &str) -> Result<Self, ResolutionFailure> {
        let (family, version) = match identifier.split_once('@') {
            Some((family, version)) => (family.trim(), Some(version.trim())),
            None => (identifier.trim(), None),
        };

        if family.is_empty() {
            return Err(ResolutionFailure::UnknownFamily(family.to_string()));
        }

        let major = match version {
            None => None,
            Some(v) if !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()) => Some(
                v.parse::<u32>()
                    .map_err(|_| ResolutionFailure::MalformedVersion(v.to_string()))?,
            ),
            Some(v) => return Err(ResolutionFailure::MalformedVersion(v.to_string())),
        };

        Ok(Self {
            family: family.to_string(),
            major,
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn major(&self) -> Option<u32> {
        self.major
    }

    /// The `(major, 0)` version requested by the identifier, if any
    pub fn version(&self) -> Option<DatabaseVersion> {
        self.major.map(|major| DatabaseVersion::new(major, 0))
    }
}

/// How auto-generated key columns are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityStyle {
    /// Identity clause rendered inline on the column
    Inline,
    /// A separate sequence per table
    Sequence,
}

/// SQL syntax rules for one database family and version.
///
/// Implementations are immutable once constructed and shared read-only
/// between the emission phases of a target.
pub trait DialectStrategy: fmt::Debug + Send + Sync {
    /// Family name as registered (e.g., "PostgreSQL")
    fn family(&self) -> &'static str;

    fn version(&self) -> DatabaseVersion;

    /// Human-readable name used in diagnostics
    fn display_name(&self) -> String {
        format!("{} {}", self.family(), self.version())
    }

    /// Opening and closing identifier quote characters
    fn quote_chars(&self) -> (char, char) {
        ('"', '"')
    }

    /// Words that must be quoted in addition to the SQL standard reserved words
    fn extra_reserved_words(&self) -> &'static [&'static str] {
        &[]
    }

    fn is_reserved_word(&self, word: &str) -> bool {
        keywords::is_reserved(word)
            || self
                .extra_reserved_words()
                .iter()
                .any(|w| w.eq_ignore_ascii_case(word))
    }

    /// Quote an identifier unconditionally, doubling embedded close quotes
    fn quote_ident(&self, name: &str) -> String {
        let (open, close) = self.quote_chars();
        let escaped = name.replace(close, &format!("{close}{close}"));
        format!("{open}{escaped}{close}")
    }

    /// Render an identifier, quoting only when required (or forced)
    fn render_ident(&self, name: &str, force_quote: bool) -> String {
        if force_quote || !crate::util::is_simple_identifier(name) || self.is_reserved_word(name)
        {
            self.quote_ident(name)
        } else {
            name.to_string()
        }
    }

    /// Column type for a logical type, or `None` when the dialect has no mapping
    fn type_name(&self, ty: &LogicalType) -> Option<String>;

    fn identity_style(&self) -> IdentityStyle {
        IdentityStyle::Inline
    }

    /// Type plus identity clause for an auto-generated key column
    fn identity_column(&self, type_sql: &str, _ty: &LogicalType) -> String {
        format!("{type_sql} GENERATED BY DEFAULT AS IDENTITY")
    }

    fn supports_schemas(&self) -> bool {
        true
    }

    fn create_schema(&self, schema: &str) -> String {
        format!("CREATE SCHEMA {schema}")
    }

    fn drop_schema(&self, schema: &str) -> String {
        format!("DROP SCHEMA {schema}")
    }

    fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE {table}")
    }

    fn create_sequence(&self, sequence: &str) -> String {
        format!("CREATE SEQUENCE {sequence} START WITH 1 INCREMENT BY 1")
    }

    fn drop_sequence(&self, sequence: &str) -> String {
        format!("DROP SEQUENCE {sequence}")
    }

    /// Trailing options appended after a CREATE TABLE column list
    fn table_options(&self) -> Option<String> {
        None
    }
}

/// Reject versions older than a family supports
pub(crate) fn check_minimum(
    family: &'static str,
    version: DatabaseVersion,
    minimum: DatabaseVersion,
) -> Result<(), ConstructionError> {
    if version < minimum {
        Err(ConstructionError::UnsupportedVersion {
            family,
            version,
            minimum,
        })
    } else {
        Ok(())
    }
}
