//! Oracle dialect.
//!
//! Oracle has no CREATE SCHEMA (schemas are users), so namespace statements
//! are never emitted. Before 12c keys come from one sequence per table.

use std::sync::Arc;

use crate::error::ConstructionError;
use crate::options::Settings;

use super::{check_minimum, DatabaseVersion, DialectStrategy, IdentityStyle, LogicalType};

const FAMILY: &str = "Oracle";
const DEFAULT_VERSION: DatabaseVersion = DatabaseVersion::new(19, 0);
const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::new(11, 0);

#[derive(Debug, Clone)]
pub struct OracleDialect {
    version: DatabaseVersion,
}

impl OracleDialect {
    pub fn new(version: DatabaseVersion) -> Result<Self, ConstructionError> {
        check_minimum(FAMILY, version, MINIMUM_VERSION)?;
        Ok(Self { version })
    }

    /// Registry factory
    pub fn create(
        version: Option<DatabaseVersion>,
        _settings: &Settings,
    ) -> Result<Arc<dyn DialectStrategy>, ConstructionError> {
        Ok(Arc::new(Self::new(version.unwrap_or(DEFAULT_VERSION))?))
    }
}

impl DialectStrategy for OracleDialect {
    fn family(&self) -> &'static str {
        FAMILY
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn extra_reserved_words(&self) -> &'static [&'static str] {
        &[
            "ACCESS", "COMMENT", "DATE", "FILE", "LEVEL", "MODE", "NUMBER", "RESOURCE", "SIZE",
            "UID",
        ]
    }

    fn type_name(&self, ty: &LogicalType) -> Option<String> {
        let major = self.version.major();
        let name = match ty {
            LogicalType::Boolean if major >= 23 => "BOOLEAN".to_string(),
            LogicalType::Boolean => "NUMBER(1,0)".to_string(),
            LogicalType::SmallInt => "NUMBER(5,0)".to_string(),
            LogicalType::Integer => "NUMBER(10,0)".to_string(),
            LogicalType::BigInt => "NUMBER(19,0)".to_string(),
            LogicalType::Decimal { .. } => {
                let (p, s) = ty.precision_and_scale();
                format!("NUMBER({p},{s})")
            }
            LogicalType::Real => "FLOAT(24)".to_string(),
            LogicalType::Double => "FLOAT(53)".to_string(),
            LogicalType::Char(_) => format!("CHAR({} CHAR)", ty.length()),
            LogicalType::Varchar(_) => format!("VARCHAR2({} CHAR)", ty.length()),
            LogicalType::Text => "CLOB".to_string(),
            LogicalType::Date | LogicalType::Time => "DATE".to_string(),
            LogicalType::Timestamp {
                with_time_zone: false,
                ..
            } => format!("TIMESTAMP({})", ty.timestamp_precision().min(9)),
            LogicalType::Timestamp {
                with_time_zone: true,
                ..
            } => format!("TIMESTAMP({}) WITH TIME ZONE", ty.timestamp_precision().min(9)),
            LogicalType::Binary(_) | LogicalType::Varbinary(_) => format!("RAW({})", ty.length()),
            LogicalType::Blob => "BLOB".to_string(),
            LogicalType::Uuid => "RAW(16)".to_string(),
            LogicalType::Json if major >= 21 => "JSON".to_string(),
            LogicalType::Json => "CLOB".to_string(),
            LogicalType::Interval => "INTERVAL DAY TO SECOND".to_string(),
            LogicalType::Custom(raw) => raw.clone(),
        };
        Some(name)
    }

    fn identity_style(&self) -> IdentityStyle {
        if self.version.major() >= 12 {
            IdentityStyle::Inline
        } else {
            IdentityStyle::Sequence
        }
    }

    fn supports_schemas(&self) -> bool {
        false
    }

    fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE {table} CASCADE CONSTRAINTS")
    }
}
