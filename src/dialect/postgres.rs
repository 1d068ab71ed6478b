//! PostgreSQL dialect.
//!
//! Versions before 10 have no identity columns; auto-generated keys fall
//! back to the `serial` pseudo-types there.

use std::sync::Arc;

use crate::error::ConstructionError;
use crate::options::Settings;

use super::{check_minimum, DatabaseVersion, DialectStrategy, LogicalType};

const FAMILY: &str = "PostgreSQL";
const DEFAULT_VERSION: DatabaseVersion = DatabaseVersion::new(12, 0);
const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::new(9, 0);

#[derive(Debug, Clone)]
pub struct PostgresDialect {
    version: DatabaseVersion,
}

impl PostgresDialect {
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

    fn has_identity_columns(&self) -> bool {
        self.version.major() >= 10
    }
}

impl DialectStrategy for PostgresDialect {
    fn family(&self) -> &'static str {
        FAMILY
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn extra_reserved_words(&self) -> &'static [&'static str] {
        &["ANALYSE", "ANALYZE", "ARRAY", "DO", "ONLY", "PLACING", "RETURNING", "VARIADIC"]
    }

    fn type_name(&self, ty: &LogicalType) -> Option<String> {
        let name = match ty {
            LogicalType::Boolean => "BOOLEAN".to_string(),
            LogicalType::SmallInt => "SMALLINT".to_string(),
            LogicalType::Integer => "INTEGER".to_string(),
            LogicalType::BigInt => "BIGINT".to_string(),
            LogicalType::Decimal { .. } => {
                let (p, s) = ty.precision_and_scale();
                format!("NUMERIC({p},{s})")
            }
            LogicalType::Real => "REAL".to_string(),
            LogicalType::Double => "DOUBLE PRECISION".to_string(),
            LogicalType::Char(_) => format!("CHAR({})", ty.length()),
            LogicalType::Varchar(_) => format!("VARCHAR({})", ty.length()),
            LogicalType::Text => "TEXT".to_string(),
            LogicalType::Date => "DATE".to_string(),
            LogicalType::Time => "TIME".to_string(),
            LogicalType::Timestamp {
                with_time_zone: false,
                ..
            } => format!("TIMESTAMP({})", ty.timestamp_precision().min(6)),
            LogicalType::Timestamp {
                with_time_zone: true,
                ..
            } => format!("TIMESTAMP({}) WITH TIME ZONE", ty.timestamp_precision().min(6)),
            LogicalType::Binary(_) | LogicalType::Varbinary(_) | LogicalType::Blob => {
                "BYTEA".to_string()
            }
            LogicalType::Uuid => "UUID".to_string(),
            LogicalType::Json => "JSONB".to_string(),
            LogicalType::Interval => "INTERVAL".to_string(),
            LogicalType::Custom(raw) => raw.clone(),
        };
        Some(name)
    }

    fn identity_column(&self, type_sql: &str, ty: &LogicalType) -> String {
        if self.has_identity_columns() {
            return format!("{type_sql} GENERATED BY DEFAULT AS IDENTITY");
        }
        match ty {
            LogicalType::SmallInt => "SMALLSERIAL".to_string(),
            LogicalType::Integer => "SERIAL".to_string(),
            _ => "BIGSERIAL".to_string(),
        }
    }

    fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE {table} CASCADE")
    }
}
