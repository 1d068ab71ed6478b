//! SQL Server dialect

use std::sync::Arc;

use crate::error::ConstructionError;
use crate::options::Settings;

use super::{check_minimum, DatabaseVersion, DialectStrategy, LogicalType};

const FAMILY: &str = "SQLServer";
const DEFAULT_VERSION: DatabaseVersion = DatabaseVersion::new(11, 0);
const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::new(10, 0);

#[derive(Debug, Clone)]
pub struct SqlServerDialect {
    version: DatabaseVersion,
}

impl SqlServerDialect {
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

impl DialectStrategy for SqlServerDialect {
    fn family(&self) -> &'static str {
        FAMILY
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn quote_chars(&self) -> (char, char) {
        ('[', ']')
    }

    fn extra_reserved_words(&self) -> &'static [&'static str] {
        &["FILE", "INDEX", "KEY", "PERCENT", "PLAN", "PUBLIC", "RULE", "SCHEMA", "TOP"]
    }

    fn type_name(&self, ty: &LogicalType) -> Option<String> {
        let name = match ty {
            LogicalType::Boolean => "BIT".to_string(),
            LogicalType::SmallInt => "SMALLINT".to_string(),
            LogicalType::Integer => "INT".to_string(),
            LogicalType::BigInt => "BIGINT".to_string(),
            LogicalType::Decimal { .. } => {
                let (p, s) = ty.precision_and_scale();
                format!("NUMERIC({p},{s})")
            }
            LogicalType::Real => "REAL".to_string(),
            LogicalType::Double => "FLOAT".to_string(),
            LogicalType::Char(_) => format!("CHAR({})", ty.length()),
            LogicalType::Varchar(_) => format!("VARCHAR({})", ty.length()),
            LogicalType::Text => "VARCHAR(MAX)".to_string(),
            LogicalType::Date => "DATE".to_string(),
            LogicalType::Time => "TIME".to_string(),
            LogicalType::Timestamp {
                with_time_zone: false,
                ..
            } => format!("DATETIME2({})", ty.timestamp_precision().min(7)),
            LogicalType::Timestamp {
                with_time_zone: true,
                ..
            } => format!("DATETIMEOFFSET({})", ty.timestamp_precision().min(7)),
            LogicalType::Binary(_) => format!("BINARY({})", ty.length()),
            LogicalType::Varbinary(_) => format!("VARBINARY({})", ty.length()),
            LogicalType::Blob => "VARBINARY(MAX)".to_string(),
            LogicalType::Uuid => "UNIQUEIDENTIFIER".to_string(),
            LogicalType::Json => "NVARCHAR(MAX)".to_string(),
            LogicalType::Interval => return None,
            LogicalType::Custom(raw) => raw.clone(),
        };
        Some(name)
    }

    fn identity_column(&self, type_sql: &str, _ty: &LogicalType) -> String {
        format!("{type_sql} IDENTITY(1,1)")
    }
}
