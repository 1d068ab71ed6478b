//! H2 dialect

use std::sync::Arc;

use crate::error::ConstructionError;
use crate::options::Settings;

use super::{check_minimum, DatabaseVersion, DialectStrategy, LogicalType};

const FAMILY: &str = "H2";
const DEFAULT_VERSION: DatabaseVersion = DatabaseVersion::new(2, 0);
const MINIMUM_VERSION: DatabaseVersion = DatabaseVersion::new(1, 0);

#[derive(Debug, Clone)]
pub struct H2Dialect {
    version: DatabaseVersion,
}

impl H2Dialect {
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

impl DialectStrategy for H2Dialect {
    fn family(&self) -> &'static str {
        FAMILY
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn extra_reserved_words(&self) -> &'static [&'static str] {
        &["KEY", "MINUS", "QUALIFY", "REGEXP", "ROWNUM", "SYSDATE", "TOP", "VALUE"]
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
            LogicalType::Text => "CLOB".to_string(),
            LogicalType::Date => "DATE".to_string(),
            LogicalType::Time => "TIME".to_string(),
            LogicalType::Timestamp {
                with_time_zone: false,
                ..
            } => format!("TIMESTAMP({})", ty.timestamp_precision().min(9)),
            LogicalType::Timestamp {
                with_time_zone: true,
                ..
            } => format!("TIMESTAMP({}) WITH TIME ZONE", ty.timestamp_precision().min(9)),
            LogicalType::Binary(_) => format!("BINARY({})", ty.length()),
            LogicalType::Varbinary(_) => format!("VARBINARY({})", ty.length()),
            LogicalType::Blob => "BLOB".to_string(),
            LogicalType::Uuid => "UUID".to_string(),
            LogicalType::Json => "JSON".to_string(),
            LogicalType::Interval if self.version.major() >= 2 => {
                "INTERVAL DAY TO SECOND".to_string()
            }
            LogicalType::Interval => return None,
            LogicalType::Custom(raw) => raw.clone(),
        };
        Some(name)
    }

    fn drop_table(&self, table: &str) -> String {
        format!("DROP TABLE {table} CASCADE")
    }
}
