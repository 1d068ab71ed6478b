//! MySQL and MariaDB dialects.
//!
//! Both families share backtick quoting and `AUTO_INCREMENT` keys; they
//! differ in JSON, UUID and boolean support depending on the version.

use std::sync::Arc;

use crate::error::ConstructionError;
use crate::options::Settings;

use super::{check_minimum, DatabaseVersion, DialectStrategy, LogicalType};

/// Setting selecting the table storage engine
pub const STORAGE_ENGINE_SETTING: &str = "storage_engine";

const STORAGE_ENGINES: &[&str] = &["InnoDB", "MyISAM", "Aria", "Memory"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MysqlFlavor {
    Mysql,
    MariaDb,
}

impl MysqlFlavor {
    fn family(&self) -> &'static str {
        match self {
            MysqlFlavor::Mysql => "MySQL",
            MysqlFlavor::MariaDb => "MariaDB",
        }
    }

    fn default_version(&self) -> DatabaseVersion {
        match self {
            MysqlFlavor::Mysql => DatabaseVersion::new(8, 0),
            MysqlFlavor::MariaDb => DatabaseVersion::new(10, 6),
        }
    }

    fn minimum_version(&self) -> DatabaseVersion {
        match self {
            MysqlFlavor::Mysql => DatabaseVersion::new(5, 0),
            MysqlFlavor::MariaDb => DatabaseVersion::new(10, 0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MysqlDialect {
    flavor: MysqlFlavor,
    version: DatabaseVersion,
    storage_engine: String,
}

impl MysqlDialect {
    pub fn new(
        flavor: MysqlFlavor,
        version: DatabaseVersion,
        settings: &Settings,
    ) -> Result<Self, ConstructionError> {
        check_minimum(flavor.family(), version, flavor.minimum_version())?;

        let storage_engine = match settings.get(STORAGE_ENGINE_SETTING) {
            None => "InnoDB".to_string(),
            Some(value) => STORAGE_ENGINES
                .iter()
                .find(|engine| engine.eq_ignore_ascii_case(value.trim()))
                .map(|engine| engine.to_string())
                .ok_or_else(|| ConstructionError::InvalidSetting {
                    key: STORAGE_ENGINE_SETTING.to_string(),
                    value: value.clone(),
                })?,
        };

        Ok(Self {
            flavor,
            version,
            storage_engine,
        })
    }

    /// Registry factory for MySQL
    pub fn create_mysql(
        version: Option<DatabaseVersion>,
        settings: &Settings,
    ) -> Result<Arc<dyn DialectStrategy>, ConstructionError> {
        Self::create(MysqlFlavor::Mysql, version, settings)
    }

    /// Registry factory for MariaDB
    pub fn create_mariadb(
        version: Option<DatabaseVersion>,
        settings: &Settings,
    ) -> Result<Arc<dyn DialectStrategy>, ConstructionError> {
        Self::create(MysqlFlavor::MariaDb, version, settings)
    }

    fn create(
        flavor: MysqlFlavor,
        version: Option<DatabaseVersion>,
        settings: &Settings,
    ) -> Result<Arc<dyn DialectStrategy>, ConstructionError> {
        let version = version.unwrap_or_else(|| flavor.default_version());
        Ok(Arc::new(Self::new(flavor, version, settings)?))
    }

    fn json_type(&self) -> Option<&'static str> {
        match self.flavor {
            MysqlFlavor::Mysql if self.version.major() < 8 => None,
            _ => Some("JSON"),
        }
    }

    fn uuid_type(&self) -> &'static str {
        match self.flavor {
            MysqlFlavor::MariaDb if self.version >= DatabaseVersion::new(10, 7) => "UUID",
            _ => "BINARY(16)",
        }
    }
}

impl DialectStrategy for MysqlDialect {
    fn family(&self) -> &'static str {
        self.flavor.family()
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn quote_chars(&self) -> (char, char) {
        ('`', '`')
    }

    fn extra_reserved_words(&self) -> &'static [&'static str] {
        &["INDEX", "KEY", "KEYS", "RANGE", "READ", "RANK", "SCHEMA", "SHOW", "STATUS"]
    }

    fn type_name(&self, ty: &LogicalType) -> Option<String> {
        let name = match ty {
            LogicalType::Boolean => {
                if self.flavor == MysqlFlavor::Mysql && self.version.major() < 8 {
                    "BIT".to_string()
                } else {
                    "BOOLEAN".to_string()
                }
            }
            LogicalType::SmallInt => "SMALLINT".to_string(),
            LogicalType::Integer => "INTEGER".to_string(),
            LogicalType::BigInt => "BIGINT".to_string(),
            LogicalType::Decimal { .. } => {
                let (p, s) = ty.precision_and_scale();
                format!("DECIMAL({p},{s})")
            }
            LogicalType::Real => "FLOAT".to_string(),
            LogicalType::Double => "DOUBLE PRECISION".to_string(),
            LogicalType::Char(_) => format!("CHAR({})", ty.length()),
            LogicalType::Varchar(_) => format!("VARCHAR({})", ty.length()),
            LogicalType::Text => "LONGTEXT".to_string(),
            LogicalType::Date => "DATE".to_string(),
            LogicalType::Time => "TIME".to_string(),
            LogicalType::Timestamp {
                with_time_zone: false,
                ..
            } => format!("DATETIME({})", ty.timestamp_precision().min(6)),
            LogicalType::Timestamp {
                with_time_zone: true,
                ..
            } => format!("TIMESTAMP({})", ty.timestamp_precision().min(6)),
            LogicalType::Binary(_) => format!("BINARY({})", ty.length()),
            LogicalType::Varbinary(_) => format!("VARBINARY({})", ty.length()),
            LogicalType::Blob => "LONGBLOB".to_string(),
            LogicalType::Uuid => self.uuid_type().to_string(),
            LogicalType::Json => self.json_type()?.to_string(),
            LogicalType::Interval => return None,
            LogicalType::Custom(raw) => raw.clone(),
        };
        Some(name)
    }

    fn identity_column(&self, type_sql: &str, _ty: &LogicalType) -> String {
        format!("{type_sql} AUTO_INCREMENT")
    }

    fn table_options(&self) -> Option<String> {
        Some(format!("ENGINE={}", self.storage_engine))
    }
}
