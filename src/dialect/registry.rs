//! Dialect registry: maps family names to dialect factories.
//!
//! Family lookup is case-insensitive. Additional families can be registered
//! at runtime alongside the built-ins.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{ConstructionError, DdlGenError, ResolutionFailure, Result};
use crate::options::Settings;

use super::{
    DatabaseVersion, DialectSpec, DialectStrategy, H2Dialect, MysqlDialect, OracleDialect,
    PostgresDialect, SqlServerDialect,
};

/// Builds a dialect for an optional requested version
pub type DialectFactory =
    fn(Option<DatabaseVersion>, &Settings) -> std::result::Result<Arc<dyn DialectStrategy>, ConstructionError>;

struct RegisteredFamily {
    name: String,
    factory: DialectFactory,
}

/// Registry of known dialect families
pub struct DialectRegistry {
    families: BTreeMap<String, RegisteredFamily>,
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl DialectRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            families: BTreeMap::new(),
        }
    }

    /// A registry with all built-in families
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("PostgreSQL", PostgresDialect::create);
        registry.register("MySQL", MysqlDialect::create_mysql);
        registry.register("MariaDB", MysqlDialect::create_mariadb);
        registry.register("SQLServer", SqlServerDialect::create);
        registry.register("Oracle", OracleDialect::create);
        registry.register("H2", H2Dialect::create);
        registry
    }

    /// Register a family, replacing any existing registration with the same name
    pub fn register(&mut self, family: &str, factory: DialectFactory) {
        let key = family.to_ascii_lowercase();
        if self.families.contains_key(&key) {
            debug!("Replacing dialect family registration: {}", family);
        }
        self.families.insert(
            key,
            RegisteredFamily {
                name: family.to_string(),
                factory,
            },
        );
    }

    /// Registered family names, sorted case-insensitively
    pub fn families(&self) -> Vec<&str> {
        self.families.values().map(|f| f.name.as_str()).collect()
    }

    pub fn contains(&self, family: &str) -> bool {
        self.families.contains_key(&family.to_ascii_lowercase())
    }

    /// Resolve an identifier without extra settings
    pub fn resolve(&self, identifier: &str) -> Result<Arc<dyn DialectStrategy>> {
        self.resolve_with(identifier, &Settings::new())
    }

    /// Resolve `Family` or `Family@Major` into a dialect strategy
    pub fn resolve_with(
        &self,
        identifier: &str,
        settings: &Settings,
    ) -> Result<Arc<dyn DialectStrategy>> {
        let failed = |reason: ResolutionFailure| DdlGenError::DialectResolutionError {
            identifier: identifier.to_string(),
            reason,
        };

        let spec = DialectSpec::parse(identifier).map_err(failed)?;

        let registered = self
            .families
            .get(&spec.family().to_ascii_lowercase())
            .ok_or_else(|| failed(ResolutionFailure::UnknownFamily(spec.family().to_string())))?;

        let dialect = (registered.factory)(spec.version(), settings)
            .map_err(|e| failed(ResolutionFailure::Construction(e)))?;

        debug!("Resolved dialect {} to {}", identifier, dialect.display_name());
        Ok(dialect)
    }
}
