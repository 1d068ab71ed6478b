//! Dialect resolution and syntax tests

use std::sync::Arc;

use rust_ddlgen::dialect::{DatabaseVersion, DialectRegistry, DialectStrategy, LogicalType};
use rust_ddlgen::error::{ConstructionError, DdlGenError, ResolutionFailure};
use rust_ddlgen::options::Settings;

fn resolve(identifier: &str) -> Arc<dyn DialectStrategy> {
    DialectRegistry::with_builtins()
        .resolve(identifier)
        .unwrap_or_else(|e| panic!("{identifier} should resolve: {e}"))
}

fn resolution_failure(identifier: &str) -> ResolutionFailure {
    match DialectRegistry::with_builtins().resolve(identifier) {
        Err(DdlGenError::DialectResolutionError { reason, .. }) => reason,
        Err(other) => panic!("unexpected error for {identifier}: {other:?}"),
        Ok(d) => panic!("{identifier} unexpectedly resolved to {}", d.display_name()),
    }
}

// ============================================================================
// Resolution Tests
// ============================================================================

#[test]
fn test_default_versions() {
    let cases = [
        ("PostgreSQL", "PostgreSQL", 12),
        ("MySQL", "MySQL", 8),
        ("MariaDB", "MariaDB", 10),
        ("SQLServer", "SQLServer", 11),
        ("Oracle", "Oracle", 19),
        ("H2", "H2", 2),
    ];
    for (identifier, family, major) in cases {
        let dialect = resolve(identifier);
        assert_eq!(dialect.family(), family);
        assert_eq!(dialect.version().major(), major, "default version of {identifier}");
    }
}

#[test]
fn test_requested_version_is_used() {
    let dialect = resolve("PostgreSQL@13");
    assert_eq!(dialect.version(), DatabaseVersion::new(13, 0));
    assert_eq!(dialect.display_name(), "PostgreSQL 13.0");
}

#[test]
fn test_family_is_case_insensitive() {
    assert_eq!(resolve("postgresql@13").family(), "PostgreSQL");
    assert_eq!(resolve("sqlserver").family(), "SQLServer");
}

#[test]
fn test_unknown_family() {
    assert!(matches!(
        resolution_failure("Unknown@1"),
        ResolutionFailure::UnknownFamily(f) if f == "Unknown"
    ));
}

#[test]
fn test_malformed_version() {
    for identifier in ["PostgreSQL@", "PostgreSQL@thirteen", "PostgreSQL@13.1", "PostgreSQL@-2"] {
        assert!(
            matches!(resolution_failure(identifier), ResolutionFailure::MalformedVersion(_)),
            "{identifier}"
        );
    }
}

#[test]
fn test_version_below_minimum() {
    assert!(matches!(
        resolution_failure("PostgreSQL@8"),
        ResolutionFailure::Construction(ConstructionError::UnsupportedVersion { .. })
    ));
}

#[test]
fn test_invalid_storage_engine() {
    let mut settings = Settings::new();
    settings.insert("storage_engine".to_string(), "paper".to_string());
    let err = DialectRegistry::with_builtins()
        .resolve_with("MySQL", &settings)
        .unwrap_err();
    assert!(matches!(
        err,
        DdlGenError::DialectResolutionError {
            reason: ResolutionFailure::Construction(ConstructionError::InvalidSetting { .. }),
            ..
        }
    ));
}

#[derive(Debug)]
struct SqliteDialect {
    version: DatabaseVersion,
}

impl DialectStrategy for SqliteDialect {
    fn family(&self) -> &'static str {
        "SQLite"
    }

    fn version(&self) -> DatabaseVersion {
        self.version
    }

    fn type_name(&self, _ty: &LogicalType) -> Option<String> {
        Some("ANY".to_string())
    }

    fn supports_schemas(&self) -> bool {
        false
    }
}

fn create_sqlite(
    version: Option<DatabaseVersion>,
    _settings: &Settings,
) -> Result<Arc<dyn DialectStrategy>, ConstructionError> {
    Ok(Arc::new(SqliteDialect {
        version: version.unwrap_or(DatabaseVersion::new(3, 0)),
    }))
}

#[test]
fn test_register_additional_family() {
    let mut registry = DialectRegistry::with_builtins();
    assert!(!registry.contains("sqlite"));

    registry.register("SQLite", create_sqlite);

    assert!(registry.contains("sqlite"));
    assert!(registry.families().contains(&"SQLite"));
    let dialect = registry.resolve("SQLite@3").unwrap();
    assert_eq!(dialect.display_name(), "SQLite 3.0");
}

// ============================================================================
// Syntax Tests
// ============================================================================

#[test]
fn test_identifier_quoting_per_family() {
    assert_eq!(resolve("PostgreSQL").render_ident("user", false), "\"user\"");
    assert_eq!(resolve("MySQL").render_ident("order", false), "`order`");
    assert_eq!(resolve("SQLServer").render_ident("order", false), "[order]");
    assert_eq!(resolve("H2").render_ident("email", false), "email");
    assert_eq!(resolve("H2").render_ident("email", true), "\"email\"");
    assert_eq!(resolve("PostgreSQL").render_ident("Mixed Case", false), "\"Mixed Case\"");
}

#[test]
fn test_type_mapping_varies_with_version() {
    let json = LogicalType::parse("JSON").unwrap();
    assert_eq!(resolve("MySQL@8").type_name(&json).as_deref(), Some("JSON"));
    assert_eq!(resolve("MySQL@5").type_name(&json), None);
    assert_eq!(resolve("Oracle@21").type_name(&json).as_deref(), Some("JSON"));
    assert_eq!(resolve("Oracle@19").type_name(&json).as_deref(), Some("CLOB"));

    let boolean = LogicalType::parse("BOOLEAN").unwrap();
    assert_eq!(resolve("SQLServer").type_name(&boolean).as_deref(), Some("BIT"));
    assert_eq!(resolve("Oracle@23").type_name(&boolean).as_deref(), Some("BOOLEAN"));
}

#[test]
fn test_schema_support() {
    assert!(resolve("PostgreSQL").supports_schemas());
    assert!(!resolve("Oracle").supports_schemas());
}

#[test]
fn test_unbounded_lengths_are_not_narrowed() {
    let varchar_max = LogicalType::parse("VARCHAR(MAX)").unwrap();
    assert_eq!(resolve("PostgreSQL").type_name(&varchar_max).as_deref(), Some("TEXT"));
    assert_eq!(resolve("SQLServer").type_name(&varchar_max).as_deref(), Some("VARCHAR(MAX)"));

    let varbinary_max = LogicalType::parse("VARBINARY(MAX)").unwrap();
    assert_eq!(resolve("SQLServer").type_name(&varbinary_max).as_deref(), Some("VARBINARY(MAX)"));
}

#[test]
fn test_timestamp_precision_is_kept() {
    let millis = LogicalType::parse("TIMESTAMP(3)").unwrap();
    assert_eq!(resolve("PostgreSQL").type_name(&millis).as_deref(), Some("TIMESTAMP(3)"));
    assert_eq!(resolve("SQLServer").type_name(&millis).as_deref(), Some("DATETIME2(3)"));
    assert_eq!(resolve("MySQL").type_name(&millis).as_deref(), Some("DATETIME(3)"));

    let nanos = LogicalType::parse("TIMESTAMP(9) WITH TIME ZONE").unwrap();
    assert_eq!(
        resolve("PostgreSQL").type_name(&nanos).as_deref(),
        Some("TIMESTAMP(6) WITH TIME ZONE")
    );
    assert_eq!(
        resolve("Oracle").type_name(&nanos).as_deref(),
        Some("TIMESTAMP(9) WITH TIME ZONE")
    );
}
