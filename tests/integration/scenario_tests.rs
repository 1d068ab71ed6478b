//! End-to-end generation scenarios
//!
//! These tests run the whole pipeline (model, filters, emission, writing)
//! against in-memory entity definitions.

use std::fs;

use pretty_assertions::assert_eq;

use rust_ddlgen::filter::{FilterTarget, SchemaFilterConfig};
use rust_ddlgen::model::{build_model, ColumnDefinition, EntityDefinition, NamespaceGroup};
use rust_ddlgen::{
    generate_scripts, Action, DdlGenError, DialectRegistry, ExecutionCoordinator,
    ExecutionOptions, Phase,
};

use crate::common::{order_entity, shop_entities, statements, user_entity, TestContext};

fn excluding_user_on_create() -> SchemaFilterConfig {
    SchemaFilterConfig::new(
        |target: FilterTarget<'_>| {
            !matches!(target, FilterTarget::Entity(t) if t.entity == "com.acme.User")
        },
        |_: FilterTarget<'_>| true,
    )
}

// ============================================================================
// Scenario Tests
// ============================================================================

/// Create-only PostgreSQL@13 writes referenced tables first into postgresql13.sql
#[test]
fn test_postgres_create_only() {
    let ctx = TestContext::new();
    let options = ExecutionOptions::builder()
        .output_dir(ctx.output_dir())
        .build();

    let report = generate_scripts(
        shop_entities(),
        vec![],
        &["PostgreSQL@13".to_string()],
        &options,
    )
    .unwrap();

    assert!(report.is_success());
    assert_eq!(report.scripts.len(), 1);
    assert_eq!(report.scripts[0].path, ctx.script_path("postgresql13.sql"));
    assert_eq!(report.scripts[0].statement_count, 3);

    let script = ctx.read_script("postgresql13.sql");
    assert_eq!(
        script,
        r#"CREATE TABLE "user" (
    id BIGINT GENERATED BY DEFAULT AS IDENTITY NOT NULL,
    email VARCHAR(255) NOT NULL UNIQUE,
    PRIMARY KEY (id)
);

CREATE TABLE "order" (
    id BIGINT GENERATED BY DEFAULT AS IDENTITY NOT NULL,
    user_id BIGINT NOT NULL,
    total NUMERIC(10,2),
    PRIMARY KEY (id)
);

ALTER TABLE "order"
    ADD CONSTRAINT fk_order_user_id
    FOREIGN KEY (user_id)
    REFERENCES "user" (id);
"#
    );
}

/// Drop-and-create begins by dropping dependent tables first
#[test]
fn test_drop_and_create_order() {
    let ctx = TestContext::new();
    let options = ExecutionOptions::builder()
        .action(Action::DropAndCreate)
        .output_dir(ctx.output_dir())
        .build();

    generate_scripts(shop_entities(), vec![], &["PostgreSQL@13".to_string()], &options).unwrap();

    let script = ctx.read_script("postgresql13.sql");
    let stmts = statements(&script);
    assert_eq!(stmts[0], "DROP TABLE \"order\" CASCADE;");
    assert_eq!(stmts[1], "DROP TABLE \"user\" CASCADE;");
    assert!(stmts[2].starts_with("CREATE TABLE \"user\""));
}

/// An unknown family fails resolution and produces no file for it
#[test]
fn test_unknown_dialect() {
    let ctx = TestContext::new();
    let options = ExecutionOptions::builder()
        .output_dir(ctx.output_dir())
        .build();

    let err = generate_scripts(shop_entities(), vec![], &["Unknown@1".to_string()], &options)
        .unwrap_err();

    assert!(matches!(
        err,
        DdlGenError::DialectResolutionError { ref identifier, .. } if identifier == "Unknown@1"
    ));
    assert!(!ctx.script_path("unknown1.sql").exists());
}

/// Halting on a dangling foreign key fails the run without a partial file
#[test]
fn test_halt_on_filtered_reference() {
    let ctx = TestContext::new();
    let options = ExecutionOptions::builder()
        .output_dir(ctx.output_dir())
        .build();
    let model = build_model(shop_entities(), vec![]).unwrap();
    let registry = DialectRegistry::with_builtins();
    let coordinator =
        ExecutionCoordinator::with_filter(&registry, &options, excluding_user_on_create());

    let err = coordinator
        .run(&model, &["PostgreSQL@13".to_string()])
        .unwrap_err();

    match err {
        DdlGenError::GenerationError(e) => {
            assert_eq!(e.phase, Phase::Create);
            assert_eq!(e.entity.as_deref(), Some("com.acme.Order"));
        }
        other => panic!("expected a generation error, got {other:?}"),
    }
    assert!(!ctx.script_path("postgresql13.sql").exists());
}

/// Collecting keeps every successful statement and reports one error
#[test]
fn test_collect_on_filtered_reference() {
    let ctx = TestContext::new();
    let options = ExecutionOptions::builder()
        .halt_on_error(false)
        .output_dir(ctx.output_dir())
        .build();
    let model = build_model(shop_entities(), vec![]).unwrap();
    let registry = DialectRegistry::with_builtins();
    let coordinator =
        ExecutionCoordinator::with_filter(&registry, &options, excluding_user_on_create());

    let report = coordinator
        .run(&model, &["PostgreSQL@13".to_string()])
        .unwrap();

    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].sql.starts_with("ALTER TABLE \"order\""));

    let script = ctx.read_script("postgresql13.sql");
    let stmts = statements(&script);
    assert_eq!(stmts.len(), 1);
    assert!(stmts[0].starts_with("CREATE TABLE \"order\""));
    assert!(!script.contains("CREATE TABLE \"user\""));
}

// ============================================================================
// Property Tests
// ============================================================================

/// Two runs with identical input produce byte-identical files
#[test]
fn test_repeated_runs_are_identical() {
    let ctx = TestContext::new();
    let options = ExecutionOptions::builder()
        .action(Action::DropAndCreate)
        .output_dir(ctx.output_dir())
        .build();
    let dialects: Vec<String> = ["PostgreSQL@13", "MySQL", "SQLServer", "Oracle", "H2"]
        .iter()
        .map(|d| d.to_string())
        .collect();

    let first = generate_scripts(shop_entities(), vec![], &dialects, &options).unwrap();
    let first_contents: Vec<String> = first
        .scripts
        .iter()
        .map(|s| fs::read_to_string(&s.path).unwrap())
        .collect();

    let second = generate_scripts(shop_entities(), vec![], &dialects, &options).unwrap();
    for (i, script) in second.scripts.iter().enumerate() {
        assert_eq!(fs::read_to_string(&script.path).unwrap(), first_contents[i]);
        assert_eq!(script.checksum, first.scripts[i].checksum);
    }
}

/// Entity input order does not change the output
#[test]
fn test_input_order_independence() {
    let ctx = TestContext::new();
    let forward = ExecutionOptions::builder()
        .output_dir(ctx.output_dir().join("forward"))
        .build();
    let reverse = ExecutionOptions::builder()
        .output_dir(ctx.output_dir().join("reverse"))
        .build();

    let a = generate_scripts(
        vec![user_entity(), order_entity()],
        vec![],
        &["H2".to_string()],
        &forward,
    )
    .unwrap();
    let b = generate_scripts(
        vec![order_entity(), user_entity()],
        vec![],
        &["H2".to_string()],
        &reverse,
    )
    .unwrap();

    assert_eq!(a.scripts[0].checksum, b.scripts[0].checksum);
}

/// Toggling namespace management only adds or removes schema statements
#[test]
fn test_manage_namespaces_toggle() {
    let ctx = TestContext::new();
    let entity = EntityDefinition::new("Invoice")
        .column(ColumnDefinition::new("id", "INTEGER").primary_key());
    let namespaces = || vec![NamespaceGroup::new("billing").entity(entity.clone())];

    let with = ExecutionOptions::builder()
        .action(Action::DropAndCreate)
        .output_dir(ctx.output_dir().join("with"))
        .build();
    let without = ExecutionOptions::builder()
        .action(Action::DropAndCreate)
        .manage_namespaces(false)
        .output_dir(ctx.output_dir().join("without"))
        .build();

    let dialects = ["PostgreSQL".to_string()];
    let a = generate_scripts(vec![], namespaces(), &dialects, &with).unwrap();
    let b = generate_scripts(vec![], namespaces(), &dialects, &without).unwrap();

    let with_script = fs::read_to_string(&a.scripts[0].path).unwrap();
    let without_script = fs::read_to_string(&b.scripts[0].path).unwrap();

    let non_schema = |script: &str| -> Vec<String> {
        statements(script)
            .into_iter()
            .filter(|s| !s.contains(" SCHEMA "))
            .map(str::to_string)
            .collect()
    };

    assert!(with_script.contains("CREATE SCHEMA billing;"));
    assert!(with_script.contains("DROP SCHEMA billing;"));
    assert!(!without_script.contains("SCHEMA"));
    assert_eq!(non_schema(&with_script), non_schema(&without_script));
}

/// Create and drop filters select independently
#[test]
fn test_disjoint_phase_filters() {
    let ctx = TestContext::new();
    let options = ExecutionOptions::builder()
        .action(Action::DropAndCreate)
        .halt_on_error(false)
        .output_dir(ctx.output_dir())
        .build();
    let model = build_model(shop_entities(), vec![]).unwrap();
    let registry = DialectRegistry::with_builtins();
    let filter = SchemaFilterConfig::new(
        |t: FilterTarget<'_>| matches!(t, FilterTarget::Entity(e) if e.name == "user"),
        |t: FilterTarget<'_>| matches!(t, FilterTarget::Entity(e) if e.name == "order"),
    );
    let coordinator = ExecutionCoordinator::with_filter(&registry, &options, filter);

    let report = coordinator.run(&model, &["H2".to_string()]).unwrap();
    assert!(report.is_success());

    let script = ctx.read_script("h2.sql");
    assert!(script.contains("DROP TABLE \"order\" CASCADE;"));
    assert!(!script.contains("DROP TABLE \"user\""));
    assert!(script.contains("CREATE TABLE \"user\""));
    assert!(!script.contains("CREATE TABLE \"order\""));
}

/// Every built-in family produces a script with its own syntax
#[test]
fn test_all_builtin_families() {
    let ctx = TestContext::new();
    let options = ExecutionOptions::builder()
        .format(false)
        .output_dir(ctx.output_dir())
        .build();
    let dialects: Vec<String> = ["PostgreSQL@9", "MySQL@5", "MariaDB", "SQLServer", "Oracle@11", "H2"]
        .iter()
        .map(|d| d.to_string())
        .collect();

    let report = generate_scripts(shop_entities(), vec![], &dialects, &options).unwrap();
    assert_eq!(report.scripts.len(), 6);

    assert!(ctx.read_script("postgresql9.sql").contains("id BIGSERIAL NOT NULL"));
    assert!(ctx.read_script("mysql5.sql").contains("`user`"));
    assert!(ctx.read_script("mysql5.sql").contains("ENGINE=InnoDB;"));
    assert!(ctx.read_script("mariadb.sql").contains("id BIGINT AUTO_INCREMENT NOT NULL"));
    assert!(ctx.read_script("sqlserver.sql").contains("id BIGINT IDENTITY(1,1) NOT NULL"));
    let oracle = ctx.read_script("oracle11.sql");
    assert!(oracle.starts_with("CREATE SEQUENCE user_seq START WITH 1 INCREMENT BY 1;"));
    assert!(oracle.contains("total NUMBER(10,2)"));
    assert!(ctx.read_script("h2.sql").contains("email VARCHAR(255) NOT NULL UNIQUE"));
}
