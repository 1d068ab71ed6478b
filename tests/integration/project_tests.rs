//! Generation driven by .ddlproj project files

use pretty_assertions::assert_eq;

use rust_ddlgen::{DdlGenError, GenerateOptions};

use crate::common::{file_exists, project_xml, statements, TestContext, SHOP_ENTITIES};

fn shop_project(ctx: &TestContext, dialects: &str, properties: &str, items: &str) {
    ctx.write_file("entities/shop.xml", SHOP_ENTITIES);
    ctx.write_project(&project_xml(dialects, properties, items));
}

fn root_error(err: &anyhow::Error) -> Option<&DdlGenError> {
    err.downcast_ref::<DdlGenError>()
}

// ============================================================================
// Project Generation Tests
// ============================================================================

/// Entity files under entities/ are picked up without an explicit item
#[test]
fn test_generate_from_default_entity_dir() {
    let ctx = TestContext::new();
    shop_project(&ctx, "PostgreSQL@13;H2", "", "");

    let report = ctx.generate(GenerateOptions::default()).unwrap();

    assert!(report.is_success());
    assert_eq!(report.scripts.len(), 2);
    assert!(file_exists(&ctx.script_path("postgresql13.sql")));
    assert!(file_exists(&ctx.script_path("h2.sql")));

    let script = ctx.read_script("postgresql13.sql");
    let stmts = statements(&script);
    assert_eq!(stmts.len(), 3);
    assert!(stmts[0].starts_with("CREATE TABLE \"user\" ("));
}

/// Include and Remove globs select entity files
#[test]
fn test_entity_include_and_remove() {
    let ctx = TestContext::new();
    ctx.write_file("model/shop.xml", SHOP_ENTITIES);
    ctx.write_file(
        "model/legacy.xml",
        r#"<Entities><Entity Name="Legacy"><Column Name="id" Type="INTEGER" PrimaryKey="true" /></Entity></Entities>"#,
    );
    ctx.write_project(&project_xml(
        "H2",
        "",
        r#"<Entities Include="model/*.xml" Remove="model/legacy.xml" />"#,
    ));

    ctx.generate(GenerateOptions::default()).unwrap();

    let script = ctx.read_script("h2.sql");
    assert!(script.contains("CREATE TABLE \"user\""));
    assert!(!script.contains("legacy"));
}

/// Command-line overrides replace the project's settings
#[test]
fn test_overrides() {
    let ctx = TestContext::new();
    shop_project(&ctx, "H2", "", "");
    let output = ctx.project_dir.join("override");

    let report = ctx
        .generate(GenerateOptions {
            output_dir: Some(output.clone()),
            dialects: vec!["SQLServer@15".to_string()],
            create_drop: Some(true),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(report.scripts.len(), 1);
    assert_eq!(report.scripts[0].path, output.join("sqlserver15.sql"));
    assert!(!file_exists(&ctx.script_path("h2.sql")));

    let script = std::fs::read_to_string(output.join("sqlserver15.sql")).unwrap();
    assert!(script.starts_with("DROP TABLE [order];"));
}

/// Project properties configure delimiter and formatting
#[test]
fn test_project_properties() {
    let ctx = TestContext::new();
    shop_project(
        &ctx,
        "MySQL@8",
        "<Delimiter>$$</Delimiter><Format>false</Format>",
        r#"<Property Name="storage_engine" Value="MyISAM" />"#,
    );

    ctx.generate(GenerateOptions::default()).unwrap();

    let script = ctx.read_script("mysql8.sql");
    let lines: Vec<&str> = script.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("CREATE TABLE `user` ("));
    assert!(lines[0].ends_with(") ENGINE=MyISAM$$"));
    assert!(lines[2].starts_with("ALTER TABLE `order` ADD CONSTRAINT"));
}

/// Import files are appended unmodified after the creation statements
#[test]
fn test_import_files() {
    let ctx = TestContext::new();
    ctx.write_file("sql/seed.sql", "INSERT INTO \"user\" (email) VALUES ('a@b.c');\n");
    shop_project(&ctx, "PostgreSQL", "", r#"<ImportFile Include="sql/seed.sql" />"#);

    let report = ctx.generate(GenerateOptions::default()).unwrap();
    assert_eq!(report.scripts[0].statement_count, 4);

    let script = ctx.read_script("postgresql.sql");
    assert!(script.ends_with("INSERT INTO \"user\" (email) VALUES ('a@b.c');\n"));
}

/// A missing import file fails before any script is written
#[test]
fn test_missing_import_file() {
    let ctx = TestContext::new();
    shop_project(&ctx, "H2", "", r#"<ImportFile Include="sql/missing.sql" />"#);

    let err = ctx.generate(GenerateOptions::default()).unwrap_err();
    assert!(matches!(
        root_error(&err),
        Some(DdlGenError::ImportFileReadError { .. })
    ));
    assert!(!file_exists(&ctx.script_path("h2.sql")));
}

/// The pattern filter provider is configured through properties
#[test]
fn test_pattern_filter_provider() {
    let ctx = TestContext::new();
    shop_project(
        &ctx,
        "H2",
        "<CreateDropStatements>true</CreateDropStatements>",
        r#"<Property Name="schema_filter_provider" Value="pattern" />
    <Property Name="filter.drop.exclude" Value="com\.acme\.Order" />"#,
    );

    ctx.generate(GenerateOptions::default()).unwrap();

    let script = ctx.read_script("h2.sql");
    let stmts = statements(&script);
    assert_eq!(stmts[0], "DROP TABLE \"user\" CASCADE;");
    assert!(!script.contains("DROP TABLE \"order\""));
    assert!(script.contains("CREATE TABLE \"order\""));
}

/// Collected failures are reported and the script is still written
#[test]
fn test_collect_unsupported_type() {
    let ctx = TestContext::new();
    ctx.write_file(
        "entities/doc.xml",
        r#"<Entities>
  <Entity Name="Doc">
    <Column Name="id" Type="INTEGER" PrimaryKey="true" />
    <Column Name="body" Type="JSON" />
  </Entity>
</Entities>"#,
    );
    ctx.write_project(&project_xml(
        "MySQL@5;PostgreSQL",
        "<HaltOnError>false</HaltOnError>",
        "",
    ));

    let report = ctx.generate(GenerateOptions::default()).unwrap();

    assert_eq!(report.scripts.len(), 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].entity.as_deref(), Some("Doc"));
    assert!(ctx.read_script("postgresql.sql").contains("body JSONB"));
}

// ============================================================================
// Invalid Project Tests
// ============================================================================

#[test]
fn test_missing_project_file() {
    let ctx = TestContext::new();
    let err = ctx.generate(GenerateOptions::default()).unwrap_err();
    assert!(matches!(
        root_error(&err),
        Some(DdlGenError::ProjectReadError { .. })
    ));
}

#[test]
fn test_no_dialects() {
    let ctx = TestContext::new();
    shop_project(&ctx, "", "", "");

    let err = ctx.generate(GenerateOptions::default()).unwrap_err();
    assert!(matches!(
        root_error(&err),
        Some(DdlGenError::InvalidProjectFormat { .. })
    ));
}

#[test]
fn test_malformed_entity_file() {
    let ctx = TestContext::new();
    ctx.write_file("entities/broken.xml", "<Entities><Entity Name=\"A\">");
    ctx.write_project(&project_xml("H2", "", ""));

    let err = ctx.generate(GenerateOptions::default()).unwrap_err();
    assert!(matches!(
        root_error(&err),
        Some(DdlGenError::EntityFileParseError { .. })
    ));
}

#[test]
fn test_dangling_entity_reference() {
    let ctx = TestContext::new();
    ctx.write_file(
        "entities/order.xml",
        r#"<Entities>
  <Entity Name="Order">
    <Column Name="id" Type="BIGINT" PrimaryKey="true" />
    <Column Name="user_id" Type="BIGINT" />
    <ForeignKey Columns="user_id" References="User" />
  </Entity>
</Entities>"#,
    );
    ctx.write_project(&project_xml("H2", "", ""));

    let err = ctx.generate(GenerateOptions::default()).unwrap_err();
    assert!(matches!(
        root_error(&err),
        Some(DdlGenError::DanglingReferenceError { .. })
    ));
}
