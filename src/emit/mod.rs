//! DDL statement emission for one phase and one dialect
//!
//! Emission never stops early: every planned statement is rendered and
//! failures come back as [`GenerationError`] items in statement order. The
//! caller decides whether a failure halts the run.

mod ddl;

use crate::dialect::{DialectStrategy, IdentityStyle};
use crate::error::{GenerationError, StatementError};
use crate::filter::FilteredSchema;
use crate::model::{ColumnElement, ForeignKeyElement, TableElement};
use crate::options::{ExecutionOptions, Phase, QUOTE_IDENTIFIERS_SETTING};
use crate::script::ImportScript;

/// Outcome of one planned statement
pub type StatementResult = Result<String, GenerationError>;

/// Render all statements of `phase` for the selected part of the model.
///
/// Successful items are complete, delimiter-terminated statements. Import
/// scripts are appended unmodified after the creation statements.
pub fn emit(
    phase: Phase,
    filtered: &FilteredSchema<'_>,
    dialect: &dyn DialectStrategy,
    options: &ExecutionOptions,
    imports: &[ImportScript],
) -> Vec<StatementResult> {
    let renderer = Renderer {
        dialect,
        options,
        phase,
        force_quote: options.setting_enabled(QUOTE_IDENTIFIERS_SETTING),
    };

    match phase {
        Phase::Drop => renderer.drop_statements(filtered),
        Phase::Create => {
            let mut statements = renderer.create_statements(filtered);
            if !imports.is_empty() {
                statements.extend(imports.iter().map(|script| Ok(script.contents.clone())));
            }
            statements
        }
    }
}

struct Renderer<'a> {
    dialect: &'a dyn DialectStrategy,
    options: &'a ExecutionOptions,
    phase: Phase,
    force_quote: bool,
}

impl Renderer<'_> {
    fn drop_statements(&self, filtered: &FilteredSchema<'_>) -> Vec<StatementResult> {
        let mut statements = Vec::new();

        for table in filtered.tables_in_drop_order() {
            let sql = self.dialect.drop_table(&self.table_name(table));
            statements.push(Ok(self.terminate(sql)));
        }

        if self.uses_sequences() {
            for table in filtered.tables_in_drop_order().filter(|t| t.has_identity()) {
                let sql = self.dialect.drop_sequence(&self.sequence_name(table));
                statements.push(Ok(self.terminate(sql)));
            }
        }

        if self.manages_namespaces() {
            for namespace in filtered.namespaces_with_tables().rev() {
                let sql = self.dialect.drop_schema(&self.ident(&namespace.name));
                statements.push(Ok(self.terminate(sql)));
            }
        }

        statements
    }

    fn create_statements(&self, filtered: &FilteredSchema<'_>) -> Vec<StatementResult> {
        let mut statements = Vec::new();

        if self.manages_namespaces() {
            for namespace in filtered.namespaces_with_tables() {
                let sql = self.dialect.create_schema(&self.ident(&namespace.name));
                statements.push(Ok(self.terminate(sql)));
            }
        }

        if self.uses_sequences() {
            for table in filtered.tables_in_creation_order().filter(|t| t.has_identity()) {
                let sql = self.dialect.create_sequence(&self.sequence_name(table));
                statements.push(Ok(self.terminate(sql)));
            }
        }

        for table in filtered.tables_in_creation_order() {
            statements.push(self.create_table(table));
        }

        for table in filtered.tables_in_creation_order() {
            for fk in &table.foreign_keys {
                statements.push(self.add_foreign_key(filtered, table, fk));
            }
        }

        statements
    }

    fn create_table(&self, table: &TableElement) -> StatementResult {
        let mut items = Vec::with_capacity(table.columns.len() + 1);
        let mut failure = None;

        for column in &table.columns {
            let type_sql = match self.dialect.type_name(&column.logical_type) {
                Some(type_sql) => type_sql,
                None => {
                    failure.get_or_insert_with(|| StatementError::UnsupportedType {
                        table: table.qualified_name(),
                        column: column.name.clone(),
                        sql_type: column.declared_type.clone(),
                        dialect: self.dialect.display_name(),
                    });
                    column.declared_type.clone()
                }
            };
            items.push(self.column_definition(table, column, type_sql));
        }

        if !table.primary_key.is_empty() {
            items.push(format!("PRIMARY KEY ({})", self.ident_list(&table.primary_key)));
        }

        let options = self.dialect.table_options();
        let sql = ddl::create_table(
            &self.table_name(table),
            &items,
            options.as_deref(),
            self.options.format(),
        );

        match failure {
            None => Ok(self.terminate(sql)),
            Some(cause) => Err(self.failed(sql, cause, table)),
        }
    }

    fn column_definition(&self, table: &TableElement, column: &ColumnElement, type_sql: String) -> String {
        let inline_identity =
            column.identity && self.dialect.identity_style() == IdentityStyle::Inline;

        let mut sql = self.ident(&column.name);
        sql.push(' ');
        if inline_identity {
            sql.push_str(&self.dialect.identity_column(&type_sql, &column.logical_type));
        } else {
            sql.push_str(&type_sql);
        }

        if let Some(default) = column.default_value.as_deref().filter(|_| !column.identity) {
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }
        if !column.nullable {
            sql.push_str(" NOT NULL");
        }

        let sole_primary_key = table.primary_key.len() == 1 && table.primary_key[0] == column.name;
        if column.unique && !sole_primary_key {
            sql.push_str(" UNIQUE");
        }
        sql
    }

    fn add_foreign_key(
        &self,
        filtered: &FilteredSchema<'_>,
        table: &TableElement,
        fk: &ForeignKeyElement,
    ) -> StatementResult {
        let model = filtered.model();
        let referenced = &model.tables()[fk.referenced_table];

        let sql = ddl::add_foreign_key(
            &self.table_name(table),
            &self.ident(&fk.name),
            &fk.columns.iter().map(|c| self.ident(c)).collect::<Vec<_>>(),
            &self.table_name(referenced),
            &fk.referenced_columns
                .iter()
                .map(|c| self.ident(c))
                .collect::<Vec<_>>(),
            self.options.format(),
        );

        if filtered.contains_table(fk.referenced_table) {
            Ok(self.terminate(sql))
        } else {
            let cause = StatementError::DanglingForeignKey {
                constraint: fk.name.clone(),
                table: table.qualified_name(),
                referenced: referenced.qualified_name(),
            };
            Err(self.failed(sql, cause, table))
        }
    }

    fn failed(&self, sql: String, cause: StatementError, table: &TableElement) -> GenerationError {
        GenerationError {
            dialect: self.dialect.display_name(),
            phase: self.phase,
            sql: self.terminate(sql),
            cause,
            entity: Some(table.entity.clone()),
        }
    }

    fn ident(&self, name: &str) -> String {
        self.dialect.render_ident(name, self.force_quote)
    }

    fn ident_list(&self, names: &[String]) -> String {
        names
            .iter()
            .map(|n| self.ident(n))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn table_name(&self, table: &TableElement) -> String {
        self.qualify(table.namespace.as_deref(), &table.name)
    }

    fn sequence_name(&self, table: &TableElement) -> String {
        self.qualify(table.namespace.as_deref(), &format!("{}_seq", table.name))
    }

    fn qualify(&self, namespace: Option<&str>, name: &str) -> String {
        match namespace {
            Some(ns) => format!("{}.{}", self.ident(ns), self.ident(name)),
            None => self.ident(name),
        }
    }

    fn uses_sequences(&self) -> bool {
        self.dialect.identity_style() == IdentityStyle::Sequence
    }

    fn manages_namespaces(&self) -> bool {
        self.options.manage_namespaces() && self.dialect.supports_schemas()
    }

    fn terminate(&self, sql: String) -> String {
        ddl::terminate(sql, self.options.delimiter())
    }
}
