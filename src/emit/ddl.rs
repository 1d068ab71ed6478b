//! Statement layout: multi-line when formatting, single-line otherwise

const INDENT: &str = "    ";

/// `CREATE TABLE name (items) [options]`
pub(crate) fn create_table(
    table: &str,
    items: &[String],
    table_options: Option<&str>,
    format: bool,
) -> String {
    let mut sql = if format {
        let body = items
            .iter()
            .map(|item| format!("{INDENT}{item}"))
            .collect::<Vec<_>>()
            .join(",\n");
        format!("CREATE TABLE {table} (\n{body}\n)")
    } else {
        format!("CREATE TABLE {table} ({})", items.join(", "))
    };

    if let Some(options) = table_options {
        sql.push(' ');
        sql.push_str(options);
    }
    sql
}

/// `ALTER TABLE t ADD CONSTRAINT c FOREIGN KEY (cols) REFERENCES rt (rcols)`
pub(crate) fn add_foreign_key(
    table: &str,
    constraint: &str,
    columns: &[String],
    referenced_table: &str,
    referenced_columns: &[String],
    format: bool,
) -> String {
    let separator = if format {
        format!("\n{INDENT}")
    } else {
        " ".to_string()
    };
    format!(
        "ALTER TABLE {table}{sep}ADD CONSTRAINT {constraint}{sep}FOREIGN KEY ({cols}){sep}REFERENCES {referenced_table} ({rcols})",
        sep = separator,
        cols = columns.join(", "),
        rcols = referenced_columns.join(", "),
    )
}

/// Append the statement delimiter
pub(crate) fn terminate(statement: String, delimiter: &str) -> String {
    if delimiter.is_empty() || statement.ends_with(delimiter) {
        statement
    } else {
        statement + delimiter
    }
}
