//! Schema model representation

use crate::dialect::LogicalType;

/// The validated logical schema shared by every dialect target of a run
#[derive(Debug, Clone, Default)]
pub struct SchemaModel {
    pub(crate) namespaces: Vec<NamespaceElement>,
    pub(crate) tables: Vec<TableElement>,
    /// Indices into `tables`, referenced tables first
    pub(crate) creation_order: Vec<usize>,
}

impl SchemaModel {
    /// Namespaces sorted by name
    pub fn namespaces(&self) -> &[NamespaceElement] {
        &self.namespaces
    }

    /// Tables sorted by namespace, then table name
    pub fn tables(&self) -> &[TableElement] {
        &self.tables
    }

    pub fn table(&self, index: usize) -> Option<&TableElement> {
        self.tables.get(index)
    }

    /// Look up a table by its entity's qualified name
    pub fn table_for_entity(&self, entity: &str) -> Option<&TableElement> {
        self.tables.iter().find(|t| t.entity == entity)
    }

    /// Table indices in foreign-key dependency order
    pub fn creation_order(&self) -> &[usize] {
        &self.creation_order
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceElement {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableElement {
    /// Qualified name of the entity this table maps
    pub entity: String,
    pub namespace: Option<String>,
    pub name: String,
    pub columns: Vec<ColumnElement>,
    /// Primary key column names in declaration order
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKeyElement>,
}

impl TableElement {
    /// `namespace.name` or just `name`
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}.{}", ns, self.name),
            None => self.name.clone(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnElement> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_identity(&self) -> bool {
        self.columns.iter().any(|c| c.identity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnElement {
    pub name: String,
    pub logical_type: LogicalType,
    /// Type text as declared by the entity, used in diagnostics
    pub declared_type: String,
    pub nullable: bool,
    pub identity: bool,
    pub unique: bool,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyElement {
    pub name: String,
    pub columns: Vec<String>,
    pub referenced_entity: String,
    /// Index of the referenced table in [`SchemaModel::tables`]
    pub referenced_table: usize,
    pub referenced_columns: Vec<String>,
}
