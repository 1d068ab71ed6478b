//! Entity definitions: the input side of model building
//!
//! These mirror what an entity source (XML files, code, a scanner) declares.
//! They carry raw SQL type text; validation happens in [`super::build_model`].

/// A mapped entity that becomes one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDefinition {
    /// Qualified entity name (e.g., "com.acme.User")
    pub name: String,
    /// Explicit table name; defaults to the snake_case simple name
    pub table: Option<String>,
    /// Owning namespace (schema)
    pub namespace: Option<String>,
    pub columns: Vec<ColumnDefinition>,
    pub relationships: Vec<RelationshipDefinition>,
}

impl EntityDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            namespace: None,
            columns: Vec::new(),
            relationships: Vec::new(),
        }
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn in_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn column(mut self, column: ColumnDefinition) -> Self {
        self.columns.push(column);
        self
    }

    pub fn relationship(mut self, relationship: RelationshipDefinition) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Name after the last `.` of the qualified name
    pub fn simple_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// A mapped attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    /// SQL type text as declared (e.g., "VARCHAR(100)")
    pub sql_type: String,
    pub nullable: bool,
    pub primary_key: bool,
    /// Value generated by the database (identity or sequence)
    pub identity: bool,
    pub unique: bool,
    /// Default expression, emitted verbatim
    pub default_value: Option<String>,
}

impl ColumnDefinition {
    /// A nullable column
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            nullable: true,
            primary_key: false,
            identity: false,
            unique: false,
            default_value: None,
        }
    }

    /// Mark as part of the primary key (implies NOT NULL)
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn identity(mut self) -> Self {
        self.identity = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default_value(mut self, expression: impl Into<String>) -> Self {
        self.default_value = Some(expression.into());
        self
    }
}

/// A many-to-one association rendered as a foreign key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDefinition {
    /// Constraint name; generated when absent
    pub name: Option<String>,
    /// Local columns
    pub columns: Vec<String>,
    /// Qualified name of the referenced entity
    pub target: String,
    /// Referenced columns; empty means the target's primary key
    pub target_columns: Vec<String>,
}

impl RelationshipDefinition {
    pub fn new(column: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: None,
            columns: vec![column.into()],
            target: target.into(),
            target_columns: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn referencing<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

/// Entities sharing one namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceGroup {
    pub name: String,
    pub entities: Vec<EntityDefinition>,
}

impl NamespaceGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: Vec::new(),
        }
    }

    pub fn entity(mut self, entity: EntityDefinition) -> Self {
        self.entities.push(entity);
        self
    }
}
