//! Build the schema model from entity definitions
//!
//! The result is independent of input order: tables are sorted by
//! namespace and name before relationships are resolved, and the creation
//! order is derived from that sorted list.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use crate::dialect::LogicalType;
use crate::error::{DdlGenError, Result};
use crate::util::to_snake_case;

use super::{
    ColumnElement, EntityDefinition, ForeignKeyElement, NamespaceElement, NamespaceGroup,
    SchemaModel, TableElement,
};

/// Build a schema model from loose entities and namespace groups
pub fn build_model(
    entities: Vec<EntityDefinition>,
    namespaces: Vec<NamespaceGroup>,
) -> Result<SchemaModel> {
    let mut namespace_names: BTreeSet<String> = BTreeSet::new();
    let mut definitions: Vec<EntityDefinition> = Vec::with_capacity(entities.len());

    for group in namespaces {
        if group.name.trim().is_empty() {
            return Err(DdlGenError::InvalidEntityError {
                entity: group
                    .entities
                    .first()
                    .map(|e| e.name.clone())
                    .unwrap_or_default(),
                message: "namespace name must not be empty".to_string(),
            });
        }
        for mut entity in group.entities {
            match &entity.namespace {
                Some(declared) if declared != &group.name => {
                    return Err(DdlGenError::invalid_entity(
                        &entity.name,
                        format!(
                            "declares namespace '{}' but is listed in namespace '{}'",
                            declared, group.name
                        ),
                    ));
                }
                _ => entity.namespace = Some(group.name.clone()),
            }
            definitions.push(entity);
        }
        namespace_names.insert(group.name);
    }

    for entity in entities {
        if let Some(ns) = &entity.namespace {
            namespace_names.insert(ns.clone());
        }
        definitions.push(entity);
    }

    check_duplicate_entities(&definitions)?;

    let mut tables = definitions
        .iter()
        .map(build_table)
        .collect::<Result<Vec<_>>>()?;

    tables.sort_by(|a, b| {
        (&a.namespace, &a.name, &a.entity).cmp(&(&b.namespace, &b.name, &b.entity))
    });
    check_duplicate_tables(&tables)?;

    // Relationships are resolved against the sorted table list
    let index_by_entity: HashMap<&str, usize> = tables
        .iter()
        .enumerate()
        .map(|(i, t)| (t.entity.as_str(), i))
        .collect();
    let definition_by_entity: HashMap<&str, &EntityDefinition> =
        definitions.iter().map(|d| (d.name.as_str(), d)).collect();

    let mut foreign_keys: Vec<Vec<ForeignKeyElement>> = Vec::with_capacity(tables.len());
    for table in &tables {
        let definition = definition_by_entity[table.entity.as_str()];
        let mut fks = Vec::with_capacity(definition.relationships.len());
        for relationship in &definition.relationships {
            let target_index = *index_by_entity
                .get(relationship.target.as_str())
                .ok_or_else(|| DdlGenError::DanglingReferenceError {
                    entity: table.entity.clone(),
                    target: relationship.target.clone(),
                })?;
            let target = &tables[target_index];

            for column in &relationship.columns {
                if table.column(column).is_none() {
                    return Err(DdlGenError::invalid_entity(
                        &table.entity,
                        format!("foreign key column '{}' is not a column of the entity", column),
                    ));
                }
            }

            let referenced_columns = if relationship.target_columns.is_empty() {
                if target.primary_key.is_empty() {
                    return Err(DdlGenError::invalid_entity(
                        &table.entity,
                        format!(
                            "relationship to '{}' needs referenced columns, the target has no primary key",
                            target.entity
                        ),
                    ));
                }
                target.primary_key.clone()
            } else {
                relationship.target_columns.clone()
            };

            for column in &referenced_columns {
                if target.column(column).is_none() {
                    return Err(DdlGenError::invalid_entity(
                        &table.entity,
                        format!(
                            "referenced column '{}' is not a column of '{}'",
                            column, target.entity
                        ),
                    ));
                }
            }

            if relationship.columns.is_empty() || relationship.columns.len() != referenced_columns.len() {
                return Err(DdlGenError::invalid_entity(
                    &table.entity,
                    format!(
                        "relationship to '{}' has {} local column(s) for {} referenced column(s)",
                        target.entity,
                        relationship.columns.len(),
                        referenced_columns.len()
                    ),
                ));
            }

            let name = relationship
                .name
                .clone()
                .unwrap_or_else(|| format!("fk_{}_{}", table.name, relationship.columns.join("_")));

            fks.push(ForeignKeyElement {
                name,
                columns: relationship.columns.clone(),
                referenced_entity: target.entity.clone(),
                referenced_table: target_index,
                referenced_columns,
            });
        }
        foreign_keys.push(fks);
    }

    for (table, fks) in tables.iter_mut().zip(foreign_keys) {
        table.foreign_keys = fks;
    }

    let creation_order = creation_order(&tables);

    debug!(
        "Built schema model with {} tables in {} namespaces",
        tables.len(),
        namespace_names.len()
    );

    Ok(SchemaModel {
        namespaces: namespace_names
            .into_iter()
            .map(|name| NamespaceElement { name })
            .collect(),
        tables,
        creation_order,
    })
}

fn check_duplicate_entities(definitions: &[EntityDefinition]) -> Result<()> {
    let mut seen = HashSet::with_capacity(definitions.len());
    for definition in definitions {
        if definition.name.trim().is_empty() {
            return Err(DdlGenError::invalid_entity(
                &definition.name,
                "entity name must not be empty",
            ));
        }
        if !seen.insert(definition.name.as_str()) {
            return Err(DdlGenError::DuplicateEntityError {
                kind: "entity",
                name: definition.name.clone(),
            });
        }
    }
    Ok(())
}

/// Table names are compared case-insensitively within a namespace
fn check_duplicate_tables(tables: &[TableElement]) -> Result<()> {
    let mut seen = HashSet::with_capacity(tables.len());
    for table in tables {
        let key = (
            table.namespace.as_deref().map(str::to_ascii_lowercase),
            table.name.to_ascii_lowercase(),
        );
        if !seen.insert(key) {
            return Err(DdlGenError::DuplicateEntityError {
                kind: "table",
                name: table.qualified_name(),
            });
        }
    }
    Ok(())
}

fn build_table(definition: &EntityDefinition) -> Result<TableElement> {
    if definition.columns.is_empty() {
        return Err(DdlGenError::invalid_entity(
            &definition.name,
            "entity declares no columns",
        ));
    }

    let mut seen = HashSet::with_capacity(definition.columns.len());
    let mut columns = Vec::with_capacity(definition.columns.len());
    let mut primary_key = Vec::new();

    for column in &definition.columns {
        if !seen.insert(column.name.as_str()) {
            return Err(DdlGenError::invalid_entity(
                &definition.name,
                format!("duplicate column '{}'", column.name),
            ));
        }

        let logical_type = LogicalType::parse(&column.sql_type).map_err(|e| {
            DdlGenError::invalid_entity(
                &definition.name,
                format!("column '{}' has an invalid type: {}", column.name, e),
            )
        })?;

        if column.primary_key {
            primary_key.push(column.name.clone());
        }

        columns.push(ColumnElement {
            name: column.name.clone(),
            logical_type,
            declared_type: column.sql_type.trim().to_string(),
            nullable: column.nullable && !column.primary_key,
            identity: column.identity,
            unique: column.unique,
            default_value: column.default_value.clone(),
        });
    }

    let name = match &definition.table {
        Some(table) if !table.trim().is_empty() => table.trim().to_string(),
        _ => to_snake_case(definition.simple_name()),
    };

    Ok(TableElement {
        entity: definition.name.clone(),
        namespace: definition.namespace.clone(),
        name,
        columns,
        primary_key,
        foreign_keys: Vec::new(),
    })
}

/// Topological order over foreign keys, referenced tables first.
///
/// At each step the earliest table (in model order) whose dependencies are
/// all placed is taken. A cycle is broken by taking the earliest remaining
/// table.
fn creation_order(tables: &[TableElement]) -> Vec<usize> {
    let dependencies: Vec<BTreeSet<usize>> = tables
        .iter()
        .enumerate()
        .map(|(i, t)| {
            t.foreign_keys
                .iter()
                .map(|fk| fk.referenced_table)
                .filter(|&target| target != i)
                .collect()
        })
        .collect();

    let mut placed = vec![false; tables.len()];
    let mut order = Vec::with_capacity(tables.len());

    while order.len() < tables.len() {
        let ready = (0..tables.len())
            .find(|&i| !placed[i] && dependencies[i].iter().all(|&d| placed[d]));

        let next = match ready {
            Some(i) => i,
            None => {
                let Some(i) = (0..tables.len()).find(|&i| !placed[i]) else {
                    break;
                };
                debug!(
                    "Foreign key cycle detected, placing {} before its dependencies",
                    tables[i].qualified_name()
                );
                i
            }
        };

        placed[next] = true;
        order.push(next);
    }

    order
}
