//! Entity definitions read from XML files
//!
//! ```xml
//! <Entities>
//!   <Namespace Name="sales">
//!     <Entity Name="com.acme.Order" Table="order">
//!       <Column Name="id" Type="BIGINT" PrimaryKey="true" Identity="true" />
//!       <Column Name="user_id" Type="BIGINT" Nullable="false" />
//!       <ForeignKey Columns="user_id" References="com.acme.User" />
//!     </Entity>
//!   </Namespace>
//!   <Entity Name="com.acme.User">...</Entity>
//! </Entities>
//! ```

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use roxmltree::{Document, Node};

use crate::error::{DdlGenError, Result};
use crate::model::{ColumnDefinition, EntityDefinition, NamespaceGroup, RelationshipDefinition};
use crate::util::{parse_bool, read_file_with_encoding_fallback};

/// Minimum number of files to benefit from parallel parsing
const PARALLEL_THRESHOLD: usize = 8;

/// Entities and namespace groups collected from one or more files
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntitySources {
    /// Entities declared outside any `<Namespace>`
    pub entities: Vec<EntityDefinition>,
    pub namespaces: Vec<NamespaceGroup>,
}

impl EntitySources {
    pub fn entity_count(&self) -> usize {
        self.entities.len() + self.namespaces.iter().map(|n| n.entities.len()).sum::<usize>()
    }

    fn extend(&mut self, other: EntitySources) {
        self.entities.extend(other.entities);
        self.namespaces.extend(other.namespaces);
    }
}

/// Load entity files, in parallel for larger file sets
pub fn load_entity_files(files: &[PathBuf]) -> Result<EntitySources> {
    let mut sources = EntitySources::default();

    if files.len() >= PARALLEL_THRESHOLD {
        let results: Vec<Result<EntitySources>> =
            files.par_iter().map(|file| load_entity_file(file)).collect();

        for result in results {
            sources.extend(result?);
        }
    } else {
        for file in files {
            sources.extend(load_entity_file(file)?);
        }
    }

    Ok(sources)
}

/// Load a single entity file
pub fn load_entity_file(path: &Path) -> Result<EntitySources> {
    let content =
        read_file_with_encoding_fallback(path).map_err(|e| DdlGenError::EntityFileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
    parse_entity_document(&content, path)
}

/// Parse entity XML; `path` is only used in error messages
pub fn parse_entity_document(content: &str, path: &Path) -> Result<EntitySources> {
    let doc = Document::parse(content).map_err(|e| DdlGenError::EntityFileParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let invalid = |message: String| DdlGenError::InvalidEntityFile {
        path: path.to_path_buf(),
        message,
    };

    let root = doc.root_element();
    if root.tag_name().name() != "Entities" {
        return Err(invalid(format!(
            "expected root element <Entities>, found <{}>",
            root.tag_name().name()
        )));
    }

    let mut sources = EntitySources::default();
    for node in root.children().filter(Node::is_element) {
        match node.tag_name().name() {
            "Entity" => sources.entities.push(parse_entity(&node).map_err(&invalid)?),
            "Namespace" => {
                let name = required(&node, "Name").map_err(&invalid)?;
                let mut group = NamespaceGroup::new(name);
                for child in node.children().filter(Node::is_element) {
                    if !child.has_tag_name("Entity") {
                        return Err(invalid(format!(
                            "unexpected <{}> in namespace '{}'",
                            child.tag_name().name(),
                            group.name
                        )));
                    }
                    group.entities.push(parse_entity(&child).map_err(&invalid)?);
                }
                sources.namespaces.push(group);
            }
            other => return Err(invalid(format!("unexpected element <{}>", other))),
        }
    }

    Ok(sources)
}

fn parse_entity(node: &Node) -> std::result::Result<EntityDefinition, String> {
    let mut entity = EntityDefinition::new(required(node, "Name")?);
    entity.table = node.attribute("Table").map(str::to_string);
    entity.namespace = node.attribute("Namespace").map(str::to_string);

    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "Column" => entity.columns.push(parse_column(&child)?),
            "ForeignKey" => entity.relationships.push(parse_foreign_key(&child)?),
            other => {
                return Err(format!(
                    "unexpected element <{}> in entity '{}'",
                    other, entity.name
                ))
            }
        }
    }

    Ok(entity)
}

fn parse_column(node: &Node) -> std::result::Result<ColumnDefinition, String> {
    let mut column = ColumnDefinition::new(required(node, "Name")?, required(node, "Type")?);

    if bool_attribute(node, "PrimaryKey")?.unwrap_or(false) {
        column = column.primary_key();
    }
    if let Some(nullable) = bool_attribute(node, "Nullable")? {
        column.nullable = nullable && !column.primary_key;
    }
    column.identity = bool_attribute(node, "Identity")?.unwrap_or(false);
    column.unique = bool_attribute(node, "Unique")?.unwrap_or(false);
    column.default_value = node.attribute("Default").map(str::to_string);

    Ok(column)
}

fn parse_foreign_key(node: &Node) -> std::result::Result<RelationshipDefinition, String> {
    let columns = split_list(&required(node, "Columns")?);
    if columns.is_empty() {
        return Err("<ForeignKey> Columns must not be empty".to_string());
    }

    Ok(RelationshipDefinition {
        name: node.attribute("Name").map(str::to_string),
        columns,
        target: required(node, "References")?,
        target_columns: node
            .attribute("ReferencedColumns")
            .map(split_list)
            .unwrap_or_default(),
    })
}

fn required(node: &Node, attribute: &str) -> std::result::Result<String, String> {
    node.attribute(attribute)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            format!(
                "<{}> requires a {} attribute",
                node.tag_name().name(),
                attribute
            )
        })
}

fn bool_attribute(node: &Node, attribute: &str) -> std::result::Result<Option<bool>, String> {
    match node.attribute(attribute) {
        None => Ok(None),
        Some(value) => parse_bool(value).map(Some).ok_or_else(|| {
            format!(
                "{} on <{}> must be true or false, got '{}'",
                attribute,
                node.tag_name().name(),
                value
            )
        }),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
