//! Parser for .ddlproj files

use std::path::{Path, PathBuf};

use anyhow::Result;
use roxmltree::{Document, Node};

use crate::error::DdlGenError;
use crate::options::{Action, ExecutionOptions, DEFAULT_OUTPUT_DIR};
use crate::util::parse_bool;

/// Directory scanned for entity files when the project lists none
const DEFAULT_ENTITY_DIR: &str = "entities";

/// Parsed DDL generation project
#[derive(Debug, Clone)]
pub struct DdlProject {
    /// Project name (file stem)
    pub name: String,
    /// Project directory; relative paths resolve against it
    pub project_dir: PathBuf,
    /// Directory receiving one script per dialect
    pub output_dir: PathBuf,
    /// Dialect identifiers (e.g., "PostgreSQL@13")
    pub dialects: Vec<String>,
    pub action: Action,
    pub delimiter: String,
    pub format: bool,
    pub halt_on_error: bool,
    pub manage_namespaces: bool,
    /// Entity definition files, sorted
    pub entity_files: Vec<PathBuf>,
    /// Raw SQL appended after creation statements, in declaration order
    pub import_files: Vec<PathBuf>,
    /// Generic settings in declaration order
    pub properties: Vec<(String, String)>,
}

impl DdlProject {
    /// Execution options for a run of this project
    pub fn execution_options(&self) -> ExecutionOptions {
        let mut builder = ExecutionOptions::builder()
            .delimiter(self.delimiter.clone())
            .format(self.format)
            .halt_on_error(self.halt_on_error)
            .manage_namespaces(self.manage_namespaces)
            .action(self.action)
            .output_dir(self.output_dir.clone())
            .settings(self.properties.iter().cloned());

        for import in &self.import_files {
            builder = builder.import_file(import.clone());
        }
        builder.build()
    }
}

/// Parse a .ddlproj file
pub fn parse_ddlproj(path: &Path) -> Result<DdlProject> {
    let content = std::fs::read_to_string(path).map_err(|e| DdlGenError::ProjectReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let doc = Document::parse(&content).map_err(|e| DdlGenError::ProjectParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "DdlProject" {
        return Err(DdlGenError::InvalidProjectFormat {
            message: format!(
                "expected root element <DdlProject>, found <{}>",
                root.tag_name().name()
            ),
        }
        .into());
    }

    let project_dir = path.parent().unwrap_or(Path::new(".")).to_path_buf();

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Project")
        .to_string();

    let output_dir = project_dir.join(
        find_property_value(&root, "OutputDirectory")
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
    );

    let dialects = find_property_value(&root, "Dialects")
        .map(|value| {
            value
                .split(';')
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let create_drop = find_bool_property(&root, "CreateDropStatements")?.unwrap_or(false);
    let delimiter = find_property_value(&root, "Delimiter").unwrap_or_else(|| ";".to_string());
    let format = find_bool_property(&root, "Format")?.unwrap_or(true);
    let halt_on_error = find_bool_property(&root, "HaltOnError")?.unwrap_or(true);
    let manage_namespaces = find_bool_property(&root, "ManageNamespaces")?.unwrap_or(true);

    let entity_files = find_entity_files(&root, &project_dir);
    let import_files = find_import_files(&root, &project_dir);
    let properties = find_properties(&root)?;

    Ok(DdlProject {
        name,
        project_dir,
        output_dir,
        dialects,
        action: Action::from_create_drop(create_drop),
        delimiter,
        format,
        halt_on_error,
        manage_namespaces,
        entity_files,
        import_files,
        properties,
    })
}

fn find_property_value(root: &Node, property_name: &str) -> Option<String> {
    root.descendants()
        .filter(|n| n.has_tag_name("PropertyGroup"))
        .flat_map(|group| group.children())
        .find(|n| n.tag_name().name() == property_name)
        .and_then(|n| n.text())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn find_bool_property(root: &Node, property_name: &str) -> Result<Option<bool>> {
    match find_property_value(root, property_name) {
        None => Ok(None),
        Some(value) => parse_bool(&value).map(Some).ok_or_else(|| {
            DdlGenError::InvalidProjectFormat {
                message: format!("{} must be true or false, got '{}'", property_name, value),
            }
            .into()
        }),
    }
}

/// Resolve `<Entities Include=".." Remove=".."/>` items.
///
/// Without any include the default entity directory is scanned recursively.
fn find_entity_files(root: &Node, project_dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut include_patterns: Vec<String> = Vec::new();
    let mut exclude_patterns: Vec<String> = Vec::new();

    for node in root.descendants().filter(|n| n.has_tag_name("Entities")) {
        if let Some(include) = node.attribute("Include") {
            include_patterns.push(include.replace('\\', "/"));
        }
        if let Some(remove) = node.attribute("Remove") {
            exclude_patterns.push(remove.replace('\\', "/"));
        }
    }

    for pattern in &include_patterns {
        if pattern.contains('*') {
            let glob_pattern = project_dir.join(pattern);
            let glob_str = glob_pattern.to_string_lossy();
            if let Ok(paths) = glob::glob(&glob_str) {
                files.extend(paths.filter_map(|p| p.ok()).filter(|p| is_xml(p)));
            }
        } else {
            let path = project_dir.join(pattern);
            if path.exists() {
                files.push(path);
            }
        }
    }

    if !exclude_patterns.is_empty() {
        files.retain(|file| {
            !exclude_patterns.iter().any(|pattern| {
                let full = project_dir.join(pattern);
                if pattern.contains('*') {
                    glob::Pattern::new(&full.to_string_lossy())
                        .map(|matcher| matcher.matches_path(file))
                        .unwrap_or(false)
                } else {
                    file == &full
                }
            })
        });
    }

    if include_patterns.is_empty() {
        let entity_dir = project_dir.join(DEFAULT_ENTITY_DIR);
        files.extend(
            walkdir::WalkDir::new(entity_dir)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_xml(e.path()))
                .map(|e| e.into_path()),
        );
    }

    files.sort();
    files.dedup();
    files
}

fn find_import_files(root: &Node, project_dir: &Path) -> Vec<PathBuf> {
    root.descendants()
        .filter(|n| n.has_tag_name("ImportFile"))
        .filter_map(|n| n.attribute("Include"))
        .map(|include| project_dir.join(include.replace('\\', "/")))
        .collect()
}

fn find_properties(root: &Node) -> Result<Vec<(String, String)>> {
    root.descendants()
        .filter(|n| n.has_tag_name("Property"))
        .map(|n| -> Result<(String, String)> {
            let name = n.attribute("Name").ok_or_else(|| DdlGenError::InvalidProjectFormat {
                message: "<Property> requires a Name attribute".to_string(),
            })?;
            let value = n
                .attribute("Value")
                .map(str::to_string)
                .or_else(|| n.text().map(|t| t.trim().to_string()))
                .unwrap_or_default();
            Ok((name.to_string(), value))
        })
        .collect()
}

fn is_xml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}
