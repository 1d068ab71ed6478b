//! Filter providers selected by name through settings

use regex::Regex;
use tracing::debug;

use crate::error::{DdlGenError, Result};
use crate::options::{Settings, FILTER_PROVIDER_SETTING};

use super::{FilterTarget, SchemaFilter, SchemaFilterConfig};

const DEFAULT_PROVIDER: &str = "default";
const PATTERN_PROVIDER: &str = "pattern";

/// Resolve the configured filter provider, falling back to `default`
pub fn resolve_filter_config(settings: &Settings) -> Result<SchemaFilterConfig> {
    let provider = settings
        .get(FILTER_PROVIDER_SETTING)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_PROVIDER);

    debug!("Using schema filter provider: {}", provider);

    if provider.eq_ignore_ascii_case(DEFAULT_PROVIDER) {
        Ok(SchemaFilterConfig::include_all())
    } else if provider.eq_ignore_ascii_case(PATTERN_PROVIDER) {
        Ok(SchemaFilterConfig::new(
            PatternFilter::from_settings(settings, "create")?,
            PatternFilter::from_settings(settings, "drop")?,
        ))
    } else {
        Err(DdlGenError::FilterConfigError {
            message: format!(
                "unknown schema filter provider '{}' (expected '{}' or '{}')",
                provider, DEFAULT_PROVIDER, PATTERN_PROVIDER
            ),
        })
    }
}

/// Include/exclude regular expressions over names.
///
/// Patterns match whole names. Entities are tested by qualified entity name
/// and by qualified table name; namespaces by name. Include patterns only
/// restrict entities, exclude patterns apply to both, and exclusion wins.
#[derive(Debug, Clone, Default)]
pub struct PatternFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
}

impl PatternFilter {
    pub fn new(include: &[&str], exclude: &[&str]) -> Result<Self> {
        Ok(Self {
            include: compile(include.iter().copied(), "include")?,
            exclude: compile(exclude.iter().copied(), "exclude")?,
        })
    }

    /// Read `filter.<phase>.include` and `filter.<phase>.exclude` (comma-separated)
    fn from_settings(settings: &Settings, phase: &str) -> Result<Self> {
        let patterns = |kind: &str| {
            let key = format!("filter.{phase}.{kind}");
            let list: Vec<String> = settings
                .get(&key)
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            compile(list.iter().map(String::as_str), &key)
        };

        Ok(Self {
            include: patterns("include")?,
            exclude: patterns("exclude")?,
        })
    }

    fn excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|re| re.is_match(name))
    }
}

impl SchemaFilter for PatternFilter {
    fn includes(&self, target: FilterTarget<'_>) -> bool {
        match target {
            FilterTarget::Namespace(ns) => !self.excluded(&ns.name),
            FilterTarget::Entity(table) => {
                let table_name = table.qualified_name();
                let names = [table.entity.as_str(), table_name.as_str()];
                let included = self.include.is_empty()
                    || names
                        .iter()
                        .any(|n| self.include.iter().any(|re| re.is_match(n)));
                included && !names.iter().any(|n| self.excluded(n))
            }
        }
    }
}

fn compile<'a>(patterns: impl Iterator<Item = &'a str>, source: &str) -> Result<Vec<Regex>> {
    patterns
        .map(|pattern| {
            Regex::new(&format!("^(?:{pattern})$")).map_err(|e| DdlGenError::FilterConfigError {
                message: format!("invalid pattern '{}' in {}: {}", pattern, source, e),
            })
        })
        .collect()
}
