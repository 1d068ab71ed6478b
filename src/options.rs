//! Run-scoped execution options

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Generic key/value settings passed through to dialects and filters
pub type Settings = BTreeMap<String, String>;

/// Reserved setting key; dialects are selected through the identifier list only
pub const DIALECT_SETTING: &str = "dialect";

/// Setting naming the schema filter provider (`default` or `pattern`)
pub const FILTER_PROVIDER_SETTING: &str = "schema_filter_provider";

/// Setting forcing every identifier to be quoted
pub const QUOTE_IDENTIFIERS_SETTING: &str = "globally_quoted_identifiers";

/// Default output directory, relative to the project directory
pub const DEFAULT_OUTPUT_DIR: &str = "target/generated-resources/sql/ddl";

/// Which phases a run generates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Creation statements only
    #[default]
    Create,
    /// Drop statements followed by creation statements
    DropAndCreate,
}

impl Action {
    pub fn from_create_drop(create_drop: bool) -> Self {
        if create_drop {
            Action::DropAndCreate
        } else {
            Action::Create
        }
    }

    /// Phases in execution order
    pub fn phases(&self) -> &'static [Phase] {
        match self {
            Action::Create => &[Phase::Create],
            Action::DropAndCreate => &[Phase::Drop, Phase::Create],
        }
    }
}

/// A generation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Drop,
    Create,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Drop => write!(f, "drop"),
            Phase::Create => write!(f, "create"),
        }
    }
}

/// Options for one generation run.
///
/// Built once through [`ExecutionOptionsBuilder`] and only read afterwards.
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    delimiter: String,
    format: bool,
    halt_on_error: bool,
    manage_namespaces: bool,
    action: Action,
    import_files: Vec<PathBuf>,
    output_dir: PathBuf,
    settings: Settings,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        ExecutionOptionsBuilder::default().build()
    }
}

impl ExecutionOptions {
    pub fn builder() -> ExecutionOptionsBuilder {
        ExecutionOptionsBuilder::default()
    }

    /// Statement terminator
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// Pretty-print statements over multiple lines
    pub fn format(&self) -> bool {
        self.format
    }

    pub fn halt_on_error(&self) -> bool {
        self.halt_on_error
    }

    /// Emit CREATE/DROP SCHEMA statements
    pub fn manage_namespaces(&self) -> bool {
        self.manage_namespaces
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Raw SQL files appended after the creation statements
    pub fn import_files(&self) -> &[PathBuf] {
        &self.import_files
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn setting(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// A boolean setting; anything other than `true` (any case) is false
    pub fn setting_enabled(&self, key: &str) -> bool {
        self.setting(key)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Builder for [`ExecutionOptions`]
#[derive(Debug, Clone)]
pub struct ExecutionOptionsBuilder {
    delimiter: String,
    format: bool,
    halt_on_error: bool,
    manage_namespaces: bool,
    action: Action,
    import_files: Vec<PathBuf>,
    output_dir: PathBuf,
    settings: Settings,
}

impl Default for ExecutionOptionsBuilder {
    fn default() -> Self {
        Self {
            delimiter: ";".to_string(),
            format: true,
            halt_on_error: true,
            manage_namespaces: true,
            action: Action::Create,
            import_files: Vec::new(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            settings: Settings::new(),
        }
    }
}

impl ExecutionOptionsBuilder {
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn format(mut self, format: bool) -> Self {
        self.format = format;
        self
    }

    pub fn halt_on_error(mut self, halt_on_error: bool) -> Self {
        self.halt_on_error = halt_on_error;
        self
    }

    pub fn manage_namespaces(mut self, manage_namespaces: bool) -> Self {
        self.manage_namespaces = manage_namespaces;
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    pub fn import_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.import_files.push(path.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Add a generic setting.
    ///
    /// The reserved `dialect` key is ignored with a warning. Overriding a key
    /// that is already present is allowed but also logged.
    pub fn setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();

        if key == DIALECT_SETTING {
            warn!(
                "ignoring dialect property '{}', use the dedicated dialect list to specify dialects",
                key
            );
            return self;
        }

        if let Some(previous) = self.settings.get(&key) {
            warn!(
                "value for property '{}' already present, overriding current value '{}'",
                key, previous
            );
        }

        debug!("setting property {} = {}", key, value);
        self.settings.insert(key, value);
        self
    }

    pub fn settings<K, V>(self, settings: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        settings
            .into_iter()
            .fold(self, |builder, (k, v)| builder.setting(k, v))
    }

    pub fn build(self) -> ExecutionOptions {
        ExecutionOptions {
            delimiter: self.delimiter,
            format: self.format,
            halt_on_error: self.halt_on_error,
            manage_namespaces: self.manage_namespaces,
            action: self.action,
            import_files: self.import_files,
            output_dir: self.output_dir,
            settings: self.settings,
        }
    }
}
