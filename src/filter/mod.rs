//! Schema filtering per generation phase
//!
//! Create and drop phases each have their own predicate. A filter only ever
//! produces a view over the shared [`SchemaModel`]; the model itself is
//! never modified.

mod provider;

use std::fmt;
use std::sync::Arc;

use crate::model::{NamespaceElement, SchemaModel, TableElement};
use crate::options::Phase;

pub use provider::{resolve_filter_config, PatternFilter};

/// An element a filter is asked about
#[derive(Debug, Clone, Copy)]
pub enum FilterTarget<'a> {
    Namespace(&'a NamespaceElement),
    Entity(&'a TableElement),
}

/// Inclusion predicate for one phase
pub trait SchemaFilter: Send + Sync {
    fn includes(&self, target: FilterTarget<'_>) -> bool;
}

impl<F> SchemaFilter for F
where
    F: Fn(FilterTarget<'_>) -> bool + Send + Sync,
{
    fn includes(&self, target: FilterTarget<'_>) -> bool {
        self(target)
    }
}

/// Filter that selects everything
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAll;

impl SchemaFilter for IncludeAll {
    fn includes(&self, _target: FilterTarget<'_>) -> bool {
        true
    }
}

/// Create and drop predicates of a run
#[derive(Clone)]
pub struct SchemaFilterConfig {
    create: Arc<dyn SchemaFilter>,
    drop: Arc<dyn SchemaFilter>,
}

impl SchemaFilterConfig {
    pub fn new(create: impl SchemaFilter + 'static, drop: impl SchemaFilter + 'static) -> Self {
        Self {
            create: Arc::new(create),
            drop: Arc::new(drop),
        }
    }

    pub fn include_all() -> Self {
        Self::new(IncludeAll, IncludeAll)
    }

    /// The predicate for a phase
    pub fn for_phase(&self, phase: Phase) -> &dyn SchemaFilter {
        match phase {
            Phase::Create => self.create.as_ref(),
            Phase::Drop => self.drop.as_ref(),
        }
    }
}

impl Default for SchemaFilterConfig {
    fn default() -> Self {
        Self::include_all()
    }
}

impl fmt::Debug for SchemaFilterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaFilterConfig").finish_non_exhaustive()
    }
}

/// The part of a model selected for one phase
#[derive(Debug, Clone)]
pub struct FilteredSchema<'m> {
    model: &'m SchemaModel,
    phase: Phase,
    namespaces: Vec<&'m NamespaceElement>,
    selected: Vec<bool>,
}

impl<'m> FilteredSchema<'m> {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn model(&self) -> &'m SchemaModel {
        self.model
    }

    /// Selected namespaces, sorted by name
    pub fn namespaces(&self) -> &[&'m NamespaceElement] {
        &self.namespaces
    }

    /// Selected namespaces holding at least one selected table
    pub fn namespaces_with_tables(
        &self,
    ) -> impl DoubleEndedIterator<Item = &'m NamespaceElement> + '_ {
        self.namespaces.iter().copied().filter(move |ns| {
            self.tables_in_creation_order()
                .any(|t| t.namespace.as_deref() == Some(ns.name.as_str()))
        })
    }

    /// Selected tables, referenced tables first
    pub fn tables_in_creation_order(&self) -> impl Iterator<Item = &'m TableElement> + '_ {
        let model = self.model;
        model
            .creation_order()
            .iter()
            .filter(move |&&i| self.selected[i])
            .map(move |&i| &model.tables()[i])
    }

    /// Selected tables, dependent tables first
    pub fn tables_in_drop_order(&self) -> impl Iterator<Item = &'m TableElement> + '_ {
        let model = self.model;
        model
            .creation_order()
            .iter()
            .rev()
            .filter(move |&&i| self.selected[i])
            .map(move |&i| &model.tables()[i])
    }

    /// Whether the table at `index` in the model is selected
    pub fn contains_table(&self, index: usize) -> bool {
        self.selected.get(index).copied().unwrap_or(false)
    }

    pub fn table_count(&self) -> usize {
        self.selected.iter().filter(|&&s| s).count()
    }
}

/// Apply the phase's predicate to the model.
///
/// Without a config everything is selected. A table is selected only when
/// its namespace (if any) is selected as well.
pub fn filter_for<'m>(
    phase: Phase,
    model: &'m SchemaModel,
    config: Option<&SchemaFilterConfig>,
) -> FilteredSchema<'m> {
    let filter: &dyn SchemaFilter = match config {
        Some(config) => config.for_phase(phase),
        None => &IncludeAll,
    };

    let namespaces: Vec<&NamespaceElement> = model
        .namespaces()
        .iter()
        .filter(|ns| filter.includes(FilterTarget::Namespace(ns)))
        .collect();

    let selected = model
        .tables()
        .iter()
        .map(|table| {
            let namespace_selected = match &table.namespace {
                Some(name) => namespaces.iter().any(|ns| &ns.name == name),
                None => true,
            };
            namespace_selected && filter.includes(FilterTarget::Entity(table))
        })
        .collect();

    FilteredSchema {
        model,
        phase,
        namespaces,
        selected,
    }
}
