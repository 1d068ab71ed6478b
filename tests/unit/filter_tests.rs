//! Schema filter tests

use pretty_assertions::assert_eq;

use rust_ddlgen::filter::{
    filter_for, resolve_filter_config, FilterTarget, FilteredSchema, PatternFilter,
    SchemaFilterConfig,
};
use rust_ddlgen::model::{build_model, ColumnDefinition, EntityDefinition, NamespaceGroup, SchemaModel};
use rust_ddlgen::options::Settings;
use rust_ddlgen::{DdlGenError, Phase};

fn keyed(name: &str) -> EntityDefinition {
    EntityDefinition::new(name).column(ColumnDefinition::new("id", "INTEGER").primary_key())
}

fn model() -> SchemaModel {
    build_model(
        vec![keyed("com.acme.Audit")],
        vec![
            NamespaceGroup::new("sales")
                .entity(keyed("com.acme.Invoice"))
                .entity(keyed("com.acme.Customer")),
            NamespaceGroup::new("staging").entity(keyed("com.acme.Import")),
        ],
    )
    .unwrap()
}

fn selected(filtered: &FilteredSchema<'_>) -> Vec<String> {
    filtered
        .tables_in_creation_order()
        .map(|t| t.qualified_name())
        .collect()
}

fn settings(pairs: &[(&str, &str)]) -> Settings {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ============================================================================
// Phase Filter Tests
// ============================================================================

#[test]
fn test_create_and_drop_filters_are_independent() {
    let model = model();
    let config = SchemaFilterConfig::new(
        |t: FilterTarget<'_>| match t {
            FilterTarget::Namespace(ns) => ns.name == "sales",
            FilterTarget::Entity(_) => true,
        },
        |t: FilterTarget<'_>| match t {
            FilterTarget::Namespace(ns) => ns.name == "staging",
            FilterTarget::Entity(_) => true,
        },
    );

    let create = filter_for(Phase::Create, &model, Some(&config));
    let drop = filter_for(Phase::Drop, &model, Some(&config));

    assert_eq!(selected(&create), vec!["audit", "sales.customer", "sales.invoice"]);
    assert_eq!(selected(&drop), vec!["audit", "staging.import"]);
    assert_eq!(create.phase(), Phase::Create);
    assert_eq!(drop.phase(), Phase::Drop);
}

#[test]
fn test_filtering_leaves_model_untouched() {
    let model = model();
    let tables_before = model.tables().len();
    let order_before = model.creation_order().to_vec();

    let nothing = SchemaFilterConfig::new(|_: FilterTarget<'_>| false, |_: FilterTarget<'_>| false);
    let filtered = filter_for(Phase::Create, &model, Some(&nothing));

    assert_eq!(filtered.table_count(), 0);
    assert!(filtered.namespaces().is_empty());
    assert_eq!(model.tables().len(), tables_before);
    assert_eq!(model.creation_order(), order_before.as_slice());
}

// ============================================================================
// Provider Tests
// ============================================================================

#[test]
fn test_default_provider_selects_everything() {
    let model = model();
    let config = resolve_filter_config(&Settings::new()).unwrap();
    for phase in [Phase::Create, Phase::Drop] {
        assert_eq!(filter_for(phase, &model, Some(&config)).table_count(), 4);
    }
}

#[test]
fn test_pattern_provider_per_phase() {
    let model = model();
    let config = resolve_filter_config(&settings(&[
        ("schema_filter_provider", "Pattern"),
        ("filter.create.include", "com\\.acme\\.(Invoice|Customer), audit"),
        ("filter.drop.exclude", "staging"),
    ]))
    .unwrap();

    let create = filter_for(Phase::Create, &model, Some(&config));
    assert_eq!(selected(&create), vec!["audit", "sales.customer", "sales.invoice"]);

    let drop = filter_for(Phase::Drop, &model, Some(&config));
    assert_eq!(selected(&drop), vec!["audit", "sales.customer", "sales.invoice"]);
    assert_eq!(drop.namespaces().len(), 1);
}

#[test]
fn test_pattern_exclusion_wins() {
    let model = model();
    let filter = PatternFilter::new(&["com\\.acme\\..*"], &["sales\\.invoice"]).unwrap();
    let config = SchemaFilterConfig::new(filter.clone(), filter);

    let create = filter_for(Phase::Create, &model, Some(&config));
    assert_eq!(
        selected(&create),
        vec!["audit", "sales.customer", "staging.import"]
    );
}

#[test]
fn test_patterns_match_whole_names() {
    let model = model();
    let filter = PatternFilter::new(&["Audit"], &[]).unwrap();
    let config = SchemaFilterConfig::new(filter.clone(), filter);
    assert_eq!(filter_for(Phase::Create, &model, Some(&config)).table_count(), 0);
}

#[test]
fn test_invalid_provider_configuration() {
    let err = resolve_filter_config(&settings(&[("schema_filter_provider", "regex")])).unwrap_err();
    assert!(matches!(err, DdlGenError::FilterConfigError { .. }));

    let err = resolve_filter_config(&settings(&[
        ("schema_filter_provider", "pattern"),
        ("filter.drop.include", "("),
    ]))
    .unwrap_err();
    assert!(matches!(err, DdlGenError::FilterConfigError { ref message } if message.contains("filter.drop.include")));
}
