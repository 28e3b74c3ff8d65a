//! Data-access layer for the twin-analysis dashboard.
//!
//! Loads twin-analysis records and patient profiles from directories of JSON
//! files, reconciles the flat and nested profile schemas, and derives the
//! typed views the presentation layer renders.

pub mod analysis;
pub mod cache;
pub mod clinical;
pub mod curation;
pub mod dashboard;
pub mod genomics;
pub mod loader;
pub mod normalize;
pub mod tabular;

pub use analysis::analysis_from_value;
pub use cache::DatasetCache;
pub use clinical::{clinical_overview, record_columns, table_rows, treatment_columns};
pub use curation::{collect_patient_ids, copy_profiles, CopyReport};
pub use dashboard::Dashboard;
pub use genomics::{
    alteration_records, canonical_records, cna_stats, display_columns, mutation_stats,
    sample_summaries, sv_stats,
};
pub use loader::{get_analyses, get_profiles};
pub use normalize::{
    get_genomic_samples, get_timeline_events, get_treatment_lines, resolve_nested_or_flat,
};
pub use tabular::{
    load_clinical_tables, load_genomics_tables, ClinicalTables, GenomicsTables, Table,
};

use serde_json::Value;

/// Renders a scalar for display; `None` for null and empty strings.
pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

/// Looks up `key` on an object and renders it with [`value_text`].
pub(crate) fn field_text(value: Option<&Value>, key: &str) -> Option<String> {
    value.and_then(|v| v.get(key)).and_then(value_text)
}
