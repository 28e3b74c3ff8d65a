//! Schema-generation reconciliation for patient profiles.
//!
//! Profiles come in two shapes: the current nested layout
//! (`timeline.surgery`, `treatments.drug_therapy.lines`, `genomics.samples`)
//! and the legacy flat layout (`surgery`, `treatment`, `samples`). All
//! accessors go through [`resolve_nested_or_flat`], where the nested value
//! wins whenever it is populated.

use serde_json::{Map, Value};

const TREATMENT_LINES_PATH: [&str; 3] = ["treatments", "drug_therapy", "lines"];
const TREATMENT_FLAT_KEY: &str = "treatment";
const SAMPLES_PATH: [&str; 2] = ["genomics", "samples"];
const SAMPLES_FLAT_KEY: &str = "samples";

/// Returns the first non-empty collection found at `nested_path`, then at
/// the top-level `flat_key`. `extract` both checks the shape and rejects
/// empty collections.
pub fn resolve_nested_or_flat<'a, T, F>(
    profile: &'a Value,
    nested_path: &[&str],
    flat_key: &str,
    extract: F,
) -> Option<&'a T>
where
    T: ?Sized,
    F: Fn(&'a Value) -> Option<&'a T>,
{
    lookup_path(profile, nested_path)
        .and_then(&extract)
        .or_else(|| profile.get(flat_key).and_then(&extract))
}

/// Events of one type (`surgery`, `radiation`, `progression`,
/// `tumor_sites`, ...) from `timeline.<type>` or the flat `<type>` list.
pub fn get_timeline_events<'a>(profile: &'a Value, event_type: &str) -> &'a [Value] {
    resolve_nested_or_flat(profile, &["timeline", event_type], event_type, non_empty_array)
        .unwrap_or_default()
}

/// Drug-therapy lines from `treatments.drug_therapy.lines` or the flat
/// `treatment` list.
pub fn get_treatment_lines(profile: &Value) -> &[Value] {
    resolve_nested_or_flat(
        profile,
        &TREATMENT_LINES_PATH,
        TREATMENT_FLAT_KEY,
        non_empty_array,
    )
    .unwrap_or_default()
}

/// Genomic samples keyed by sample id, sorted by id.
pub fn get_genomic_samples(profile: &Value) -> Vec<(&str, &Value)> {
    let Some(samples) =
        resolve_nested_or_flat(profile, &SAMPLES_PATH, SAMPLES_FLAT_KEY, non_empty_object)
    else {
        return Vec::new();
    };

    let mut entries: Vec<(&str, &Value)> = samples
        .iter()
        .map(|(id, sample)| (id.as_str(), sample))
        .collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    entries
}

fn lookup_path<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

fn non_empty_array(value: &Value) -> Option<&[Value]> {
    value
        .as_array()
        .filter(|entries| !entries.is_empty())
        .map(Vec::as_slice)
}

fn non_empty_object(value: &Value) -> Option<&Map<String, Value>> {
    value.as_object().filter(|map| !map.is_empty())
}
