//! Per-sample genomic views: alteration counts, column canonicalization and
//! summary statistics for mutations, copy-number alterations and structural
//! variants.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};
use twin_core::{AlterationKind, CnaStats, MutationStats, SampleSummary, SvStats};

use crate::normalize::get_genomic_samples;
use crate::{field_text, value_text};

const MUTATION_RENAMES: [(&str, &str); 7] = [
    ("gene", "hugo_symbol"),
    ("protein_change", "HGVSp_Short"),
    ("variant_classification", "variant_classification"),
    ("chromosome", "chromosome"),
    ("position", "start_position"),
    ("ref_allele", "reference_allele"),
    ("alt_allele", "tumor_seq_allele2"),
];

const CNA_RENAMES: [(&str, &str); 3] = [
    ("gene", "Hugo_Symbol"),
    ("alteration_type", "Alteration_Type"),
    ("gistic_value", "GISTIC_value"),
];

const SV_RENAMES: [(&str, &str); 5] = [
    ("site1_gene", "SITE1_HUGO_SYMBOL"),
    ("site2_gene", "SITE2_HUGO_SYMBOL"),
    ("sv_type", "SV_STATUS"),
    ("site1_chromosome", "SITE1_CHROMOSOME"),
    ("site2_chromosome", "SITE2_CHROMOSOME"),
];

pub const MUTATION_DISPLAY_COLUMNS: [&str; 7] = [
    "hugo_symbol",
    "variant_classification",
    "HGVSp_Short",
    "chromosome",
    "start_position",
    "reference_allele",
    "tumor_seq_allele2",
];

pub const CNA_DISPLAY_COLUMNS: [&str; 3] = ["Hugo_Symbol", "Alteration_Type", "GISTIC_value"];

pub const SV_DISPLAY_COLUMNS: [&str; 5] = [
    "SITE1_HUGO_SYMBOL",
    "SITE2_HUGO_SYMBOL",
    "SV_STATUS",
    "SITE1_CHROMOSOME",
    "SITE2_CHROMOSOME",
];

const TOP_GENES: usize = 10;

fn renames(kind: AlterationKind) -> &'static [(&'static str, &'static str)] {
    match kind {
        AlterationKind::Mutation => &MUTATION_RENAMES,
        AlterationKind::CopyNumber => &CNA_RENAMES,
        AlterationKind::StructuralVariant => &SV_RENAMES,
    }
}

/// Preferred display columns for an alteration kind.
pub fn preferred_columns(kind: AlterationKind) -> &'static [&'static str] {
    match kind {
        AlterationKind::Mutation => &MUTATION_DISPLAY_COLUMNS,
        AlterationKind::CopyNumber => &CNA_DISPLAY_COLUMNS,
        AlterationKind::StructuralVariant => &SV_DISPLAY_COLUMNS,
    }
}

/// Alteration list of one kind inside a sample record.
pub fn alteration_records(sample: &Value, kind: AlterationKind) -> &[Value] {
    sample
        .get(kind.sample_key())
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// One summary card per sample of the profile, sorted by sample id.
pub fn sample_summaries(profile: &Value) -> Vec<SampleSummary> {
    get_genomic_samples(profile)
        .into_iter()
        .map(|(sample_id, sample)| {
            let info = sample.get("sample_info");
            SampleSummary {
                sample_id: sample_id.to_string(),
                sample_type: field_text(info, "sample_type")
                    .unwrap_or_else(|| "Unknown".to_string()),
                cancer_type: field_text(info, "cancer_type_detailed")
                    .unwrap_or_else(|| "Unknown".to_string()),
                mutations: alteration_records(sample, AlterationKind::Mutation).len(),
                cnas: alteration_records(sample, AlterationKind::CopyNumber).len(),
                svs: alteration_records(sample, AlterationKind::StructuralVariant).len(),
            }
        })
        .collect()
}

/// Records with producer field names mapped to the canonical column names.
/// Non-object entries are dropped.
pub fn canonical_records(records: &[Value], kind: AlterationKind) -> Vec<Map<String, Value>> {
    let table = renames(kind);
    records
        .iter()
        .filter_map(Value::as_object)
        .map(|record| {
            record
                .iter()
                .map(|(key, value)| {
                    let column = table
                        .iter()
                        .find(|(from, _)| *from == key.as_str())
                        .map(|(_, to)| (*to).to_string())
                        .unwrap_or_else(|| key.clone());
                    (column, value.clone())
                })
                .collect()
        })
        .collect()
}

/// Preferred columns present in the records, or every column when none of
/// the preferred ones is present.
pub fn display_columns(records: &[Map<String, Value>], kind: AlterationKind) -> Vec<String> {
    let present: Vec<String> = preferred_columns(kind)
        .iter()
        .filter(|column| has_column(records, column))
        .map(|column| (*column).to_string())
        .collect();
    if !present.is_empty() {
        return present;
    }

    let mut all = Vec::new();
    for record in records {
        for key in record.keys() {
            if !all.contains(key) {
                all.push(key.clone());
            }
        }
    }
    all
}

pub fn mutation_stats(records: &[Map<String, Value>]) -> MutationStats {
    let classification = "variant_classification";
    let gene = "hugo_symbol";

    MutationStats {
        total: records.len(),
        missense: has_column(records, classification)
            .then(|| count_equal(records, classification, "Missense_Mutation")),
        distinct_genes: has_column(records, gene).then(|| {
            records
                .iter()
                .filter_map(|record| record.get(gene).and_then(value_text))
                .collect::<BTreeSet<_>>()
                .len()
        }),
        classification_counts: value_counts(records, classification),
        top_genes: value_counts(records, gene)
            .into_iter()
            .take(TOP_GENES)
            .collect(),
    }
}

pub fn cna_stats(records: &[Map<String, Value>]) -> CnaStats {
    let column = "Alteration_Type";
    let has_type = has_column(records, column);

    CnaStats {
        total: records.len(),
        amplifications: has_type.then(|| count_equal(records, column, "Amplification")),
        deletions: has_type.then(|| count_equal(records, column, "Deletion")),
        type_counts: value_counts(records, column),
    }
}

pub fn sv_stats(records: &[Map<String, Value>]) -> SvStats {
    let column = "SV_STATUS";

    SvStats {
        total: records.len(),
        somatic: has_column(records, column).then(|| count_equal(records, column, "SOMATIC")),
    }
}

fn has_column(records: &[Map<String, Value>], column: &str) -> bool {
    records.iter().any(|record| record.contains_key(column))
}

fn count_equal(records: &[Map<String, Value>], column: &str, expected: &str) -> usize {
    records
        .iter()
        .filter(|record| record.get(column).and_then(Value::as_str) == Some(expected))
        .count()
}

/// Occurrences per distinct value, most frequent first; ties by value.
fn value_counts(records: &[Map<String, Value>], column: &str) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in records
        .iter()
        .filter_map(|record| record.get(column).and_then(value_text))
    {
        *counts.entry(value).or_default() += 1;
    }

    let mut ordered: Vec<(String, usize)> = counts.into_iter().collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1));
    ordered
}
