//! Clinical panel and tabular projections for a patient profile.

use serde_json::Value;
use twin_core::{ClinicalOverview, EMPTY_CELL, NOT_AVAILABLE};

use crate::{field_text, value_text};

/// Columns shown for drug-therapy lines, in display order.
pub const TREATMENT_COLUMNS: [&str; 6] = [
    "start_date_days",
    "stop_date_days",
    "agent",
    "subtype",
    "investigative",
    "line_number",
];

/// Demographics, stage, cancer type and biomarker panel of a profile.
pub fn clinical_overview(profile: &Value) -> ClinicalOverview {
    let clinical = profile.get("clinical");
    let demographics = clinical.and_then(|c| c.get("demographics"));
    let stage = clinical.and_then(|c| c.get("stage"));
    let biomarkers = clinical.and_then(|c| c.get("biomarkers"));

    let text = |section: Option<&Value>, key: &str| {
        field_text(section, key).unwrap_or_else(|| NOT_AVAILABLE.to_string())
    };

    ClinicalOverview {
        has_demographics: is_populated(demographics),
        age: text(demographics, "age"),
        sex: text(demographics, "sex"),
        race: text(demographics, "race"),
        vital_status: text(demographics, "vital_status"),
        stage_highest_recorded: text(stage, "highest_recorded"),
        stage_category: text(stage, "category"),
        oncotree_code: text(biomarkers, "oncotree_code"),
        cancer_type_detailed: text(biomarkers, "cancer_type_detailed"),
        has_biomarkers: is_populated(biomarkers),
        tmb_nonsynonymous: format_tmb(biomarkers.and_then(|b| b.get("tmb_nonsynonymous"))),
        msi_type: text(biomarkers, "msi_type"),
        pdl1_status: text(biomarkers, "pdl1_status"),
    }
}

/// Subset of [`TREATMENT_COLUMNS`] present in at least one line.
pub fn treatment_columns(lines: &[Value]) -> Vec<&'static str> {
    TREATMENT_COLUMNS
        .into_iter()
        .filter(|column| lines.iter().any(|line| line.get(*column).is_some()))
        .collect()
}

/// Union of the keys of a list of records, in first-seen order.
pub fn record_columns(records: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        let Some(map) = record.as_object() else {
            continue;
        };
        for key in map.keys() {
            if !columns.iter().any(|existing| existing == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// Renders `records` as rows of display cells for the given columns.
pub fn table_rows<S: AsRef<str>>(records: &[Value], columns: &[S]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|record| {
            columns
                .iter()
                .map(|column| {
                    record
                        .get(column.as_ref())
                        .and_then(value_text)
                        .unwrap_or_else(|| EMPTY_CELL.to_string())
                })
                .collect()
        })
        .collect()
}

fn is_populated(section: Option<&Value>) -> bool {
    section
        .and_then(Value::as_object)
        .is_some_and(|map| !map.is_empty())
}

/// Two decimals; zero, missing and non-numeric values show `N/A`.
fn format_tmb(value: Option<&Value>) -> String {
    let tmb = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    match tmb {
        Some(tmb) if tmb != 0.0 => format!("{tmb:.2}"),
        _ => NOT_AVAILABLE.to_string(),
    }
}
