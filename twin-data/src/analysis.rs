//! Raw twin-analysis JSON to `TwinAnalysis` conversion.
//!
//! Every polymorphic or aliased field is resolved here once, so consumers
//! never inspect the raw shape again.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use twin_core::{
    title_case, ClinicalSummary, DashboardError, Difference, GenomicComparison, GenomicFinding,
    Insight, MatchQuality, Measure, PhenotypeComparison, Recommendation, SharedFeatures,
    SummaryField, SummaryText, TreatmentComparison, TreatmentGuidance, TwinAnalysis, EMPTY_CELL,
};

use crate::loader::identifier_text;
use crate::{field_text, value_text};

/// Convert one parsed analysis file into a typed record. The `filename`
/// attribute is injected into the raw JSON as well.
pub fn analysis_from_value(
    mut value: Value,
    filename: &str,
) -> Result<TwinAnalysis, DashboardError> {
    let Some(object) = value.as_object_mut() else {
        return Err(malformed(filename, "record is not a JSON object"));
    };
    object.insert("filename".to_string(), Value::String(filename.to_string()));

    let query_patient_id = value
        .get("query_patient_id")
        .and_then(identifier_text)
        .ok_or_else(|| malformed(filename, "missing query_patient_id"))?;
    let twin_id = value
        .get("twin_id")
        .and_then(identifier_text)
        .ok_or_else(|| malformed(filename, "missing twin_id"))?;

    let rank = value.get("rank").and_then(parse_rank);
    let similarity_score = measure(value.get("similarity_score"));
    let clinical_pct = measure(value.get("clinical_pct"));
    let genomic_pct = measure(value.get("genomic_pct"));
    let match_quality = parse_match_quality(value.get("match_quality"));
    let shared_features = parse_shared_features(value.get("shared_features"));
    let clinical_summary = parse_clinical_summary(value.get("clinical_summary"));
    let phenotype_comparison = parse_phenotypes(value.get("phenotype_comparison"));
    let genomic_comparison = parse_genomic_comparison(value.get("genomic_comparison"));
    let treatment_comparison = parse_treatment_comparison(value.get("treatment_comparison"));
    let actionable_insights = items(value.get("actionable_insights"))
        .iter()
        .filter_map(parse_insight)
        .collect();
    let recommendations = items(value.get("recommendations"))
        .iter()
        .filter_map(parse_recommendation)
        .collect();
    let differences = parse_differences(&value);
    let summary = value.get("summary").and_then(parse_summary);
    let rationale = field_text(Some(&value), "rationale");
    let treatment_guidance = parse_guidance(value.get("use_for_treatment_guidance"));

    Ok(TwinAnalysis {
        query_patient_id,
        twin_id,
        rank,
        similarity_score,
        clinical_pct,
        genomic_pct,
        match_quality,
        shared_features,
        clinical_summary,
        phenotype_comparison,
        genomic_comparison,
        treatment_comparison,
        actionable_insights,
        recommendations,
        differences,
        summary,
        rationale,
        treatment_guidance,
        filename: filename.to_string(),
        raw: value,
    })
}

fn malformed(filename: &str, reason: &str) -> DashboardError {
    DashboardError::MalformedRecord {
        filename: filename.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_rank(value: &Value) -> Option<u32> {
    let rank = match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    u32::try_from(rank).ok().filter(|rank| *rank >= 1)
}

fn measure(value: Option<&Value>) -> Measure {
    match value {
        None | Some(Value::Null) => Measure::Missing,
        Some(Value::Number(number)) => match number.as_i64() {
            Some(integer) => Measure::Integer(integer),
            None => number
                .as_f64()
                .map(Measure::Number)
                .unwrap_or(Measure::Missing),
        },
        Some(Value::String(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Measure::Missing
            } else if let Ok(integer) = trimmed.parse::<i64>() {
                Measure::Integer(integer)
            } else {
                trimmed
                    .parse::<f64>()
                    .map(Measure::Number)
                    .unwrap_or_else(|_| Measure::Text(trimmed.to_string()))
            }
        }
        Some(other) => Measure::Text(other.to_string()),
    }
}

fn items(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// List of display strings; a bare string counts as a one-item list.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(entries)) => entries.iter().filter_map(value_text).collect(),
        Some(Value::String(text)) if !text.trim().is_empty() => vec![text.clone()],
        _ => Vec::new(),
    }
}

fn parse_match_quality(value: Option<&Value>) -> MatchQuality {
    let Some(quality) = value.filter(|v| v.is_object()) else {
        return MatchQuality::default();
    };

    let mut weaknesses = string_list(quality.get("weaknesses"));
    if weaknesses.is_empty() {
        weaknesses = string_list(quality.get("limitations"));
    }

    MatchQuality {
        grade: field_text(Some(quality), "grade"),
        overall_assessment: field_text(Some(quality), "overall_assessment"),
        strengths: string_list(quality.get("strengths")),
        weaknesses,
    }
}

fn parse_shared_features(value: Option<&Value>) -> SharedFeatures {
    match value {
        Some(Value::Array(entries)) => SharedFeatures::List {
            biomarkers: entries.iter().filter_map(value_text).collect(),
        },
        Some(Value::Object(map)) => SharedFeatures::Mapping {
            biomarkers: string_list(map.get("biomarkers")),
            other: map
                .iter()
                .filter(|(key, _)| key.as_str() != "biomarkers")
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        },
        _ => SharedFeatures::Absent,
    }
}

fn parse_clinical_summary(value: Option<&Value>) -> ClinicalSummary {
    ClinicalSummary {
        query: cell_map(value.and_then(|v| v.get("query"))),
        twin: cell_map(value.and_then(|v| v.get("twin"))),
    }
}

fn cell_map(value: Option<&Value>) -> BTreeMap<String, String> {
    value
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(key, value)| {
                    let cell = value_text(value).unwrap_or_else(|| EMPTY_CELL.to_string());
                    (key.clone(), cell)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_phenotypes(value: Option<&Value>) -> PhenotypeComparison {
    PhenotypeComparison {
        shared: string_list(value.and_then(|v| v.get("shared"))),
        query_only: string_list(value.and_then(|v| v.get("query_only"))),
        twin_only: string_list(value.and_then(|v| v.get("twin_only"))),
    }
}

fn parse_finding(value: &Value) -> Option<GenomicFinding> {
    match value {
        Value::Object(_) => Some(GenomicFinding::Variant {
            gene: field_text(Some(value), "gene"),
            variant: field_text(Some(value), "variant"),
            clinical_significance: field_text(Some(value), "clinical_significance"),
        }),
        other => value_text(other).map(|text| GenomicFinding::Note { text }),
    }
}

fn parse_genomic_comparison(value: Option<&Value>) -> GenomicComparison {
    let findings = |key: &str| {
        items(value.and_then(|v| v.get(key)))
            .iter()
            .filter_map(parse_finding)
            .collect::<Vec<_>>()
    };

    GenomicComparison {
        shared_variants: findings("shared_variants"),
        query_unique: findings("query_unique"),
        twin_unique: findings("twin_unique"),
        similarity_note: field_text(value, "genomic_similarity_note"),
    }
}

fn treatment_name(value: &Value) -> Option<String> {
    match value {
        Value::Object(_) => {
            field_text(Some(value), "treatment").or_else(|| Some(value.to_string()))
        }
        other => value_text(other),
    }
}

fn parse_treatment_comparison(value: Option<&Value>) -> TreatmentComparison {
    let names = |key: &str| {
        items(value.and_then(|v| v.get(key)))
            .iter()
            .filter_map(treatment_name)
            .collect::<Vec<_>>()
    };

    TreatmentComparison {
        query_treatments: names("query_treatments"),
        twin_treatments: names("twin_treatments"),
        overlap: field_text(value, "treatment_overlap"),
        divergence: field_text(value, "treatment_divergence"),
        gaps: string_list(value.and_then(|v| v.get("treatment_gaps"))),
    }
}

/// `key_differences` when it has entries, otherwise the older `differences`.
fn parse_differences(analysis: &Value) -> Vec<Difference> {
    let mut entries = items(analysis.get("key_differences"));
    if entries.is_empty() {
        entries = items(analysis.get("differences"));
    }

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::Object(_) => Some(Difference::Detailed {
                feature: field_text(Some(entry), "feature")
                    .unwrap_or_else(|| "Feature".to_string()),
                query_value: field_text(Some(entry), "query_value")
                    .unwrap_or_else(|| EMPTY_CELL.to_string()),
                twin_value: field_text(Some(entry), "twin_value")
                    .unwrap_or_else(|| EMPTY_CELL.to_string()),
                clinical_impact: field_text(Some(entry), "clinical_impact"),
            }),
            other => value_text(other).map(|text| Difference::Note { text }),
        })
        .collect()
}

fn parse_insight(value: &Value) -> Option<Insight> {
    match value {
        Value::Object(_) => Some(Insight::Detailed {
            insight: field_text(Some(value), "insight").unwrap_or_else(|| "Insight".to_string()),
            evidence: field_text(Some(value), "evidence"),
            recommended_action: field_text(Some(value), "recommended_action"),
        }),
        other => value_text(other).map(|text| Insight::Note { text }),
    }
}

fn parse_recommendation(value: &Value) -> Option<Recommendation> {
    match value {
        Value::Object(_) => Some(Recommendation {
            recommendation: field_text(Some(value), "recommendation")
                .unwrap_or_else(|| value.to_string()),
            evidence: field_text(Some(value), "evidence"),
            confidence: field_text(Some(value), "confidence"),
        }),
        other => value_text(other).map(|recommendation| Recommendation {
            recommendation,
            evidence: None,
            confidence: None,
        }),
    }
}

fn parse_guidance(value: Option<&Value>) -> TreatmentGuidance {
    match value {
        None | Some(Value::Null) => TreatmentGuidance::NotSpecified,
        Some(Value::Bool(true)) => TreatmentGuidance::Recommended,
        Some(Value::Bool(false)) => TreatmentGuidance::NotRecommended,
        Some(other) => value_text(other)
            .map(TreatmentGuidance::Other)
            .unwrap_or(TreatmentGuidance::NotSpecified),
    }
}

fn parse_summary(value: &Value) -> Option<SummaryText> {
    match value {
        Value::Object(map) if map.is_empty() => None,
        Value::Object(map) => Some(SummaryText::Fields(summary_fields(map))),
        other => value_text(other).map(SummaryText::Text),
    }
}

fn summary_fields(map: &Map<String, Value>) -> Vec<SummaryField> {
    map.iter()
        .map(|(key, value)| SummaryField {
            label: title_case(key),
            value: value_text(value).unwrap_or_default(),
        })
        .collect()
}
