use std::path::PathBuf;

use serde_json::json;
use twin_core::{
    Difference, GenomicFinding, Insight, Measure, SharedFeatures, SummaryText,
    TreatmentGuidance, TwinAnalysis,
};
use twin_data::{analysis_from_value, get_analyses};

fn fixture_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn load(filename: &str) -> TwinAnalysis {
    get_analyses(fixture_dir("twins"))
        .expect("Không nạp được fixture")
        .into_records()
        .into_iter()
        .find(|a| a.filename == filename)
        .expect("Thiếu bản ghi trong fixture")
}

#[test]
fn minimal_record_degrades_to_sentinels() {
    let analysis = analysis_from_value(
        json!({"query_patient_id": "A", "twin_id": "B"}),
        "A_twin_B_analysis.json",
    )
    .expect("Bản ghi tối thiểu phải hợp lệ");

    assert_eq!(analysis.rank, None);
    assert_eq!(analysis.pair_label(), "A ↔ B (Rank #N/A)");
    assert_eq!(analysis.display_similarity(), "N/A");
    assert_eq!(analysis.clinical_pct.display(), "N/A");
    assert_eq!(analysis.shared_features, SharedFeatures::Absent);
    assert_eq!(analysis.shared_biomarker_count(), 0);
    assert_eq!(
        analysis.match_quality.assessment_text(),
        "No overall assessment provided."
    );
    assert_eq!(analysis.match_quality.grade_text(), "N/A");
    assert_eq!(analysis.treatment_guidance, TreatmentGuidance::NotSpecified);
    assert_eq!(analysis.treatment_guidance.label(), "Not Specified");
    assert!(analysis.differences.is_empty());
    assert!(analysis.clinical_summary.comparison_rows().is_empty());
    assert!(analysis.summary.is_none());
}

#[test]
fn scenario_record_keeps_rank_and_score() {
    let analysis = load("A_twin_B_analysis.json");
    assert_eq!(analysis.pair_label(), "A ↔ B (Rank #1)");
    assert_eq!(analysis.similarity_score, Measure::Number(0.92));
    assert_eq!(analysis.display_similarity(), "9.20");
}

#[test]
fn rich_record_resolves_polymorphic_fields() {
    let analysis = load("P-0021419_twin_P-0004863_analysis.json");

    assert_eq!(analysis.rank, Some(2));
    assert_eq!(analysis.display_similarity(), "8.73");
    assert_eq!(analysis.clinical_pct.display(), "82.5");
    assert_eq!(analysis.genomic_pct.display(), "71");

    assert_eq!(analysis.shared_biomarker_count(), 3);
    match &analysis.shared_features {
        SharedFeatures::Mapping { biomarkers, other } => {
            assert_eq!(biomarkers, &["EGFR", "TP53", "CDKN2A"]);
            assert_eq!(other["pathways"], json!(["RTK/RAS"]));
        }
        other => panic!("Sai dạng shared_features: {other:?}"),
    }

    assert_eq!(analysis.match_quality.grade_text(), "B+");
    assert_eq!(analysis.match_quality.strengths.len(), 2);
    assert_eq!(
        analysis.match_quality.weaknesses,
        vec!["Different smoking history".to_string()]
    );

    assert_eq!(analysis.treatment_guidance, TreatmentGuidance::Recommended);
    assert_eq!(
        analysis.rationale.as_deref(),
        Some("Matched on driver mutations and stage.")
    );
}

#[test]
fn empty_key_differences_fall_back_to_differences() {
    let analysis = load("P-0021419_twin_P-0004863_analysis.json");

    assert_eq!(
        analysis.differences,
        vec![
            Difference::Detailed {
                feature: "Smoking".to_string(),
                query_value: "Never".to_string(),
                twin_value: "Former".to_string(),
                clinical_impact: Some("May alter TMB".to_string()),
            },
            Difference::Note {
                text: "Different sex".to_string(),
            },
        ]
    );

    let other = load("P-0004863_twin_P-0021419_analysis.json");
    assert_eq!(
        other.differences,
        vec![Difference::Note {
            text: "Different sex".to_string()
        }]
    );
}

#[test]
fn clinical_comparison_rows_mark_matches() {
    let analysis = load("P-0021419_twin_P-0004863_analysis.json");
    let rows = analysis.clinical_summary.comparison_rows();

    let row = |feature: &str| {
        rows.iter()
            .find(|row| row.feature == feature)
            .expect("Thiếu dòng so sánh")
    };

    let features: Vec<&str> = rows.iter().map(|row| row.feature.as_str()).collect();
    assert_eq!(features, vec!["Age At Diagnosis", "Pdl1 Status", "Sex", "Stage"]);

    assert!(row("Stage").matches);
    assert!(!row("Sex").matches);
    assert_eq!(row("Age At Diagnosis").query_value, "61");
    assert_eq!(row("Age At Diagnosis").twin_value, "-");
    assert_eq!(row("Pdl1 Status").twin_value, "-");
    assert!(!row("Pdl1 Status").matches);
}

#[test]
fn genomic_and_treatment_lists_accept_objects_and_text() {
    let analysis = load("P-0021419_twin_P-0004863_analysis.json");

    let genomic = &analysis.genomic_comparison;
    let shared: Vec<&str> = genomic
        .shared_variants
        .iter()
        .map(GenomicFinding::gene_label)
        .collect();
    assert_eq!(shared, vec!["EGFR", "TP53"]);
    assert_eq!(genomic.shared_variants[0].describe(), "EGFR L858R: Sensitizing");
    assert_eq!(genomic.query_unique[0].describe(), "KRAS G12C");
    assert_eq!(genomic.twin_unique[0].describe(), "STK11 loss");
    assert_eq!(
        genomic.similarity_note.as_deref(),
        Some("Driver profile is concordant.")
    );

    let treatment = &analysis.treatment_comparison;
    assert_eq!(treatment.query_treatments, vec!["Osimertinib", "Carboplatin"]);
    assert_eq!(treatment.twin_treatments, vec!["Erlotinib"]);
    assert_eq!(treatment.overlap.as_deref(), Some("Both received EGFR TKIs."));
    assert_eq!(treatment.divergence, None);
    assert_eq!(treatment.gaps.len(), 1);

    let phenotypes = &analysis.phenotype_comparison;
    assert_eq!(phenotypes.shared, vec!["Adenocarcinoma"]);
    assert_eq!(phenotypes.query_only, vec!["Brain metastasis"]);
    assert!(phenotypes.twin_only.is_empty());
}

#[test]
fn insights_recommendations_and_summary() {
    let analysis = load("P-0021419_twin_P-0004863_analysis.json");

    assert_eq!(analysis.actionable_insights.len(), 2);
    assert!(matches!(
        &analysis.actionable_insights[0],
        Insight::Detailed { recommended_action: Some(action), .. }
            if action == "Review osimertinib eligibility"
    ));
    assert_eq!(
        analysis.actionable_insights[1],
        Insight::Note {
            text: "Monitor for T790M".to_string()
        }
    );

    assert_eq!(analysis.recommendations[0].confidence.as_deref(), Some("Moderate"));
    assert_eq!(analysis.recommendations[1].recommendation, "Discuss at tumor board");
    assert_eq!(analysis.recommendations[1].evidence, None);

    match &analysis.summary {
        Some(SummaryText::Fields(fields)) => {
            let labels: Vec<&str> = fields.iter().map(|f| f.label.as_str()).collect();
            assert_eq!(labels, vec!["Caveat", "Key Point"]);
        }
        other => panic!("Sai dạng summary: {other:?}"),
    }
}

#[test]
fn list_shaped_shared_features_and_text_guidance() {
    let analysis = load("P-0004863_twin_P-0021419_analysis.json");

    assert_eq!(
        analysis.shared_features,
        SharedFeatures::List {
            biomarkers: vec!["EGFR".to_string(), "TP53".to_string()]
        }
    );
    assert_eq!(analysis.shared_biomarker_count(), 2);
    assert_eq!(analysis.treatment_guidance.label(), "Use with caution");
    assert_eq!(analysis.display_similarity(), "8.73");
}

#[test]
fn non_numeric_similarity_is_shown_verbatim() {
    let analysis = analysis_from_value(
        json!({"query_patient_id": "A", "twin_id": "B", "similarity_score": "high", "rank": "4"}),
        "a.json",
    )
    .expect("Bản ghi phải hợp lệ");

    assert_eq!(analysis.display_similarity(), "high");
    assert_eq!(analysis.rank, Some(4));
    assert!(analysis.involves("A") && analysis.involves("B") && !analysis.involves("C"));
}

#[test]
fn false_guidance_is_not_recommended() {
    let analysis = analysis_from_value(
        json!({"query_patient_id": "A", "twin_id": "B", "use_for_treatment_guidance": false}),
        "a.json",
    )
    .expect("Bản ghi phải hợp lệ");

    assert_eq!(analysis.treatment_guidance.label(), "Not Recommended");
}

#[test]
fn percentages_keep_integer_and_float_forms() {
    let analysis = analysis_from_value(
        json!({
            "query_patient_id": "A",
            "twin_id": "B",
            "similarity_score": 1,
            "clinical_pct": 85.0,
            "genomic_pct": 85
        }),
        "a.json",
    )
    .expect("Bản ghi phải hợp lệ");

    assert_eq!(analysis.clinical_pct, Measure::Number(85.0));
    assert_eq!(analysis.clinical_pct.display(), "85.0");
    assert_eq!(analysis.genomic_pct, Measure::Integer(85));
    assert_eq!(analysis.genomic_pct.display(), "85");
    assert_eq!(analysis.display_similarity(), "10.00");

    let analysis = analysis_from_value(
        json!({"query_patient_id": "A", "twin_id": "B", "clinical_pct": "85.0"}),
        "a.json",
    )
    .expect("Bản ghi phải hợp lệ");
    assert_eq!(analysis.clinical_pct.display(), "85.0");
}
