//! Mô hình hiển thị cho một bản phân tích cặp song sinh.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{EMPTY_CELL, NOT_AVAILABLE};

/// Giá trị số có thể đến dưới dạng số, chuỗi tự do hoặc không có.
/// Số nguyên và số thực được tách riêng để `85` và `85.0` hiển thị đúng như
/// trong file nguồn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Measure {
    Integer(i64),
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl Measure {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Measure::Integer(value) => Some(*value as f64),
            Measure::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Measure::Missing)
    }

    /// Hiển thị nguyên giá trị (dùng cho phần trăm).
    pub fn display(&self) -> String {
        match self {
            Measure::Integer(value) => value.to_string(),
            Measure::Number(value) => format_float(*value),
            Measure::Text(text) => text.clone(),
            Measure::Missing => NOT_AVAILABLE.to_string(),
        }
    }
}

/// Tập biomarker chung: danh sách phẳng hoặc object có khoá `biomarkers`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SharedFeatures {
    List {
        biomarkers: Vec<String>,
    },
    Mapping {
        biomarkers: Vec<String>,
        #[serde(default)]
        other: BTreeMap<String, Value>,
    },
    #[default]
    Absent,
}

impl SharedFeatures {
    pub fn biomarkers(&self) -> &[String] {
        match self {
            SharedFeatures::List { biomarkers } | SharedFeatures::Mapping { biomarkers, .. } => {
                biomarkers
            }
            SharedFeatures::Absent => &[],
        }
    }

    pub fn biomarker_count(&self) -> usize {
        self.biomarkers().len()
    }
}

/// Đánh giá chất lượng ghép cặp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MatchQuality {
    pub grade: Option<String>,
    pub overall_assessment: Option<String>,
    pub strengths: Vec<String>,
    /// Gộp `weaknesses` và tên cũ `limitations`.
    pub weaknesses: Vec<String>,
}

impl MatchQuality {
    pub fn assessment_text(&self) -> &str {
        self.overall_assessment
            .as_deref()
            .unwrap_or("No overall assessment provided.")
    }

    pub fn grade_text(&self) -> &str {
        self.grade.as_deref().unwrap_or(NOT_AVAILABLE)
    }
}

/// Hai bảng thuộc tính lâm sàng của bệnh nhân gốc và bệnh nhân song sinh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ClinicalSummary {
    pub query: BTreeMap<String, String>,
    pub twin: BTreeMap<String, String>,
}

/// Một dòng trong bảng so sánh lâm sàng.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComparisonRow {
    pub feature: String,
    pub query_value: String,
    pub twin_value: String,
    pub matches: bool,
}

impl ClinicalSummary {
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.twin.is_empty()
    }

    /// Hợp các khoá của hai phía, sắp xếp theo tên khoá.
    pub fn comparison_rows(&self) -> Vec<ComparisonRow> {
        let keys: BTreeSet<&String> = self.query.keys().chain(self.twin.keys()).collect();
        keys.into_iter()
            .map(|key| {
                let query_value = self
                    .query
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| EMPTY_CELL.to_string());
                let twin_value = self
                    .twin
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| EMPTY_CELL.to_string());
                let matches = query_value == twin_value && query_value != EMPTY_CELL;
                ComparisonRow {
                    feature: title_case(key),
                    query_value,
                    twin_value,
                    matches,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PhenotypeComparison {
    pub shared: Vec<String>,
    pub query_only: Vec<String>,
    pub twin_only: Vec<String>,
}

/// Biến thể gen được nhắc tới trong phần so sánh di truyền.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenomicFinding {
    Variant {
        gene: Option<String>,
        variant: Option<String>,
        clinical_significance: Option<String>,
    },
    Note {
        text: String,
    },
}

impl GenomicFinding {
    /// Tên gen, hoặc nguyên văn ghi chú.
    pub fn gene_label(&self) -> &str {
        match self {
            GenomicFinding::Variant { gene, .. } => gene.as_deref().unwrap_or_default(),
            GenomicFinding::Note { text } => text,
        }
    }

    /// Dạng "GEN biến thể: ý nghĩa".
    pub fn describe(&self) -> String {
        match self {
            GenomicFinding::Variant {
                gene,
                variant,
                clinical_significance,
            } => {
                let head = [gene.as_deref(), variant.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join(" ");
                match clinical_significance {
                    Some(sig) => format!("{head}: {sig}"),
                    None => head,
                }
            }
            GenomicFinding::Note { text } => text.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GenomicComparison {
    pub shared_variants: Vec<GenomicFinding>,
    pub query_unique: Vec<GenomicFinding>,
    pub twin_unique: Vec<GenomicFinding>,
    pub similarity_note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TreatmentComparison {
    pub query_treatments: Vec<String>,
    pub twin_treatments: Vec<String>,
    pub overlap: Option<String>,
    pub divergence: Option<String>,
    pub gaps: Vec<String>,
}

/// Khác biệt chính giữa hai bệnh nhân.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Difference {
    Detailed {
        feature: String,
        query_value: String,
        twin_value: String,
        clinical_impact: Option<String>,
    },
    Note {
        text: String,
    },
}

/// Gợi ý hành động rút ra từ cặp song sinh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Insight {
    Detailed {
        insight: String,
        evidence: Option<String>,
        recommended_action: Option<String>,
    },
    Note {
        text: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recommendation {
    pub recommendation: String,
    pub evidence: Option<String>,
    pub confidence: Option<String>,
}

/// Cờ "dùng cho định hướng điều trị".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TreatmentGuidance {
    Recommended,
    NotRecommended,
    Other(String),
    #[default]
    NotSpecified,
}

impl TreatmentGuidance {
    pub fn label(&self) -> &str {
        match self {
            TreatmentGuidance::Recommended => "Recommended",
            TreatmentGuidance::NotRecommended => "Not Recommended",
            TreatmentGuidance::Other(text) => text,
            TreatmentGuidance::NotSpecified => "Not Specified",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SummaryField {
    pub label: String,
    pub value: String,
}

/// Phần tóm tắt riêng: văn bản hoặc các cặp nhãn/giá trị.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SummaryText {
    Text(String),
    Fields(Vec<SummaryField>),
}

/// Bản phân tích một cặp song sinh, đã chuẩn hoá các trường đa hình.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TwinAnalysis {
    pub query_patient_id: String,
    pub twin_id: String,
    pub rank: Option<u32>,
    pub similarity_score: Measure,
    pub clinical_pct: Measure,
    pub genomic_pct: Measure,
    pub match_quality: MatchQuality,
    pub shared_features: SharedFeatures,
    pub clinical_summary: ClinicalSummary,
    pub phenotype_comparison: PhenotypeComparison,
    pub genomic_comparison: GenomicComparison,
    pub treatment_comparison: TreatmentComparison,
    pub actionable_insights: Vec<Insight>,
    pub recommendations: Vec<Recommendation>,
    /// Gộp `key_differences` và tên cũ `differences`.
    pub differences: Vec<Difference>,
    pub summary: Option<SummaryText>,
    pub rationale: Option<String>,
    pub treatment_guidance: TreatmentGuidance,
    /// Tên file nguồn, do bộ nạp gắn vào.
    pub filename: String,
    /// Bản ghi JSON gốc (đã có trường `filename`).
    pub raw: Value,
}

impl TwinAnalysis {
    /// Nhãn chọn cặp: "Q ↔ T (Rank #n)".
    pub fn pair_label(&self) -> String {
        format!(
            "{} ↔ {} (Rank #{})",
            self.query_patient_id,
            self.twin_id,
            self.rank_text()
        )
    }

    pub fn rank_text(&self) -> String {
        self.rank
            .map(|rank| rank.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// Điểm tương đồng nhân 10, hai chữ số thập phân.
    pub fn display_similarity(&self) -> String {
        match &self.similarity_score {
            Measure::Integer(score) => format!("{:.2}", *score as f64 * 10.0),
            Measure::Number(score) => format!("{:.2}", score * 10.0),
            other => other.display(),
        }
    }

    pub fn shared_biomarker_count(&self) -> usize {
        self.shared_features.biomarker_count()
    }

    /// Bệnh nhân có tham gia cặp này không (ở phía nào cũng được).
    pub fn involves(&self, patient_id: &str) -> bool {
        self.query_patient_id == patient_id || self.twin_id == patient_id
    }
}

/// Viết hoa chữ cái sau mỗi ký tự không phải chữ, thay `_` bằng khoảng trắng.
pub fn title_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut boundary = true;
    for ch in key.replace('_', " ").chars() {
        if ch.is_alphabetic() {
            if boundary {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            boundary = false;
        } else {
            out.push(ch);
            boundary = true;
        }
    }
    out
}

/// Số thực theo cách `serde_json` in ra: `85.0` giữ phần thập phân.
fn format_float(value: f64) -> String {
    serde_json::Number::from_f64(value)
        .map(|number| number.to_string())
        .unwrap_or_else(|| value.to_string())
}
