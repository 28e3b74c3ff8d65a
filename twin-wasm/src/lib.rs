//! Bridge WASM <-> JavaScript cho dashboard song sinh số.
//!
//! Mỗi hàm `#[wasm_bindgen]` chỉ chuyển đổi `JsValue`; phần xử lý nằm trong
//! các hàm thuần Rust bên dưới để test được ngoài trình duyệt.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use serde_wasm_bindgen::{from_value, Serializer};
use twin_core::{ClinicalOverview, ComparisonRow, DashboardError, SampleSummary, TwinAnalysis};
use twin_data::{
    analysis_from_value, clinical_overview, get_genomic_samples, get_timeline_events,
    get_treatment_lines, sample_summaries, table_rows, treatment_columns,
};
use wasm_bindgen::prelude::*;

#[derive(Deserialize)]
struct JsClinicalOptions {
    #[serde(default)]
    include_samples: Option<bool>,
    #[serde(default)]
    include_treatments: Option<bool>,
}

/// Phần nào của khung lâm sàng được trả về.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClinicalOptions {
    include_samples: bool,
    include_treatments: bool,
}

impl Default for ClinicalOptions {
    fn default() -> Self {
        Self {
            include_samples: true,
            include_treatments: true,
        }
    }
}

impl From<JsClinicalOptions> for ClinicalOptions {
    fn from(cfg: JsClinicalOptions) -> Self {
        let mut base = ClinicalOptions::default();
        if let Some(flag) = cfg.include_samples {
            base.include_samples = flag;
        }
        if let Some(flag) = cfg.include_treatments {
            base.include_treatments = flag;
        }
        base
    }
}

/// Bản ghi phân tích kèm các chuỗi hiển thị đã tính sẵn.
#[derive(Debug, Serialize)]
struct AnalysisView {
    pair_label: String,
    display_similarity: String,
    clinical_pct: String,
    genomic_pct: String,
    shared_biomarker_count: usize,
    treatment_guidance: String,
    comparison_rows: Vec<ComparisonRow>,
    analysis: TwinAnalysis,
}

impl From<TwinAnalysis> for AnalysisView {
    fn from(analysis: TwinAnalysis) -> Self {
        Self {
            pair_label: analysis.pair_label(),
            display_similarity: analysis.display_similarity(),
            clinical_pct: analysis.clinical_pct.display(),
            genomic_pct: analysis.genomic_pct.display(),
            shared_biomarker_count: analysis.shared_biomarker_count(),
            treatment_guidance: analysis.treatment_guidance.label().to_string(),
            comparison_rows: analysis.clinical_summary.comparison_rows(),
            analysis,
        }
    }
}

#[derive(Debug, Serialize)]
struct TreatmentTable {
    columns: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ClinicalView {
    overview: ClinicalOverview,
    #[serde(skip_serializing_if = "Option::is_none")]
    samples: Option<Vec<SampleSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    treatments: Option<TreatmentTable>,
}

#[wasm_bindgen]
pub fn timeline_events(profile: JsValue, event_type: String) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let profile = read_json(profile, "hồ sơ bệnh nhân")?;
    to_js(get_timeline_events(&profile, &event_type))
}

#[wasm_bindgen]
pub fn treatment_lines(profile: JsValue) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let profile = read_json(profile, "hồ sơ bệnh nhân")?;
    to_js(get_treatment_lines(&profile))
}

/// Danh sách `{ sample_id, sample }`, sắp theo mã mẫu.
#[wasm_bindgen]
pub fn genomic_samples(profile: JsValue) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let profile = read_json(profile, "hồ sơ bệnh nhân")?;
    to_js(&samples_value(&profile))
}

#[wasm_bindgen]
pub fn analysis_view(record: JsValue, filename: String) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let record = read_json(record, "bản ghi phân tích")?;
    let view = build_analysis_view(record, &filename)
        .map_err(|err| JsValue::from_str(&format_dashboard_error(err)))?;
    to_js(&view)
}

#[wasm_bindgen]
pub fn clinical_view(profile: JsValue, options: Option<JsValue>) -> Result<JsValue, JsValue> {
    init_panic_hook();
    let profile = read_json(profile, "hồ sơ bệnh nhân")?;

    let options = match options {
        Some(js_options) => {
            let options: JsClinicalOptions = from_value(js_options)
                .map_err(|err| JsValue::from_str(&format!("Không đọc được tuỳ chọn: {err}")))?;
            ClinicalOptions::from(options)
        }
        None => ClinicalOptions::default(),
    };

    to_js(&build_clinical_view(&profile, options))
}

fn build_analysis_view(record: Value, filename: &str) -> Result<AnalysisView, DashboardError> {
    analysis_from_value(record, filename).map(AnalysisView::from)
}

fn build_clinical_view(profile: &Value, options: ClinicalOptions) -> ClinicalView {
    let treatments = options.include_treatments.then(|| {
        let lines = get_treatment_lines(profile);
        let columns = treatment_columns(lines);
        let rows = table_rows(lines, &columns);
        TreatmentTable { columns, rows }
    });

    ClinicalView {
        overview: clinical_overview(profile),
        samples: options.include_samples.then(|| sample_summaries(profile)),
        treatments,
    }
}

fn samples_value(profile: &Value) -> Value {
    get_genomic_samples(profile)
        .into_iter()
        .map(|(sample_id, sample)| json!({ "sample_id": sample_id, "sample": sample }))
        .collect()
}

fn init_panic_hook() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

fn read_json(input: JsValue, what: &str) -> Result<Value, JsValue> {
    from_value::<Value>(input)
        .map_err(|err| JsValue::from_str(&format!("Không đọc được JSON {what}: {err}")))
}

/// Object JSON sang object JS thường (không phải `Map`).
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&Serializer::json_compatible())
        .map_err(|err| JsValue::from_str(&format!("Không serialize kết quả: {err}")))
}

fn format_dashboard_error(err: DashboardError) -> String {
    format!("Dashboard error: {err}")
}
