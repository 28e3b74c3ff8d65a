//! Hồ sơ bệnh nhân và các bảng thống kê dẫn xuất từ hồ sơ.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Hồ sơ bệnh nhân đọc từ một file JSON, giữ nguyên cấu trúc gốc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientProfile {
    /// Mã bệnh nhân dùng làm khoá chỉ mục.
    pub id: String,
    /// Tên file nguồn.
    pub source_file: String,
    /// Mã lấy từ tên file thay vì từ nội dung.
    pub id_from_filename: bool,
    pub data: Value,
}

impl PatientProfile {
    /// Object `clinical`, hoặc `Value::Null` khi không có.
    pub fn clinical(&self) -> &Value {
        self.data.get("clinical").unwrap_or(&Value::Null)
    }
}

impl AsRef<Value> for PatientProfile {
    fn as_ref(&self) -> &Value {
        &self.data
    }
}

/// Các loại sự kiện trong dòng thời gian lâm sàng.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEventKind {
    Surgery,
    Radiation,
    Progression,
    TumorSites,
}

impl TimelineEventKind {
    pub const ALL: [TimelineEventKind; 4] = [
        TimelineEventKind::Surgery,
        TimelineEventKind::Radiation,
        TimelineEventKind::Progression,
        TimelineEventKind::TumorSites,
    ];

    /// Khoá JSON tương ứng, dùng cho cả hai thế hệ schema.
    pub fn key(self) -> &'static str {
        match self {
            TimelineEventKind::Surgery => "surgery",
            TimelineEventKind::Radiation => "radiation",
            TimelineEventKind::Progression => "progression",
            TimelineEventKind::TumorSites => "tumor_sites",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimelineEventKind::Surgery => "Surgery",
            TimelineEventKind::Radiation => "Radiation",
            TimelineEventKind::Progression => "Progression",
            TimelineEventKind::TumorSites => "Tumor Sites",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

/// Bảng thông tin lâm sàng tóm tắt; trường thiếu hiển thị `N/A`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClinicalOverview {
    pub has_demographics: bool,
    pub age: String,
    pub sex: String,
    pub race: String,
    pub vital_status: String,
    pub stage_highest_recorded: String,
    pub stage_category: String,
    pub oncotree_code: String,
    pub cancer_type_detailed: String,
    pub has_biomarkers: bool,
    pub tmb_nonsynonymous: String,
    pub msi_type: String,
    pub pdl1_status: String,
}

/// Số lượng biến đổi di truyền của một mẫu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SampleSummary {
    pub sample_id: String,
    pub sample_type: String,
    pub cancer_type: String,
    pub mutations: usize,
    pub cnas: usize,
    pub svs: usize,
}

impl SampleSummary {
    pub fn total(&self) -> usize {
        self.mutations + self.cnas + self.svs
    }
}

/// Ba nhóm biến đổi di truyền trong một mẫu.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AlterationKind {
    Mutation,
    CopyNumber,
    StructuralVariant,
}

impl AlterationKind {
    /// Khoá danh sách trong object mẫu.
    pub fn sample_key(self) -> &'static str {
        match self {
            AlterationKind::Mutation => "mutations",
            AlterationKind::CopyNumber => "copy_number_alterations",
            AlterationKind::StructuralVariant => "structural_variants",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MutationStats {
    pub total: usize,
    /// `None` khi dữ liệu không có cột phân loại biến thể.
    pub missense: Option<usize>,
    /// `None` khi dữ liệu không có cột tên gen.
    pub distinct_genes: Option<usize>,
    /// Phân bố phân loại biến thể, giảm dần theo số lượng.
    pub classification_counts: Vec<(String, usize)>,
    /// Tối đa 10 gen đột biến nhiều nhất.
    pub top_genes: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CnaStats {
    pub total: usize,
    pub amplifications: Option<usize>,
    pub deletions: Option<usize>,
    pub type_counts: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SvStats {
    pub total: usize,
    pub somatic: Option<usize>,
}
