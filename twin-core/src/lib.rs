//! Kiểu dữ liệu lõi cho dashboard so sánh cặp bệnh nhân "song sinh số".

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

mod analysis;
mod profile;

pub use analysis::{
    title_case, ClinicalSummary, ComparisonRow, Difference, GenomicComparison, GenomicFinding,
    Insight, MatchQuality, Measure, PhenotypeComparison, Recommendation, SharedFeatures,
    SummaryField, SummaryText, TreatmentComparison, TreatmentGuidance, TwinAnalysis,
};
pub use profile::{
    AlterationKind, ClinicalOverview, CnaStats, MutationStats, PatientProfile, SampleSummary,
    SvStats, TimelineEventKind,
};

/// Giá trị hiển thị khi dữ liệu không có.
pub const NOT_AVAILABLE: &str = "N/A";

/// Giá trị hiển thị cho ô trống trong bảng so sánh.
pub const EMPTY_CELL: &str = "-";

/// Cấu hình vị trí các thư mục dữ liệu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    /// Thư mục chứa các file JSON phân tích cặp song sinh.
    pub analyses_dir: PathBuf,
    /// Thư mục chứa hồ sơ bệnh nhân (mỗi bệnh nhân một file JSON).
    pub profiles_dir: PathBuf,
    /// Thư mục chứa file lâm sàng dạng TSV (tuỳ chọn).
    pub clinical_dir: Option<PathBuf>,
    /// Thư mục chứa file đột biến/CNA/SV dạng CSV (tuỳ chọn).
    pub genomics_dir: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            analyses_dir: PathBuf::from("final_twin_analysis_2"),
            profiles_dir: PathBuf::from("patient_profiles_2"),
            clinical_dir: None,
            genomics_dir: None,
        }
    }
}

impl DashboardConfig {
    /// Đọc cấu hình từ chuỗi JSON; trường thiếu lấy giá trị mặc định.
    pub fn from_json_str(input: &str) -> Result<Self, DashboardError> {
        let partial: PartialDashboardConfig =
            serde_json::from_str(input).map_err(|err| DashboardError::Config(err.to_string()))?;
        Ok(Self::from(partial))
    }

    /// Đọc cấu hình từ file JSON.
    pub fn from_json_file(path: &Path) -> Result<Self, DashboardError> {
        let data = std::fs::read_to_string(path).map_err(|source| DashboardError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&data)
    }
}

/// Cấu hình một phần, dùng để ghi đè lên giá trị mặc định.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PartialDashboardConfig {
    #[serde(default)]
    pub analyses_dir: Option<PathBuf>,
    #[serde(default)]
    pub profiles_dir: Option<PathBuf>,
    #[serde(default)]
    pub clinical_dir: Option<PathBuf>,
    #[serde(default)]
    pub genomics_dir: Option<PathBuf>,
}

impl From<PartialDashboardConfig> for DashboardConfig {
    fn from(cfg: PartialDashboardConfig) -> Self {
        let mut base = DashboardConfig::default();
        if let Some(dir) = cfg.analyses_dir {
            base.analyses_dir = dir;
        }
        if let Some(dir) = cfg.profiles_dir {
            base.profiles_dir = dir;
        }
        if cfg.clinical_dir.is_some() {
            base.clinical_dir = cfg.clinical_dir;
        }
        if cfg.genomics_dir.is_some() {
            base.genomics_dir = cfg.genomics_dir;
        }
        base
    }
}

/// File bị bỏ qua trong một lần nạp theo lô.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

/// Hai file cùng ánh xạ về một mã bệnh nhân; file sau ghi đè file trước.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyCollision {
    pub key: String,
    pub replaced_file: String,
    pub winning_file: String,
}

/// Kết quả nạp một thư mục: bản ghi hợp lệ kèm danh sách file bị bỏ qua.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadReport<T> {
    pub directory: PathBuf,
    pub loaded_at: DateTime<Utc>,
    pub records: T,
    #[serde(default)]
    pub skipped: Vec<SkippedFile>,
    #[serde(default)]
    pub collisions: Vec<KeyCollision>,
}

impl<T> LoadReport<T> {
    /// Khởi tạo báo cáo với thời điểm nạp hiện tại.
    pub fn new(directory: impl Into<PathBuf>, records: T) -> Self {
        Self {
            directory: directory.into(),
            loaded_at: Utc::now(),
            records,
            skipped: Vec::new(),
            collisions: Vec::new(),
        }
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Bỏ phần báo cáo, chỉ giữ bản ghi.
    pub fn into_records(self) -> T {
        self.records
    }
}

/// Lỗi chung của tầng truy cập dữ liệu.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Không tìm thấy thư mục: {}", .0.display())]
    DirectoryNotFound(PathBuf),
    #[error("Không đọc được {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Bản ghi không hợp lệ trong {filename}: {reason}")]
    MalformedRecord { filename: String, reason: String },
    #[error("Không đọc được dữ liệu: {0}")]
    Parse(String),
    #[error("Cấu hình không hợp lệ: {0}")]
    Config(String),
}

impl DashboardError {
    /// Lỗi do thư mục đầu vào không tồn tại.
    pub fn is_directory_not_found(&self) -> bool {
        matches!(self, DashboardError::DirectoryNotFound(_))
    }
}

/// Chuỗi hiển thị cho giá trị tuỳ chọn, thay bằng `N/A` khi thiếu.
pub fn display_or_na(value: Option<&str>) -> &str {
    value.unwrap_or(NOT_AVAILABLE)
}
