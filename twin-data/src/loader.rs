//! Directory loaders for twin-analysis records and patient profiles.
//!
//! Both loaders share one policy: a missing directory is returned as
//! [`DashboardError::DirectoryNotFound`] and the caller decides whether that
//! is fatal; an unparsable file is skipped and recorded in the report.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};
use twin_core::{
    DashboardError, KeyCollision, LoadReport, PatientProfile, SkippedFile, TwinAnalysis,
};

use crate::analysis::analysis_from_value;

struct JsonFile {
    filename: String,
    value: Value,
}

/// Load every `*.json` file in `directory` as a twin-analysis record.
pub fn get_analyses(
    directory: impl AsRef<Path>,
) -> Result<LoadReport<Vec<TwinAnalysis>>, DashboardError> {
    let directory = directory.as_ref();
    let (files, skipped) = read_json_dir(directory)?;

    let mut report = LoadReport::new(directory, Vec::with_capacity(files.len()));
    report.skipped = skipped;

    for JsonFile { filename, value } in files {
        match analysis_from_value(value, &filename) {
            Ok(analysis) => {
                debug!(file = %filename, "loaded twin analysis");
                report.records.push(analysis);
            }
            Err(err) => {
                warn!(file = %filename, error = %err, "skipping twin analysis");
                report.skipped.push(SkippedFile {
                    filename,
                    reason: err.to_string(),
                });
            }
        }
    }

    report.skipped.sort_by(|a, b| a.filename.cmp(&b.filename));
    info!(
        directory = %directory.display(),
        loaded = report.records.len(),
        skipped = report.skipped_count(),
        "twin analyses loaded"
    );
    Ok(report)
}

/// Load every `*.json` file in `directory` as a patient profile keyed by
/// patient identifier. A later file with the same key replaces the earlier
/// one.
pub fn get_profiles(
    directory: impl AsRef<Path>,
) -> Result<LoadReport<BTreeMap<String, PatientProfile>>, DashboardError> {
    let directory = directory.as_ref();
    let (files, skipped) = read_json_dir(directory)?;

    let mut report = LoadReport::new(directory, BTreeMap::<String, PatientProfile>::new());
    report.skipped = skipped;

    for JsonFile { filename, value } in files {
        if !value.is_object() {
            warn!(file = %filename, "skipping profile that is not a JSON object");
            report.skipped.push(SkippedFile {
                filename,
                reason: "profile is not a JSON object".to_string(),
            });
            continue;
        }

        let (id, id_from_filename) = match profile_key(&value) {
            Some(id) => (id, false),
            None => (filename_stem(&filename), true),
        };

        if let Some(previous) = report.records.get(&id) {
            warn!(
                key = %id,
                replaced = %previous.source_file,
                winner = %filename,
                "duplicate patient id, keeping the later file"
            );
            report.collisions.push(KeyCollision {
                key: id.clone(),
                replaced_file: previous.source_file.clone(),
                winning_file: filename.clone(),
            });
        }

        debug!(file = %filename, patient = %id, "loaded patient profile");
        report.records.insert(
            id.clone(),
            PatientProfile {
                id,
                source_file: filename,
                id_from_filename,
                data: value,
            },
        );
    }

    report.skipped.sort_by(|a, b| a.filename.cmp(&b.filename));
    info!(
        directory = %directory.display(),
        loaded = report.records.len(),
        skipped = report.skipped_count(),
        collisions = report.collisions.len(),
        "patient profiles loaded"
    );
    Ok(report)
}

/// Identifier carried by the profile itself: top-level `patient_id`, then
/// `clinical.patient_id`.
pub fn profile_key(profile: &Value) -> Option<String> {
    profile
        .get("patient_id")
        .and_then(identifier_text)
        .or_else(|| {
            profile
                .get("clinical")
                .and_then(|clinical| clinical.get("patient_id"))
                .and_then(identifier_text)
        })
}

/// File name without its final extension (`P-001.json` -> `P-001`).
pub fn filename_stem(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}

pub(crate) fn identifier_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn read_json_dir(directory: &Path) -> Result<(Vec<JsonFile>, Vec<SkippedFile>), DashboardError> {
    if !directory.is_dir() {
        return Err(DashboardError::DirectoryNotFound(directory.to_path_buf()));
    }

    let io_error = |source: std::io::Error| DashboardError::Io {
        path: directory.to_path_buf(),
        source,
    };

    let mut candidates: Vec<(String, PathBuf)> = Vec::new();
    for entry in fs::read_dir(directory).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let filename = entry.file_name().to_string_lossy().into_owned();
        let path = entry.path();
        if filename.ends_with(".json") && path.is_file() {
            candidates.push((filename, path));
        }
    }
    candidates.sort_by(|a, b| a.0.cmp(&b.0));

    let mut parsed = Vec::with_capacity(candidates.len());
    let mut skipped = Vec::new();

    for (filename, path) in candidates {
        let outcome = fs::read_to_string(&path)
            .map_err(|err| err.to_string())
            .and_then(|text| {
                serde_json::from_str::<Value>(&text).map_err(|err| err.to_string())
            });

        match outcome {
            Ok(value) => parsed.push(JsonFile { filename, value }),
            Err(reason) => {
                warn!(file = %filename, %reason, "skipping malformed JSON file");
                skipped.push(SkippedFile { filename, reason });
            }
        }
    }

    Ok((parsed, skipped))
}
