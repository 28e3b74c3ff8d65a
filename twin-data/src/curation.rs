//! Copies the profiles referenced by a set of twin analyses into a working
//! profile directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};
use twin_core::DashboardError;

const ANALYSIS_SUFFIX: &str = "_analysis.json";
const PATIENT_PREFIX: &str = "P-";
const PATIENT_DIGITS: usize = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyReport {
    pub copied: Vec<String>,
    pub missing: Vec<String>,
}

/// Patient ids (`P-` followed by seven digits) appearing in the names of
/// `*_analysis.json` files, sorted and deduplicated.
pub fn collect_patient_ids(
    analysis_dir: impl AsRef<Path>,
) -> Result<BTreeSet<String>, DashboardError> {
    let analysis_dir = analysis_dir.as_ref();
    if !analysis_dir.is_dir() {
        return Err(DashboardError::DirectoryNotFound(analysis_dir.to_path_buf()));
    }

    let io_error = |source: std::io::Error| DashboardError::Io {
        path: analysis_dir.to_path_buf(),
        source,
    };

    let mut ids = BTreeSet::new();
    for entry in fs::read_dir(analysis_dir).map_err(io_error)? {
        let entry = entry.map_err(io_error)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(ANALYSIS_SUFFIX) {
            ids.extend(patient_ids_in(&name));
        }
    }

    info!(
        directory = %analysis_dir.display(),
        patients = ids.len(),
        "collected patient ids from analysis filenames"
    );
    Ok(ids)
}

/// Non-overlapping `P-ddddddd` tokens in `text`, left to right.
pub fn patient_ids_in(text: &str) -> Vec<String> {
    let bytes = text.as_bytes();
    let token_len = PATIENT_PREFIX.len() + PATIENT_DIGITS;
    let mut found = Vec::new();
    let mut index = 0;

    while index + token_len <= bytes.len() {
        let candidate = &bytes[index..index + token_len];
        if candidate.starts_with(PATIENT_PREFIX.as_bytes())
            && candidate[PATIENT_PREFIX.len()..]
                .iter()
                .all(u8::is_ascii_digit)
        {
            found.push(text[index..index + token_len].to_string());
            index += token_len;
        } else {
            index += 1;
        }
    }
    found
}

/// Copies `<id>.json` for every id from `source` into `destination`,
/// creating `destination` when needed.
pub fn copy_profiles<'a>(
    ids: impl IntoIterator<Item = &'a String>,
    source: impl AsRef<Path>,
    destination: impl AsRef<Path>,
) -> Result<CopyReport, DashboardError> {
    let source = source.as_ref();
    let destination = destination.as_ref();

    if !source.is_dir() {
        return Err(DashboardError::DirectoryNotFound(source.to_path_buf()));
    }
    fs::create_dir_all(destination).map_err(|err| DashboardError::Io {
        path: destination.to_path_buf(),
        source: err,
    })?;

    let mut report = CopyReport::default();
    for id in ids {
        let file_name = format!("{id}.json");
        let from = source.join(&file_name);
        if !from.is_file() {
            warn!(patient = %id, "profile not found in source directory");
            report.missing.push(id.clone());
            continue;
        }

        let to = destination.join(&file_name);
        fs::copy(&from, &to).map_err(|err| DashboardError::Io {
            path: from.clone(),
            source: err,
        })?;
        report.copied.push(id.clone());
    }

    info!(
        copied = report.copied.len(),
        missing = report.missing.len(),
        destination = %destination.display(),
        "patient profiles copied"
    );
    Ok(report)
}
