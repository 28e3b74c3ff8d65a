//! Session cache of loaded directories, keyed by path.
//!
//! Entries live until [`DatasetCache::invalidate`] or [`DatasetCache::clear`];
//! there is no freshness check. Failed loads are not cached, so a retry after
//! fixing the filesystem goes back to disk.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::debug;
use twin_core::{DashboardError, LoadReport, PatientProfile, TwinAnalysis};

use crate::loader::{get_analyses, get_profiles};

pub type AnalysisReport = LoadReport<Vec<TwinAnalysis>>;
pub type ProfileReport = LoadReport<BTreeMap<String, PatientProfile>>;

#[derive(Debug, Default)]
pub struct DatasetCache {
    analyses: HashMap<PathBuf, AnalysisReport>,
    profiles: HashMap<PathBuf, ProfileReport>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Twin analyses of `directory`, loading them on first use.
    pub fn analyses(&mut self, directory: &Path) -> Result<&AnalysisReport, DashboardError> {
        match self.analyses.entry(directory.to_path_buf()) {
            Entry::Occupied(entry) => {
                debug!(directory = %directory.display(), "twin analyses served from cache");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let report = get_analyses(directory)?;
                Ok(entry.insert(report))
            }
        }
    }

    /// Patient profiles of `directory`, loading them on first use.
    pub fn profiles(&mut self, directory: &Path) -> Result<&ProfileReport, DashboardError> {
        match self.profiles.entry(directory.to_path_buf()) {
            Entry::Occupied(entry) => {
                debug!(directory = %directory.display(), "patient profiles served from cache");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let report = get_profiles(directory)?;
                Ok(entry.insert(report))
            }
        }
    }

    pub fn is_cached(&self, directory: &Path) -> bool {
        self.analyses.contains_key(directory) || self.profiles.contains_key(directory)
    }

    /// Drops every entry loaded from `directory`. Returns whether anything
    /// was cached.
    pub fn invalidate(&mut self, directory: &Path) -> bool {
        let analyses = self.analyses.remove(directory).is_some();
        let profiles = self.profiles.remove(directory).is_some();
        analyses || profiles
    }

    pub fn clear(&mut self) {
        self.analyses.clear();
        self.profiles.clear();
    }
}
