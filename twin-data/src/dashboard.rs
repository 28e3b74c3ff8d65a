//! Top-level dataset used by the presentation layer.

use std::collections::BTreeMap;

use tracing::error;
use twin_core::{
    DashboardConfig, DashboardError, LoadReport, PatientProfile, SkippedFile, TwinAnalysis,
};

use crate::cache::{AnalysisReport, DatasetCache, ProfileReport};

/// Analyses and profiles loaded for one session.
#[derive(Debug, Clone)]
pub struct Dashboard {
    config: DashboardConfig,
    analyses: AnalysisReport,
    profiles: ProfileReport,
}

impl Dashboard {
    /// Loads both datasets. A missing analyses directory is an error; a
    /// missing profiles directory leaves the profile index empty.
    pub fn load(config: DashboardConfig) -> Result<Self, DashboardError> {
        Self::load_with(&mut DatasetCache::new(), config)
    }

    /// Same as [`Dashboard::load`], reusing entries already in `cache`.
    pub fn load_with(
        cache: &mut DatasetCache,
        config: DashboardConfig,
    ) -> Result<Self, DashboardError> {
        let analyses = cache.analyses(&config.analyses_dir)?.clone();

        let profiles = match cache.profiles(&config.profiles_dir) {
            Ok(report) => report.clone(),
            Err(err) if err.is_directory_not_found() => {
                error!(error = %err, "patient profiles unavailable, continuing without them");
                LoadReport::new(&config.profiles_dir, BTreeMap::new())
            }
            Err(err) => return Err(err),
        };

        Ok(Self {
            config,
            analyses,
            profiles,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn analyses(&self) -> &[TwinAnalysis] {
        &self.analyses.records
    }

    pub fn analysis_report(&self) -> &AnalysisReport {
        &self.analyses
    }

    pub fn profiles(&self) -> &BTreeMap<String, PatientProfile> {
        &self.profiles.records
    }

    pub fn profile_report(&self) -> &ProfileReport {
        &self.profiles
    }

    pub fn profile(&self, patient_id: &str) -> Option<&PatientProfile> {
        self.profiles.records.get(patient_id)
    }

    /// Patient ids in sorted order.
    pub fn patient_ids(&self) -> Vec<&str> {
        self.profiles.records.keys().map(String::as_str).collect()
    }

    pub fn find_pair(&self, query_patient_id: &str, twin_id: &str) -> Option<&TwinAnalysis> {
        self.analyses()
            .iter()
            .find(|a| a.query_patient_id == query_patient_id && a.twin_id == twin_id)
    }

    /// Every analysis the patient takes part in, on either side.
    pub fn analyses_for(&self, patient_id: &str) -> Vec<&TwinAnalysis> {
        self.analyses()
            .iter()
            .filter(|a| a.involves(patient_id))
            .collect()
    }

    /// Query and twin profiles of a pair; either may be missing.
    pub fn pair_profiles(
        &self,
        analysis: &TwinAnalysis,
    ) -> (Option<&PatientProfile>, Option<&PatientProfile>) {
        (
            self.profile(&analysis.query_patient_id),
            self.profile(&analysis.twin_id),
        )
    }

    /// Mean similarity score over analyses that carry a numeric score.
    pub fn average_similarity(&self) -> Option<f64> {
        let scores: Vec<f64> = self
            .analyses()
            .iter()
            .filter_map(|a| a.similarity_score.as_f64())
            .collect();
        if scores.is_empty() {
            None
        } else {
            Some(scores.iter().sum::<f64>() / scores.len() as f64)
        }
    }

    /// Files skipped by either loader.
    pub fn skipped_files(&self) -> impl Iterator<Item = &SkippedFile> {
        self.analyses.skipped.iter().chain(self.profiles.skipped.iter())
    }
}
