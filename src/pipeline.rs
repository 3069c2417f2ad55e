use crate::config::{Config, SourceSettings};
use crate::error::{PipelineError, Result};
use crate::extract;
use crate::loader::SqliteStore;
use crate::transform::{create_source, SourceFamily};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

/// Outcome of one successful source run.
#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    pub source: String,
    pub rows_extracted: usize,
    pub rows_loaded: usize,
    pub relation: String,
    pub store_file: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceFailure {
    pub source: String,
    pub error: String,
}

/// Result of a full pipeline run across sources.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub reports: Vec<SourceReport>,
    pub failures: Vec<SourceFailure>,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

pub struct Pipeline;

impl Pipeline {
    /// Run extract → transform → load for one configured source.
    pub fn run_source(config: &Config, name: &str) -> Result<SourceReport> {
        let family = create_source(name)
            .ok_or_else(|| PipelineError::Config(format!("unknown source '{name}'")))?;
        let settings = config
            .source(name)
            .ok_or_else(|| PipelineError::Config(format!("no settings for source '{name}'")))?;
        Self::run_family(family.as_ref(), &settings)
    }

    fn run_family(family: &dyn SourceFamily, settings: &SourceSettings) -> Result<SourceReport> {
        let span = tracing::info_span!("source", source = family.name());
        let _enter = span.enter();

        info!("Extracting raw table from {}", settings.input_dir.display());
        let raw = extract::load_table(&settings.input_dir)?;
        let rows_extracted = raw.row_count();

        info!("Transforming {} raw rows", rows_extracted);
        let cleaned = family.transform(&raw)?;

        info!(
            "Loading {} rows into '{}' at {}",
            cleaned.row_count(),
            settings.relation,
            settings.store_path.display()
        );
        let mut store = SqliteStore::open(&settings.store_path)?;
        store.replace(&settings.relation, family.schema(), &cleaned)?;

        Ok(SourceReport {
            source: family.name().to_string(),
            rows_extracted,
            rows_loaded: cleaned.row_count(),
            relation: settings.relation.clone(),
            store_file: settings.store_path.to_string_lossy().to_string(),
        })
    }

    /// Run every named source in order, continuing past per-source failures.
    ///
    /// Sources share no transaction: a failed source leaves the others'
    /// relations untouched. A JSON run summary is written into the data
    /// directory; failing to write it is logged, not fatal.
    pub fn run_all(config: &Config, sources: &[String]) -> RunSummary {
        let started_at = Utc::now();
        let mut reports = Vec::new();
        let mut failures = Vec::new();

        for name in sources {
            match Self::run_source(config, name) {
                Ok(report) => {
                    info!(
                        "Source '{}' complete: {} rows loaded into '{}'",
                        name, report.rows_loaded, report.relation
                    );
                    reports.push(report);
                }
                Err(e) => {
                    error!("Source '{}' failed: {}", name, e);
                    failures.push(SourceFailure {
                        source: name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let summary = RunSummary {
            started_at,
            finished_at: Utc::now(),
            reports,
            failures,
        };

        if let Err(e) = Self::persist_summary(&summary, &config.data_dir()) {
            warn!("Failed to write run summary: {}", e);
        }
        summary
    }

    /// Persist the run summary to a timestamped JSON file.
    fn persist_summary(summary: &RunSummary, data_dir: &Path) -> Result<String> {
        fs::create_dir_all(data_dir)?;

        let timestamp = summary.started_at.format("%Y%m%d_%H%M%S");
        let filepath = data_dir.join(format!("run_summary_{timestamp}.json"));

        let json_content = serde_json::to_string_pretty(summary)?;
        fs::write(&filepath, json_content)?;

        Ok(filepath.to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants;

    #[test]
    fn unknown_source_is_a_config_error() {
        let config = Config::default();
        let err = Pipeline::run_source(&config, "nonexistent").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn run_all_continues_past_a_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default().with_data_dir(dir.path().to_path_buf());

        // No input CSVs exist, so both sources fail with MissingSource,
        // but the run still covers both and reports each failure.
        let sources: Vec<String> = constants::get_supported_sources()
            .into_iter()
            .map(str::to_string)
            .collect();
        let summary = Pipeline::run_all(&config, &sources);

        assert!(summary.has_failures());
        assert_eq!(summary.failures.len(), 2);
        assert_eq!(summary.failures[0].source, "nics");
        assert_eq!(summary.failures[1].source, "cdc");
    }
}
