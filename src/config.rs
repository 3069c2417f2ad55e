use crate::constants;
use crate::error::{PipelineError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Pipeline configuration, loaded from `config.toml` when present and
/// filled from compiled defaults otherwise.
///
/// All locations are carried here explicitly and threaded into the
/// orchestrator; transformers take no configuration at all, only their
/// schema and allow-list constants.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    data_dir: Option<PathBuf>,
    nics: SourceSection,
    cdc: SourceSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SourceSection {
    input_dir: Option<PathBuf>,
    store_file: Option<String>,
    relation: Option<String>,
}

/// Fully resolved settings for one source.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    /// Directory an external acquisition step drops the raw CSV into.
    pub input_dir: PathBuf,
    /// SQLite store file this source's relation lives in.
    pub store_path: PathBuf,
    /// Relation (table) name inside the store.
    pub relation: String,
}

impl Config {
    /// Load `config.toml` from the working directory, falling back to
    /// defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("Failed to read config file '{}': {e}", path.display()))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("./data"))
    }

    /// Resolve the settings for one source name, or `None` for an unknown
    /// source. Each family gets its own store file, so independent sources
    /// never target the same relation.
    pub fn source(&self, name: &str) -> Option<SourceSettings> {
        let (section, default_store, default_relation) = match name {
            constants::NICS_SOURCE => (&self.nics, "cleaned_nics_dataset.sqlite", "nics_data"),
            constants::CDC_SOURCE => (&self.cdc, "cleaned_cdc_dataset.sqlite", "cdc_data"),
            _ => return None,
        };
        let data_dir = self.data_dir();
        Some(SourceSettings {
            input_dir: section
                .input_dir
                .clone()
                .unwrap_or_else(|| data_dir.join(name)),
            store_path: data_dir.join(
                section
                    .store_file
                    .clone()
                    .unwrap_or_else(|| default_store.to_string()),
            ),
            relation: section
                .relation
                .clone()
                .unwrap_or_else(|| default_relation.to_string()),
        })
    }

    /// Override the data directory (used by tests to stay inside a tempdir).
    pub fn with_data_dir(mut self, dir: PathBuf) -> Self {
        self.data_dir = Some(dir);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_both_sources() {
        let config = Config::default();
        let nics = config.source(constants::NICS_SOURCE).unwrap();
        assert_eq!(nics.relation, "nics_data");
        assert!(nics.store_path.ends_with("cleaned_nics_dataset.sqlite"));

        let cdc = config.source(constants::CDC_SOURCE).unwrap();
        assert_eq!(cdc.relation, "cdc_data");
        assert!(config.source("unknown").is_none());
    }

    #[test]
    fn toml_overrides_apply_per_source() {
        let config: Config = toml::from_str(
            r#"
            data_dir = "/tmp/stats"

            [cdc]
            relation = "mortality"
            store_file = "cdc.sqlite"
            "#,
        )
        .unwrap();

        let cdc = config.source(constants::CDC_SOURCE).unwrap();
        assert_eq!(cdc.relation, "mortality");
        assert_eq!(cdc.store_path, PathBuf::from("/tmp/stats/cdc.sqlite"));
        // Untouched source keeps its defaults, under the overridden data dir
        let nics = config.source(constants::NICS_SOURCE).unwrap();
        assert_eq!(nics.input_dir, PathBuf::from("/tmp/stats/nics"));
    }

    #[test]
    fn missing_config_file_falls_back_to_defaults() {
        let config = Config::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.data_dir(), PathBuf::from("./data"));
    }
}
