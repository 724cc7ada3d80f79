// src/config.rs
use serde::Deserialize;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("'{0}' must not be empty")]
    EmptyField(&'static str),
    #[error("'{first}' and '{second}' both point to '{path}'")]
    PathCollision {
        first: &'static str,
        second: &'static str,
        path: PathBuf,
    },
}

/// How rows with a blank `Region` or `Product` value are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingKeyPolicy {
    /// Keep the row and group it under the empty-string key. (Default)
    #[default]
    Group,
    /// Exclude the row from the validated table, like a non-numeric measure.
    Drop,
}

/// Everything a report run needs to know, passed explicitly into the pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportConfig {
    pub input_source: PathBuf,
    pub output_destination: PathBuf,
    pub chart_artifact_path: PathBuf,
    pub title: String,
    pub author: String,
    pub missing_keys: MissingKeyPolicy,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input_source: PathBuf::from("sales_data.csv"),
            output_destination: PathBuf::from("sales_report.pdf"),
            chart_artifact_path: PathBuf::from("sales_by_region_plot.png"),
            title: "Quarterly Sales Performance Report".to_string(),
            author: "Automated Report System".to_string(),
            missing_keys: MissingKeyPolicy::default(),
        }
    }
}

impl ReportConfig {
    /// Loads a configuration from a JSON file. Absent keys keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&source).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json_str(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    pub fn with_input<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.input_source = path.into();
        self
    }

    pub fn with_output<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_destination = path.into();
        self
    }

    pub fn with_chart_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.chart_artifact_path = path.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_missing_keys(mut self, policy: MissingKeyPolicy) -> Self {
        self.missing_keys = policy;
        self
    }

    /// Rejects configurations that could never produce a document.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_source.as_os_str().is_empty() {
            return Err(ConfigError::EmptyField("inputSource"));
        }
        if self.output_destination.as_os_str().is_empty() {
            return Err(ConfigError::EmptyField("outputDestination"));
        }
        if self.chart_artifact_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyField("chartArtifactPath"));
        }

        let paths = [
            ("inputSource", resolve(&self.input_source)),
            ("outputDestination", resolve(&self.output_destination)),
            ("chartArtifactPath", resolve(&self.chart_artifact_path)),
        ];
        for (i, (first, a)) in paths.iter().enumerate() {
            if let Some((second, _)) = paths[i + 1..].iter().find(|(_, b)| b == a) {
                return Err(ConfigError::PathCollision {
                    first: *first,
                    second: *second,
                    path: a.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Absolute, lexically normalized form of `path`, for comparing configured locations.
fn resolve(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}
