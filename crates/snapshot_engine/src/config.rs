use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::types::ConfigError;

const CONFIG_FILENAME: &str = "config.json";

/// Where a run reads its inputs and writes its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionLayout {
    pub config_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for ExtractionLayout {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("./static-configs"),
            output_dir: PathBuf::from("./kube-resources"),
        }
    }
}

impl ExtractionLayout {
    pub fn new(config_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILENAME)
    }

    pub fn manifest_file(&self, group: &str) -> PathBuf {
        self.config_dir.join(format!("{group}-resources.yaml"))
    }

    pub fn placeholder_file(&self, group: &str) -> PathBuf {
        self.config_dir
            .join(format!("{group}-resources-placeholders.yaml"))
    }

    pub fn output_file(&self, environment: &str, cluster: &str, group: &str) -> PathBuf {
        self.output_dir
            .join(environment)
            .join(format!("{cluster}-{group}-resources.yaml"))
    }
}

/// Cluster aliases known without any configuration, mapped to the substrings
/// a GKE cluster name must contain.
pub fn builtin_cluster_patterns() -> BTreeMap<String, Vec<String>> {
    let mut patterns = BTreeMap::new();
    patterns.insert("rai".to_string(), vec!["-sa-".to_string(), "gke".to_string()]);
    patterns.insert("r1-rai".to_string(), vec!["alto-".to_string(), "gke".to_string()]);
    patterns
}

/// One environment's entry in `config.json`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    pub name: String,
    pub project_id: String,
    pub region: String,
    namespace_overrides: BTreeMap<String, String>,
    cluster_patterns: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawEnvironment {
    project_id: Option<String>,
    region: Option<String>,
    #[serde(default)]
    namespace_overrides: BTreeMap<String, String>,
    #[serde(default)]
    cluster_patterns: BTreeMap<String, Vec<String>>,
}

impl EnvironmentConfig {
    /// Namespace that `name` must always be fetched from, if pinned.
    pub fn namespace_override(&self, name: &str) -> Option<&str> {
        self.namespace_overrides.get(name).map(String::as_str)
    }

    pub fn cluster_patterns(&self, alias: &str) -> Option<&[String]> {
        self.cluster_patterns.get(alias).map(Vec::as_slice)
    }
}

/// Read `config.json` and pick out `environment`.
pub fn load_environment(path: &Path, environment: &str) -> Result<EnvironmentConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut all: Map<String, Value> =
        serde_json::from_str(&text).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    let entry = all
        .remove(environment)
        .ok_or_else(|| ConfigError::UnknownEnvironment(environment.to_string()))?;
    let raw: RawEnvironment = serde_json::from_value(entry).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: format!("environment '{environment}': {err}"),
    })?;

    let project_id = required(raw.project_id, environment, "project_id")?;
    let region = required(raw.region, environment, "region")?;

    let mut cluster_patterns = builtin_cluster_patterns();
    cluster_patterns.extend(raw.cluster_patterns);

    Ok(EnvironmentConfig {
        name: environment.to_string(),
        project_id,
        region,
        namespace_overrides: raw.namespace_overrides,
        cluster_patterns,
    })
}

fn required(
    value: Option<String>,
    environment: &str,
    field: &'static str,
) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingField {
            environment: environment.to_string(),
            field,
        })
}
