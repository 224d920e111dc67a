use std::path::PathBuf;

use snapshot_core::TemplateCorruption;

use crate::command::CommandError;
use crate::persist::PersistError;

/// Handle to a resolved cluster, usable by a [`crate::ResourceFetcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterContext {
    pub cluster_name: String,
    pub context_name: String,
}

/// Outcome of one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub output_path: PathBuf,
    pub cluster: ClusterContext,
    pub attempted: usize,
    pub written: usize,
    /// Resources that were not found or could not be fetched, as (kind, name).
    pub missing: Vec<(String, String)>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("environment '{0}' not found in config")]
    UnknownEnvironment(String),
    #[error("{field} not found for environment '{environment}'")]
    MissingField {
        environment: String,
        field: &'static str,
    },
    #[error("input file {0:?} not found")]
    ManifestMissing(PathBuf),
    #[error("invalid manifest {path:?}: {message}")]
    ManifestInvalid { path: PathBuf, message: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("{0} is required but not installed or not in PATH")]
    ToolMissing(String),
    #[error("cluster '{0}' is not supported")]
    UnsupportedCluster(String),
    #[error("no GKE cluster found for cluster type '{alias}' in project '{project}'")]
    ClusterNotFound { alias: String, project: String },
    #[error("`{command}` failed: {source}")]
    Command {
        command: String,
        #[source]
        source: CommandError,
    },
    #[error("`{command}` exited unsuccessfully: {stderr}")]
    CommandFailed { command: String, stderr: String },
}

/// A fetch that could not complete. Not fatal to the run.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error("fetched text is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Errors that abort an extraction run.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error("search/replace corrupted {kind}/{name}")]
    TemplateCorruption {
        kind: String,
        name: String,
        #[source]
        source: TemplateCorruption,
    },
    #[error("failed to render {kind}/{name} as YAML: {source}")]
    Render {
        kind: String,
        name: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("output file error: {0}")]
    Output(#[from] PersistError),
}
