//! Snapshot engine: configuration, cluster collaborators and the extraction run.
mod command;
mod config;
mod context;
mod engine;
mod fetch;
mod loader;
mod persist;
mod render;
mod types;
mod writer;

pub use command::{run_command, CommandError, CommandOutput};
pub use config::{builtin_cluster_patterns, load_environment, EnvironmentConfig, ExtractionLayout};
pub use context::{select_cluster, ClusterTarget, ContextResolver, GcloudContextResolver, ToolSettings};
pub use engine::ExtractionEngine;
pub use fetch::{parse_fetched, FetchSettings, KubectlFetcher, ResourceFetcher};
pub use loader::{load_manifest, load_placeholders, read_yaml_record};
pub use persist::{ensure_output_dir, replace_file_atomically, PersistError};
pub use render::render_document;
pub use types::{ClusterContext, ConfigError, ContextError, ExtractError, FetchError, RunReport};
pub use writer::{trim_document_tail, trim_output_file, DocumentWriter, DOCUMENT_SEPARATOR};
