use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[command(
    name = "kube-snapshot",
    version,
    about = "Extract sanitized, placeholder-injected manifests from a GKE cluster",
    after_help = "Examples:\n  kube-snapshot stg rai druid\n  kube-snapshot prod-eu r1-rai kafka monitoring --output-dir ./backup"
)]
pub struct Cli {
    /// Environment name, a key of config.json (e.g. stg, prod-us)
    pub environment: String,

    /// Cluster alias (e.g. rai, r1-rai)
    pub cluster: String,

    /// Resource groups to extract, each reading {group}-resources.yaml
    #[arg(default_values = ["druid", "kafka"])]
    pub groups: Vec<String>,

    /// Directory holding config.json and the resource/placeholder files
    #[arg(long, env = "KUBE_SNAPSHOT_CONFIG_DIR", default_value = "./static-configs")]
    pub config_dir: PathBuf,

    /// Directory receiving {environment}/{cluster}-{group}-resources.yaml
    #[arg(long, env = "KUBE_SNAPSHOT_OUTPUT_DIR", default_value = "./kube-resources")]
    pub output_dir: PathBuf,

    /// kubectl binary
    #[arg(long, default_value = "kubectl")]
    pub kubectl: String,

    /// gcloud binary
    #[arg(long, default_value = "gcloud")]
    pub gcloud: String,

    /// Per-command timeout for kubectl fetches, in seconds
    #[arg(long, default_value_t = 60)]
    pub kubectl_timeout_secs: u64,

    /// Also write the log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}
