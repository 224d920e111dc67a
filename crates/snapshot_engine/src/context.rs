use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};

use crate::command::{run_command, CommandOutput};
use crate::types::{ClusterContext, ContextError};

/// Which cluster to resolve and how to recognise it by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterTarget<'a> {
    pub project_id: &'a str,
    pub region: &'a str,
    pub alias: &'a str,
    /// Substrings that must all appear in the cluster name.
    pub name_patterns: &'a [String],
}

/// Establishes access to a cluster. Failure is fatal for the run.
pub trait ContextResolver {
    fn resolve(&self, target: &ClusterTarget<'_>) -> Result<ClusterContext, ContextError>;
}

impl<T: ContextResolver + ?Sized> ContextResolver for &T {
    fn resolve(&self, target: &ClusterTarget<'_>) -> Result<ClusterContext, ContextError> {
        (**self).resolve(target)
    }
}

#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub gcloud: String,
    pub kubectl: String,
    pub timeout: Duration,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            gcloud: "gcloud".to_string(),
            kubectl: "kubectl".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Resolves a GKE cluster through `gcloud` and reads back the kubectl context
/// name, then restores whatever context was current before.
#[derive(Debug, Clone, Default)]
pub struct GcloudContextResolver {
    settings: ToolSettings,
}

impl GcloudContextResolver {
    pub fn new(settings: ToolSettings) -> Self {
        Self { settings }
    }

    /// Fail early when either CLI is absent.
    pub fn check_tools(&self) -> Result<(), ContextError> {
        let probes = [
            (self.settings.kubectl.as_str(), vec!["version", "--client"]),
            (self.settings.gcloud.as_str(), vec!["--version"]),
        ];
        for (tool, args) in probes {
            match run_command(tool, &args, self.settings.timeout) {
                Ok(output) if output.success() => {}
                _ => return Err(ContextError::ToolMissing(tool.to_string())),
            }
        }
        Ok(())
    }

    fn run_checked(&self, program: &str, args: &[&str]) -> Result<CommandOutput, ContextError> {
        let command = format!("{program} {}", args.join(" "));
        engine_debug!("Running `{}`", command);
        let output = run_command(program, args, self.settings.timeout).map_err(|source| {
            ContextError::Command {
                command: command.clone(),
                source,
            }
        })?;
        if !output.success() {
            return Err(ContextError::CommandFailed {
                command,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }

    fn current_context(&self) -> Result<String, ContextError> {
        let output = self.run_checked(&self.settings.kubectl, &["config", "current-context"])?;
        Ok(output.stdout.trim().to_string())
    }
}

impl ContextResolver for GcloudContextResolver {
    fn resolve(&self, target: &ClusterTarget<'_>) -> Result<ClusterContext, ContextError> {
        self.check_tools()?;

        let listing = self.run_checked(
            &self.settings.gcloud,
            &[
                "container",
                "clusters",
                "list",
                "--project",
                target.project_id,
                "--format",
                "value(name)",
            ],
        )?;
        let cluster_name = select_cluster(&listing.stdout, target.name_patterns)
            .ok_or_else(|| ContextError::ClusterNotFound {
                alias: target.alias.to_string(),
                project: target.project_id.to_string(),
            })?
            .to_string();

        // A fresh kubeconfig has no current context; nothing to restore then.
        let previous = match self.current_context() {
            Ok(context) => Some(context),
            Err(err) => {
                engine_warn!("No current kubectl context to restore: {}", err);
                None
            }
        };

        engine_info!("Fetching kubectl context for cluster: {}", cluster_name);
        self.run_checked(
            &self.settings.gcloud,
            &[
                "container",
                "clusters",
                "get-credentials",
                &cluster_name,
                "--project",
                target.project_id,
                "--region",
                target.region,
            ],
        )?;
        let context_name = self.current_context()?;
        engine_info!("Cluster kubectl context: {}", context_name);

        if let Some(previous) = previous.filter(|p| !p.is_empty() && *p != context_name) {
            self.run_checked(&self.settings.kubectl, &["config", "use-context", &previous])?;
        }

        Ok(ClusterContext {
            cluster_name,
            context_name,
        })
    }
}

/// First cluster name in a `gcloud ... --format value(name)` listing that
/// contains every pattern. An empty pattern list matches nothing.
pub fn select_cluster<'a>(listing: &'a str, patterns: &[String]) -> Option<&'a str> {
    if patterns.is_empty() {
        return None;
    }
    listing
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .find(|name| patterns.iter().all(|pattern| name.contains(pattern.as_str())))
}
