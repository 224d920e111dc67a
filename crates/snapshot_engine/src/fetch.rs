use std::time::Duration;

use engine_logging::engine_debug;
use snapshot_core::Record;

use crate::command::run_command;
use crate::types::{ClusterContext, FetchError};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub kubectl: String,
    pub timeout: Duration,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            kubectl: "kubectl".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Fetches the raw JSON text of one resource.
///
/// `Ok(None)` means the resource does not exist (or the cluster returned
/// nothing for it); that is an expected outcome, not an error.
pub trait ResourceFetcher {
    fn fetch(
        &self,
        kind: &str,
        name: &str,
        context: &ClusterContext,
        namespace: Option<&str>,
    ) -> Result<Option<String>, FetchError>;
}

impl<T: ResourceFetcher + ?Sized> ResourceFetcher for &T {
    fn fetch(
        &self,
        kind: &str,
        name: &str,
        context: &ClusterContext,
        namespace: Option<&str>,
    ) -> Result<Option<String>, FetchError> {
        (**self).fetch(kind, name, context, namespace)
    }
}

#[derive(Debug, Clone, Default)]
pub struct KubectlFetcher {
    settings: FetchSettings,
}

impl KubectlFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }
}

impl ResourceFetcher for KubectlFetcher {
    fn fetch(
        &self,
        kind: &str,
        name: &str,
        context: &ClusterContext,
        namespace: Option<&str>,
    ) -> Result<Option<String>, FetchError> {
        let mut args: Vec<&str> = Vec::with_capacity(10);
        if let Some(namespace) = namespace {
            args.extend(["-n", namespace]);
        }
        args.extend([
            "get",
            kind,
            name,
            "-o",
            "json",
            "--context",
            context.context_name.as_str(),
        ]);

        let output = run_command(&self.settings.kubectl, &args, self.settings.timeout)?;
        if !output.success() {
            engine_debug!(
                "kubectl get {} {} exited with {}: {}",
                kind,
                name,
                output.status,
                output.stderr.trim()
            );
            return Ok(None);
        }
        if output.stdout.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(output.stdout))
    }
}

/// Parse fetched text into a record. An empty document counts as absent.
pub fn parse_fetched(raw: &str) -> Result<Option<Record>, FetchError> {
    let record: Record = serde_json::from_str(raw)?;
    let is_empty = match &record {
        Record::Null => true,
        Record::Object(map) => map.is_empty(),
        Record::Array(items) => items.is_empty(),
        Record::String(text) => text.is_empty(),
        _ => false,
    };
    Ok((!is_empty).then_some(record))
}
