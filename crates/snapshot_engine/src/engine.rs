use engine_logging::{engine_debug, engine_info, engine_warn};
use snapshot_core::{
    apply_placeholders, apply_search_replace, PlaceholderRuleSet, Record, RunPhase, RunState,
    Sanitizer,
};

use crate::config::{load_environment, EnvironmentConfig, ExtractionLayout};
use crate::context::{ClusterTarget, ContextResolver};
use crate::fetch::{parse_fetched, ResourceFetcher};
use crate::loader::{load_manifest, load_placeholders};
use crate::render::render_document;
use crate::types::{ClusterContext, ContextError, ExtractError, RunReport};
use crate::writer::DocumentWriter;

/// Drives one extraction: config, cluster context, then every manifest
/// resource through fetch, sanitize, placeholders, search/replace and render.
///
/// Resources are processed strictly one after another. A missing resource is
/// logged and counted; configuration, context, corruption and output errors
/// abort the run, leaving documents already written on disk.
pub struct ExtractionEngine<F, R> {
    layout: ExtractionLayout,
    fetcher: F,
    resolver: R,
    sanitizer: Sanitizer,
}

impl<F: ResourceFetcher, R: ContextResolver> ExtractionEngine<F, R> {
    pub fn new(layout: ExtractionLayout, fetcher: F, resolver: R) -> Self {
        Self {
            layout,
            fetcher,
            resolver,
            sanitizer: Sanitizer::default(),
        }
    }

    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn layout(&self) -> &ExtractionLayout {
        &self.layout
    }

    /// Extract `group` from `cluster` in `environment` into one output file.
    pub fn run(
        &self,
        environment: &str,
        cluster: &str,
        group: &str,
    ) -> Result<RunReport, ExtractError> {
        let mut state = RunState::new();
        let input_file = self.layout.manifest_file(group);
        let output_file = self.layout.output_file(environment, cluster, group);
        engine_info!(
            "Parsing {:?} and fetching Kubernetes manifests...",
            input_file
        );

        let env = load_environment(&self.layout.config_file(), environment)?;
        let manifest = load_manifest(&input_file)?;
        let rules = load_placeholders(&self.layout.placeholder_file(group));
        advance(&mut state, RunPhase::ConfigLoaded);

        let context = self.resolve_context(&env, cluster)?;
        advance(&mut state, RunPhase::ContextResolved);

        engine_info!("Environment: {}", environment);
        engine_info!("Cluster: {}", cluster);
        engine_info!("Resource group: {}", group);
        engine_info!("Project ID: {}", env.project_id);
        engine_info!("Region: {}", env.region);
        engine_info!("Kube cluster: {}", context.cluster_name);
        engine_info!("Kubectl context: {}", context.context_name);
        engine_info!("Input file: {:?}", input_file);
        engine_info!("Output file: {:?}", output_file);

        let mut writer = DocumentWriter::create(&output_file)?;
        advance(&mut state, RunPhase::PerResourceLoop);

        for (kind, name) in manifest.pairs() {
            let count = state.begin_resource(kind, name);
            engine_info!("Processing {}: {}: {}", count, kind, name);

            let namespace = env.namespace_override(name).or(state.namespace());
            let Some(record) = self.fetch_record(kind, name, &context, namespace) else {
                state.record_missing(kind, name);
                continue;
            };

            let document = self.transform(kind, name, record, &rules)?;
            writer.append_document(&document)?;
            state.record_written();
            engine_info!("  Fetched {}/{}", kind, name);
        }

        let output_path = writer.finish()?;
        advance(&mut state, RunPhase::Finalized);

        engine_info!("Resources extracted to {:?}", output_path);
        engine_info!("Total resources processed: {}", state.attempted());
        engine_info!("Total resources in output file: {}", state.written());

        Ok(RunReport {
            output_path,
            cluster: context,
            attempted: state.attempted(),
            written: state.written(),
            missing: state.into_missing(),
        })
    }

    fn resolve_context(
        &self,
        env: &EnvironmentConfig,
        cluster: &str,
    ) -> Result<ClusterContext, ContextError> {
        let name_patterns = env
            .cluster_patterns(cluster)
            .ok_or_else(|| ContextError::UnsupportedCluster(cluster.to_string()))?;
        self.resolver.resolve(&ClusterTarget {
            project_id: &env.project_id,
            region: &env.region,
            alias: cluster,
            name_patterns,
        })
    }

    fn fetch_record(
        &self,
        kind: &str,
        name: &str,
        context: &ClusterContext,
        namespace: Option<&str>,
    ) -> Option<Record> {
        let raw = match self.fetcher.fetch(kind, name, context, namespace) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                engine_warn!("  Resource {}/{} not found", kind, name);
                return None;
            }
            Err(err) => {
                engine_warn!("  Resource {}/{} could not be fetched: {}", kind, name, err);
                return None;
            }
        };
        match parse_fetched(&raw) {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                engine_warn!("  Resource {}/{} returned no data", kind, name);
                None
            }
            Err(err) => {
                engine_warn!("  Resource {}/{} is unreadable: {}", kind, name, err);
                None
            }
        }
    }

    fn transform(
        &self,
        kind: &str,
        name: &str,
        record: Record,
        rules: &PlaceholderRuleSet,
    ) -> Result<String, ExtractError> {
        let record = self.sanitizer.sanitize(record);
        let record = apply_placeholders(record, kind, name, rules);
        let record = apply_search_replace(record, rules.search_and_replace()).map_err(
            |source| ExtractError::TemplateCorruption {
                kind: kind.to_string(),
                name: name.to_string(),
                source,
            },
        )?;
        render_document(&record).map_err(|source| ExtractError::Render {
            kind: kind.to_string(),
            name: name.to_string(),
            source,
        })
    }
}

fn advance(state: &mut RunState, to: RunPhase) {
    let from = state.phase();
    let moved = state.advance(to);
    debug_assert!(moved, "run phase cannot move from {from:?} to {to:?}");
    engine_debug!("Run phase {:?} -> {:?}", from, to);
}
