use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use engine_logging::{engine_info, engine_warn};
use snapshot_engine::{
    ExtractionEngine, ExtractionLayout, FetchSettings, GcloudContextResolver, KubectlFetcher,
    ToolSettings,
};

use crate::cli::Cli;

/// Run every requested group in order, stopping at the first fatal error.
pub fn run(cli: &Cli) -> anyhow::Result<Vec<PathBuf>> {
    let layout = ExtractionLayout::new(&cli.config_dir, &cli.output_dir);
    let fetcher = KubectlFetcher::new(FetchSettings {
        kubectl: cli.kubectl.clone(),
        timeout: Duration::from_secs(cli.kubectl_timeout_secs),
    });
    let resolver = GcloudContextResolver::new(ToolSettings {
        gcloud: cli.gcloud.clone(),
        kubectl: cli.kubectl.clone(),
        ..ToolSettings::default()
    });
    let engine = ExtractionEngine::new(layout, fetcher, resolver);

    engine_info!(
        "Starting extraction for {}/{}: {} (configs in {:?})",
        cli.environment,
        cli.cluster,
        cli.groups.join(", "),
        engine.layout().config_dir
    );

    let mut outputs = Vec::with_capacity(cli.groups.len());
    for group in &cli.groups {
        let report = engine
            .run(&cli.environment, &cli.cluster, group)
            .with_context(|| format!("extracting '{group}' resources"))?;
        if !report.missing.is_empty() {
            let missing: Vec<String> = report
                .missing
                .iter()
                .map(|(kind, name)| format!("{kind}/{name}"))
                .collect();
            engine_warn!("{}: not extracted: {}", group, missing.join(", "));
        }
        outputs.push(report.output_path);
    }

    for path in &outputs {
        engine_info!("Generated {:?}", path);
    }
    Ok(outputs)
}
