#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use pretty_assertions::assert_eq;
use snapshot_engine::{
    ClusterContext, ClusterTarget, ContextError, ContextResolver, GcloudContextResolver,
    ToolSettings,
};
use tempfile::TempDir;

// Writing an executable while another test thread forks can leave the file
// busy at exec time, so these tests run one at a time.
static SERIAL: Mutex<()> = Mutex::new(());

const FAKE_KUBECTL: &str = r#"#!/bin/sh
DIR=$(dirname "$0")
echo "kubectl $*" >> "$DIR/calls.log"
case "$1 $2" in
  "version --client") exit 0 ;;
  "config current-context")
    if [ -s "$DIR/current" ]; then cat "$DIR/current"; else echo "error: current-context is not set" >&2; exit 1; fi ;;
  "config use-context") printf '%s\n' "$3" > "$DIR/current" ;;
esac
"#;

const FAKE_GCLOUD: &str = r#"#!/bin/sh
DIR=$(dirname "$0")
echo "gcloud $*" >> "$DIR/calls.log"
if [ "$1" = "--version" ]; then exit 0; fi
case "$3" in
  list)
    if [ -f "$DIR/list-fails" ]; then echo "permission denied" >&2; exit 1; fi
    printf 'alto-eu-gke\nproj-sa-eu-gke\n' ;;
  get-credentials) printf 'gke_%s_%s_%s\n' "$6" "$8" "$4" > "$DIR/current" ;;
esac
"#;

/// `gcloud` and `kubectl` stand-ins that share a fake kubeconfig and log
/// every invocation.
struct FakeTools {
    temp: TempDir,
    _serial: MutexGuard<'static, ()>,
}

impl FakeTools {
    fn new() -> Self {
        let serial = SERIAL.lock().unwrap_or_else(PoisonError::into_inner);
        let temp = TempDir::new().unwrap();
        write_script(&temp.path().join("kubectl"), FAKE_KUBECTL);
        write_script(&temp.path().join("gcloud"), FAKE_GCLOUD);
        Self {
            temp,
            _serial: serial,
        }
    }

    fn tool(&self, name: &str) -> String {
        self.temp.path().join(name).to_string_lossy().into_owned()
    }

    fn settings(&self) -> ToolSettings {
        ToolSettings {
            gcloud: self.tool("gcloud"),
            kubectl: self.tool("kubectl"),
            timeout: Duration::from_secs(10),
        }
    }

    fn set_current(&self, context: &str) {
        fs::write(self.temp.path().join("current"), format!("{context}\n")).unwrap();
    }

    fn current(&self) -> String {
        fs::read_to_string(self.temp.path().join("current"))
            .unwrap()
            .trim()
            .to_string()
    }

    fn fail_listing(&self) {
        fs::write(self.temp.path().join("list-fails"), "").unwrap();
    }

    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.temp.path().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

fn write_script(path: &Path, body: &str) {
    fs::write(path, body).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

fn patterns(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn target<'a>(name_patterns: &'a [String]) -> ClusterTarget<'a> {
    ClusterTarget {
        project_id: "proj",
        region: "us-central1",
        alias: "rai",
        name_patterns,
    }
}

#[test]
fn resolves_context_and_restores_the_previous_one() {
    let tools = FakeTools::new();
    tools.set_current("gke_other_ctx");
    let resolver = GcloudContextResolver::new(tools.settings());
    let wanted = patterns(&["-sa-", "gke"]);

    let context = resolver.resolve(&target(&wanted)).unwrap();

    assert_eq!(
        context,
        ClusterContext {
            cluster_name: "proj-sa-eu-gke".to_string(),
            context_name: "gke_proj_us-central1_proj-sa-eu-gke".to_string(),
        }
    );
    assert_eq!(tools.current(), "gke_other_ctx");
    assert_eq!(
        tools.calls(),
        vec![
            "kubectl version --client",
            "gcloud --version",
            "gcloud container clusters list --project proj --format value(name)",
            "kubectl config current-context",
            "gcloud container clusters get-credentials proj-sa-eu-gke --project proj --region us-central1",
            "kubectl config current-context",
            "kubectl config use-context gke_other_ctx",
        ]
    );
}

#[test]
fn fresh_kubeconfig_has_nothing_to_restore() {
    let tools = FakeTools::new();
    let resolver = GcloudContextResolver::new(tools.settings());
    let wanted = patterns(&["alto-", "gke"]);

    let context = resolver.resolve(&target(&wanted)).unwrap();

    assert_eq!(context.cluster_name, "alto-eu-gke");
    assert_eq!(context.context_name, "gke_proj_us-central1_alto-eu-gke");
    assert_eq!(tools.current(), "gke_proj_us-central1_alto-eu-gke");
    assert!(!tools.calls().iter().any(|call| call.contains("use-context")));
}

#[test]
fn current_context_already_on_the_cluster_is_left_alone() {
    let tools = FakeTools::new();
    tools.set_current("gke_proj_us-central1_proj-sa-eu-gke");
    let resolver = GcloudContextResolver::new(tools.settings());
    let wanted = patterns(&["-sa-", "gke"]);

    resolver.resolve(&target(&wanted)).unwrap();

    assert!(!tools.calls().iter().any(|call| call.contains("use-context")));
}

#[test]
fn failing_listing_reports_the_command_and_stderr() {
    let tools = FakeTools::new();
    tools.fail_listing();
    let resolver = GcloudContextResolver::new(tools.settings());
    let wanted = patterns(&["-sa-", "gke"]);

    let err = resolver.resolve(&target(&wanted)).unwrap_err();

    match err {
        ContextError::CommandFailed { command, stderr } => {
            assert!(command.ends_with("container clusters list --project proj --format value(name)"));
            assert_eq!(stderr, "permission denied");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!tools.calls().iter().any(|call| call.contains("get-credentials")));
}

#[test]
fn unmatched_patterns_are_cluster_not_found() {
    let tools = FakeTools::new();
    let resolver = GcloudContextResolver::new(tools.settings());
    let wanted = patterns(&["missing"]);

    let err = resolver.resolve(&target(&wanted)).unwrap_err();

    assert!(matches!(
        err,
        ContextError::ClusterNotFound { ref alias, ref project } if alias == "rai" && project == "proj"
    ));
}

#[test]
fn absent_tools_fail_the_check() {
    let tools = FakeTools::new();
    let missing: PathBuf = tools.temp.path().join("no-such-gcloud");
    let resolver = GcloudContextResolver::new(ToolSettings {
        gcloud: missing.to_string_lossy().into_owned(),
        ..tools.settings()
    });
    let wanted = patterns(&["-sa-", "gke"]);

    let err = resolver.resolve(&target(&wanted)).unwrap_err();

    assert!(matches!(err, ContextError::ToolMissing(ref tool) if Path::new(tool) == missing));
    assert_eq!(tools.calls(), vec!["kubectl version --client"]);
}
