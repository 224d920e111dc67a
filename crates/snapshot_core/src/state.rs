use crate::manifest::NAMESPACES_KIND;

/// Lifecycle of one extraction run. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum RunPhase {
    #[default]
    Init,
    ConfigLoaded,
    ContextResolved,
    PerResourceLoop,
    Finalized,
}

impl RunPhase {
    pub fn next(self) -> Option<RunPhase> {
        match self {
            RunPhase::Init => Some(RunPhase::ConfigLoaded),
            RunPhase::ConfigLoaded => Some(RunPhase::ContextResolved),
            RunPhase::ContextResolved => Some(RunPhase::PerResourceLoop),
            RunPhase::PerResourceLoop => Some(RunPhase::Finalized),
            RunPhase::Finalized => None,
        }
    }
}

/// Progress of a run: phase, captured namespace and resource counts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunState {
    phase: RunPhase,
    namespace: Option<String>,
    attempted: usize,
    written: usize,
    missing: Vec<(String, String)>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Move to the next phase. Returns false, leaving the phase untouched,
    /// when `to` is not the immediate successor.
    pub fn advance(&mut self, to: RunPhase) -> bool {
        if self.phase.next() != Some(to) {
            return false;
        }
        self.phase = to;
        true
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Count an attempt at `kind`/`name`.
    ///
    /// The first name seen under the namespaces kind becomes the active
    /// namespace; later names under that kind leave it unchanged.
    pub fn begin_resource(&mut self, kind: &str, name: &str) -> usize {
        if kind == NAMESPACES_KIND && self.namespace.is_none() {
            self.namespace = Some(name.to_string());
        }
        self.attempted += 1;
        self.attempted
    }

    pub fn record_written(&mut self) {
        self.written += 1;
    }

    pub fn record_missing(&mut self, kind: &str, name: &str) {
        self.missing.push((kind.to_string(), name.to_string()));
    }

    pub fn attempted(&self) -> usize {
        self.attempted
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn missing(&self) -> &[(String, String)] {
        &self.missing
    }

    pub fn into_missing(self) -> Vec<(String, String)> {
        self.missing
    }
}
