use tracing::trace;

pub mod benchmark;
pub mod condensation;
pub mod kosaraju;
pub mod selector;
pub mod stress;
pub mod tarjan;

/// Lifecycle of one engine run.
///
/// A run starts `Initialized`, alternates between `Discovering` and
/// `Extracting` while components are found, and ends either `Finished` (the
/// result has been handed to the caller) or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EnginePhase {
    Initialized,
    Discovering,
    Extracting,
    Finished,
    Failed,
}

/// Records phase changes of one engine run.
#[derive(Debug)]
pub(crate) struct PhaseTracker {
    engine: &'static str,
    phase: EnginePhase,
}

impl PhaseTracker {
    pub(crate) fn new(engine: &'static str) -> Self {
        Self {
            engine,
            phase: EnginePhase::Initialized,
        }
    }

    pub(crate) fn advance(&mut self, next: EnginePhase) {
        if self.phase != next {
            trace!(engine = self.engine, from = ?self.phase, to = ?next, "phase change");
            self.phase = next;
        }
    }

    pub(crate) fn phase(&self) -> EnginePhase {
        self.phase
    }
}
