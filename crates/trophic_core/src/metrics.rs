//! Counters and structured logging for the puzzle engine.
//!
//! Components log through `tracing`; nothing here is required for correct
//! results. [`Metrics`] is an optional sink callers may share between calls.

use std::sync::atomic::{AtomicU64, Ordering};

/// Engine-wide counters. Safe to share across threads.
#[derive(Debug, Default)]
pub struct Metrics {
    scenarios_generated: AtomicU64,
    generation_attempts: AtomicU64,
    nodes_explored: AtomicU64,
    solutions_yielded: AtomicU64,
    simulations_run: AtomicU64,
}

/// Point-in-time copy of [`Metrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub scenarios_generated: u64,
    pub generation_attempts: u64,
    pub nodes_explored: u64,
    pub solutions_yielded: u64,
    pub simulations_run: u64,
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a finished generator call and how many attempts it took.
    pub fn record_generation(&self, attempts: usize, success: bool) {
        self.generation_attempts
            .fetch_add(attempts as u64, Ordering::Relaxed);
        if success {
            self.scenarios_generated.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records search effort: choice points expanded and solutions handed out.
    pub fn record_search(&self, nodes_explored: u64, solutions: u64) {
        self.nodes_explored
            .fetch_add(nodes_explored, Ordering::Relaxed);
        self.solutions_yielded.fetch_add(solutions, Ordering::Relaxed);
    }

    pub fn record_simulation(&self) {
        self.simulations_run.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            scenarios_generated: self.scenarios_generated.load(Ordering::Relaxed),
            generation_attempts: self.generation_attempts.load(Ordering::Relaxed),
            nodes_explored: self.nodes_explored.load(Ordering::Relaxed),
            solutions_yielded: self.solutions_yielded.load(Ordering::Relaxed),
            simulations_run: self.simulations_run.load(Ordering::Relaxed),
        }
    }

    /// Emits the current counters as one structured log line.
    pub fn log_summary(&self) {
        let s = self.snapshot();
        tracing::info!(
            scenarios = s.scenarios_generated,
            attempts = s.generation_attempts,
            explored = s.nodes_explored,
            solutions = s.solutions_yielded,
            simulations = s.simulations_run,
            "Puzzle engine summary"
        );
    }
}
