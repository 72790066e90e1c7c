//! Backtracking enumeration of scenario completions.
//!
//! The search is an explicit frontier: a stack of choice points over a single
//! working [`FoodWeb`]. Each call to `next` resumes where the previous one
//! stopped, so the iterator can be paused, dropped or moved to another thread
//! at any point.
//!
//! # Branching
//! At each depth the consumer with the largest unmet in-degree deficit is
//! chosen (ties go to the lower index) and the search branches over every
//! legal edge into it. When no deficit is left it branches over every legal
//! edge. After every capacity of a `source→target` pair has been explored the
//! pair is excluded from the subtrees of its later siblings, so each edge set
//! is produced exactly once.
//!
//! # Capacity domain
//! An edge into `t` carries `1..=max_intake(t)`; for producer sources the
//! upper bound is reduced by what producers already deliver to `t`, since
//! producer edges always deliver in full. Capacities are stepped through one
//! at a time rather than materialized, so a wide intake band costs nothing
//! until the search actually reaches its larger values. Enumerating every
//! completion of such a band is still proportional to its width.

use crate::config::{SearchConfig, SimulationConfig};
use crate::error::Result;
use crate::metrics::Metrics;
use crate::simulator::FeedingSimulator;
use crate::validator::Validator;
use crate::web::{Edge, FoodWeb};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use trophic_data::{CandidateSolution, Energy, Scenario};

/// Cooperative cancellation flag, checked once per search step.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Search front end holding configuration shared by every enumeration.
#[derive(Debug, Clone, Default)]
pub struct Search {
    config: SearchConfig,
    validator: Validator<FeedingSimulator>,
    cancel: Option<CancellationToken>,
    metrics: Option<Arc<Metrics>>,
}

impl Search {
    #[must_use]
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_simulation(mut self, simulation: SimulationConfig) -> Self {
        self.validator = Validator::with_simulator(FeedingSimulator::new(simulation));
        self
    }

    #[must_use]
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Lazily enumerates completions of `scenario`, at most `limit` of them.
    ///
    /// Fails only if the scenario's fixed edges already break an invariant;
    /// an unsolvable scenario yields an empty sequence.
    pub fn enumerate(&self, scenario: &Scenario, limit: Option<usize>) -> Result<Solutions> {
        let web = FoodWeb::from_scenario(scenario)?;
        let limit = limit.or(self.config.default_limit);
        tracing::debug!(
            species = web.len(),
            fixed = web.edge_count(),
            required = scenario.required_edge_count,
            ?limit,
            "Search started"
        );
        Ok(Solutions::start(
            web,
            scenario.required_edge_count,
            limit,
            self.config.validate_leaves,
            self.validator.clone(),
            self.cancel.clone(),
            self.metrics.clone(),
        ))
    }

    /// Enumerates with the first choice point split across worker threads.
    ///
    /// Each root branch owns an independent copy of the working web. Results
    /// come back in the same order as [`Search::enumerate`] would produce them.
    pub fn enumerate_parallel(
        &self,
        scenario: &Scenario,
        limit: Option<usize>,
    ) -> Result<Vec<CandidateSolution>> {
        let root = self.enumerate(scenario, limit)?;
        let limit = root.limit;
        let Some(branch_count) = root.root_branch_count() else {
            return Ok(root.collect());
        };

        #[cfg(feature = "rayon")]
        let per_branch: Vec<Vec<CandidateSolution>> = {
            use rayon::prelude::*;
            (0..branch_count)
                .into_par_iter()
                .map(|i| root.branch(i).collect())
                .collect()
        };
        #[cfg(not(feature = "rayon"))]
        let per_branch: Vec<Vec<CandidateSolution>> = (0..branch_count)
            .map(|i| root.branch(i).collect())
            .collect();

        let mut merged: Vec<CandidateSolution> = per_branch.into_iter().flatten().collect();
        if let Some(limit) = limit {
            merged.truncate(limit);
        }
        Ok(merged)
    }
}

/// Lazily enumerates completions with the default configuration.
pub fn enumerate(scenario: &Scenario, limit: Option<usize>) -> Result<Solutions> {
    Search::default().enumerate(scenario, limit)
}

/// A legal `source→target` pair and the largest capacity to try on it.
#[derive(Debug, Clone, Copy)]
struct Choice {
    source: usize,
    target: usize,
    ceiling: Energy,
}

#[derive(Debug, Clone)]
struct Frame {
    choices: Vec<Choice>,
    /// Index of the pair being stepped through.
    current: usize,
    /// Capacity last applied on the current pair; 0 before the first.
    capacity: Energy,
    applied: bool,
    exclusion_mark: usize,
}

impl Frame {
    fn new(choices: Vec<Choice>, exclusion_mark: usize) -> Self {
        Self {
            choices,
            current: 0,
            capacity: 0,
            applied: false,
            exclusion_mark,
        }
    }

    /// Pair whose capacities are all explored, if the cursor sits on one.
    fn exhausted_pair(&self) -> Option<(usize, usize)> {
        self.choices
            .get(self.current)
            .filter(|c| self.capacity >= c.ceiling)
            .map(|c| (c.source, c.target))
    }

    /// Steps to the next edge, moving past an exhausted pair first.
    fn advance(&mut self) -> Option<Edge> {
        if self.exhausted_pair().is_some() {
            self.current += 1;
            self.capacity = 0;
        }
        let choice = self.choices.get(self.current)?;
        self.capacity += 1;
        Some(Edge {
            source: choice.source,
            target: choice.target,
            capacity: self.capacity,
        })
    }
}

/// Resumable search state. Yields frozen [`CandidateSolution`] snapshots.
#[derive(Debug, Clone)]
pub struct Solutions {
    web: FoodWeb,
    /// Edge-stack height of the fixed edges; everything above is candidate.
    base: usize,
    required: usize,
    limit: Option<usize>,
    validate_leaves: bool,
    validator: Validator<FeedingSimulator>,
    cancel: Option<CancellationToken>,
    metrics: Option<Arc<Metrics>>,
    stack: Vec<Frame>,
    excluded: HashSet<(usize, usize)>,
    exclusion_log: Vec<(usize, usize)>,
    pending_leaf: bool,
    yielded: usize,
    explored: u64,
    done: bool,
}

impl Solutions {
    fn start(
        web: FoodWeb,
        required: usize,
        limit: Option<usize>,
        validate_leaves: bool,
        validator: Validator<FeedingSimulator>,
        cancel: Option<CancellationToken>,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        let base = web.edge_count();
        let mut solutions = Self {
            web,
            base,
            required,
            limit,
            validate_leaves,
            validator,
            cancel,
            metrics,
            stack: Vec::new(),
            excluded: HashSet::new(),
            exclusion_log: Vec::new(),
            pending_leaf: false,
            yielded: 0,
            explored: 0,
            done: false,
        };
        if !solutions.feasible() {
            solutions.done = true;
        } else if required == 0 {
            solutions.pending_leaf = true;
        } else {
            solutions.push_frame();
        }
        solutions
    }

    /// Number of candidate edges placed so far.
    fn placed(&self) -> usize {
        self.web.edge_count() - self.base
    }

    /// Choice count of the untouched root frame, if the search is still at the root.
    fn root_branch_count(&self) -> Option<usize> {
        match self.stack.as_slice() {
            [root] if root.current == 0 && root.capacity == 0 && !self.done => {
                Some(root.choices.len())
            }
            _ => None,
        }
    }

    /// Subtree of the `i`-th root pair, with earlier sibling pairs excluded.
    fn branch(&self, i: usize) -> Solutions {
        let mut sub = self.clone();
        let root = &self.stack[0];
        for earlier in &root.choices[..i] {
            let pair = (earlier.source, earlier.target);
            sub.excluded.insert(pair);
            sub.exclusion_log.push(pair);
        }
        let mark = sub.exclusion_log.len();
        sub.stack = vec![Frame::new(vec![root.choices[i]], mark)];
        sub
    }

    fn push_frame(&mut self) {
        let choices = self.choices();
        if choices.is_empty() {
            return;
        }
        let mark = self.exclusion_log.len();
        self.stack.push(Frame::new(choices, mark));
    }

    /// Legal, non-excluded pairs at the current choice point.
    fn choices(&self) -> Vec<Choice> {
        let n = self.web.len();
        let constrained = (0..n)
            .filter(|&i| self.web.in_deficit(i) > 0)
            .max_by(|&a, &b| {
                self.web
                    .in_deficit(a)
                    .cmp(&self.web.in_deficit(b))
                    .then(b.cmp(&a))
            });

        let mut out = Vec::new();
        match constrained {
            Some(target) => {
                for source in 0..n {
                    self.push_legal(source, target, &mut out);
                }
            }
            None => {
                for target in 0..n {
                    for source in 0..n {
                        self.push_legal(source, target, &mut out);
                    }
                }
            }
        }
        out
    }

    fn push_legal(&self, source: usize, target: usize, out: &mut Vec<Choice>) {
        if !self.usable(source, target) {
            return;
        }
        out.push(Choice {
            source,
            target,
            ceiling: self.capacity_ceiling(source, target),
        });
    }

    /// Pair is structurally legal, not excluded and has a capacity to try.
    fn usable(&self, source: usize, target: usize) -> bool {
        self.web.check_edge(source, target).is_ok()
            && !self.excluded.contains(&(source, target))
            && self.capacity_ceiling(source, target) > 0
    }

    fn capacity_ceiling(&self, source: usize, target: usize) -> Energy {
        let max = self.web.node(target).max_intake;
        if self.web.node(source).is_producer() {
            max.saturating_sub(self.web.producer_inflow(target))
        } else {
            max
        }
    }

    /// Forward check: `false` when no completion of the current state can exist.
    fn feasible(&self) -> bool {
        let remaining = self.required.saturating_sub(self.placed());
        let n = self.web.len();

        let total_deficit: usize = (0..n).map(|i| self.web.in_deficit(i) as usize).sum();
        if total_deficit > remaining {
            return false;
        }

        for t in 0..n {
            let species = self.web.node(t);
            if species.is_producer() {
                continue;
            }
            if self.web.producer_inflow(t) > species.max_intake {
                return false;
            }
            let open_slots = (self.web.remaining_in(t) as usize).min(remaining) as Energy;
            let reachable = self
                .web
                .in_capacity(t)
                .saturating_add(open_slots.saturating_mul(species.max_intake));
            if reachable < species.min_intake {
                return false;
            }
            let deficit = self.web.in_deficit(t);
            if deficit > 0 {
                let sources = (0..n).filter(|&s| self.usable(s, t)).count();
                if sources < deficit as usize {
                    return false;
                }
            }
        }
        true
    }

    /// Snapshot of the current full assignment, if it passes the leaf filter.
    fn leaf(&self) -> Option<CandidateSolution> {
        if self.validate_leaves {
            if let Some(metrics) = &self.metrics {
                metrics.record_simulation();
            }
            if !self.validator.validate_web(&self.web).valid {
                tracing::trace!(explored = self.explored, "Leaf rejected by validation");
                return None;
            }
        }
        Some(CandidateSolution::new(self.web.feeding_edges_from(self.base)).sorted())
    }

    fn finish(&mut self) {
        if self.done {
            return;
        }
        self.done = true;
        self.stack.clear();
        tracing::debug!(
            explored = self.explored,
            yielded = self.yielded,
            "Search finished"
        );
        if let Some(metrics) = &self.metrics {
            metrics.record_search(self.explored, self.yielded as u64);
        }
    }

    fn limit_reached(&self) -> bool {
        self.limit.is_some_and(|l| self.yielded >= l)
    }

    fn unwind_exclusions(&mut self, mark: usize) {
        for pair in self.exclusion_log.drain(mark..) {
            self.excluded.remove(&pair);
        }
    }
}

impl Iterator for Solutions {
    type Item = CandidateSolution;

    fn next(&mut self) -> Option<CandidateSolution> {
        loop {
            if self.done {
                return None;
            }
            if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
                || self.limit_reached()
            {
                self.finish();
                return None;
            }

            // a pending leaf only exists when there is no frame to resume
            if self.pending_leaf {
                self.pending_leaf = false;
                let leaf = self.leaf();
                if leaf.is_some() {
                    self.yielded += 1;
                }
                self.finish();
                return leaf;
            }

            if self.stack.is_empty() {
                self.finish();
                return None;
            }
            let last = self.stack.len() - 1;
            let frame = &mut self.stack[last];

            if frame.applied {
                frame.applied = false;
                self.web.pop_edge();
            }
            if let Some(pair) = frame.exhausted_pair() {
                self.excluded.insert(pair);
                self.exclusion_log.push(pair);
            }

            let Some(edge) = frame.advance() else {
                let mark = frame.exclusion_mark;
                self.stack.pop();
                self.unwind_exclusions(mark);
                continue;
            };
            frame.applied = true;
            self.web.push_unchecked(edge);
            self.explored += 1;

            if !self.feasible() {
                continue;
            }
            if self.placed() == self.required {
                if let Some(candidate) = self.leaf() {
                    self.yielded += 1;
                    if self.limit_reached() {
                        self.finish();
                    }
                    return Some(candidate);
                }
                continue;
            }
            self.push_frame();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trophic_data::{FeedingEdge, Species};

    fn two_consumers() -> Scenario {
        Scenario {
            nodes: vec![
                Species::producer("P", 2),
                Species::consumer("C1", 1, (1, 3), 0, 1),
                Species::consumer("C2", 1, (1, 3), 0, 1),
            ],
            fixed_edges: vec![],
            required_edge_count: 2,
            seed: 0,
        }
    }

    #[test]
    fn test_first_solution_is_minimal_capacities() {
        let first = enumerate(&two_consumers(), Some(1)).unwrap().next().unwrap();
        assert_eq!(
            first.edges,
            vec![FeedingEdge::new("P", "C1", 1), FeedingEdge::new("P", "C2", 1)]
        );
    }

    #[test]
    fn test_all_capacity_combinations_enumerated_once() {
        let all: Vec<_> = enumerate(&two_consumers(), None).unwrap().collect();
        // both consumers pick a capacity in 1..=3
        assert_eq!(all.len(), 9);
        let unique: HashSet<_> = all.iter().cloned().collect();
        assert_eq!(unique.len(), 9);
    }

    #[test]
    fn test_limit_respected() {
        assert_eq!(enumerate(&two_consumers(), Some(4)).unwrap().count(), 4);
        assert_eq!(enumerate(&two_consumers(), Some(0)).unwrap().count(), 0);
    }

    #[test]
    fn test_no_required_edges_yields_empty_candidate_once() {
        let mut s = two_consumers();
        s.fixed_edges = vec![FeedingEdge::new("P", "C1", 2), FeedingEdge::new("P", "C2", 2)];
        s.required_edge_count = 0;
        let all: Vec<_> = enumerate(&s, None).unwrap().collect();
        assert_eq!(all, vec![CandidateSolution::default()]);
    }

    #[test]
    fn test_unsolvable_is_empty_not_error() {
        let mut s = two_consumers();
        s.nodes[0].max_out_degree = 1;
        assert_eq!(enumerate(&s, None).unwrap().count(), 0);
    }

    #[test]
    fn test_infeasible_fixed_edges_rejected() {
        let mut s = two_consumers();
        s.fixed_edges = vec![FeedingEdge::new("C1", "C2", 1)];
        assert!(matches!(
            enumerate(&s, None),
            Err(crate::error::TrophicError::InfeasibleScenario(_))
        ));
    }

    #[test]
    fn test_cancellation_stops_iteration() {
        let token = CancellationToken::new();
        let mut it = Search::default()
            .with_cancel(token.clone())
            .enumerate(&two_consumers(), None)
            .unwrap();
        assert!(it.next().is_some());
        token.cancel();
        assert!(it.next().is_none());
        assert!(it.next().is_none());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential: Vec<_> = enumerate(&two_consumers(), None).unwrap().collect();
        let parallel = Search::default()
            .enumerate_parallel(&two_consumers(), None)
            .unwrap();
        assert_eq!(sequential, parallel);

        let limited = Search::default()
            .enumerate_parallel(&two_consumers(), Some(5))
            .unwrap();
        assert_eq!(limited, sequential[..5].to_vec());
    }

    /// P feeds H, H forwards to K. K is starved whenever H receives less
    /// than K needs, which no structural check can see.
    fn relay() -> Scenario {
        Scenario {
            nodes: vec![
                Species::producer("P", 1),
                Species::consumer("H", 1, (1, 3), 1, 1),
                Species::consumer("K", 2, (2, 3), 0, 1),
            ],
            fixed_edges: vec![],
            required_edge_count: 2,
            seed: 0,
        }
    }

    #[test]
    fn test_leaf_validation_drops_starved_completions() {
        let unchecked = Search::new(SearchConfig {
            validate_leaves: false,
            ..Default::default()
        });
        let all: Vec<_> = unchecked.enumerate(&relay(), None).unwrap().collect();
        let validated: Vec<_> = enumerate(&relay(), None).unwrap().collect();

        // H→K needs capacity 2 or 3 to pass the forward check; P→H is free
        assert_eq!(all.len(), 6);
        assert_eq!(validated.len(), 4);
        assert!(validated.iter().all(|c| all.contains(c)));

        let starved = CandidateSolution::new(vec![
            FeedingEdge::new("P", "H", 1),
            FeedingEdge::new("H", "K", 2),
        ])
        .sorted();
        assert!(all.contains(&starved));
        assert!(!validated.contains(&starved));
    }

    #[test]
    fn test_wide_intake_band_is_stepped_lazily() {
        let mut s = two_consumers();
        s.nodes[1].max_intake = u64::MAX;
        s.nodes[1].max_in_degree = 2;

        let first: Vec<_> = enumerate(&s, Some(1)).unwrap().collect();
        assert_eq!(
            first,
            vec![CandidateSolution::new(vec![
                FeedingEdge::new("P", "C1", 1),
                FeedingEdge::new("P", "C2", 1),
            ])]
        );

        let parallel = Search::default().enumerate_parallel(&s, Some(3)).unwrap();
        let sequential: Vec<_> = enumerate(&s, Some(3)).unwrap().collect();
        assert_eq!(parallel, sequential);
        assert_eq!(sequential[2].edges[1], FeedingEdge::new("P", "C2", 3));
    }

    #[test]
    fn test_metrics_recorded_on_finish() {
        let metrics = Arc::new(Metrics::new());
        let count = Search::default()
            .with_metrics(metrics.clone())
            .enumerate(&two_consumers(), None)
            .unwrap()
            .count();
        let snap = metrics.snapshot();
        assert_eq!(snap.solutions_yielded, count as u64);
        assert!(snap.nodes_explored >= count as u64);
    }
}
