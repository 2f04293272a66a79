//! Matchmaker: the strategy context.
//!
//! Holds the active strategy and enforces the contract around it: empty
//! pools and zero capacity short-circuit without calling the strategy, and
//! the result never exceeds capacity.

use tracing::debug;

use scrim_core::config::SelectionConfig;
use scrim_core::{Candidate, StrategyKind};

use crate::scorer::{ByReliability, ReliabilityWeights};
use crate::strategy::{ByLatency, ByRankProximity, Requirements, SelectionStrategy};

/// Build the strategy for a stored identifier.
pub fn strategy_for(kind: StrategyKind, config: &SelectionConfig) -> Box<dyn SelectionStrategy> {
    match kind {
        StrategyKind::RankProximity => Box::new(ByRankProximity),
        StrategyKind::Latency => Box::new(ByLatency),
        StrategyKind::Reliability => Box::new(ByReliability::new(ReliabilityWeights::from(config))),
    }
}

pub struct Matchmaker {
    strategy: Box<dyn SelectionStrategy>,
}

impl Matchmaker {
    pub fn new(strategy: Box<dyn SelectionStrategy>) -> Self {
        Self { strategy }
    }

    pub fn for_kind(kind: StrategyKind, config: &SelectionConfig) -> Self {
        Self::new(strategy_for(kind, config))
    }

    pub fn kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    /// Replace the active strategy.
    pub fn set_strategy(&mut self, strategy: Box<dyn SelectionStrategy>) {
        debug!(from = %self.strategy.kind(), to = %strategy.kind(), "selection strategy swapped");
        self.strategy = strategy;
    }

    /// Run the active strategy and cap the result at `req.capacity`.
    pub fn select(&self, candidates: &[Candidate], req: &Requirements) -> Vec<Candidate> {
        if candidates.is_empty() || req.capacity == 0 {
            debug!(
                pool = candidates.len(),
                capacity = req.capacity,
                "nothing to select"
            );
            return Vec::new();
        }

        let mut selection = self.strategy.select(candidates, req);
        selection.truncate(req.capacity as usize);
        debug!(
            strategy = %self.strategy.kind(),
            pool = candidates.len(),
            selected = selection.len(),
            "candidates selected"
        );
        selection
    }
}

impl Default for Matchmaker {
    fn default() -> Self {
        Self::new(Box::new(ByRankProximity))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::strategy::tests::{default_req, make_candidate};

    /// Counts invocations and returns the pool unchanged.
    struct Counting(Arc<AtomicUsize>);

    impl SelectionStrategy for Counting {
        fn kind(&self) -> StrategyKind {
            StrategyKind::RankProximity
        }

        fn select(&self, candidates: &[Candidate], _req: &Requirements) -> Vec<Candidate> {
            self.0.fetch_add(1, Ordering::Relaxed);
            candidates.to_vec()
        }
    }

    #[test]
    fn truncates_to_capacity() {
        let pool: Vec<Candidate> = (0..6)
            .map(|i| make_candidate(&format!("p{i}"), 15, 10 + i))
            .collect();
        let matchmaker = Matchmaker::for_kind(StrategyKind::Latency, &SelectionConfig::default());

        let selection = matchmaker.select(&pool, &default_req(4));
        assert_eq!(selection.len(), 4);
        assert_eq!(selection[0].user_id, "p0");
    }

    #[test]
    fn short_result_is_not_padded() {
        let pool = vec![make_candidate("in", 15, 10), make_candidate("out", 99, 10)];
        let matchmaker = Matchmaker::default();

        assert_eq!(matchmaker.select(&pool, &default_req(5)).len(), 1);
    }

    #[test]
    fn empty_pool_or_zero_capacity_skips_strategy() {
        let calls = Arc::new(AtomicUsize::new(0));
        let matchmaker = Matchmaker::new(Box::new(Counting(calls.clone())));

        assert!(matchmaker.select(&[], &default_req(3)).is_empty());
        assert!(matchmaker
            .select(&[make_candidate("a", 15, 10)], &default_req(0))
            .is_empty());
        assert_eq!(calls.load(Ordering::Relaxed), 0);

        assert_eq!(matchmaker.select(&[make_candidate("a", 15, 10)], &default_req(1)).len(), 1);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn hot_swap_changes_ordering() {
        let pool = vec![make_candidate("near-mid", 15, 40), make_candidate("fast", 11, 5)];
        let mut matchmaker = Matchmaker::default();
        assert_eq!(matchmaker.kind(), StrategyKind::RankProximity);
        assert_eq!(matchmaker.select(&pool, &default_req(1))[0].user_id, "near-mid");

        matchmaker.set_strategy(strategy_for(StrategyKind::Latency, &SelectionConfig::default()));
        assert_eq!(matchmaker.kind(), StrategyKind::Latency);
        assert_eq!(matchmaker.select(&pool, &default_req(1))[0].user_id, "fast");
    }
}
