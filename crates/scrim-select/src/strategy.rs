//! Selection strategies: rank proximity and latency.

use scrim_core::{Candidate, RankRange, Scrim, StrategyKind};

/// What a scrim asks of its candidates.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Requirements {
    pub rank: RankRange,
    pub max_latency_ms: u32,
    /// Number of open slots to fill.
    pub capacity: u32,
    /// Role labels of the format; reliability ties favor players who fill one.
    pub roles: Vec<String>,
}

impl Requirements {
    /// Requirements for filling the remaining slots of `scrim`.
    pub fn from_scrim(scrim: &Scrim) -> Self {
        Self {
            rank: scrim.constraints.rank,
            max_latency_ms: scrim.constraints.max_latency_ms,
            capacity: scrim.capacity().saturating_sub(scrim.accepted_count()),
            roles: scrim.format.roles.clone(),
        }
    }
}

/// A pluggable candidate-ordering algorithm.
///
/// Implementations must be pure: same inputs, same output, no side effects.
/// They may return more candidates than `req.capacity`; the caller truncates.
pub trait SelectionStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn select(&self, candidates: &[Candidate], req: &Requirements) -> Vec<Candidate>;
}

/// Candidates inside the rank window, closest to its midpoint first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByRankProximity;

impl SelectionStrategy for ByRankProximity {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RankProximity
    }

    fn select(&self, candidates: &[Candidate], req: &Requirements) -> Vec<Candidate> {
        let mut eligible: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| req.rank.contains(c.rank))
            .collect();
        // `sort_by` is stable, so equal distances keep input order.
        eligible.sort_by(|a, b| {
            req.rank
                .distance_from_midpoint(a.rank)
                .total_cmp(&req.rank.distance_from_midpoint(b.rank))
        });
        eligible.into_iter().cloned().collect()
    }
}

/// Candidates under the latency cap, lowest latency first.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByLatency;

impl SelectionStrategy for ByLatency {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Latency
    }

    fn select(&self, candidates: &[Candidate], req: &Requirements) -> Vec<Candidate> {
        let mut eligible: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| c.latency_ms <= req.max_latency_ms)
            .collect();
        eligible.sort_by_key(|c| c.latency_ms);
        eligible.into_iter().cloned().collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_candidate(id: &str, rank: u32, latency_ms: u32) -> Candidate {
        Candidate {
            user_id: id.to_string(),
            rank,
            latency_ms,
            fair_play_rate: 1.0,
            abandon_rate: 0.0,
            preferred_role: None,
        }
    }

    pub(crate) fn default_req(capacity: u32) -> Requirements {
        Requirements {
            rank: RankRange::new(10, 20),
            max_latency_ms: 50,
            capacity,
            roles: Vec::new(),
        }
    }

    fn ids(selection: &[Candidate]) -> Vec<&str> {
        selection.iter().map(|c| c.user_id.as_str()).collect()
    }

    #[test]
    fn rank_proximity_filters_and_orders_by_midpoint_distance() {
        let pool = vec![
            make_candidate("low", 10, 10),
            make_candidate("out", 25, 10),
            make_candidate("mid", 15, 10),
            make_candidate("near", 17, 10),
            make_candidate("under", 9, 10),
        ];

        let selection = ByRankProximity.select(&pool, &default_req(5));
        assert_eq!(ids(&selection), vec!["mid", "near", "low"]);
    }

    #[test]
    fn rank_proximity_ties_keep_input_order() {
        let pool = vec![
            make_candidate("above", 17, 10),
            make_candidate("below", 13, 10),
            make_candidate("above-2", 17, 10),
        ];

        let selection = ByRankProximity.select(&pool, &default_req(5));
        assert_eq!(ids(&selection), vec!["above", "below", "above-2"]);
    }

    #[test]
    fn latency_filters_and_orders_ascending() {
        let pool = vec![
            make_candidate("slow", 15, 50),
            make_candidate("too-slow", 15, 51),
            make_candidate("fast", 15, 5),
            make_candidate("fast-2", 15, 5),
            make_candidate("medium", 15, 20),
        ];

        let selection = ByLatency.select(&pool, &default_req(5));
        assert_eq!(ids(&selection), vec!["fast", "fast-2", "medium", "slow"]);
    }

    #[test]
    fn strategies_are_pure() {
        let pool = vec![make_candidate("a", 12, 30), make_candidate("b", 15, 10)];
        let req = default_req(2);
        let before = pool.clone();

        let first = ByLatency.select(&pool, &req);
        let second = ByLatency.select(&pool, &req);

        assert_eq!(first, second);
        assert_eq!(pool, before);
    }
}
