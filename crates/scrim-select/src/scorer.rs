//! Reliability scoring for candidate selection.
//!
//! Each candidate gets a composite score from its history:
//! - **Fair play**: share of matches without conduct reports
//! - **Commitment**: one minus the share of abandoned matches
//!
//! Candidates are picked greedily, best score first. Among equal scores the
//! pick that keeps the group balanced wins:
//! 1. a candidate whose preferred role is not yet covered beats one that
//!    duplicates it
//! 2. then one who would fill a still-open role of the format
//! 3. then the one that adds the least variance to the selected group's ranks

use std::cmp::Ordering;

use tracing::trace;

use scrim_core::config::SelectionConfig;
use scrim_core::{Candidate, StrategyKind};

use crate::strategy::{Requirements, SelectionStrategy};

/// Scores closer than this are treated as equal.
const SCORE_EPSILON: f64 = 1e-9;

/// Weights for the reliability components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReliabilityWeights {
    pub fair_play: f64,
    pub commitment: f64,
}

impl Default for ReliabilityWeights {
    fn default() -> Self {
        Self::from(&SelectionConfig::default())
    }
}

impl From<&SelectionConfig> for ReliabilityWeights {
    fn from(config: &SelectionConfig) -> Self {
        Self {
            fair_play: config.fair_play_weight,
            commitment: config.abandonment_weight,
        }
    }
}

/// Composite reliability score (higher = more reliable).
pub fn reliability_score(candidate: &Candidate, weights: &ReliabilityWeights) -> f64 {
    let fair_play = candidate.fair_play_rate.clamp(0.0, 1.0);
    let commitment = 1.0 - candidate.abandon_rate.clamp(0.0, 1.0);
    weights.fair_play * fair_play + weights.commitment * commitment
}

/// Population variance of a set of ranks. Zero for fewer than two ranks.
pub fn rank_variance(ranks: &[u32]) -> f64 {
    if ranks.len() < 2 {
        return 0.0;
    }
    let n = ranks.len() as f64;
    let mean = ranks.iter().map(|r| f64::from(*r)).sum::<f64>() / n;
    ranks
        .iter()
        .map(|r| (f64::from(*r) - mean).powi(2))
        .sum::<f64>()
        / n
}

/// Most reliable candidates first, balance-aware tie-breaks.
#[derive(Debug, Clone, Default)]
pub struct ByReliability {
    pub weights: ReliabilityWeights,
}

impl ByReliability {
    pub fn new(weights: ReliabilityWeights) -> Self {
        Self { weights }
    }

    /// Tie-break key for adding `candidate` to the current selection.
    fn balance_key(
        &self,
        candidate: &Candidate,
        selected: &[&Candidate],
        req: &Requirements,
    ) -> BalanceKey {
        let duplicates_role = candidate.preferred_role.as_ref().is_some_and(|role| {
            selected
                .iter()
                .any(|s| s.preferred_role.as_ref() == Some(role))
        });
        let fills_open_role = !duplicates_role
            && candidate
                .preferred_role
                .as_ref()
                .is_some_and(|role| req.roles.contains(role));
        let mut ranks: Vec<u32> = selected.iter().map(|s| s.rank).collect();
        ranks.push(candidate.rank);
        BalanceKey {
            duplicates_role,
            misses_open_role: !fills_open_role,
            variance: rank_variance(&ranks),
        }
    }
}

impl SelectionStrategy for ByReliability {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Reliability
    }

    fn select(&self, candidates: &[Candidate], req: &Requirements) -> Vec<Candidate> {
        let mut remaining: Vec<(usize, f64)> = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| (i, reliability_score(c, &self.weights)))
            .collect();
        let mut selected: Vec<&Candidate> = Vec::with_capacity(candidates.len());

        while !remaining.is_empty() {
            let best = remaining
                .iter()
                .map(|(_, score)| *score)
                .fold(f64::NEG_INFINITY, f64::max);

            let mut pick: Option<(usize, BalanceKey)> = None;
            for (pos, (index, score)) in remaining.iter().enumerate() {
                if best - score > SCORE_EPSILON {
                    continue;
                }
                let key = self.balance_key(&candidates[*index], &selected, req);
                let better = match &pick {
                    None => true,
                    // Strictly better only, so earlier input wins exact ties.
                    Some((_, current)) => key.cmp_balance(current) == Ordering::Less,
                };
                if better {
                    pick = Some((pos, key));
                }
            }

            let Some((pos, key)) = pick else {
                break;
            };
            let (index, score) = remaining.remove(pos);
            trace!(
                candidate = %candidates[index].user_id,
                score,
                duplicates_role = key.duplicates_role,
                fills_role = !key.misses_open_role,
                variance = key.variance,
                "reliability pick"
            );
            selected.push(&candidates[index]);
        }

        selected.into_iter().cloned().collect()
    }
}

/// Lower sorts first on every field.
#[derive(Debug, Clone, Copy)]
struct BalanceKey {
    duplicates_role: bool,
    misses_open_role: bool,
    variance: f64,
}

impl BalanceKey {
    fn cmp_balance(&self, other: &Self) -> Ordering {
        self.duplicates_role
            .cmp(&other.duplicates_role)
            .then(self.misses_open_role.cmp(&other.misses_open_role))
            .then_with(|| self.variance.total_cmp(&other.variance))
    }
}
