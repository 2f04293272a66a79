//! Candidate selection for scrims.
//!
//! Strategies are pure functions over a candidate pool: they filter and
//! order candidates against a scrim's requirements and never mutate
//! anything. The [`Matchmaker`] holds the active strategy, validates its
//! inputs, and caps the result at the scrim's capacity.
//!
//! # Components
//!
//! - **`strategy`**: `SelectionStrategy` trait, rank-proximity and latency strategies
//! - **`scorer`**: Reliability scoring and the balance-aware reliability strategy
//! - **`matchmaker`**: Strategy context with hot swap

pub mod matchmaker;
pub mod scorer;
pub mod strategy;

pub use matchmaker::{Matchmaker, strategy_for};
pub use scorer::{ByReliability, ReliabilityWeights, rank_variance, reliability_score};
pub use strategy::{ByLatency, ByRankProximity, Requirements, SelectionStrategy};
