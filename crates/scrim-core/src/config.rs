//! scrim.toml configuration parser.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::roster::DEFAULT_HISTORY_LIMIT;
use crate::types::{AdmissionConstraints, GameFormat, RankRange, StrategyKind};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScrimConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub admission: AdmissionPolicy,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Depth of the role-assignment undo stack.
    pub history_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Where the boundary between automatic admission and organizer review lies.
///
/// Hard violations (rank outside the window, latency above the max) are
/// always rejected. Applications inside the bounds are accepted unless one
/// of the review rules below routes them to Pending.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AdmissionPolicy {
    /// Every in-bounds application waits for the organizer.
    pub manual_review: bool,
    /// In-bounds ranks this close to either edge go to review.
    pub rank_review_margin: u32,
    /// Latencies this close to the max go to review.
    pub latency_review_margin_ms: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    pub fair_play_weight: f64,
    pub abandonment_weight: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            fair_play_weight: 0.6,
            abandonment_weight: 0.4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "scrims.redb".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl ScrimConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ScrimConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Scaffold a scrim.toml pointing at the given database file.
    pub fn scaffold(store_path: &str) -> Self {
        ScrimConfig {
            store: StoreConfig {
                path: store_path.to_string(),
            },
            ..Default::default()
        }
    }
}

/// Everything needed to open a new scrim, as written in a definition file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrimDefinition {
    pub id: String,
    pub organizer_id: String,
    pub format: GameFormat,
    #[serde(default)]
    pub scheduled_at: u64,
    pub rank: RankRange,
    pub max_latency_ms: u32,
    #[serde(default)]
    pub strategy: StrategyKind,
}

impl ScrimDefinition {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let definition: ScrimDefinition = toml::from_str(&content)?;
        Ok(definition)
    }

    pub fn constraints(&self) -> AdmissionConstraints {
        AdmissionConstraints {
            rank: self.rank,
            max_latency_ms: self.max_latency_ms,
        }
    }
}
