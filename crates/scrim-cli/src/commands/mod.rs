pub mod admission;
pub mod roles;
pub mod scrim;
pub mod setup;

use std::path::Path;

use anyhow::Context;
use scrim_core::ScrimConfig;
use scrim_engine::ScrimService;
use scrim_state::StateStore;
use tracing::debug;

/// Opened store plus the service running on top of it.
pub struct App {
    pub service: ScrimService,
    pub store: StateStore,
}

impl App {
    pub fn open(config: ScrimConfig, db: Option<&Path>) -> anyhow::Result<Self> {
        let path = match db {
            Some(path) => path.to_path_buf(),
            None => Path::new(&config.store.path).to_path_buf(),
        };
        let store = StateStore::open(&path)
            .with_context(|| format!("opening database {}", path.display()))?;
        debug!(path = %path.display(), "database opened");
        let service = ScrimService::with_state_store(store.clone(), config);
        Ok(Self { service, store })
    }
}

/// Read the config file, or fall back to defaults when it does not exist.
pub fn load_config(path: &Path) -> anyhow::Result<ScrimConfig> {
    if !path.is_file() {
        return Ok(ScrimConfig::default());
    }
    ScrimConfig::from_file(path).with_context(|| format!("reading {}", path.display()))
}
