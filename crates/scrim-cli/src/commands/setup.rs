use std::path::Path;

use anyhow::bail;
use scrim_core::{Candidate, ScrimConfig};

use super::App;

/// Write a default scrim.toml into `path`. Never overwrites.
pub fn init(path: &str) -> anyhow::Result<()> {
    let output = Path::new(path).join("scrim.toml");
    if output.exists() {
        bail!("{} already exists", output.display());
    }
    let config = ScrimConfig::scaffold("scrims.redb");
    std::fs::write(&output, config.to_toml_string()?)?;
    println!("✓ Generated {}", output.display());
    Ok(())
}

pub fn add_player(
    app: &App,
    id: &str,
    rank: u32,
    latency_ms: u32,
    fair_play_rate: f64,
    abandon_rate: f64,
    preferred_role: Option<String>,
) -> anyhow::Result<()> {
    if id.trim().is_empty() {
        bail!("player id is required");
    }
    for (name, rate) in [("fair-play", fair_play_rate), ("abandon", abandon_rate)] {
        if !(0.0..=1.0).contains(&rate) {
            bail!("{name} rate must be between 0 and 1, got {rate}");
        }
    }

    app.store.put_player(&Candidate {
        user_id: id.to_string(),
        rank,
        latency_ms,
        fair_play_rate,
        abandon_rate,
        preferred_role,
    })?;
    println!("✓ Player {id} saved");
    Ok(())
}

pub fn list_players(app: &App) -> anyhow::Result<()> {
    let players = app.store.list_players()?;
    if players.is_empty() {
        println!("No players.");
        return Ok(());
    }
    for p in players {
        println!("{}", format_candidate(&p));
    }
    Ok(())
}

pub fn format_candidate(c: &Candidate) -> String {
    format!(
        "{:<16} rank {:>4}  {:>4}ms  fair-play {:.2}  abandon {:.2}  {}",
        c.user_id,
        c.rank,
        c.latency_ms,
        c.fair_play_rate,
        c.abandon_rate,
        c.preferred_role.as_deref().unwrap_or("-"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_scaffold_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_str().unwrap();

        init(path).unwrap();
        let parsed = ScrimConfig::from_file(&dir.path().join("scrim.toml")).unwrap();
        assert_eq!(parsed, ScrimConfig::scaffold("scrims.redb"));

        assert!(init(path).is_err());
    }

    #[test]
    fn test_add_player_validates_rates() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::open(ScrimConfig::default(), Some(&dir.path().join("t.redb"))).unwrap();

        assert!(add_player(&app, "a", 15, 10, 1.5, 0.0, None).is_err());
        assert!(add_player(&app, " ", 15, 10, 1.0, 0.0, None).is_err());
        add_player(&app, "a", 15, 10, 0.9, 0.1, Some("entry".into())).unwrap();

        let stored = app.store.get_player("a").unwrap().unwrap();
        assert_eq!(stored.preferred_role.as_deref(), Some("entry"));
    }
}
