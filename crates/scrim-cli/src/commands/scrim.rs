use std::fmt::Write as _;
use std::path::Path;

use scrim_core::config::ScrimDefinition;
use scrim_core::{Scrim, StrategyKind};

use super::setup::format_candidate;
use super::App;

pub async fn create(app: &App, definition: &Path) -> anyhow::Result<()> {
    let definition = ScrimDefinition::from_file(definition)?;
    let scrim = app.service.create_scrim(&definition).await?;
    println!(
        "✓ Scrim {} created ({} players, ranks {}-{}, max {}ms)",
        scrim.id,
        scrim.capacity(),
        scrim.constraints.rank.min,
        scrim.constraints.rank.max,
        scrim.constraints.max_latency_ms,
    );
    Ok(())
}

pub async fn show(app: &App, scrim_id: &str, format: &str) -> anyhow::Result<()> {
    let scrim = app.service.get_scrim(scrim_id).await?;
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&scrim)?),
        _ => print!("{}", format_scrim(&scrim)),
    }
    Ok(())
}

pub fn list(app: &App) -> anyhow::Result<()> {
    let scrims = app.store.list_scrims()?;
    if scrims.is_empty() {
        println!("No scrims.");
        return Ok(());
    }
    for s in scrims {
        println!(
            "{:<20} {:<14} {}/{}  organizer {}",
            s.id,
            s.state.label(),
            s.accepted_count(),
            s.capacity(),
            s.organizer_id
        );
    }
    Ok(())
}

pub async fn select(app: &App, scrim_id: &str, players: &[String]) -> anyhow::Result<()> {
    let pool: Vec<String> = if players.is_empty() {
        app.store
            .list_players()?
            .into_iter()
            .map(|c| c.user_id)
            .collect()
    } else {
        players.to_vec()
    };

    let picked = app.service.select_candidates_for(scrim_id, &pool).await?;
    if picked.is_empty() {
        println!("No eligible candidates.");
        return Ok(());
    }
    for (i, c) in picked.iter().enumerate() {
        println!("{:>2}. {}", i + 1, format_candidate(c));
    }
    Ok(())
}

pub async fn set_strategy(
    app: &App,
    scrim_id: &str,
    actor: &str,
    kind: StrategyKind,
) -> anyhow::Result<()> {
    app.service.set_strategy(scrim_id, actor, kind).await?;
    println!("✓ Scrim {scrim_id} now selects by {kind}");
    Ok(())
}

pub async fn start(app: &App, scrim_id: &str, actor: &str) -> anyhow::Result<()> {
    app.service.start(scrim_id, actor).await?;
    println!("✓ Scrim {scrim_id} started");
    Ok(())
}

pub async fn finish(app: &App, scrim_id: &str, actor: &str) -> anyhow::Result<()> {
    app.service.finish(scrim_id, actor).await?;
    println!("✓ Scrim {scrim_id} finished");
    Ok(())
}

pub async fn cancel(app: &App, scrim_id: &str, actor: &str) -> anyhow::Result<()> {
    app.service.cancel(scrim_id, actor).await?;
    println!("✓ Scrim {scrim_id} cancelled");
    Ok(())
}

/// Human-readable summary of a scrim.
pub fn format_scrim(scrim: &Scrim) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Scrim {} ({})", scrim.id, scrim.format.name);
    let _ = writeln!(out, "  state:     {}", scrim.state);
    let _ = writeln!(out, "  organizer: {}", scrim.organizer_id);
    let _ = writeln!(
        out,
        "  roster:    {}/{}  ranks {}-{}  max {}ms  strategy {}",
        scrim.accepted_count(),
        scrim.capacity(),
        scrim.constraints.rank.min,
        scrim.constraints.rank.max,
        scrim.constraints.max_latency_ms,
        scrim.strategy,
    );

    if !scrim.postulations.is_empty() {
        let _ = writeln!(out, "Postulations:");
        for p in &scrim.postulations {
            let _ = write!(
                out,
                "  {:<16} {:<9} rank {:>4}  {:>4}ms",
                p.applicant_id,
                p.status.to_string(),
                p.rank,
                p.latency_ms
            );
            match &p.rejection_reason {
                Some(reason) => {
                    let _ = writeln!(out, "  ({reason})");
                }
                None => out.push('\n'),
            }
        }
    }

    if !scrim.confirmations.is_empty() {
        let _ = writeln!(out, "Attendance:");
        for c in &scrim.confirmations {
            let _ = writeln!(
                out,
                "  {:<16} {:<9} role {}",
                c.applicant_id,
                c.status.to_string(),
                c.role.as_deref().unwrap_or("-"),
            );
        }
    }

    let workspace = &scrim.workspace;
    if workspace.is_locked() {
        let _ = writeln!(out, "Roles:     finalized");
    } else if !workspace.participants().is_empty() {
        let _ = writeln!(out, "Roles:");
        for p in workspace.participants() {
            let _ = writeln!(
                out,
                "  {:<16} {}",
                p.user_id,
                p.role.as_deref().unwrap_or("-")
            );
        }
    }
    out
}
