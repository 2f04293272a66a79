use scrim_core::PostulationStatus;

use super::App;

pub async fn apply(
    app: &App,
    scrim_id: &str,
    player: &str,
    rank: u32,
    latency_ms: u32,
) -> anyhow::Result<()> {
    let postulation = app.service.apply(scrim_id, player, rank, latency_ms).await?;
    match postulation.status {
        PostulationStatus::Accepted => println!("✓ {player} accepted into {scrim_id}"),
        PostulationStatus::Pending => println!("… {player} is waiting for organizer review"),
        PostulationStatus::Rejected => println!(
            "✗ {player} rejected: {}",
            postulation.rejection_reason.as_deref().unwrap_or("no reason given")
        ),
    }

    let scrim = app.service.get_scrim(scrim_id).await?;
    println!("  roster {}/{} ({})", scrim.accepted_count(), scrim.capacity(), scrim.state);
    Ok(())
}

pub async fn accept(app: &App, scrim_id: &str, actor: &str, applicant: &str) -> anyhow::Result<()> {
    app.service.accept_postulation(scrim_id, actor, applicant).await?;
    println!("✓ {applicant} accepted into {scrim_id}");
    Ok(())
}

pub async fn reject(
    app: &App,
    scrim_id: &str,
    actor: &str,
    applicant: &str,
    reason: &str,
) -> anyhow::Result<()> {
    app.service
        .reject_postulation(scrim_id, actor, applicant, reason)
        .await?;
    println!("✓ {applicant} rejected from {scrim_id}");
    Ok(())
}

pub async fn confirm(app: &App, scrim_id: &str, player: &str) -> anyhow::Result<()> {
    app.service.confirm_attendance(scrim_id, player).await?;
    let scrim = app.service.get_scrim(scrim_id).await?;
    println!(
        "✓ {player} confirmed ({} still pending, scrim {})",
        scrim.pending_confirmation_count(),
        scrim.state
    );
    Ok(())
}

pub async fn decline(app: &App, scrim_id: &str, player: &str) -> anyhow::Result<()> {
    app.service.decline_attendance(scrim_id, player).await?;
    let scrim = app.service.get_scrim(scrim_id).await?;
    println!(
        "✓ {player} declined, slot reopened ({}/{}, scrim {})",
        scrim.accepted_count(),
        scrim.capacity(),
        scrim.state
    );
    Ok(())
}
