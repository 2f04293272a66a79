use scrim_core::ActionRecord;

use super::App;

pub async fn invite(
    app: &App,
    scrim_id: &str,
    actor: &str,
    user: &str,
    role: Option<&str>,
) -> anyhow::Result<()> {
    app.service.invite(scrim_id, actor, user, role).await?;
    println!("✓ {user} added as {}", role.unwrap_or("(no role)"));
    Ok(())
}

pub async fn assign(
    app: &App,
    scrim_id: &str,
    actor: &str,
    user: &str,
    role: &str,
) -> anyhow::Result<()> {
    app.service.assign_role(scrim_id, actor, user, role).await?;
    println!("✓ {user} now plays {role}");
    Ok(())
}

pub async fn swap(
    app: &App,
    scrim_id: &str,
    actor: &str,
    first: &str,
    second: &str,
) -> anyhow::Result<()> {
    app.service.swap(scrim_id, actor, first, second).await?;
    println!("✓ Swapped roles of {first} and {second}");
    Ok(())
}

pub async fn undo(app: &App, scrim_id: &str, actor: &str) -> anyhow::Result<()> {
    let action = app.service.undo(scrim_id, actor).await?;
    println!("✓ Undid {}", describe(&action));
    Ok(())
}

pub async fn finalize(app: &App, scrim_id: &str, actor: &str) -> anyhow::Result<()> {
    let report = app.service.finalize_roles(scrim_id, actor).await?;
    println!("✓ Roles locked for {scrim_id}");
    for (user, role) in &report.assigned {
        println!("  {user:<16} {role}");
    }
    if !report.unmatched.is_empty() {
        println!(
            "  no pending attendance for: {}",
            report.unmatched.join(", ")
        );
    }
    Ok(())
}

fn describe(action: &ActionRecord) -> String {
    match action {
        ActionRecord::Invite { user_id, .. } => format!("invite of {user_id}"),
        ActionRecord::AssignRole {
            user_id, new_role, ..
        } => format!("{new_role} for {user_id}"),
        ActionRecord::Swap { first, second } => format!("swap of {first} and {second}"),
    }
}
