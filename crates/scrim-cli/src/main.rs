use std::path::PathBuf;

use clap::{Parser, Subcommand};
use scrim_core::StrategyKind;

mod commands;

#[derive(Parser)]
#[command(
    name = "scrimctl",
    about = "Scrim formation — postulations, attendance, role assignment",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Database file (overrides [store].path in the config)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Configuration file
    #[arg(long, global = true, default_value = "scrim.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a scrim.toml scaffold
    Init {
        #[arg(short, long, default_value = ".")]
        path: String,
    },
    /// Open a scrim from a definition file
    Create {
        /// Path to the scrim definition (TOML)
        definition: PathBuf,
    },
    /// Show one scrim
    Show {
        scrim: String,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// List all scrims
    List,
    /// Manage player profiles used for candidate selection
    Player {
        #[command(subcommand)]
        action: PlayerAction,
    },
    /// Apply to a scrim
    Apply {
        scrim: String,
        player: String,
        #[arg(long)]
        rank: u32,
        #[arg(long)]
        latency: u32,
    },
    /// Decide a postulation left for review
    Postulation {
        #[command(subcommand)]
        action: PostulationAction,
    },
    /// Answer an attendance request
    Attendance {
        #[command(subcommand)]
        action: AttendanceAction,
    },
    /// Rank players for the open slots of a scrim.
    ///
    /// With no players given, every stored profile is considered.
    Select {
        scrim: String,
        players: Vec<String>,
    },
    /// Change the selection strategy (rank_proximity, latency, reliability)
    Strategy {
        scrim: String,
        kind: StrategyKind,
        #[arg(long = "as", value_name = "USER")]
        actor: String,
    },
    /// Edit the role workspace
    Roles {
        #[command(subcommand)]
        action: RolesAction,
    },
    /// Start a fully confirmed scrim
    Start {
        scrim: String,
        #[arg(long = "as", value_name = "USER")]
        actor: String,
    },
    /// Mark a scrim as finished
    Finish {
        scrim: String,
        #[arg(long = "as", value_name = "USER")]
        actor: String,
    },
    /// Cancel a scrim
    Cancel {
        scrim: String,
        #[arg(long = "as", value_name = "USER")]
        actor: String,
    },
}

#[derive(Subcommand)]
enum PlayerAction {
    /// Add or replace a player profile
    Add {
        id: String,
        #[arg(long)]
        rank: u32,
        #[arg(long)]
        latency: u32,
        #[arg(long, default_value = "1.0")]
        fair_play: f64,
        #[arg(long, default_value = "0.0")]
        abandon: f64,
        #[arg(long)]
        role: Option<String>,
    },
    /// List player profiles
    List,
}

#[derive(Subcommand)]
enum PostulationAction {
    Accept {
        scrim: String,
        applicant: String,
        #[arg(long = "as", value_name = "USER")]
        actor: String,
    },
    Reject {
        scrim: String,
        applicant: String,
        #[arg(long = "as", value_name = "USER")]
        actor: String,
        #[arg(long, default_value = "")]
        reason: String,
    },
}

#[derive(Subcommand)]
enum AttendanceAction {
    Confirm { scrim: String, player: String },
    Decline { scrim: String, player: String },
}

#[derive(Subcommand)]
enum RolesAction {
    /// Add a participant to the workspace
    Invite {
        scrim: String,
        user: String,
        #[arg(long)]
        role: Option<String>,
        #[arg(long = "as", value_name = "USER")]
        actor: String,
    },
    /// Give a participant a role
    Assign {
        scrim: String,
        user: String,
        role: String,
        #[arg(long = "as", value_name = "USER")]
        actor: String,
    },
    /// Exchange two participants' roles
    Swap {
        scrim: String,
        first: String,
        second: String,
        #[arg(long = "as", value_name = "USER")]
        actor: String,
    },
    /// Revert the last workspace edit
    Undo {
        scrim: String,
        #[arg(long = "as", value_name = "USER")]
        actor: String,
    },
    /// Lock the workspace and hand roles to pending confirmations
    Finalize {
        scrim: String,
        #[arg(long = "as", value_name = "USER")]
        actor: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { path } = &cli.command {
        init_tracing("info")?;
        return commands::setup::init(path);
    }

    let config = commands::load_config(&cli.config)?;
    init_tracing(&config.log.filter)?;
    let app = commands::App::open(config, cli.db.as_deref())?;

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Create { definition } => commands::scrim::create(&app, &definition).await,
        Commands::Show { scrim, format } => commands::scrim::show(&app, &scrim, &format).await,
        Commands::List => commands::scrim::list(&app),
        Commands::Player { action } => match action {
            PlayerAction::Add {
                id,
                rank,
                latency,
                fair_play,
                abandon,
                role,
            } => commands::setup::add_player(&app, &id, rank, latency, fair_play, abandon, role),
            PlayerAction::List => commands::setup::list_players(&app),
        },
        Commands::Apply {
            scrim,
            player,
            rank,
            latency,
        } => commands::admission::apply(&app, &scrim, &player, rank, latency).await,
        Commands::Postulation { action } => match action {
            PostulationAction::Accept {
                scrim,
                applicant,
                actor,
            } => commands::admission::accept(&app, &scrim, &actor, &applicant).await,
            PostulationAction::Reject {
                scrim,
                applicant,
                actor,
                reason,
            } => commands::admission::reject(&app, &scrim, &actor, &applicant, &reason).await,
        },
        Commands::Attendance { action } => match action {
            AttendanceAction::Confirm { scrim, player } => {
                commands::admission::confirm(&app, &scrim, &player).await
            }
            AttendanceAction::Decline { scrim, player } => {
                commands::admission::decline(&app, &scrim, &player).await
            }
        },
        Commands::Select { scrim, players } => {
            commands::scrim::select(&app, &scrim, &players).await
        }
        Commands::Strategy { scrim, kind, actor } => {
            commands::scrim::set_strategy(&app, &scrim, &actor, kind).await
        }
        Commands::Roles { action } => match action {
            RolesAction::Invite {
                scrim,
                user,
                role,
                actor,
            } => commands::roles::invite(&app, &scrim, &actor, &user, role.as_deref()).await,
            RolesAction::Assign {
                scrim,
                user,
                role,
                actor,
            } => commands::roles::assign(&app, &scrim, &actor, &user, &role).await,
            RolesAction::Swap {
                scrim,
                first,
                second,
                actor,
            } => commands::roles::swap(&app, &scrim, &actor, &first, &second).await,
            RolesAction::Undo { scrim, actor } => commands::roles::undo(&app, &scrim, &actor).await,
            RolesAction::Finalize { scrim, actor } => {
                commands::roles::finalize(&app, &scrim, &actor).await
            }
        },
        Commands::Start { scrim, actor } => commands::scrim::start(&app, &scrim, &actor).await,
        Commands::Finish { scrim, actor } => commands::scrim::finish(&app, &scrim, &actor).await,
        Commands::Cancel { scrim, actor } => commands::scrim::cancel(&app, &scrim, &actor).await,
    }
}

fn init_tracing(filter: &str) -> anyhow::Result<()> {
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::try_new(filter)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter.add_directive("scrimctl=info".parse()?))
        .init();
    Ok(())
}
