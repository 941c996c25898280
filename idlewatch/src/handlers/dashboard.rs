//! One-shot dashboard handlers
//!
//! `sync`, `agents` and `analyze` each run a single sync against the active
//! profile and print one view.

use anyhow::{anyhow, Result};

use idlewatch::dashboard::{SyncOutcome, Tab};
use idlewatch::filter::{PresenceFilter, StatusFilter};
use idlewatch::profiles::FileStore;
use idlewatch::render;
use idlewatch::session::Session;

use super::CommandContext;

/// Sync once, failing the command when the sync fails
pub(crate) async fn sync_or_bail(session: &mut Session<FileStore>) -> Result<()> {
    let profile = session.active_profile().name.clone();
    match session.sync().await {
        SyncOutcome::Applied { agents } => {
            tracing::info!(profile = %profile, agents, "Sync complete");
            Ok(())
        }
        SyncOutcome::Failed => Err(anyhow!(session
            .state()
            .sync_error()
            .unwrap_or("Sync failed")
            .to_string())),
        SyncOutcome::Stale | SyncOutcome::Busy => Err(anyhow!("Sync did not complete")),
    }
}

/// Handle the `sync` command
pub async fn run_sync(ctx: &CommandContext) -> Result<()> {
    let mut session = ctx.session()?;
    sync_or_bail(&mut session).await?;
    print!("{}", render::render_dashboard(session.state()));
    Ok(())
}

/// Handle the `agents` command
pub async fn run_agents(
    ctx: &CommandContext,
    search: Option<String>,
    status: Option<String>,
    presence: Option<String>,
) -> Result<()> {
    // Validate filters before touching the network
    let status = status
        .as_deref()
        .map(str::parse::<StatusFilter>)
        .transpose()?
        .unwrap_or_default();
    let presence = presence
        .as_deref()
        .map(PresenceFilter::from)
        .unwrap_or_default();

    let mut session = ctx.session()?;
    sync_or_bail(&mut session).await?;

    {
        let state = session.state_mut();
        state.set_search(search.unwrap_or_default());
        state.set_status_filter(status);
        state.set_presence_filter(presence);
        state.set_tab(Tab::Agents);
    }

    let state = session.state();
    if ctx.is_verbose() {
        eprintln!("Presences seen: {}", state.presences().join(", "));
    }
    print!(
        "{}",
        render::render_view(state, session.profiles().profiles(), session.profiles().active_id())
    );
    Ok(())
}

/// Handle the `analyze` command
pub async fn run_analyze(ctx: &CommandContext) -> Result<()> {
    let mut session = ctx.session()?;
    sync_or_bail(&mut session).await?;

    if !session.analyze().await {
        println!("No on-queue agents to analyze.");
        return Ok(());
    }

    let state = session.state();
    print!(
        "{}",
        render::render_view(state, session.profiles().profiles(), session.profiles().active_id())
    );
    Ok(())
}
