//! Watch command handler
//!
//! Syncs the active profile on a fixed interval and redraws the dashboard
//! after every cycle until Ctrl+C.

use std::time::Duration;

use anyhow::{bail, Result};
use chrono::Local;
use tokio::time::MissedTickBehavior;

use idlewatch::dashboard::{SyncOutcome, Tab};
use idlewatch::profiles::FileStore;
use idlewatch::render;
use idlewatch::session::Session;

use super::CommandContext;

/// Handle the `watch` command
pub async fn run_watch(ctx: &CommandContext, interval: Option<u64>, analyze: bool) -> Result<()> {
    let interval = interval.unwrap_or(ctx.file_config.watch.interval);
    if interval == 0 {
        bail!("Watch interval must be at least 1 second");
    }

    let mut session = ctx.session()?;
    println!(
        "Watching {} (interval: {}s)",
        session.active_profile().name,
        interval
    );
    println!("Press Ctrl+C to stop\n");

    let mut ticker = tokio::time::interval(Duration::from_secs(interval));
    // Ticks missed during a slow sync are dropped, not replayed
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                println!("\nStopped.");
                return Ok(());
            }
            _ = ticker.tick() => {
                run_cycle(&mut session, analyze, ctx.is_verbose()).await;
            }
        }
    }
}

/// One sync (and optional analysis) followed by a redraw
async fn run_cycle(session: &mut Session<FileStore>, analyze: bool, verbose: bool) {
    let outcome = session.sync().await;
    if verbose {
        eprintln!("Sync: {:?}", outcome);
    }

    if analyze && matches!(outcome, SyncOutcome::Applied { .. }) {
        session.analyze().await;
    }

    println!(
        "=== {} | {} ===",
        session.active_profile().name,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let state = session.state();
    print!("{}", render::render_dashboard(state));
    if state.tab() == Tab::Reports {
        if let Some(analysis) = state.analysis() {
            println!();
            print!("{}", render::render_report(analysis));
        }
    }
    println!();
}
