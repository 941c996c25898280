//! CLI argument definitions
//!
//! Contains the main CLI struct and Commands enum for clap parsing.

use clap::{ArgAction, Parser, Subcommand};

use idlewatch::config::InsightProvider;

#[derive(Parser)]
#[command(name = "idlewatch")]
#[command(about = "Contact-center idle monitor for Genesys Cloud")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Insight backend (default: from .idlewatch.toml or gemini)
    #[arg(long, env = "IDLEWATCH_BACKEND", global = true)]
    pub backend: Option<InsightProvider>,

    /// Insight model (default: the backend's default)
    #[arg(short = 'm', long, env = "IDLEWATCH_MODEL", global = true)]
    pub model: Option<String>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage connection profiles
    Profiles {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Sync once and show the dashboard
    Sync,
    /// Sync once and list agents
    Agents {
        /// Case-insensitive name search
        #[arg(long, short)]
        search: Option<String>,
        /// Routing status (IDLE, COMMUNICATING, INTERACTING, OFF_LINE, NOT_RESPONDING or all)
        #[arg(long)]
        status: Option<String>,
        /// Presence label, e.g. "On Queue" (or all)
        #[arg(long)]
        presence: Option<String>,
    },
    /// Sync once and run an AI analysis of the on-queue agents
    Analyze,
    /// Sync repeatedly and redraw the dashboard
    Watch {
        /// Seconds between syncs (default: from .idlewatch.toml or 30)
        #[arg(long)]
        interval: Option<u64>,
        /// Run an AI analysis after every successful sync
        #[arg(long)]
        analyze: bool,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// List saved profiles
    List,
    /// Add a profile, or replace the one with the same id
    Add {
        /// Display name
        #[arg(long)]
        name: String,
        /// Profile id (default: generated)
        #[arg(long)]
        id: Option<String>,
        /// Region label, e.g. ap_southeast_2
        #[arg(long, default_value = "us_east_1")]
        region: String,
        /// API host, e.g. https://api.mypurecloud.com
        #[arg(long)]
        api_host: String,
        /// Login host, e.g. https://login.mypurecloud.com
        #[arg(long)]
        login_host: String,
        /// OAuth client id
        #[arg(long, env = "GENESYS_CLIENT_ID")]
        client_id: String,
        /// OAuth client secret
        #[arg(long, env = "GENESYS_CLIENT_SECRET", hide_env_values = true)]
        client_secret: String,
        /// URL prefix prepended to every request, e.g. https://corsproxy.io/?
        #[arg(long)]
        cors_proxy: Option<String>,
        /// Make the new profile active
        #[arg(long)]
        activate: bool,
    },
    /// Remove a profile
    Remove {
        /// Profile id
        id: String,
    },
    /// Make a profile active
    Use {
        /// Profile id
        id: String,
    },
}
