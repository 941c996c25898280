//! Profile command handlers
//!
//! `profiles list|add|remove|use` against the saved profile store.

use anyhow::Result;

use idlewatch::profiles::{Profile, Upserted};
use idlewatch::render;

use super::CommandContext;
use crate::cli::ProfileCommands;

/// Handle the `profiles` subcommands
pub async fn run_profiles_command(ctx: &CommandContext, command: ProfileCommands) -> Result<()> {
    let mut store = ctx.profile_store()?;

    match command {
        ProfileCommands::List => {
            print!("{}", render::render_profiles(store.profiles(), store.active_id()));
        }

        ProfileCommands::Add {
            name,
            id,
            region,
            api_host,
            login_host,
            client_id,
            client_secret,
            cors_proxy,
            activate,
        } => {
            let profile = Profile {
                id: id.unwrap_or_else(Profile::new_id),
                name,
                region,
                api_host,
                login_host,
                client_id,
                client_secret,
                cors_proxy: cors_proxy.filter(|p| !p.trim().is_empty()),
                last_synced_at: None,
            };
            let id = profile.id.clone();

            match store.upsert(profile)? {
                Upserted::Inserted => println!("Added profile {}", id),
                Upserted::Replaced => println!("Updated profile {}", id),
            }
            if activate {
                store.set_active(&id)?;
                println!("Active profile: {}", id);
            }
        }

        ProfileCommands::Remove { id } => {
            store.delete(&id)?;
            println!("Removed profile {}", id);
            println!("Active profile: {}", store.active_id());
        }

        ProfileCommands::Use { id } => {
            if store.set_active(&id)? {
                println!("Active profile: {}", id);
            } else {
                println!("Profile {} is already active", id);
            }
        }
    }

    Ok(())
}
