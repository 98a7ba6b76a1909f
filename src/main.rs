use std::io::{self, Write};

use anyhow::Result;
use siot_playground_rs::actions::ACTIONS;
use siot_playground_rs::config::SiotConfig;
use siot_playground_rs::menu;
use tracing::{error, info};

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let config = SiotConfig::from_env();
    info!(server = %config.server_uri, client_id = %config.client_id, "configuration loaded");

    let names: Vec<&str> = ACTIONS.iter().map(|action| action.name).collect();
    println!("{}", menu::render(&names));

    let Some(choice) = menu::choose(&mut io::stdin().lock(), &mut io::stdout(), names.len())? else {
        return Ok(());
    };
    let action = &ACTIONS[choice];

    print!("{}", menu::banner(action.name));
    io::stdout().flush()?;

    info!(action = action.name, "running action");
    if let Err(e) = (action.run)(&config) {
        error!(error = %e, action = action.name, "action failed");
        return Err(e.into());
    }
    Ok(())
}
