use anyhow::Result;
use progression::{NextAvailability, ProgressionController};
use storage::LevelStore;
use tracing::{error, info};

mod clipboard;
mod config;

use config::{load_settings, resolve_database_url};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let database_url = resolve_database_url(&settings.database_url);
    let store = LevelStore::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    store.initialize().await?;

    let mut tracker = ProgressionController::new(store);
    let levels = tracker.levels().await?;
    info!(missions = levels.len(), "operation history loaded");

    for level in &levels {
        let marker = if level.captured() { "secured" } else { "open" };
        println!("mission {:>2}  [{marker}]", level.index);
    }

    // Resume at the latest mission and hand its access string to the
    // clipboard; the GUI front-end layers on top of this same controller.
    if let Some(last) = levels.last() {
        let view = tracker.select(last.index).await?;
        if let Some(level) = view.level {
            let hint = level.login_hint();
            println!();
            println!("active: mission {} as {}", level.index, hint.username);
            println!("connect: {}", hint.ssh_command());
            println!("{}", clipboard::copy_text("SSH command", &hint.ssh_command()));
        }
    }

    match tracker.next_availability().await? {
        NextAvailability::Ready { next } => {
            println!("next: mission {next} is ready to deploy");
        }
        NextAvailability::Locked => {
            println!("next: locked; save the current mission's credential first");
        }
        NextAvailability::AllDeployed => {
            println!("next: all missions deployed");
        }
    }

    Ok(())
}
