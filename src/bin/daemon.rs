//! Headless autosave daemon.
//!
//! Loads the persisted refresh rate, starts the scheduler, and serves the
//! operator console on stdin/stdout until `quit`, EOF, or ctrl-c; the
//! scheduler then stops with one final save before the process exits.
//!
//! All tracing/diagnostic output goes to stderr so that stdout remains a
//! clean console reply channel.
//!
//! The save action is configured through the `SAVETICK_SAVE_COMMAND`
//! environment variable: when set, each fire runs it via `sh -c` (a
//! non-zero exit is logged as a failed save); when unset, fires are only
//! logged, which is useful for dry runs.

use std::sync::Arc;

use savetick::console::run_console;
use savetick::{IntervalStore, SaveAction, SaveScheduler, SaveTickError};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("savetick starting");

    let store = IntervalStore::new(savetick::paths::refresh_rate_path());
    let interval = store.load_or_init();
    tracing::info!(interval = %interval, store = %store.path().display(), "refresh rate loaded");

    let scheduler = Arc::new(SaveScheduler::new(interval, store, save_action_from_env()));
    scheduler
        .start()
        .map_err(|e| anyhow::anyhow!("cannot start scheduler: {e}"))?;

    tokio::select! {
        result = run_console(Arc::clone(&scheduler)) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "console failed");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("ctrl-c received");
        }
    }

    scheduler.stop().await;
    tracing::info!("savetick shut down cleanly");
    Ok(())
}

/// Build the save action from the environment.
fn save_action_from_env() -> SaveAction {
    match std::env::var("SAVETICK_SAVE_COMMAND") {
        Ok(command) if !command.trim().is_empty() => {
            tracing::info!(command = %command, "save trigger will run the configured command");
            Box::new(move || {
                let status = std::process::Command::new("sh")
                    .arg("-c")
                    .arg(&command)
                    .status()
                    .map_err(|e| {
                        SaveTickError::Action(format!("cannot spawn save command: {e}"))
                    })?;
                if status.success() {
                    Ok(())
                } else {
                    Err(SaveTickError::Action(format!(
                        "save command exited with {status}"
                    )))
                }
            })
        }
        _ => Box::new(|| {
            tracing::info!("save trigger fired (no SAVETICK_SAVE_COMMAND configured)");
            Ok(())
        }),
    }
}
