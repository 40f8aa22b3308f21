use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use prize_dash_host::commands::{HostCommand, parse_command};
use prize_dash_host::config::HostConfig;
use prize_dash_host::runtime::{HostBroadcast, LoopTiming, spawn_session};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Prize Dash host starting");

    let config = HostConfig::load();
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "Invalid configuration");
        std::process::exit(1);
    }

    let session = match prize_dash_host::build_session(&config) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load catalog");
            std::process::exit(1);
        },
    };

    let timing = LoopTiming::new(config.frame_rate_hz, &session);
    let (cmd_tx, mut broadcast_rx, handle) = spawn_session(session, timing);

    // Text driver: one command per stdin line
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match parse_command(&line) {
                Ok(cmd) => {
                    if cmd_tx.send(cmd).is_err() {
                        return;
                    }
                },
                Err(e) => tracing::warn!(error = %e, "Ignoring input line"),
            }
        }
        let _ = cmd_tx.send(HostCommand::Stop);
    });

    while let Some(broadcast) = broadcast_rx.recv().await {
        match broadcast {
            HostBroadcast::Ui(event) => match serde_json::to_string(&event) {
                Ok(json) => println!("{json}"),
                Err(e) => tracing::error!(error = %e, "Failed to encode UI event"),
            },
            HostBroadcast::Frame(data) => tracing::trace!(bytes = data.len(), "Frame"),
            HostBroadcast::Stopped => break,
        }
    }

    if let Err(e) = handle.await {
        tracing::error!(error = %e, "Session task failed");
    }
}
