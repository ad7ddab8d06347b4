// ABOUTME: Main entry point running the Mastodon adapter against a minimal robot host
// ABOUTME: Initializes logging and config, runs the adapter, and logs received messages

use anyhow::Result;
use std::sync::Arc;
use tootbot::{
    config::MastodonConfig,
    logging::{self, LogFormat},
    platform::MastodonAdapter,
    Adapter, AdapterEvent, Robot,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init(LogFormat::from_env());

    tracing::info!("Starting tootbot");

    let config = MastodonConfig::from_env()?;
    tracing::info!(
        base_url = %config.base_url,
        timeline = %config.timeline,
        visibility = %config.visibility,
        "Configuration loaded"
    );

    let (robot, mut inbox) = Robot::new("tootbot");
    let robot = Arc::new(robot);
    let mut events = robot.subscribe();
    let adapter = MastodonAdapter::connect(Arc::clone(&robot), config)?;

    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            if event == AdapterEvent::Connected {
                tracing::info!("Adapter connected");
            }
        }
    });

    tokio::spawn(async move {
        while let Some(message) = inbox.recv().await {
            tracing::info!(
                id = %message.id,
                screen_name = message.screen_name.as_deref().unwrap_or(""),
                is_mention = message.is_mention,
                text = %message.text,
                "Received message"
            );
        }
    });

    adapter.run().await
}
