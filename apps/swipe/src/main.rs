use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{AccessToken, ImageOptions, YouTubeClient};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

mod app;
mod config;

use app::{App, Command, Step, HELP};
use config::{load_settings_from, SETTINGS_FILE};

#[derive(Parser, Debug)]
#[command(about = "Keep or unsubscribe from your YouTube channels one card at a time")]
struct Args {
    /// OAuth bearer token with the youtube scope.
    #[arg(long, env = "YOUTUBE_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,
    #[arg(long)]
    api_base_url: Option<String>,
    /// Base URL of a running image relay; thumbnails are routed through it.
    #[arg(long)]
    image_relay_url: Option<String>,
    #[arg(long, default_value = SETTINGS_FILE)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let mut settings = load_settings_from(&args.config, |key| std::env::var(key).ok());
    if let Some(v) = args.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = args.image_relay_url {
        settings.image_relay_url = Some(v);
    }

    let token = AccessToken::new(args.access_token)?;
    let mut images = ImageOptions::default().with_placeholder_base(settings.placeholder_base_url);
    if let Some(relay) = settings.image_relay_url.as_deref() {
        images = images
            .with_relay(relay)
            .with_context(|| format!("invalid image relay url '{relay}'"))?;
    }

    let mut app = App::new(YouTubeClient::new(settings.api_base_url), token, images);
    println!("Loading your subscriptions...");
    println!("{}", app.reload().await);
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(command) => match app.handle(command).await {
                Step::Print(text) => println!("{text}"),
                Step::Quit => break,
            },
            Err(message) => println!("{message}"),
        }
    }

    Ok(())
}
