//! TubeScript transcript extraction service.

use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tubescript_core::TubeScriptConfig;

mod routes;
mod session;
mod state;

use state::AppState;

fn print_help() {
    println!("TubeScript: transcript extraction service");
    println!();
    println!("Usage: tubescript [command]");
    println!();
    println!("Commands:");
    println!("  (none)                   Start the server");
    println!("  fetch <url>              Print the transcript for a video page");
    println!("  help                     Show this help message");
    println!();
    println!("Environment:");
    println!("  TUBESCRIPT_CONFIG        Config file (default tubescript.json)");
    println!("  TUBESCRIPT_PORT          HTTP port (default 3004)");
    println!("  TUBESCRIPT_API_BASE      Upstream origin");
    println!("  TUBESCRIPT_API_KEY       API key, skips page scraping");
}

/// One-shot extraction for `tubescript fetch <url>`.
async fn fetch(config: TubeScriptConfig, url: &str) -> anyhow::Result<()> {
    let has_key = config.api_key.is_some();
    let state = AppState::new(config)?;

    if has_key {
        state.session.set_location(url);
    } else {
        state.session.navigate(&state.client, url).await?;
    }

    let transcript = state.extractor.get_transcript().await?;
    println!("{}", transcript);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = TubeScriptConfig::from_env();

    // Handle CLI subcommands
    if args.len() > 1 {
        match args[1].as_str() {
            "fetch" => {
                if args.len() < 3 {
                    eprintln!("Usage: tubescript fetch <url>");
                    std::process::exit(1);
                }
                if let Err(e) = fetch(config, &args[2]).await {
                    eprintln!("No transcript: {}", e);
                    std::process::exit(1);
                }
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'tubescript help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    if config.api_key.is_none() {
        warn!("No API key configured; navigate to a page before requesting transcripts");
    }
    let port = config.port;

    let state = Arc::new(AppState::new(config)?);
    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("TubeScript server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
