//! roundtrip CLI — the main entry point.
//!
//! Interactive chat by default; `--message` sends a single turn and exits.
//! All orchestration logic lives in `roundtrip-agent` — this binary only
//! wires configuration, the provider, and stdin together.

use clap::Parser;
use roundtrip_agent::Agent;
use roundtrip_config::AppConfig;
use roundtrip_providers::{HttpRelevanceLookup, OpenRouterProvider};
use std::io::{BufRead, Write};
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "roundtrip",
    about = "roundtrip — single-turn, tool-augmented agent chat",
    version,
    author
)]
struct Cli {
    /// Send a single message instead of entering interactive mode
    #[arg(short, long)]
    message: Option<String>,

    /// Override the configured model
    #[arg(long)]
    model: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if let Some(model) = cli.model {
        config.model = model;
    }

    // Check for API key early — give a clear error
    if config.api_key.is_none() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    OPENROUTER_API_KEY='sk-or-v1-...'   (recommended)");
        eprintln!("    ROUNDTRIP_API_KEY='sk-...'          (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        eprintln!("  Get an OpenRouter key at: https://openrouter.ai/keys");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = Arc::new(OpenRouterProvider::from_config(&config)?);

    let mut catalog = roundtrip_tools::default_catalog();
    if let Some(url) = &config.lookup.url {
        catalog = catalog.with_lookup(Arc::new(HttpRelevanceLookup::new(
            url.as_str(),
            std::time::Duration::from_secs(config.provider.timeout_secs),
        )));
    }
    let tool_names = catalog.names().join(", ");

    let mut agent = Agent::new(provider, catalog, &config.model)
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens)
        .with_window(config.memory.window)
        .with_suggestion_limit(config.lookup.top_k);

    if let Some(message) = cli.message {
        // Single message mode
        eprint!("  Thinking...");
        let envelope = agent.chat(&message).await?;
        eprint!("\r              \r");
        println!("{}", envelope.response);
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  roundtrip — agent chat (single tool round-trip per turn)");
    println!();
    println!("  Model:   {}", config.model);
    println!("  Tools:   {tool_names}");
    println!("  Window:  last {} turns", config.memory.window);
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or 'quit' to leave.");
    println!();

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let input = line?;
        let input = input.trim();

        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "exit" | "quit") {
            break;
        }

        eprint!("  ...");
        match agent.chat(input).await {
            Ok(envelope) => {
                eprint!("\r     \r");
                println!();
                for line in envelope.response.lines() {
                    println!("  Agent > {line}");
                }
                println!();
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
                println!();
            }
        }
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}
