//! Binary entrypoint for the rpgchat CLI.
//!
//! Commands:
//! - `start [--port <n>] [--bind <addr>]` - run the chat server
//! - `init` - write a starter `config.toml`
//! - `check-world [--path <file>]` - load a world document and print a summary
//!
//! See the library crate docs for module-level details: `rpgchat::`.
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{error, info, warn};

use rpgchat::chat::ChatServer;
use rpgchat::config::Config;
use rpgchat::fonts::Fonts;
use rpgchat::game::{load_world_from_json, Rules, World, WorldSummary};

#[derive(Parser)]
#[command(name = "rpgchat")]
#[command(about = "A chat lobby with a shared real-time adventure world")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the chat server
    Start {
        /// TCP port, overriding the config file
        #[arg(short, long)]
        port: Option<u16>,

        /// Bind address, overriding the config file
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Write a default configuration file
    Init,
    /// Load a world document and print a JSON summary
    CheckWorld {
        /// World file; defaults to the configured path
        #[arg(long)]
        path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Some(Config::load_or_default(&cli.config).await?),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Start { port, bind } => {
            let mut config = pre_config.unwrap_or_default();
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            info!("Starting rpgchat v{}", env!("CARGO_PKG_VERSION"));

            let fonts = Fonts::new(config.server.colors);
            let rules = Rules::from_config(&config);
            let world = match load_world_from_json(&config.world.path, config.world.start_cell) {
                Ok(graph) => World::new(graph, rules, fonts),
                Err(e) if !config.world.require_world => {
                    error!(
                        "Failed to load world {}: {} (continuing without a game)",
                        config.world.path, e
                    );
                    World::empty(rules, fonts)
                }
                Err(e) => {
                    return Err(anyhow::anyhow!(
                        "Failed to load world {}: {}",
                        config.world.path,
                        e
                    ))
                }
            };

            let mut server = ChatServer::new(config, world);
            server.bind().await?;
            server.run().await?;
            info!("Server stopped");
        }
        Commands::Init => {
            if std::path::Path::new(&cli.config).exists() {
                warn!("{} already exists; leaving it untouched", cli.config);
                return Ok(());
            }
            Config::create_default(&cli.config).await?;
            info!("Created default configuration at {}", cli.config);
            println!("Edit {} and run `rpgchat start`.", cli.config);
        }
        Commands::CheckWorld { path } => {
            let config = pre_config.unwrap_or_default();
            let path = path.unwrap_or_else(|| config.world.path.clone());
            match load_world_from_json(&path, config.world.start_cell) {
                Ok(graph) => {
                    let summary = WorldSummary::of(&graph);
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                }
                Err(e) => {
                    eprintln!("World {} failed to load: {}", path, e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .map(|c| c.logging.level_filter())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Mirror to the console only when someone is watching it
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}
