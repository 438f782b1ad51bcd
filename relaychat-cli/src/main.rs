use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use relaychat_core::{init_logging, ChatConfig, ChatError, CliErrorDisplay, LogTarget};

mod chat;
mod config;
mod printer;

use config::{load_config, CliOverrides};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Parser)]
#[command(name = "relaychat")]
#[command(version = VERSION)]
#[command(about = "relaychat - line-mode client for a Socket.IO chat relay")]
#[command(long_about = r#"
relaychat connects to a chat relay over Socket.IO and turns your terminal
into a chat window: every line you type is sent as one message, every
message the relay broadcasts is printed as `sender: text`.

Press Ctrl+D (end of input) to leave. Settings come from relaychat.toml,
~/.config/relaychat/config.toml and RELAYCHAT_* environment variables.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Relay address, e.g. http://localhost:5000
    #[arg(long, global = true)]
    url: Option<String>,

    /// Extra config file to load on top of the standard ones
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Sender label the relay uses for your own messages
    #[arg(long, global = true)]
    you_label: Option<String>,

    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Chat on stdin/stdout (default)")]
    Chat,

    #[command(about = "Print the effective configuration as JSON")]
    Config,

    #[command(about = "Show version information")]
    Version {
        #[arg(short, long)]
        detailed: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match run(cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<ChatError>() {
                Some(chat_error) => {
                    eprint!("{}: {}", "Error".red().bold(), CliErrorDisplay::new(chat_error))
                }
                None => eprintln!("{}: {:#}", "Error".red().bold(), e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(Commands::Version { detailed }) = cli.command {
        return cmd_version(detailed);
    }

    let overrides = CliOverrides {
        config_file: cli.config,
        url: cli.url,
        you_label: cli.you_label,
        verbose: cli.verbose,
    };
    let config = load_config(&overrides)?;

    match cli.command {
        Some(Commands::Config) => cmd_config(&config),
        _ => {
            let target = LogTarget::resolve(&config.logging, LogTarget::Stderr);
            init_logging(&config.logging, target, "warn")?;
            chat::run_chat(&config).await
        }
    }
}

fn cmd_config(config: &ChatConfig) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

fn cmd_version(detailed: bool) -> anyhow::Result<()> {
    if detailed {
        println!("{}", "relaychat Version Information".cyan().bold());
        println!("{}", "═".repeat(40).dimmed());
        println!("  {:<15} {}", "Version:".bold(), VERSION);
        println!("  {:<15} {}", "Name:".bold(), NAME);
        println!("  {:<15} Apache-2.0", "License:".bold());
        println!("  {:<15} Socket.IO v5 / Engine.IO v4 (websocket)", "Protocol:".bold());
        println!();
        println!("  {}", "Build Information:".bold());
        println!("    Rust Edition: 2021");
        #[cfg(debug_assertions)]
        println!("    Build:        Debug");
        #[cfg(not(debug_assertions))]
        println!("    Build:        Release");
    } else {
        println!("relaychat {}", VERSION);
    }

    Ok(())
}
