//! sandstorm-rcon client binary
//!
//! Connects, authenticates, then runs a single command, the interactive
//! prompt, and/or scheduled commands.

use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use sandstorm_rcon::schedule::{self, Scheduler};
use sandstorm_rcon::{repl, Config, Session};
use tracing_subscriber::{fmt, EnvFilter};

/// Could not reach the server
const EXIT_CONNECT_FAILED: i32 = 1;

/// Server did not accept the password
const EXIT_AUTH_FAILED: i32 = 2;

/// Schedule file missing or unreadable
const EXIT_SCHEDULE_FAILED: i32 = 3;

/// RCON client
#[derive(Parser, Debug)]
#[command(name = "sandstorm-rcon-client")]
#[command(about = "RCON client for Insurgency: Sandstorm and other Source-style game servers")]
struct Args {
    /// Server IP:Port
    #[arg(short, long, default_value = "127.0.0.1:27015")]
    server: String,

    /// RCON password
    #[arg(short, long, default_value = "")]
    password: String,

    /// RCON command to execute. Omit this for REPL mode.
    #[arg(short, long)]
    command: Option<String>,

    /// Path to crontab file for scheduled commands
    #[arg(short = 'f', long)]
    cronfile: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Disable REPL mode (e.g. when using --cronfile)
    #[arg(short = 'n', long)]
    norepl: bool,

    /// Print version and exit
    #[arg(short = 'v', long)]
    version: bool,
}

fn main() {
    let args = Args::parse();

    if args.version {
        println!("sandstorm-rcon-client {}", sandstorm_rcon::VERSION);
        return;
    }

    init_logging(args.debug);

    let config = Config::builder().server_addr(&args.server).build();

    let mut session = match Session::connect(&config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Error connecting to server: {}", e);
            process::exit(EXIT_CONNECT_FAILED);
        }
    };
    tracing::info!("Connected to server: {}", session.peer());

    if !session.authenticate(&args.password) {
        process::exit(EXIT_AUTH_FAILED);
    }

    let session = session.into_shared();

    let scheduler = match args.cronfile.as_deref() {
        Some(path) => {
            let started = schedule::load_schedule(path)
                .and_then(|entries| Scheduler::start(session.clone(), schedule::compile(entries)));
            match started {
                Ok(scheduler) => {
                    tracing::info!("Crontab running. Press ctrl+c to stop.");
                    Some(scheduler)
                }
                Err(e) => {
                    tracing::error!("Failed to start scheduler: {}", e);
                    process::exit(EXIT_SCHEDULE_FAILED);
                }
            }
        }
        None => None,
    };

    if let Some(command) = args.command.as_deref() {
        if let Err(e) = repl::send_and_print(&session, command, &mut io::stdout()) {
            tracing::error!("Error sending command: {}", e);
        }
    } else if !args.norepl {
        tracing::info!("Entering command REPL. Press ctrl+c or ctrl+d to exit.");
        if let Err(e) = repl::run(&session, io::stdin().lock(), io::stdout()) {
            tracing::error!("REPL error: {}", e);
        }
    }

    // Scheduled commands keep running until the process is interrupted
    if let Some(scheduler) = scheduler {
        scheduler.wait();
    }

    tracing::info!("Exiting");
}

/// Initialize tracing/logging
///
/// `RUST_LOG` overrides the level chosen by `--debug`.
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}
