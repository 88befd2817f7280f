use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use prochelper_process::{HelperConfig, KillStatus, ProcessHelper};

#[cfg(windows)]
const DEFAULT_PROGRAM: &str = "notepad";
#[cfg(windows)]
const DEFAULT_ARGS: &str = r"C:\Windows\System32\drivers\etc\hosts";

#[cfg(not(windows))]
const DEFAULT_PROGRAM: &str = "sleep";
#[cfg(not(windows))]
const DEFAULT_ARGS: &str = "300";

/// Start a hidden process, check it is running, then kill it by name
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Program to launch
    #[arg(long, default_value = DEFAULT_PROGRAM)]
    program: String,

    /// Raw argument string passed to the program
    #[arg(long, default_value = DEFAULT_ARGS)]
    args: String,

    /// Process name to check and kill (defaults to the program's file stem)
    #[arg(long)]
    name: Option<String>,

    /// Launch in background mode (stdout captured) instead of hidden mode
    #[arg(long)]
    background: bool,

    /// Milliseconds to wait for each killed process to exit (overrides config)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Configuration file path (YAML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    initialize_logging(args.debug);

    let mut config = match &args.config {
        Some(path) => HelperConfig::load_from_file(path)?,
        None => HelperConfig::default(),
    };
    if let Some(timeout_ms) = args.timeout_ms {
        config.kill_timeout = Duration::from_millis(timeout_ms);
    }

    let name = match &args.name {
        Some(name) => name.clone(),
        None => process_name_for(&args.program)?,
    };

    let helper = ProcessHelper::new().configure(config);

    info!("Step 1: create and start process '{}'", args.program);
    let descriptor = if args.background {
        helper.create_background_descriptor(&args.program, &args.args)
    } else {
        helper.create_hidden_descriptor(&args.program, &args.args)
    };
    let mut child = descriptor.spawn()?;

    info!("Step 2: check whether '{}' is running", name);
    let running = helper.is_running(&name)?;
    info!("Process '{}' running: {}", name, running);

    info!("Step 3: kill all processes named '{}'", name);
    let outcomes = helper.kill_all_with_outcomes(&name, helper.config().kill_timeout)?;
    for outcome in &outcomes {
        match outcome.status {
            KillStatus::TimedOut => warn!("PID {}: still running after timeout", outcome.pid),
            status => info!("PID {}: {:?}", outcome.pid, status),
        }
    }

    // Reap our own child so it does not linger as a zombie
    match child.try_wait() {
        Ok(Some(status)) => info!("Started process exited: {}", status),
        Ok(None) => warn!("Started process (PID {}) is still running", child.id()),
        Err(e) => warn!("Failed to query started process: {}", e),
    }

    info!("Demo complete");
    Ok(())
}

fn process_name_for(program: &str) -> Result<String> {
    Path::new(program)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .with_context(|| format!("Cannot derive a process name from '{}'", program))
}

fn initialize_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_target(false)
        .init();
}
