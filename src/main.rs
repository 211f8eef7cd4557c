//! strata — inspect layered properties configuration.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use std::process;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::args::{Cli, Command, ContextArgs};
use strata::constants;
use strata::env::Env;
use strata::{LayeredConfig, ProcessContext};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Layers { file } => run_layers(&cli.context, &file),
        Command::Get { file, key, list } => run_get(&cli.context, &file, &key, list),
        Command::Dump { file, json } => run_dump(&cli.context, &file, json),
        Command::Watch {
            file,
            key,
            interval,
        } => run_watch(&cli.context, &file, &key, interval).await,
        Command::Version => run_version(),
    }
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Build a config for inspection. One-shot commands never refresh.
fn load(args: &ContextArgs, file: &str, refresh_interval: Duration) -> LayeredConfig {
    let context = args.apply(ProcessContext::from_env(&Env::real()));
    LayeredConfig::builder(file)
        .context(context)
        .resource_path(args.resource_path())
        .refresh_interval(refresh_interval)
        .build()
}

fn run_layers(args: &ContextArgs, file: &str) -> Result<()> {
    let config = load(args, file, Duration::ZERO);
    print!("{}", cli::render_report(config.report()));
    Ok(())
}

fn run_get(args: &ContextArgs, file: &str, key: &str, list: bool) -> Result<()> {
    let config = load(args, file, Duration::ZERO);
    let Some((layer, values)) = config.lookup(key) else {
        bail!("key '{key}' not found in any layer of {file}");
    };

    if list {
        for value in &values {
            println!("{value}");
        }
    } else {
        let value = config.get_string(key)?;
        println!("{value}");
    }
    eprintln!("{}", format!("from {layer} layer").dimmed());
    Ok(())
}

fn run_dump(args: &ContextArgs, file: &str, json: bool) -> Result<()> {
    let config = load(args, file, Duration::ZERO);
    let entries = cli::collect_dump(&config);

    if json {
        let rendered =
            serde_json::to_string_pretty(&entries).context("failed to serialize config dump")?;
        println!("{rendered}");
    } else {
        print!("{}", cli::render_dump(&entries));
    }
    Ok(())
}

async fn run_watch(args: &ContextArgs, file: &str, key: &str, interval: u64) -> Result<()> {
    if interval == 0 {
        bail!("--interval must be at least 1 second");
    }
    let config = load(args, file, Duration::from_secs(interval));
    let mut last = config.lookup(key);
    print_watched(key, last.as_ref());

    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let current = config.lookup(key);
                if current != last {
                    print_watched(key, current.as_ref());
                    last = current;
                }
            }
        }
    }

    config.close();
    Ok(())
}

fn print_watched(key: &str, value: Option<&(strata::Layer, Vec<String>)>) {
    match value {
        Some((layer, values)) => println!(
            "{key} = {}  {}",
            values.join(", "),
            format!("[{layer}]").dimmed()
        ),
        None => println!("{key} {}", "(unset)".yellow()),
    }
}

/// Print detailed version and build information.
fn run_version() -> Result<()> {
    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    println!("{}     {}", "target:".dimmed(), constants::TARGET);
    Ok(())
}
