//! theme-changer: read, set, and watch the theme preference

mod config;

use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use theme_changer_core::{ThemeChangeEvent, ThemeController};
use theme_changer_desktop::desktop_controller;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "theme-changer", version, about = "Light/dark/system theme preference")]
struct Cli {
    /// Config file (defaults to ./theme-changer.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// App id scoping the settings file
    #[arg(long, global = true)]
    app_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the stored preference (light, dark or system)
    Get,
    /// Store a preference and print the emitted change event
    Set {
        /// light, dark or system
        theme: String,
    },
    /// Print the effective theme (light or dark)
    Effective,
    /// Print the OS theme (light or dark)
    System,
    /// Print a JSON line for every theme change
    Watch {
        /// Poll interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Stop after this many seconds
        #[arg(long)]
        duration_secs: Option<u64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::load_from_dir(&std::env::current_dir()?)?,
    };
    if let Some(app_id) = cli.app_id {
        config.app_id = app_id;
    }
    if let Command::Watch {
        interval_ms: Some(interval_ms),
        ..
    } = &cli.command
    {
        config.watcher.interval_ms = *interval_ms;
    }

    let controller = desktop_controller(
        &config.app_id,
        config.controller.clone(),
        config.watcher.clone(),
    )
    .context("Failed to set up desktop theme controller")?;

    match cli.command {
        Command::Get => println!("{}", controller.get_theme()),
        Command::Effective => println!("{}", controller.get_effective_theme()),
        Command::System => println!("{}", controller.get_system_theme()),
        Command::Set { theme } => {
            let sub = controller.add_listener(print_event);
            controller
                .set_theme_str(&theme)
                .with_context(|| format!("Cannot set theme {theme:?}"))?;
            sub.remove();
        }
        Command::Watch { duration_secs, .. } => {
            watch(&controller, duration_secs.map(Duration::from_secs));
        }
    }

    Ok(())
}

fn watch(controller: &ThemeController, duration: Option<Duration>) {
    let (tx, rx) = mpsc::channel::<ThemeChangeEvent>();
    let sub = controller.add_listener(move |event| {
        let _ = tx.send(*event);
    });

    controller.initialize();
    info!(
        "Watching theme changes (preference {}, effective {})",
        controller.get_theme(),
        controller.get_effective_theme()
    );

    let deadline = duration.map(|d| Instant::now() + d);
    loop {
        let received = match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }
                match rx.recv_timeout(remaining) {
                    Ok(event) => Some(event),
                    Err(mpsc::RecvTimeoutError::Timeout) => None,
                    Err(mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
            None => match rx.recv() {
                Ok(event) => Some(event),
                Err(_) => break,
            },
        };

        if let Some(event) = received {
            print_event(&event);
        }
    }

    sub.remove();
    controller.teardown();
}

fn print_event(event: &ThemeChangeEvent) {
    match serde_json::to_string(event) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!("Failed to encode event: {}", e),
    }
}
