//! Sway CLI
//!
//! Inspect motion libraries and trace how a motion responds to preset and
//! override changes without running a game.

mod simulate;
mod template;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use sway_core::{Vec2, Vec3};
use sway_motion::{DataKind, MotionLibrary};
use tracing_subscriber::EnvFilter;

use crate::simulate::{print_trace, simulate, ScheduledEvent, SimulateOptions};

/// Spring-driven procedural motion tools
#[derive(Parser, Debug)]
#[command(name = "sway")]
#[command(about = "Inspect motion libraries and trace simulated motion")]
#[command(version)]
struct Cli {
    /// Log broadcaster and solver activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the output of one motion, frame by frame
    Simulate {
        /// Motion kind to simulate
        kind: String,

        /// Motion library (built-in profiles when omitted)
        #[arg(short, long)]
        library: Option<PathBuf>,

        /// Channel dimensions (1, 2 or 3)
        #[arg(short, long, default_value = "3")]
        dims: usize,

        /// Number of host frames to run
        #[arg(short, long, default_value = "240")]
        frames: u32,

        /// Host frame rate
        #[arg(long, default_value = "60")]
        fps: f32,

        /// Fixed simulation rate
        #[arg(long, default_value = "120")]
        hz: f32,

        /// Print every n-th frame
        #[arg(long, default_value = "1")]
        every: u32,

        /// Scheduled change as FRAME:ACTION:NAME (push, pop, override, clear)
        #[arg(short = 'a', long = "at")]
        events: Vec<ScheduledEvent>,
    },

    /// List motion data, presets and defaults in a library
    List {
        /// Motion library (built-in profiles when omitted)
        #[arg(short, long)]
        library: Option<PathBuf>,
    },

    /// Write a starter motion library
    Init {
        /// Output file
        #[arg(default_value = "motion.toml")]
        path: PathBuf,

        /// Template to use (shooter, minimal)
        #[arg(short, long, default_value = "shooter")]
        template: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Simulate {
            kind,
            library,
            dims,
            frames,
            fps,
            hz,
            every,
            events,
        } => {
            let library = load_library(library.as_deref())?;
            let options = SimulateOptions {
                kind: DataKind::from(kind),
                hz,
                fps,
                frames,
                every,
                events,
            };
            cmd_simulate(&library, &options, dims)
        }
        Commands::List { library } => cmd_list(&load_library(library.as_deref())?),
        Commands::Init {
            path,
            template,
            force,
        } => {
            template::create_library(&path, &template, force)?;
            println!("Created {}", path.display());
            Ok(())
        }
    }
}

fn load_library(path: Option<&Path>) -> Result<MotionLibrary> {
    match path {
        Some(path) => MotionLibrary::load(path)
            .with_context(|| format!("Failed to load motion library {}", path.display())),
        None => Ok(MotionLibrary::builtin()),
    }
}

fn cmd_simulate(library: &MotionLibrary, options: &SimulateOptions, dims: usize) -> Result<()> {
    if !(options.fps.is_finite() && options.fps > 0.0) {
        bail!("--fps must be positive, got {}", options.fps);
    }
    tracing::info!(kind = %options.kind, dims, frames = options.frames, "simulating");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match dims {
        1 => print_trace(&mut out, &simulate::<f32>(library, options)?),
        2 => print_trace(&mut out, &simulate::<Vec2>(library, options)?),
        3 => print_trace(&mut out, &simulate::<Vec3>(library, options)?),
        other => bail!("--dims must be 1, 2 or 3, got {other}"),
    }
}

fn cmd_list(library: &MotionLibrary) -> Result<()> {
    println!("Motion data:");
    for name in library.data_names() {
        if let Some(data) = library.data(name) {
            println!(
                "  {name:<28} kind={:<16} channels={}",
                data.kind(),
                data.channels().len()
            );
        }
    }

    println!("Presets:");
    for name in library.preset_names() {
        if let Some(preset) = library.preset(name) {
            let kinds: Vec<&str> = preset.kinds().map(DataKind::as_str).collect();
            println!("  {name:<28} {}", kinds.join(", "));
        }
    }

    println!("Defaults:");
    for data in library.defaults() {
        println!("  {:<28} kind={}", data.name(), data.kind());
    }
    Ok(())
}
