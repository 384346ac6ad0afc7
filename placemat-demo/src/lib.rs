//! # Placemat Demo
//!
//! Headless demo host for Placemat. It plays a scripted scenario against
//! the simulated tracking backend, drives the placement state machine the
//! way an interactive view would, and logs what the user would see.
//!
//! ## Usage
//!
//! ```bash
//! # Play the built-in scenario as fast as possible
//! cargo run -p placemat-demo
//!
//! # Play a scenario file, paced to 60 fps, with frame statistics
//! cargo run -p placemat-demo -- --script demo.json --realtime --stats
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `DemoConfig` - Run length, pacing, and output options
//! - `Scenario` - World script plus user actions, from JSON or built in
//! - `PlacementApp` - The frame loop between session and state machine

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

mod app;
mod scenario;

pub use app::PlacementApp;
pub use scenario::{Scenario, ScenarioAction, ScenarioStep, UserAction, UserStep};

use std::path::PathBuf;

use clap::Parser;

/// Command-line arguments for the demo binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "placemat-demo")]
#[command(about = "Headless surface-placement demo")]
#[command(version)]
pub struct CliArgs {
    /// Scenario file (JSON). The built-in scenario plays when omitted.
    #[arg(long, env = "PLACEMAT_SCRIPT")]
    pub script: Option<PathBuf>,

    /// Number of frames to run.
    #[arg(long, default_value = "600")]
    pub frames: u64,

    /// Simulated frames per second.
    #[arg(long, default_value = "60")]
    pub fps: u32,

    /// Pace frames to wall-clock time instead of running instantly.
    #[arg(long)]
    pub realtime: bool,

    /// Log frame statistics when the run ends.
    #[arg(long)]
    pub stats: bool,

    /// Write the final scene graph to a JSON file.
    #[arg(long)]
    pub dump_scene: Option<PathBuf>,
}

/// Demo run configuration.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// Scenario file to play, if any.
    pub script: Option<PathBuf>,
    /// Number of frames to run.
    pub frames: u64,
    /// Simulated frames per second.
    pub fps: u32,
    /// Pace frames to wall-clock time.
    pub realtime: bool,
    /// Log frame statistics when the run ends.
    pub stats: bool,
    /// Where to write the final scene graph, if anywhere.
    pub dump_scene: Option<PathBuf>,
}

impl DemoConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            script: None,
            frames: 600,
            fps: 60,
            realtime: false,
            stats: false,
            dump_scene: None,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<CliArgs> for DemoConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            script: args.script,
            frames: args.frames,
            fps: args.fps,
            realtime: args.realtime,
            stats: args.stats,
            dump_scene: args.dump_scene,
        }
    }
}
