//! Application entry point for the orbits viewer.
//!
//! This binary parses the command line, loads a scenario, sets up
//! eframe/egui and delegates drawing and timing to [`Viewer`] from the
//! `viewer` module.

mod viewer;

use anyhow::{Context, Result};
use clap::Parser;
use orbits_core::scenario::ScenarioConfig;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use viewer::Viewer;

#[derive(Parser, Debug)]
#[command(about = "Real-time 2D gravitational n-body viewer")]
struct Args {
    /// YAML scenario to load instead of the built-in three-body scene.
    #[arg(short, long)]
    scenario: Option<PathBuf>,

    /// Start the simulation immediately.
    #[arg(long)]
    autostart: bool,
}

fn load_scenario(path: Option<&PathBuf>) -> Result<ScenarioConfig> {
    let Some(path) = path else {
        return Ok(ScenarioConfig::default_orbits());
    };
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let scenario = ScenarioConfig::from_yaml_reader(BufReader::new(file))
        .with_context(|| format!("reading {}", path.display()))?;
    log::info!(
        "loaded {} bodies from {}",
        scenario.bodies.len(),
        path.display()
    );
    Ok(scenario)
}

/// Starts the native eframe application.
///
/// ### Returns
/// - `Ok(())` if the application runs to completion without errors.
/// - `Err` if the scenario cannot be loaded or eframe fails to create the
///   native window or event loop.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let scenario = load_scenario(args.scenario.as_ref())?;
    let mut viewer = Viewer::new(scenario)?;
    if args.autostart {
        viewer.start();
    }

    let options = eframe::NativeOptions::default();
    eframe::run_native("Orbits", options, Box::new(|_cc| Ok(Box::new(viewer))))
        .map_err(|e| anyhow::anyhow!("eframe failed: {e}"))
}
