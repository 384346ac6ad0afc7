//! # Placemat Demo
//!
//! Headless demo binary: plays a placement scenario and logs the run.

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use placemat_demo::{CliArgs, DemoConfig, PlacementApp, Scenario};
use placemat_session::SessionError;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "placemat_demo=info,placemat_session=info,placemat_core=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Placemat demo");

    let config = DemoConfig::from(CliArgs::parse());

    let scenario = match config.script {
        Some(ref path) => {
            tracing::info!("Loading scenario from {}", path.display());
            Scenario::load(path)?
        }
        None => {
            tracing::info!("Playing the built-in scenario");
            Scenario::builtin()
        }
    };

    let mut app = match PlacementApp::new(&config, scenario) {
        Ok(app) => app,
        Err(err) => {
            if matches!(
                err.downcast_ref::<SessionError>(),
                Some(SessionError::Unsupported)
            ) {
                tracing::warn!("World tracking unavailable on this platform, nothing to run");
                return Ok(());
            }
            return Err(err);
        }
    };

    if config.realtime {
        tracing::info!("Running {} frames at {} fps", config.frames, config.fps);
        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(app.run_paced(config.frames));
    } else {
        app.run(config.frames);
    }

    tracing::info!(
        "Run finished after {} frames: state {:?}, {} objects placed, status \"{}\"",
        app.frame(),
        app.placement().app_state(),
        app.placement().placed_objects().len(),
        app.placement().status_text()
    );

    if config.stats {
        let stats = app.session().stats();
        tracing::info!(
            "Frame statistics: {} frames, avg {:.2} ms, peak {:.2} ms",
            stats.frames,
            stats.avg_frame_time_ms,
            stats.peak_frame_time_ms
        );
    }

    if let Some(ref path) = config.dump_scene {
        std::fs::write(path, app.scene_json()?)?;
        tracing::info!("Scene written to {}", path.display());
    }

    tracing::info!("Placemat demo exited");
    Ok(())
}
