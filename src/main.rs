use std::sync::Arc;

use clap::Parser;
use tracing::{Level, error};

use detectview::{Config, Detector, Session, YoloDetector};

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();
}

/// Load, detect and optionally save without opening a window
fn run_headless(config: &Config, detector: &dyn Detector) -> anyhow::Result<()> {
    let Some(input) = &config.input else {
        anyhow::bail!("headless mode needs --input");
    };

    let mut session = Session::new(config.rename.clone());
    session.load(input)?;
    println!("{}", session.detect(detector)?);

    if let Some(output) = &config.output {
        let saved = session.save(output)?;
        println!("Saved annotated image to {}", saved.display());
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_tracing(config.verbose);

    let detector = YoloDetector::new(config.detector_config());

    if config.input.is_some() {
        let detector = detector?;
        return run_headless(&config, &detector);
    }

    // The window still opens without a model; Detect reports why it failed
    let detector: Result<Arc<dyn Detector>, String> = match detector {
        Ok(detector) => Ok(Arc::new(detector)),
        Err(e) => {
            error!("{}", e);
            Err(e.to_string())
        }
    };

    run_gui(detector, config)
}

#[cfg(feature = "gui")]
fn run_gui(detector: Result<Arc<dyn Detector>, String>, config: Config) -> anyhow::Result<()> {
    detectview::gui::run(detector, config.rename)?;
    tracing::info!("Window closed");
    Ok(())
}

#[cfg(not(feature = "gui"))]
fn run_gui(_detector: Result<Arc<dyn Detector>, String>, _config: Config) -> anyhow::Result<()> {
    anyhow::bail!("built without the `gui` feature; use --input for headless mode")
}
