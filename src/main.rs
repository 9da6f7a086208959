use tracing::{info, warn};

use card_table_viz::app::{run_headless, run_window, RunMode};
use card_table_viz::config::{load_settings, ViewerSettings};
use card_table_viz::utils::logging::init_logging;
use card_table_viz::{APP_NAME, VERSION};

fn main() -> anyhow::Result<()> {
    init_logging();
    info!("Starting {} v{}", APP_NAME, VERSION);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = RunMode::from_args(args.as_slice())?;

    let settings = load_settings().unwrap_or_else(|e| {
        warn!("Failed to load settings, using defaults: {:#}", e);
        ViewerSettings::default()
    });

    match mode {
        RunMode::Window => run_window(settings),
        RunMode::Headless { frames } => {
            let report = run_headless(&settings, frames)?;
            println!(
                "{} frames rendered, {} FPS, {:.2} ms/frame",
                report.frames_rendered, report.stats.fps, report.stats.frame_time_ms
            );
            Ok(())
        }
    }
}
