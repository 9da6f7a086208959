use std::env;
use std::fs::{self, File};
use std::io;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Session log file, recreated on every start.
pub const LOG_FILE: &str = "card-table-viz.log";

/// Env var that lets wgpu/naga log below `warn`.
pub const WGPU_LOG_VAR: &str = "WGPU_LOG";

fn flag(name: &str) -> bool {
    env::var(name).map(|v| v == "1").unwrap_or(false)
}

/// Filter used when `RUST_LOG` is unset: `info` overall, this crate at
/// `debug`, GPU internals at `warn` unless `gpu_verbose`.
pub fn default_filter(gpu_verbose: bool) -> EnvFilter {
    let gpu_level = if gpu_verbose { "debug" } else { "warn" };
    let directives = format!(
        "info,card_table_viz=debug,wgpu_core={0},wgpu_hal={0},naga={0}",
        gpu_level
    );
    EnvFilter::try_new(&directives).unwrap_or_else(|e| {
        eprintln!("Warning: Bad default log filter '{}': {}", directives, e);
        EnvFilter::new("info")
    })
}

fn open_log_file() -> Option<File> {
    if let Err(e) = fs::remove_file(LOG_FILE) {
        if e.kind() != io::ErrorKind::NotFound {
            eprintln!("Warning: Failed to remove old {}: {}", LOG_FILE, e);
        }
    }
    match File::create(LOG_FILE) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Warning: Logging to console only, cannot create {}: {}", LOG_FILE, e);
            None
        }
    }
}

/// Install the global subscriber: console output plus the session log file.
///
/// `RUST_LOG` replaces [`default_filter`] entirely. Panics are routed
/// through `tracing`, with a backtrace when `RUST_BACKTRACE=1`.
pub fn init_logging() {
    let gpu_verbose = flag(WGPU_LOG_VAR);
    let backtrace = flag("RUST_BACKTRACE");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(gpu_verbose));

    let file_layer = open_log_file().map(|file| {
        fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_file(true)
            .with_line_number(true)
    });
    let file_enabled = file_layer.is_some();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .with(file_layer)
        .init();

    std::panic::set_hook(Box::new(move |info| {
        match info.location() {
            Some(at) => tracing::error!("Panic at {}:{}:{}: {}", at.file(), at.line(), at.column(), info),
            None => tracing::error!("Panic: {}", info),
        }
        if backtrace {
            tracing::error!("Backtrace:\n{}", std::backtrace::Backtrace::force_capture());
        }
    }));

    tracing::info!(
        "Logging initialized (file: {}, wgpu verbose: {})",
        if file_enabled { LOG_FILE } else { "off" },
        gpu_verbose
    );
}

/// Log which GPU adapter was picked.
pub fn log_adapter_info(adapter: &wgpu::Adapter) {
    let info = adapter.get_info();
    tracing::info!(
        "GPU adapter: {} ({:?}, {:?}), driver {} {}",
        info.name,
        info.backend,
        info.device_type,
        info.driver,
        info.driver_info
    );
}
