// card-table-viz: an animated card table rendered with wgpu

pub mod app;
pub mod config;
pub mod diagnostics;
pub mod host;
pub mod input;
pub mod rendering;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::ViewerSettings;
pub use diagnostics::{DiagnosticsError, FrameRateMonitor};
pub use host::{DisplayRegistry, FrameScheduler, HostContainer, TextDisplay};
pub use rendering::{LifecycleState, RenderBackend, RenderError, RenderLoop};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
