pub mod frame_rate;

pub use frame_rate::{FrameRateMonitor, FrameStats, DISPLAY_INTERVAL_MS, FRAME_SAMPLE_WINDOW};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiagnosticsError {
    #[error("Display target not found: {id}")]
    NotFound { id: String },
}

pub type DiagnosticsResult<T> = Result<T, DiagnosticsError>;
