//! Frame-rate monitor
//!
//! Turns a stream of monotonic frame timestamps into a smoothed FPS and
//! frame-time readout. Statistics are recomputed every frame over a
//! 60-sample rolling window; the readout is written to the host displays at
//! most once per second.

use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use super::{DiagnosticsError, DiagnosticsResult};
use crate::host::{DisplayRegistry, TextDisplay};

/// Number of frame deltas kept in the rolling window.
pub const FRAME_SAMPLE_WINDOW: usize = 60;

/// Minimum time between two display writes, in milliseconds.
pub const DISPLAY_INTERVAL_MS: f64 = 1000.0;

/// Snapshot of the derived statistics.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    pub fps: u32,
    pub frame_time_ms: f64,
    pub samples: usize,
}

pub struct FrameRateMonitor {
    fps_display: Rc<dyn TextDisplay>,
    frame_time_display: Rc<dyn TextDisplay>,
    samples: VecDeque<f64>,
    last_timestamp: Option<f64>,
    last_display_update: Option<f64>,
    current_fps: u32,
    current_frame_time: f64,
}

impl FrameRateMonitor {
    /// Resolve both displays and build a monitor in its zero state.
    ///
    /// Fails with [`DiagnosticsError::NotFound`] if either identifier is
    /// unknown to the registry.
    pub fn new(
        registry: &DisplayRegistry,
        fps_display_id: &str,
        frame_time_display_id: &str,
    ) -> DiagnosticsResult<Self> {
        let fps_display = registry
            .resolve(fps_display_id)
            .ok_or_else(|| DiagnosticsError::NotFound { id: fps_display_id.to_string() })?;
        let frame_time_display = registry
            .resolve(frame_time_display_id)
            .ok_or_else(|| DiagnosticsError::NotFound { id: frame_time_display_id.to_string() })?;

        debug!(
            "Frame-rate monitor bound to displays '{}' and '{}'",
            fps_display_id, frame_time_display_id
        );

        Ok(Self {
            fps_display,
            frame_time_display,
            samples: VecDeque::with_capacity(FRAME_SAMPLE_WINDOW),
            last_timestamp: None,
            last_display_update: None,
            current_fps: 0,
            current_frame_time: 0.0,
        })
    }

    /// Record a frame at `timestamp_ms`.
    ///
    /// Timestamps are expected to be non-decreasing. A negative delta is
    /// recorded as zero.
    pub fn update(&mut self, timestamp_ms: f64) {
        if let Some(last) = self.last_timestamp {
            let delta = (timestamp_ms - last).max(0.0);
            if self.samples.len() == FRAME_SAMPLE_WINDOW {
                self.samples.pop_front();
            }
            self.samples.push_back(delta);

            let average = self.average();
            self.current_frame_time = average;
            self.current_fps = if average > 0.0 {
                (1000.0 / average).round() as u32
            } else {
                0
            };
        }
        self.last_timestamp = Some(timestamp_ms);

        if self.display_due(timestamp_ms) {
            self.write_displays();
            self.last_display_update = Some(timestamp_ms);
        }
    }

    pub fn current_fps(&self) -> u32 {
        self.current_fps
    }

    /// Average frame time in milliseconds, `0.0` before the first delta.
    pub fn current_frame_time(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.current_frame_time
        }
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            fps: self.current_fps(),
            frame_time_ms: self.current_frame_time(),
            samples: self.sample_count(),
        }
    }

    /// Reset to the zero state and show `0` on both displays.
    pub fn dispose(&mut self) {
        self.samples.clear();
        self.last_timestamp = None;
        self.last_display_update = None;
        self.current_fps = 0;
        self.current_frame_time = 0.0;
        self.fps_display.set_text("0");
        self.frame_time_display.set_text("0");
        debug!("Frame-rate monitor reset");
    }

    fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    fn display_due(&self, timestamp_ms: f64) -> bool {
        if self.samples.is_empty() {
            return false;
        }
        match self.last_display_update {
            None => true,
            Some(last) => timestamp_ms - last >= DISPLAY_INTERVAL_MS,
        }
    }

    fn write_displays(&self) {
        let fps = self.current_fps.to_string();
        let frame_time = format!("{:.2}", self.average());
        trace!("Frame stats: {} fps, {} ms", fps, frame_time);
        self.fps_display.set_text(&fps);
        self.frame_time_display.set_text(&frame_time);
    }
}

impl fmt::Debug for FrameRateMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameRateMonitor")
            .field("samples", &self.samples.len())
            .field("last_timestamp", &self.last_timestamp)
            .field("last_display_update", &self.last_display_update)
            .field("current_fps", &self.current_fps)
            .field("current_frame_time", &self.current_frame_time)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::TextCell;

    fn monitor() -> (FrameRateMonitor, Rc<TextCell>, Rc<TextCell>) {
        let fps = Rc::new(TextCell::new());
        let frame_time = Rc::new(TextCell::new());
        let mut registry = DisplayRegistry::new();
        registry.register("fps", fps.clone());
        registry.register("frame-time", frame_time.clone());
        let monitor = FrameRateMonitor::new(&registry, "fps", "frame-time").unwrap();
        (monitor, fps, frame_time)
    }

    #[test]
    fn test_first_update_only_records_timestamp() {
        let (mut monitor, fps, _) = monitor();
        monitor.update(5000.0);
        assert_eq!(monitor.current_fps(), 0);
        assert_eq!(monitor.current_frame_time(), 0.0);
        assert_eq!(monitor.sample_count(), 0);
        assert_eq!(fps.write_count(), 0);
    }

    #[test]
    fn test_second_update_computes_fps() {
        let (mut monitor, _, _) = monitor();
        monitor.update(0.0);
        monitor.update(20.0);
        assert_eq!(monitor.sample_count(), 1);
        assert_eq!(monitor.current_fps(), 50);
        assert!((monitor.current_frame_time() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_deltas_give_zero_fps() {
        let (mut monitor, _, _) = monitor();
        monitor.update(100.0);
        monitor.update(100.0);
        monitor.update(100.0);
        assert_eq!(monitor.current_fps(), 0);
        assert_eq!(monitor.current_frame_time(), 0.0);
    }

    #[test]
    fn test_negative_delta_is_clamped() {
        let (mut monitor, _, _) = monitor();
        monitor.update(100.0);
        monitor.update(90.0);
        assert_eq!(monitor.sample_count(), 1);
        assert_eq!(monitor.current_frame_time(), 0.0);
    }

    #[test]
    fn test_window_evicts_oldest() {
        let (mut monitor, _, _) = monitor();
        let mut t = 0.0;
        monitor.update(t);
        // One slow frame followed by a full window of fast ones.
        t += 100.0;
        monitor.update(t);
        for _ in 0..FRAME_SAMPLE_WINDOW {
            t += 10.0;
            monitor.update(t);
        }
        assert_eq!(monitor.sample_count(), FRAME_SAMPLE_WINDOW);
        assert!((monitor.current_frame_time() - 10.0).abs() < 1e-9);
        assert_eq!(monitor.current_fps(), 100);
    }

    #[test]
    fn test_display_throttled_to_once_per_second() {
        let (mut monitor, fps, frame_time) = monitor();
        for i in 0..=120 {
            monitor.update(i as f64 * 10.0);
        }
        // First write at t=10, then t=1010; t=1200 is the last frame.
        assert_eq!(fps.write_count(), 2);
        assert_eq!(frame_time.write_count(), 2);
        assert_eq!(fps.text(), "100");
        assert_eq!(frame_time.text(), "10.00");
    }

    #[test]
    fn test_dispose_resets_and_zeroes_displays() {
        let (mut monitor, fps, frame_time) = monitor();
        monitor.update(0.0);
        monitor.update(16.0);
        monitor.dispose();
        assert_eq!(monitor.stats(), FrameStats::default());
        assert_eq!(fps.text(), "0");
        assert_eq!(frame_time.text(), "0");

        // After a reset the next update is a first update again.
        monitor.update(5000.0);
        assert_eq!(monitor.sample_count(), 0);
    }

    #[test]
    fn test_missing_display_is_not_found() {
        let registry = DisplayRegistry::new();
        let err = FrameRateMonitor::new(&registry, "fps", "frame-time").unwrap_err();
        assert_eq!(err, DiagnosticsError::NotFound { id: "fps".to_string() });
    }
}
