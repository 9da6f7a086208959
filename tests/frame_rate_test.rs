use std::rc::Rc;

use card_table_viz::diagnostics::{DiagnosticsError, FrameRateMonitor, FRAME_SAMPLE_WINDOW};
use card_table_viz::host::{DisplayRegistry, TextCell, TextDisplay};

struct Fixture {
    registry: DisplayRegistry,
    fps: Rc<TextCell>,
    frame_time: Rc<TextCell>,
}

fn fixture() -> Fixture {
    let fps = Rc::new(TextCell::new());
    let frame_time = Rc::new(TextCell::new());
    let mut registry = DisplayRegistry::new();
    registry.register("fps", fps.clone());
    registry.register("frame-time", frame_time.clone());
    Fixture {
        registry,
        fps,
        frame_time,
    }
}

fn monitor(fixture: &Fixture) -> FrameRateMonitor {
    FrameRateMonitor::new(&fixture.registry, "fps", "frame-time").unwrap()
}

fn drive(monitor: &mut FrameRateMonitor, spacing_ms: f64, frames: usize) {
    for i in 0..frames {
        monitor.update(i as f64 * spacing_ms);
    }
}

fn is_decimal(text: &str) -> bool {
    let mut dots = 0;
    for c in text.chars() {
        if c == '.' {
            dots += 1;
        } else if !c.is_ascii_digit() {
            return false;
        }
    }
    !text.is_empty() && dots <= 1
}

#[test]
fn test_sixty_hz_reads_about_sixty_fps() {
    let fixture = fixture();
    let mut monitor = monitor(&fixture);
    drive(&mut monitor, 16.67, 120);
    let fps = monitor.current_fps();
    assert!(fps > 55 && fps < 65, "fps = {}", fps);
    assert!((monitor.current_frame_time() - 16.67).abs() < 0.01);
}

#[test]
fn test_thirty_hz_reads_about_thirty_fps() {
    let fixture = fixture();
    let mut monitor = monitor(&fixture);
    drive(&mut monitor, 33.33, 90);
    let fps = monitor.current_fps();
    assert!(fps > 28 && fps < 32, "fps = {}", fps);
}

#[test]
fn test_single_update_reports_zero() {
    let fixture = fixture();
    let mut monitor = monitor(&fixture);
    monitor.update(1234.0);
    assert_eq!(monitor.current_fps(), 0);
    assert_eq!(monitor.current_frame_time(), 0.0);
    assert_eq!(monitor.sample_count(), 0);
    assert_eq!(fixture.fps.write_count(), 0);
}

#[test]
fn test_window_never_exceeds_sixty_samples() {
    let fixture = fixture();
    let mut monitor = monitor(&fixture);
    for i in 0..500 {
        monitor.update(i as f64 * 10.0);
        assert!(monitor.sample_count() <= FRAME_SAMPLE_WINDOW);
    }
    assert_eq!(monitor.sample_count(), FRAME_SAMPLE_WINDOW);
}

#[test]
fn test_average_tracks_the_recent_window() {
    let fixture = fixture();
    let mut monitor = monitor(&fixture);
    // 60 slow frames, then 60 fast ones push them all out.
    let mut t = 0.0;
    monitor.update(t);
    for _ in 0..60 {
        t += 50.0;
        monitor.update(t);
    }
    assert_eq!(monitor.current_fps(), 20);
    for _ in 0..60 {
        t += 10.0;
        monitor.update(t);
    }
    assert_eq!(monitor.current_fps(), 100);
}

#[test]
fn test_display_writes_are_throttled() {
    let fixture = fixture();
    let mut monitor = monitor(&fixture);
    drive(&mut monitor, 16.67, 60);

    // One write as soon as there is a sample; the next is due a second later.
    assert_eq!(fixture.fps.write_count(), 1);
    assert_eq!(fixture.frame_time.write_count(), 1);
    assert!(fixture.fps.text().chars().all(|c| c.is_ascii_digit()));
    assert!(is_decimal(&fixture.frame_time.text()));

    for i in 60..200 {
        monitor.update(i as f64 * 16.67);
    }
    // 200 frames span ~3.3 s: writes at ~0 s, ~1 s, ~2 s and ~3 s.
    assert!(fixture.fps.write_count() >= 3 && fixture.fps.write_count() <= 4);
    assert_eq!(fixture.fps.text(), "60");
    assert_eq!(fixture.frame_time.text(), "16.67");
}

#[test]
fn test_dispose_resets_and_is_idempotent() {
    let fixture = fixture();
    let mut monitor = monitor(&fixture);
    drive(&mut monitor, 16.67, 30);

    monitor.dispose();
    assert_eq!(monitor.current_fps(), 0);
    assert_eq!(monitor.current_frame_time(), 0.0);
    assert_eq!(monitor.sample_count(), 0);
    assert_eq!(fixture.fps.text(), "0");
    assert_eq!(fixture.frame_time.text(), "0");

    monitor.dispose();
    assert_eq!(monitor.current_fps(), 0);
    assert_eq!(fixture.fps.text(), "0");
}

#[test]
fn test_missing_display_fails_construction() {
    let fixture = fixture();
    let err = FrameRateMonitor::new(&fixture.registry, "fps", "latency").unwrap_err();
    assert_eq!(err, DiagnosticsError::NotFound { id: "latency".to_string() });

    let err = FrameRateMonitor::new(&DisplayRegistry::new(), "fps", "frame-time").unwrap_err();
    assert_eq!(err, DiagnosticsError::NotFound { id: "fps".to_string() });
}
