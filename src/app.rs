use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::config::ViewerSettings;
use crate::diagnostics::{FrameRateMonitor, FrameStats};
use crate::host::{
    DisplayRegistry, FrameScheduler, HostContainer, ManualFrameScheduler, MemoryContainer,
    RedrawScheduler, TextCell, TextDisplay, TitleBar, WindowContainer,
};
use crate::input::key_identifier;
use crate::rendering::scene::layout::load_layout;
use crate::rendering::{HeadlessBackend, RenderBackend, RenderLoop, WgpuBackend};

/// Rotation speed change per `+` / `-` press, in radians per second.
pub const ROTATION_STEP: f32 = 0.25;

/// Frames a headless run renders when no count is given.
pub const DEFAULT_HEADLESS_FRAMES: u64 = 600;

/// Simulated frame spacing for headless runs (60 Hz).
pub const HEADLESS_FRAME_INTERVAL_MS: f64 = 1000.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Window,
    Headless { frames: u64 },
}

impl RunMode {
    /// Parse command-line arguments (program name excluded).
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> anyhow::Result<Self> {
        let mut mode = RunMode::Window;
        let mut iter = args.iter().map(|arg| AsRef::<str>::as_ref(arg)).peekable();
        while let Some(arg) = iter.next() {
            match arg {
                "--headless" => {
                    let frames = match iter.peek() {
                        Some(next) if !next.starts_with("--") => {
                            let count = next
                                .parse::<u64>()
                                .with_context(|| format!("Invalid frame count '{}'", next))?;
                            iter.next();
                            count
                        }
                        _ => DEFAULT_HEADLESS_FRAMES,
                    };
                    mode = RunMode::Headless { frames };
                }
                other => bail!("Unknown argument '{}'", other),
            }
        }
        Ok(mode)
    }
}

/// Append the configured layout file, if any, to the loop's scene.
fn apply_configured_layout<B, C, S>(render_loop: &mut RenderLoop<B, C, S>, settings: &ViewerSettings)
where
    B: RenderBackend,
    C: HostContainer,
    S: FrameScheduler,
{
    if let Some(path) = settings.scene.layout_path.as_deref() {
        let added = render_loop.scene_mut().apply_layout(load_layout(path));
        info!("Layout {:?}: {} nodes added", path, added);
    }
}

type WindowLoop = RenderLoop<WgpuBackend, WindowContainer, RedrawScheduler>;

/// The windowed viewer.
///
/// Owns the render loop and the frame-rate monitor explicitly; both are
/// created when the event loop resumes and disposed on close.
pub struct ViewerApp {
    settings: ViewerSettings,
    window: Option<Arc<Window>>,
    render_loop: Option<WindowLoop>,
    monitor: Option<FrameRateMonitor>,
    displays: DisplayRegistry,
    started: Instant,
    error: Option<anyhow::Error>,
}

impl ViewerApp {
    pub fn new(settings: ViewerSettings) -> Self {
        Self {
            settings,
            window: None,
            render_loop: None,
            monitor: None,
            displays: DisplayRegistry::new(),
            started: Instant::now(),
            error: None,
        }
    }

    /// The error that stopped the event loop, if any.
    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.error.take()
    }

    fn init_window(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_settings = &self.settings.window;
        let attributes = Window::default_attributes()
            .with_title(window_settings.title.clone())
            .with_inner_size(PhysicalSize::new(window_settings.width, window_settings.height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("Failed to create window")?,
        );

        let title_bar = TitleBar::new(window.clone(), window_settings.title.clone());
        self.displays
            .register(self.settings.hud.fps_display.clone(), Rc::new(title_bar.segment("FPS ", "")));
        self.displays.register(
            self.settings.hud.frame_time_display.clone(),
            Rc::new(title_bar.segment("", " ms")),
        );
        let monitor = FrameRateMonitor::new(
            &self.displays,
            &self.settings.hud.fps_display,
            &self.settings.hud.frame_time_display,
        )?;

        let backend = pollster::block_on(WgpuBackend::new(window.clone(), window_settings.vsync))?;
        let mut render_loop = RenderLoop::new(
            backend,
            WindowContainer::new(window.clone()),
            RedrawScheduler::new(window.clone()),
            &self.settings,
        )?;
        apply_configured_layout(&mut render_loop, &self.settings);
        render_loop.start()?;

        self.window = Some(window);
        self.monitor = Some(monitor);
        self.render_loop = Some(render_loop);
        self.started = Instant::now();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("Viewer error: {:#}", err);
        self.shutdown();
        self.error = Some(err);
        event_loop.exit();
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        let Some(key) = key_identifier(&event.logical_key) else {
            return;
        };
        if key == "Escape" {
            if event.state == ElementState::Pressed {
                self.shutdown();
                event_loop.exit();
            }
            return;
        }
        let Some(render_loop) = self.render_loop.as_mut() else {
            return;
        };

        match event.state {
            ElementState::Pressed => {
                let result = match key.as_str() {
                    "+" | "=" => {
                        let speed = render_loop.rotation_speed() + ROTATION_STEP;
                        render_loop.set_rotation_speed(speed)
                    }
                    "-" => {
                        let speed = render_loop.rotation_speed() - ROTATION_STEP;
                        render_loop.set_rotation_speed(speed)
                    }
                    " " if !event.repeat => {
                        if render_loop.is_running() {
                            render_loop.stop()
                        } else {
                            render_loop.start()
                        }
                    }
                    _ => {
                        render_loop.key_down(&key);
                        Ok(())
                    }
                };
                if let Err(e) = result {
                    warn!("Key '{}' ignored: {}", key, e);
                }
            }
            ElementState::Released => render_loop.key_up(&key),
        }
    }

    fn redraw(&mut self) -> anyhow::Result<()> {
        let (Some(render_loop), Some(monitor)) = (self.render_loop.as_mut(), self.monitor.as_mut())
        else {
            return Ok(());
        };
        let Some(handle) = render_loop.scheduler_mut().take_pending() else {
            // Redraw requested by the platform, not by the loop
            return Ok(());
        };
        let timestamp_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        if render_loop.on_frame(handle, timestamp_ms)? {
            monitor.update(timestamp_ms);
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(mut render_loop) = self.render_loop.take() {
            render_loop.dispose();
        }
        if let Some(mut monitor) = self.monitor.take() {
            monitor.dispose();
        }
        self.window = None;
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.render_loop.is_some() || self.error.is_some() {
            return;
        }
        if let Err(e) = self.init_window(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map_or(true, |w| w.id() != window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested");
                self.shutdown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(render_loop) = self.render_loop.as_mut() {
                    if render_loop.container().has_resize_listeners() {
                        debug!("Window resized to {}x{}", size.width, size.height);
                        if let Err(e) = render_loop.handle_resize() {
                            warn!("Resize ignored: {}", e);
                        }
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(event_loop, &event),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.redraw() {
                    self.fail(event_loop, e);
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

/// Open the window and run until it is closed.
pub fn run_window(settings: ViewerSettings) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = ViewerApp::new(settings);
    event_loop.run_app(&mut app)?;

    match app.take_error() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// What a headless run measured.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessReport {
    pub frames_rendered: u64,
    pub stats: FrameStats,
    pub fps_text: String,
    pub frame_time_text: String,
}

/// Drive the loop with the in-memory host and a simulated 60 Hz clock.
pub fn run_headless(settings: &ViewerSettings, frames: u64) -> anyhow::Result<HeadlessReport> {
    let fps_cell = Rc::new(TextCell::new());
    let frame_time_cell = Rc::new(TextCell::new());
    let mut displays = DisplayRegistry::new();
    displays.register(settings.hud.fps_display.clone(), fps_cell.clone());
    displays.register(settings.hud.frame_time_display.clone(), frame_time_cell.clone());

    let mut monitor = FrameRateMonitor::new(
        &displays,
        &settings.hud.fps_display,
        &settings.hud.frame_time_display,
    )?;
    let mut render_loop = RenderLoop::new(
        HeadlessBackend::new(),
        MemoryContainer::new(settings.window.width, settings.window.height),
        ManualFrameScheduler::new(),
        settings,
    )?;
    apply_configured_layout(&mut render_loop, settings);
    render_loop.start()?;

    info!("Headless run: {} frames", frames);
    for frame in 0..frames {
        let Some(handle) = render_loop.scheduler_mut().take_pending() else {
            break;
        };
        let timestamp_ms = frame as f64 * HEADLESS_FRAME_INTERVAL_MS;
        if render_loop.on_frame(handle, timestamp_ms)? {
            monitor.update(timestamp_ms);
        }
    }

    let report = HeadlessReport {
        frames_rendered: render_loop.frames_rendered(),
        stats: monitor.stats(),
        fps_text: fps_cell.text(),
        frame_time_text: frame_time_cell.text(),
    };
    info!(
        "Headless run finished: {} frames, {} FPS, {:.2} ms/frame",
        report.frames_rendered, report.stats.fps, report.stats.frame_time_ms
    );

    render_loop.dispose();
    monitor.dispose();
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_window_mode() {
        let args: [&str; 0] = [];
        assert_eq!(RunMode::from_args(&args).unwrap(), RunMode::Window);
    }

    #[test]
    fn test_parse_headless_mode() {
        assert_eq!(
            RunMode::from_args(&["--headless"]).unwrap(),
            RunMode::Headless { frames: DEFAULT_HEADLESS_FRAMES }
        );
        assert_eq!(
            RunMode::from_args(&["--headless", "120"]).unwrap(),
            RunMode::Headless { frames: 120 }
        );
        assert!(RunMode::from_args(&["--headless", "many"]).is_err());
        assert!(RunMode::from_args(&["--fullscreen"]).is_err());
    }

    #[test]
    fn test_headless_run_reports_sixty_fps() {
        let report = run_headless(&ViewerSettings::default(), 120).unwrap();
        assert_eq!(report.frames_rendered, 120);
        assert!(report.stats.fps >= 59 && report.stats.fps <= 61);
        assert!(!report.fps_text.is_empty());
        assert!(report.fps_text.chars().all(|c| c.is_ascii_digit()));
    }
}
