//! Render-loop controller
//!
//! Owns the camera, the scene and the render surface, and drives per-frame
//! rendering through the host's frame scheduler. The lifecycle is a small
//! state machine:
//!
//! ```text
//! Idle --start--> Running --stop--> Idle
//!   \                |
//!    +---dispose-----+----> Disposed (terminal)
//! ```

use tracing::{debug, info, trace};

use super::backend::RenderBackend;
use super::camera::{Camera, CameraController};
use super::scene::Scene;
use super::{RenderError, RenderResult};
use crate::config::ViewerSettings;
use crate::host::{FrameHandle, FrameScheduler, HostContainer, ListenerId, SurfaceId};
use crate::input::KeyState;
use crate::utils::math::aspect_ratio;

/// Lifecycle of a [`RenderLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Constructed or stopped; no frame is scheduled
    #[default]
    Idle,
    /// A frame callback is pending
    Running,
    /// Resources released; terminal
    Disposed,
}

impl LifecycleState {
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;

        match (self, next) {
            (Idle, Running) | (Running, Idle) => true,
            (Idle, Disposed) | (Running, Disposed) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Idle => write!(f, "Idle"),
            LifecycleState::Running => write!(f, "Running"),
            LifecycleState::Disposed => write!(f, "Disposed"),
        }
    }
}

pub struct RenderLoop<B, C, S>
where
    B: RenderBackend,
    C: HostContainer,
    S: FrameScheduler,
{
    backend: B,
    container: C,
    scheduler: S,
    state: LifecycleState,
    surface: SurfaceId,
    resize_listener: Option<ListenerId>,
    pending_frame: Option<FrameHandle>,
    camera: Camera,
    controller: CameraController,
    keys: KeyState,
    scene: Scene,
    last_render: Option<f64>,
    frames_rendered: u64,
}

impl<B, C, S> RenderLoop<B, C, S>
where
    B: RenderBackend,
    C: HostContainer,
    S: FrameScheduler,
{
    /// Create the surface, mount it in `container` and subscribe to resizes.
    ///
    /// A container with zero height yields an aspect ratio of `1.0`.
    pub fn new(
        mut backend: B,
        mut container: C,
        scheduler: S,
        settings: &ViewerSettings,
    ) -> RenderResult<Self> {
        let (width, height) = container.client_size();
        let aspect = aspect_ratio(width, height);

        let surface = backend.create_surface(width, height)?;
        container.append_child(surface);
        let resize_listener = container.add_resize_listener();

        info!(
            "Render loop created: surface {:?} at {}x{} (aspect {:.3})",
            surface, width, height, aspect
        );

        Ok(Self {
            backend,
            container,
            scheduler,
            state: LifecycleState::Idle,
            surface,
            resize_listener: Some(resize_listener),
            pending_frame: None,
            camera: Camera::from_settings(&settings.camera, aspect),
            controller: CameraController::from_settings(&settings.camera),
            keys: KeyState::new(),
            scene: Scene::card_table(&settings.scene),
            last_render: None,
            frames_rendered: 0,
        })
    }

    /// Begin scheduling frames. Starting a running loop does nothing.
    pub fn start(&mut self) -> RenderResult<()> {
        self.ensure_live()?;
        if self.state == LifecycleState::Running {
            debug!("Render loop already running");
            return Ok(());
        }
        self.pending_frame = Some(self.scheduler.request_frame());
        self.transition_to(LifecycleState::Running)
    }

    /// Cancel the pending frame. Stopping an idle loop does nothing.
    pub fn stop(&mut self) -> RenderResult<()> {
        self.ensure_live()?;
        if self.state != LifecycleState::Running {
            return Ok(());
        }
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
        self.transition_to(LifecycleState::Idle)
    }

    /// Host callback for a fired frame request.
    ///
    /// Stale handles and frames arriving while idle are ignored and return
    /// `Ok(false)`. Otherwise the next frame is requested before this one is
    /// rendered.
    pub fn on_frame(&mut self, handle: FrameHandle, timestamp_ms: f64) -> RenderResult<bool> {
        self.ensure_live()?;
        if self.state != LifecycleState::Running || self.pending_frame != Some(handle) {
            debug!("Ignoring stale frame {:?} (state {})", handle, self.state);
            return Ok(false);
        }
        self.pending_frame = Some(self.scheduler.request_frame());
        self.render(timestamp_ms)?;
        Ok(true)
    }

    /// Render one frame at `timestamp_ms`.
    ///
    /// Applies held keys to the camera, advances the shader clock and the
    /// deck rotation by the time since the previous render, then draws.
    /// Works whether or not the loop is running.
    pub fn render(&mut self, timestamp_ms: f64) -> RenderResult<()> {
        self.ensure_live()?;

        let delta_secs = match self.last_render {
            Some(last) => ((timestamp_ms - last) / 1000.0).max(0.0),
            None => 0.0,
        };
        self.last_render = Some(timestamp_ms);

        self.controller.update_camera(&self.keys, &mut self.camera);
        self.scene.advance(delta_secs as f32);
        self.backend.draw(self.surface, &self.scene, &self.camera)?;

        self.frames_rendered += 1;
        trace!("Frame {} rendered at {:.2} ms", self.frames_rendered, timestamp_ms);
        Ok(())
    }

    /// Match camera and surface to the container's current size.
    ///
    /// A zero height gives aspect `1.0`; zero-area sizes leave the surface
    /// at its previous size.
    pub fn handle_resize(&mut self) -> RenderResult<()> {
        self.ensure_live()?;
        let (width, height) = self.container.client_size();
        let aspect = aspect_ratio(width, height);
        self.camera.set_aspect(aspect);
        self.backend.resize_surface(self.surface, width, height);
        debug!("Resized to {}x{} (aspect {:.3})", width, height, aspect);
        Ok(())
    }

    /// Stop, unsubscribe, unmount and release everything. Idempotent.
    pub fn dispose(&mut self) {
        if self.state == LifecycleState::Disposed {
            return;
        }
        if let Some(handle) = self.pending_frame.take() {
            self.scheduler.cancel_frame(handle);
        }
        if let Some(listener) = self.resize_listener.take() {
            self.container.remove_resize_listener(listener);
        }
        self.container.remove_child(self.surface);
        self.backend.release_surface(self.surface);
        self.backend.release();
        self.scene.clear();
        self.keys.clear();

        let previous = self.state;
        self.state = LifecycleState::Disposed;
        info!(
            "Render loop disposed from {} after {} frames",
            previous, self.frames_rendered
        );
    }

    pub fn key_down(&mut self, key: &str) {
        if self.state != LifecycleState::Disposed {
            self.keys.press(key);
        }
    }

    pub fn key_up(&mut self, key: &str) {
        if self.state != LifecycleState::Disposed {
            self.keys.release(key);
        }
    }

    pub fn rotation_speed(&self) -> f32 {
        self.scene.rotation_speed()
    }

    pub fn set_rotation_speed(&mut self, radians_per_sec: f32) -> RenderResult<()> {
        self.ensure_live()?;
        self.scene.set_rotation_speed(radians_per_sec);
        Ok(())
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LifecycleState::Running
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending_frame
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn container(&self) -> &C {
        &self.container
    }

    /// Hosts resize their container through this before calling
    /// [`RenderLoop::handle_resize`].
    pub fn container_mut(&mut self) -> &mut C {
        &mut self.container
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    fn ensure_live(&self) -> RenderResult<()> {
        if self.state == LifecycleState::Disposed {
            Err(RenderError::Disposed)
        } else {
            Ok(())
        }
    }

    fn transition_to(&mut self, next: LifecycleState) -> RenderResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(RenderError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        info!("Render loop: {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }
}

impl<B, C, S> Drop for RenderLoop<B, C, S>
where
    B: RenderBackend,
    C: HostContainer,
    S: FrameScheduler,
{
    fn drop(&mut self) {
        self.dispose();
    }
}
