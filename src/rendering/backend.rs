//! The seam between the render loop and the 3D engine.

use std::collections::BTreeMap;

use cgmath::Point3;
use tracing::{debug, trace};

use super::{Camera, RenderError, RenderResult, Scene};
use crate::host::SurfaceId;

/// Operations the render loop needs from a 3D engine.
pub trait RenderBackend {
    /// Create a drawable surface of the given size.
    fn create_surface(&mut self, width: u32, height: u32) -> RenderResult<SurfaceId>;

    /// Resize a surface. Zero-area sizes are ignored.
    fn resize_surface(&mut self, surface: SurfaceId, width: u32, height: u32);

    /// Draw one frame of `scene` as seen by `camera`.
    fn draw(&mut self, surface: SurfaceId, scene: &Scene, camera: &Camera) -> RenderResult<()>;

    fn release_surface(&mut self, surface: SurfaceId);

    /// Release every engine resource still held.
    fn release(&mut self);
}

/// What the headless backend saw on its most recent draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub surface: SurfaceId,
    pub aspect: f32,
    pub eye: Point3<f32>,
    pub shader_time: f32,
    pub spin_angle: f32,
    pub node_count: usize,
}

/// Backend that renders nothing and records what it was asked to do.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    surfaces: BTreeMap<u64, (u32, u32)>,
    next_surface: u64,
    draws: u64,
    last_draw: Option<DrawRecord>,
    released: bool,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn surface_size(&self, surface: SurfaceId) -> Option<(u32, u32)> {
        self.surfaces.get(&surface.0).copied()
    }

    pub fn live_surfaces(&self) -> usize {
        self.surfaces.len()
    }

    pub fn draw_count(&self) -> u64 {
        self.draws
    }

    pub fn last_draw(&self) -> Option<&DrawRecord> {
        self.last_draw.as_ref()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_surface(&mut self, width: u32, height: u32) -> RenderResult<SurfaceId> {
        if self.released {
            return Err(RenderError::SurfaceCreation {
                reason: "backend already released".to_string(),
            });
        }
        self.next_surface += 1;
        self.surfaces.insert(self.next_surface, (width, height));
        debug!("Headless surface {} created at {}x{}", self.next_surface, width, height);
        Ok(SurfaceId(self.next_surface))
    }

    fn resize_surface(&mut self, surface: SurfaceId, width: u32, height: u32) {
        if width == 0 || height == 0 {
            debug!("Ignoring zero-area resize to {}x{}", width, height);
            return;
        }
        if let Some(size) = self.surfaces.get_mut(&surface.0) {
            *size = (width, height);
        }
    }

    fn draw(&mut self, surface: SurfaceId, scene: &Scene, camera: &Camera) -> RenderResult<()> {
        if !self.surfaces.contains_key(&surface.0) {
            return Err(RenderError::SurfaceUnavailable { surface });
        }
        self.draws += 1;
        self.last_draw = Some(DrawRecord {
            surface,
            aspect: camera.aspect,
            eye: camera.eye,
            shader_time: scene.shader_time(),
            spin_angle: scene.spin_angle(),
            node_count: scene.nodes().len(),
        });
        trace!("Headless draw #{}", self.draws);
        Ok(())
    }

    fn release_surface(&mut self, surface: SurfaceId) {
        self.surfaces.remove(&surface.0);
    }

    fn release(&mut self) {
        self.surfaces.clear();
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CameraSettings, SceneSettings};

    #[test]
    fn test_zero_area_resize_is_ignored() {
        let mut backend = HeadlessBackend::new();
        let surface = backend.create_surface(800, 600).unwrap();
        backend.resize_surface(surface, 1024, 0);
        assert_eq!(backend.surface_size(surface), Some((800, 600)));
        backend.resize_surface(surface, 1024, 768);
        assert_eq!(backend.surface_size(surface), Some((1024, 768)));
    }

    #[test]
    fn test_draw_requires_live_surface() {
        let mut backend = HeadlessBackend::new();
        let surface = backend.create_surface(800, 600).unwrap();
        let scene = Scene::card_table(&SceneSettings::default());
        let camera = Camera::from_settings(&CameraSettings::default(), 4.0 / 3.0);

        backend.draw(surface, &scene, &camera).unwrap();
        assert_eq!(backend.draw_count(), 1);
        assert_eq!(backend.last_draw().unwrap().node_count, scene.nodes().len());

        backend.release_surface(surface);
        assert!(matches!(
            backend.draw(surface, &scene, &camera),
            Err(RenderError::SurfaceUnavailable { .. })
        ));
    }

    #[test]
    fn test_release_blocks_new_surfaces() {
        let mut backend = HeadlessBackend::new();
        backend.create_surface(10, 10).unwrap();
        backend.release();
        assert_eq!(backend.live_surfaces(), 0);
        assert!(backend.create_surface(10, 10).is_err());
    }
}
