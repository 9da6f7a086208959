use bytemuck::{Pod, Zeroable};
use cgmath::SquareMatrix;

use super::{Camera, Scene};

/// Per-frame uniform block shared by the background and table pipelines.
///
/// Layout matches `FrameUniforms` in `table.wgsl` (128 bytes, vec4-aligned).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub light_direction: [f32; 4],
    pub light_color: [f32; 4],
    /// x = ambient, yzw unused
    pub ambient: [f32; 4],
    pub time: f32,
    pub aspect: f32,
    pub _padding: [f32; 2],
}

impl FrameUniforms {
    pub fn new() -> Self {
        Self {
            view_proj: cgmath::Matrix4::<f32>::identity().into(),
            light_direction: [0.0, -1.0, 0.0, 0.0],
            light_color: [1.0, 1.0, 1.0, 0.0],
            ambient: [0.25, 0.0, 0.0, 0.0],
            time: 0.0,
            aspect: 1.0,
            _padding: [0.0; 2],
        }
    }

    pub fn update(&mut self, scene: &Scene, camera: &Camera) {
        self.view_proj = camera.build_view_projection_matrix().into();
        self.time = scene.shader_time();
        self.aspect = camera.aspect;
        if let Some(light) = scene.light() {
            self.light_direction = [light.direction.x, light.direction.y, light.direction.z, 0.0];
            self.light_color = [light.color.x, light.color.y, light.color.z, 0.0];
            self.ambient = [light.ambient, 0.0, 0.0, 0.0];
        }
    }
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self::new()
    }
}
