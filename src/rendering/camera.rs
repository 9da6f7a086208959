use cgmath::{Matrix4, Point3, Vector3};
use tracing::trace;

use crate::config::CameraSettings;
use crate::input::{
    KeyState, KEY_ARROW_DOWN, KEY_ARROW_LEFT, KEY_ARROW_RIGHT, KEY_ARROW_UP, KEY_BACK,
    KEY_FORWARD, KEY_LEFT, KEY_RIGHT,
};
use crate::utils::math::{horizontal_forward, rotate_about_vertical};

/// wgpu clip space has z in [0, 1]; cgmath builds OpenGL's [-1, 1].
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Perspective camera looking from `eye` at `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn from_settings(settings: &CameraSettings, aspect: f32) -> Self {
        Self {
            eye: Point3::from(settings.eye),
            target: Point3::from(settings.target),
            up: Vector3::unit_y(),
            aspect,
            fovy: settings.fovy,
            znear: settings.znear,
            zfar: settings.zfar,
        }
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let view = Matrix4::look_at_rh(self.eye, self.target, self.up);
        let proj = cgmath::perspective(cgmath::Deg(self.fovy), self.aspect, self.znear, self.zfar);
        OPENGL_TO_WGPU_MATRIX * proj * view
    }
}

/// Moves the camera from held keys, once per rendered frame.
///
/// Forward/back translate eye and target together along the horizontal
/// view direction. Left/right swing the eye around the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraController {
    pub move_speed: f32,
    pub turn_speed: f32,
}

impl CameraController {
    pub fn new(move_speed: f32, turn_speed: f32) -> Self {
        Self { move_speed, turn_speed }
    }

    pub fn from_settings(settings: &CameraSettings) -> Self {
        Self::new(settings.move_speed, settings.turn_speed)
    }

    /// Apply the current key state. Returns whether the camera moved.
    pub fn update_camera(&self, keys: &KeyState, camera: &mut Camera) -> bool {
        let forward = keys.any_pressed(&[KEY_FORWARD, KEY_ARROW_UP]);
        let back = keys.any_pressed(&[KEY_BACK, KEY_ARROW_DOWN]);
        let left = keys.any_pressed(&[KEY_LEFT, KEY_ARROW_LEFT]);
        let right = keys.any_pressed(&[KEY_RIGHT, KEY_ARROW_RIGHT]);

        let mut moved = false;

        let step = match (forward, back) {
            (true, false) => self.move_speed,
            (false, true) => -self.move_speed,
            _ => 0.0,
        };
        if step != 0.0 {
            if let Some(direction) = horizontal_forward(camera.eye, camera.target) {
                let offset = direction * step;
                camera.eye += offset;
                camera.target += offset;
                moved = true;
            }
        }

        let angle = match (left, right) {
            (true, false) => self.turn_speed,
            (false, true) => -self.turn_speed,
            _ => 0.0,
        };
        if angle != 0.0 {
            camera.eye = rotate_about_vertical(camera.eye, camera.target, angle);
            moved = true;
        }

        if moved {
            trace!("Camera eye -> {:?}", camera.eye);
        }
        moved
    }
}
