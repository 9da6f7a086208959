pub mod backend;
pub mod camera;
pub mod engine;
pub mod light;
pub mod mesh;
pub mod render_loop;
pub mod scene;
pub mod shaders;
pub mod uniforms;

pub use backend::{DrawRecord, HeadlessBackend, RenderBackend};
pub use camera::{Camera, CameraController};
pub use engine::WgpuBackend;
pub use light::Light;
pub use render_loop::{LifecycleState, RenderLoop};
pub use scene::{Scene, SceneGraph, SceneNode, ShapeKind, MAX_ROTATION_SPEED};

use thiserror::Error;

use crate::host::SurfaceId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("Render loop has been disposed")]
    Disposed,

    #[error("Invalid lifecycle transition from {from} to {to}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },

    #[error("Surface creation failed: {reason}")]
    SurfaceCreation { reason: String },

    #[error("Surface {surface:?} is not available")]
    SurfaceUnavailable { surface: SurfaceId },

    #[error("No suitable GPU adapter found")]
    AdapterUnavailable,

    #[error("Device request failed: {reason}")]
    DeviceRequest { reason: String },

    #[error("Frame acquisition failed: {reason}")]
    Frame { reason: String },
}

pub type RenderResult<T> = Result<T, RenderError>;
