pub mod graph;
pub mod layout;

pub use graph::{SceneGraph, SceneNode, ShapeKind};
pub use layout::{load_layout, LayoutError};

use cgmath::{Matrix4, Quaternion, Rad, Rotation3, Vector3};
use tracing::{debug, info, warn};

use crate::config::SceneSettings;
use crate::rendering::light::Light;

/// Upper bound for the deck auto-rotation, radians per second.
pub const MAX_ROTATION_SPEED: f32 = 4.0 * std::f32::consts::PI;

/// The card table: scene graph, lighting and the time-driven parameters
/// (shader clock and deck auto-rotation).
#[derive(Debug, Clone)]
pub struct Scene {
    graph: SceneGraph,
    lights: Vec<Light>,
    shader_time: f32,
    background_speed: f32,
    spin_angle: f32,
    rotation_speed: f32,
}

impl Scene {
    pub fn empty(settings: &SceneSettings) -> Self {
        Self {
            graph: SceneGraph::new(),
            lights: Vec::new(),
            shader_time: 0.0,
            background_speed: settings.background_speed,
            spin_angle: 0.0,
            rotation_speed: settings.rotation_speed.clamp(0.0, MAX_ROTATION_SPEED),
        }
    }

    /// Felt table with a rim, a spinning deck and a five-card fan.
    pub fn card_table(settings: &SceneSettings) -> Self {
        let mut scene = Self::empty(settings);
        scene.lights.push(Light::from_settings(settings));

        let graph = &mut scene.graph;
        graph.add_node(SceneNode::new("table", ShapeKind::TableTop, Vector3::new(0.0, 0.0, 0.0)));
        graph.add_node(SceneNode::new("rim-north", ShapeKind::TableRim, Vector3::new(0.0, 0.15, -2.65)));
        graph.add_node(SceneNode::new("rim-south", ShapeKind::TableRim, Vector3::new(0.0, 0.15, 2.65)));
        graph.add_node(
            SceneNode::new("deck", ShapeKind::Deck, Vector3::new(0.0, 0.23, -0.8)).spinning(),
        );
        for i in 0..5 {
            let offset = i as f32 - 2.0;
            graph.add_node(
                SceneNode::new(
                    format!("hand-{}", i + 1),
                    ShapeKind::Card,
                    Vector3::new(offset * 0.55, 0.11 + i as f32 * 0.002, 1.4 + offset.abs() * 0.08),
                )
                .with_yaw(-offset * 8.0),
            );
        }

        debug!("Card table scene built with {} nodes", scene.graph.len());
        scene
    }

    /// Advance time-driven parameters by `delta_secs`.
    pub fn advance(&mut self, delta_secs: f32) {
        let delta = delta_secs.max(0.0);
        self.shader_time += delta * self.background_speed;
        self.spin_angle = (self.spin_angle + self.rotation_speed * delta) % std::f32::consts::TAU;
    }

    /// Seconds on the background shader's clock.
    pub fn shader_time(&self) -> f32 {
        self.shader_time
    }

    pub fn spin_angle(&self) -> f32 {
        self.spin_angle
    }

    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    /// Set the auto-rotation speed, clamped to `[0, MAX_ROTATION_SPEED]`.
    pub fn set_rotation_speed(&mut self, radians_per_sec: f32) {
        let speed = if radians_per_sec.is_finite() {
            radians_per_sec.clamp(0.0, MAX_ROTATION_SPEED)
        } else {
            0.0
        };
        if speed != self.rotation_speed {
            info!("Rotation speed set to {:.2} rad/s", speed);
        }
        self.rotation_speed = speed;
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    pub fn nodes(&self) -> &[SceneNode] {
        self.graph.nodes()
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Primary light, if the scene has one.
    pub fn light(&self) -> Option<&Light> {
        self.lights.first()
    }

    /// Model matrix of `node`, including auto-rotation for spinning nodes.
    pub fn model_matrix(&self, node: &SceneNode) -> Matrix4<f32> {
        let rotation = if node.spins {
            Quaternion::from_angle_y(Rad(self.spin_angle)) * node.rotation
        } else {
            node.rotation
        };
        Matrix4::from_translation(node.position)
            * Matrix4::from(rotation)
            * Matrix4::from_nonuniform_scale(node.scale.x, node.scale.y, node.scale.z)
    }

    /// Merge the result of a layout load. A failed load is logged and leaves
    /// the scene as it was. Returns the number of nodes added or replaced.
    pub fn apply_layout(&mut self, result: Result<Vec<SceneNode>, LayoutError>) -> usize {
        match result {
            Ok(nodes) => {
                let count = nodes.len();
                for node in nodes {
                    self.graph.add_node(node);
                }
                info!("Applied layout with {} nodes", count);
                count
            }
            Err(e) => {
                warn!("Layout not applied: {}", e);
                0
            }
        }
    }

    /// Drop every node and light.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.lights.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty() && self.lights.is_empty()
    }
}
