use cgmath::{Deg, Quaternion, Rotation3, Vector3};
use serde::Deserialize;

/// Geometry a node is drawn with. Every shape is a box; the kind picks the
/// default proportions and colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    TableTop,
    TableRim,
    Card,
    Deck,
}

impl ShapeKind {
    pub fn default_scale(self) -> Vector3<f32> {
        match self {
            ShapeKind::TableTop => Vector3::new(8.0, 0.2, 5.0),
            ShapeKind::TableRim => Vector3::new(8.6, 0.3, 0.3),
            ShapeKind::Card => Vector3::new(0.63, 0.01, 0.88),
            ShapeKind::Deck => Vector3::new(0.63, 0.25, 0.88),
        }
    }

    pub fn default_color(self) -> [f32; 3] {
        match self {
            ShapeKind::TableTop => [0.05, 0.35, 0.16],
            ShapeKind::TableRim => [0.32, 0.18, 0.08],
            ShapeKind::Card => [0.95, 0.94, 0.90],
            ShapeKind::Deck => [0.55, 0.08, 0.10],
        }
    }
}

/// One drawable object in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    pub kind: ShapeKind,
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
    pub color: [f32; 3],
    /// Nodes with this flag follow the scene's auto-rotation.
    pub spins: bool,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: ShapeKind, position: Vector3<f32>) -> Self {
        Self {
            name: name.into(),
            kind,
            position,
            rotation: Quaternion::from_angle_y(Deg(0.0)),
            scale: kind.default_scale(),
            color: kind.default_color(),
            spins: false,
        }
    }

    pub fn with_yaw(mut self, degrees: f32) -> Self {
        self.rotation = Quaternion::from_angle_y(Deg(degrees));
        self
    }

    pub fn spinning(mut self) -> Self {
        self.spins = true;
        self
    }
}

/// Insertion-ordered collection of named nodes.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, replacing any node with the same name.
    pub fn add_node(&mut self, node: SceneNode) {
        match self.nodes.iter_mut().find(|existing| existing.name == node.name) {
            Some(existing) => *existing = node,
            None => self.nodes.push(node),
        }
    }

    pub fn remove_node(&mut self, name: &str) -> Option<SceneNode> {
        let index = self.nodes.iter().position(|node| node.name == name)?;
        Some(self.nodes.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
