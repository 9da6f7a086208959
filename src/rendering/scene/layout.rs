//! Card layouts loaded from TOML
//!
//! ```toml
//! [[card]]
//! name = "river-1"
//! position = [-1.0, 0.11, 0.0]
//! yaw = 12.0
//!
//! [[card]]
//! name = "spare-deck"
//! kind = "deck"
//! position = [2.5, 0.23, -1.2]
//! spins = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use cgmath::Vector3;
use serde::Deserialize;
use thiserror::Error;

use super::graph::{SceneNode, ShapeKind};

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Failed to read layout {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse layout {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize)]
struct LayoutFile {
    #[serde(default, rename = "card")]
    cards: Vec<Placement>,
}

#[derive(Debug, Deserialize)]
struct Placement {
    name: String,
    #[serde(default = "default_kind")]
    kind: ShapeKind,
    position: [f32; 3],
    #[serde(default)]
    yaw: f32,
    color: Option<[f32; 3]>,
    #[serde(default)]
    spins: bool,
}

fn default_kind() -> ShapeKind {
    ShapeKind::Card
}

impl From<Placement> for SceneNode {
    fn from(placement: Placement) -> Self {
        let mut node = SceneNode::new(placement.name, placement.kind, Vector3::from(placement.position))
            .with_yaw(placement.yaw);
        if let Some(color) = placement.color {
            node.color = color;
        }
        node.spins = placement.spins;
        node
    }
}

pub fn parse_layout(source: &str, path: &Path) -> Result<Vec<SceneNode>, LayoutError> {
    let file: LayoutFile = toml::from_str(source).map_err(|source| LayoutError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.cards.into_iter().map(SceneNode::from).collect())
}

pub fn load_layout(path: &Path) -> Result<Vec<SceneNode>, LayoutError> {
    let source = fs::read_to_string(path).map_err(|source| LayoutError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_layout(&source, path)
}
