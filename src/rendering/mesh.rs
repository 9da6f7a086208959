use cgmath::{InnerSpace, Matrix4, Vector3, Vector4};

use super::Scene;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x3];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;

        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Vertices per box: 6 faces, 2 triangles each.
pub const BOX_VERTEX_COUNT: usize = 36;

// (normal, four corners counter-clockwise seen from outside) for a unit cube
const FACES: [([f32; 3], [[f32; 3]; 4]); 6] = [
    ([1.0, 0.0, 0.0], [[0.5, -0.5, 0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5]]),
    ([-1.0, 0.0, 0.0], [[-0.5, -0.5, -0.5], [-0.5, -0.5, 0.5], [-0.5, 0.5, 0.5], [-0.5, 0.5, -0.5]]),
    ([0.0, 1.0, 0.0], [[-0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5]]),
    ([0.0, -1.0, 0.0], [[-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5]]),
    ([0.0, 0.0, 1.0], [[-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5]]),
    ([0.0, 0.0, -1.0], [[0.5, -0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5, 0.5, -0.5], [0.5, 0.5, -0.5]]),
];

/// Unit cube transformed by `model`, in world space.
pub fn box_vertices(model: &Matrix4<f32>, color: [f32; 3], out: &mut Vec<Vertex>) {
    for (normal, corners) in FACES.iter() {
        let world_normal = model * Vector4::new(normal[0], normal[1], normal[2], 0.0);
        let world_normal = Vector3::new(world_normal.x, world_normal.y, world_normal.z);
        let world_normal = if world_normal.magnitude2() > f32::EPSILON {
            world_normal.normalize()
        } else {
            Vector3::new(normal[0], normal[1], normal[2])
        };

        let transformed: Vec<[f32; 3]> = corners
            .iter()
            .map(|c| {
                let p = model * Vector4::new(c[0], c[1], c[2], 1.0);
                [p.x, p.y, p.z]
            })
            .collect();

        for index in [0usize, 1, 2, 0, 2, 3] {
            out.push(Vertex {
                position: transformed[index],
                normal: world_normal.into(),
                color,
            });
        }
    }
}

/// Flatten every node of `scene` into one world-space triangle list.
pub fn scene_vertices(scene: &Scene) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(scene.nodes().len() * BOX_VERTEX_COUNT);
    for node in scene.nodes() {
        box_vertices(&scene.model_matrix(node), node.color, &mut vertices);
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneSettings;
    use cgmath::SquareMatrix;

    #[test]
    fn test_box_has_36_vertices_with_unit_normals() {
        let mut out = Vec::new();
        box_vertices(&Matrix4::from_nonuniform_scale(4.0, 0.5, 2.0), [1.0, 0.0, 0.0], &mut out);
        assert_eq!(out.len(), BOX_VERTEX_COUNT);
        for vertex in &out {
            let n = Vector3::from(vertex.normal);
            assert!((n.magnitude() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_translation_moves_positions() {
        let mut out = Vec::new();
        box_vertices(
            &(Matrix4::from_translation(Vector3::new(10.0, 0.0, 0.0)) * Matrix4::identity()),
            [1.0, 1.0, 1.0],
            &mut out,
        );
        assert!(out.iter().all(|v| v.position[0] >= 9.5 && v.position[0] <= 10.5));
    }

    #[test]
    fn test_scene_vertices_cover_all_nodes() {
        let scene = Scene::card_table(&SceneSettings::default());
        assert_eq!(scene_vertices(&scene).len(), scene.nodes().len() * BOX_VERTEX_COUNT);
    }
}
