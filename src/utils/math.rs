use cgmath::{InnerSpace, Point3, Vector3};

/// Rotate `point` about the vertical axis through `pivot` by `angle` radians.
///
/// Only the horizontal (x, z) components change:
/// `x' = x cos a - z sin a`, `z' = x sin a + z cos a`, relative to the pivot.
pub fn rotate_about_vertical(point: Point3<f32>, pivot: Point3<f32>, angle: f32) -> Point3<f32> {
    let (sin, cos) = angle.sin_cos();
    let dx = point.x - pivot.x;
    let dz = point.z - pivot.z;
    Point3::new(
        pivot.x + dx * cos - dz * sin,
        point.y,
        pivot.z + dx * sin + dz * cos,
    )
}

/// Unit vector pointing from `eye` towards `target`, flattened onto the
/// horizontal plane. `None` when looking straight up or down.
pub fn horizontal_forward(eye: Point3<f32>, target: Point3<f32>) -> Option<Vector3<f32>> {
    let direction = target - eye;
    let flat = Vector3::new(direction.x, 0.0, direction.z);
    if flat.magnitude2() <= f32::EPSILON {
        None
    } else {
        Some(flat.normalize())
    }
}

/// Width over height, falling back to `1.0` for a zero height.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let rotated = rotate_about_vertical(
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            std::f32::consts::FRAC_PI_2,
        );
        assert!(close(rotated.x, 0.0));
        assert!(close(rotated.y, 2.0));
        assert!(close(rotated.z, 1.0));
    }

    #[test]
    fn test_rotate_keeps_distance_to_pivot() {
        let pivot = Point3::new(1.0, 0.0, -1.0);
        let point = Point3::new(4.0, 3.0, 3.0);
        let rotated = rotate_about_vertical(point, pivot, 0.7);
        let before = (point.x - pivot.x).hypot(point.z - pivot.z);
        let after = (rotated.x - pivot.x).hypot(rotated.z - pivot.z);
        assert!(close(before, after));
    }

    #[test]
    fn test_horizontal_forward() {
        let forward =
            horizontal_forward(Point3::new(0.0, 5.0, 10.0), Point3::new(0.0, 0.0, 0.0)).unwrap();
        assert!(close(forward.x, 0.0));
        assert!(close(forward.y, 0.0));
        assert!(close(forward.z, -1.0));

        assert!(horizontal_forward(Point3::new(0.0, 5.0, 0.0), Point3::new(0.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_aspect_ratio_zero_height() {
        assert_eq!(aspect_ratio(800, 0), 1.0);
        assert!(close(aspect_ratio(1920, 1080), 1.777_777_8));
    }
}
