use cgmath::{InnerSpace, Vector3};

use crate::config::SceneSettings;

/// Directional light with a flat ambient term.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Direction the light travels in, normalized.
    pub direction: Vector3<f32>,
    pub color: Vector3<f32>,
    pub ambient: f32,
}

impl Light {
    pub fn new(direction: Vector3<f32>, color: Vector3<f32>, ambient: f32) -> Self {
        let direction = if direction.magnitude2() > f32::EPSILON {
            direction.normalize()
        } else {
            -Vector3::unit_y()
        };
        Self {
            direction,
            color,
            ambient: ambient.clamp(0.0, 1.0),
        }
    }

    pub fn from_settings(settings: &SceneSettings) -> Self {
        Self::new(
            Vector3::from(settings.light_direction),
            Vector3::from(settings.light_color),
            settings.ambient,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_is_normalized() {
        let light = Light::new(Vector3::new(0.0, -4.0, 3.0), Vector3::new(1.0, 1.0, 1.0), 0.2);
        assert!((light.direction.magnitude() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_direction_points_down() {
        let light = Light::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0), 2.0);
        assert_eq!(light.direction, Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(light.ambient, 1.0);
    }
}
