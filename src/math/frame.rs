// Copyright @yucwang 2023

use crate::math::constants::{ Vector3f };

/// Orthonormal basis around a unit `z` axis.
pub struct Frame {
    x: Vector3f,
    y: Vector3f,
    z: Vector3f
}

impl Frame {
    pub fn from_normal(n: &Vector3f) -> Frame {
        let up = if n.z.abs() < 0.999 {
            Vector3f::new(0.0, 0.0, 1.0)
        } else {
            Vector3f::new(1.0, 0.0, 0.0)
        };
        let x = n.cross(&up).normalize();
        let y = n.cross(&x).normalize();
        Frame { x, y, z: *n }
    }

    pub fn from_local(&self, v: &Vector3f) -> Vector3f {
        v.x * self.x + v.y * self.y + v.z * self.z
    }
}
