// Copyright @yucwang 2023

use crate::core::face::Face;
use crate::math::constants::{ Float, Vector2f, Vector3f };

/// Entry/exit distances of the nearest box along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitInfo {
    pub near: Float,
    pub far: Float,
    pub box_index: usize,
}

impl HitInfo {
    pub fn is_valid(&self) -> bool {
        self.near > 0.0 && self.near < self.far
    }
}

/// Where a traced ray landed on a box face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub p: Vector3f,
    pub t: Float,
    pub box_index: usize,
    pub face: Face,
    pub normal: Vector3f,
    pub uv: Vector2f,
}

/// One sample that reached the cache.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deposit {
    pub hit: SurfaceHit,
    pub attenuation: Float,
    pub value: Float,
}
