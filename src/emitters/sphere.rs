// Copyright @yucwang 2026

use crate::core::sampler::DirectionSampler;
use crate::math::constants::{Float, Vector3f};

/// Spherical emitter. Photons leave from a uniformly chosen surface point
/// into the hemisphere around that point's outward normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereLight {
    pub center: Vector3f,
    pub radius: Float,
}

pub struct LightSample {
    pub p: Vector3f,
    pub n: Vector3f,
}

impl SphereLight {
    pub fn new(center: Vector3f, radius: Float) -> Self {
        Self { center, radius }
    }

    pub fn sample_position(&self, warp: &dyn DirectionSampler, rand: &Vector3f) -> LightSample {
        let n = warp.sphere_point(rand);
        LightSample { p: self.center + self.radius * n, n }
    }

    pub fn sample_direction(&self, warp: &dyn DirectionSampler, rand: &Vector3f,
                            position: &LightSample) -> Vector3f {
        warp.hemisphere_direction(rand, &position.n)
    }
}
