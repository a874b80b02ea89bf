// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector3f };

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AABB {
    pub p_min: Vector3f,
    pub p_max: Vector3f
}

impl AABB {
    pub fn new(p_min: Vector3f, p_max: Vector3f) -> Self {
        let mut min = Vector3f::new(0.0, 0.0, 0.0);
        let mut max = Vector3f::new(0.0, 0.0, 0.0);
        for idx in 0..3 {
            min[idx] = p_min[idx].min(p_max[idx]);
            max[idx] = p_max[idx].max(p_min[idx]);
        }
        Self { p_min: min, p_max: max }
    }

    pub fn extent(&self) -> Vector3f {
        self.p_max - self.p_min
    }

    /// Slab test against the whole line through `origin`.
    ///
    /// Returns `(t_near, t_far)`. The ray misses when `t_near >= t_far`.
    /// A zero direction component divides to a signed infinity and the
    /// min/max reductions absorb it. If the origin also sits exactly on one of
    /// that axis' planes the 0/0 NaN is dropped by `Float::min`/`Float::max`
    /// and the grazing ray reports a miss.
    pub fn intersect_slab(&self, origin: &Vector3f, dir: &Vector3f) -> (Float, Float) {
        let mut t_near = Float::NEG_INFINITY;
        let mut t_far = Float::INFINITY;

        for idx in 0..3 {
            let t_min = (self.p_min[idx] - origin[idx]) / dir[idx];
            let t_max = (self.p_max[idx] - origin[idx]) / dir[idx];
            let t1 = t_min.min(t_max);
            let t2 = t_min.max(t_max);

            t_near = t_near.max(t1);
            t_far = t_far.min(t2);
        }

        (t_near, t_far)
    }

    /// True when every axis has a strictly positive extent.
    pub fn is_valid(&self) -> bool {
        (0..3).all(|idx| self.p_min[idx] < self.p_max[idx])
    }
}

/* Test for AABB */
