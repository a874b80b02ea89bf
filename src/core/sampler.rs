// Copyright @yucwang 2026

use crate::core::rng::LcgRng;
use crate::math::constants::{Float, Vector2f, Vector2u, Vector3f};
use crate::math::frame::Frame;
use crate::math::warp::{sample_cosine_hemisphere, sample_uniform_sphere};

/// Offsets applied to the invocation id for the three draws of a triple.
/// The first one is the identity.
pub const TRIPLE_OFFSETS: [(u32, u32); 3] = [(0, 0), (113, 487), (839, 271)];

/// Scalar random source keyed on an invocation id and a time value.
pub trait Sampler: Send + Sync {
    fn sample(&self, invocation_id: Vector2u, offset: (u32, u32), time: Float) -> Float;

    fn sample_triple(&self, invocation_id: Vector2u, time: Float) -> Vector3f {
        Vector3f::new(self.sample(invocation_id, TRIPLE_OFFSETS[0], time),
                      self.sample(invocation_id, TRIPLE_OFFSETS[1], time),
                      self.sample(invocation_id, TRIPLE_OFFSETS[2], time))
    }
}

/// Direction warps driven by a random triple. The triple is passed in by the
/// caller; nothing is carried between calls.
pub trait DirectionSampler: Send + Sync {
    fn sphere_point(&self, rand: &Vector3f) -> Vector3f;
    fn hemisphere_direction(&self, rand: &Vector3f, normal: &Vector3f) -> Vector3f;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct HashSampler;

impl Sampler for HashSampler {
    fn sample(&self, invocation_id: Vector2u, offset: (u32, u32), time: Float) -> Float {
        let x = invocation_id.x.wrapping_add(offset.0) as u64;
        let y = invocation_id.y.wrapping_add(offset.1) as u64;
        let seed = ((time.to_bits() as u64) << 32)
            ^ ((y & 0xFFFF) << 16)
            ^ (x & 0xFFFF)
            ^ ((x >> 16) << 40)
            ^ ((y >> 16) << 52);
        LcgRng::new(seed).next_f32()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct WarpDirectionSampler;

impl DirectionSampler for WarpDirectionSampler {
    fn sphere_point(&self, rand: &Vector3f) -> Vector3f {
        sample_uniform_sphere(&Vector2f::new(rand.x, rand.y))
    }

    fn hemisphere_direction(&self, rand: &Vector3f, normal: &Vector3f) -> Vector3f {
        let local = sample_cosine_hemisphere(&Vector2f::new(rand.x, rand.y));
        Frame::from_normal(normal).from_local(&local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_sampler_deterministic() {
        let sampler = HashSampler;
        let id = Vector2u::new(17, 4);
        let a = sampler.sample_triple(id, 0.5);
        let b = sampler.sample_triple(id, 0.5);
        assert_eq!(a, b);
        for v in a.iter() {
            assert!(*v >= 0.0 && *v <= 1.0);
        }
    }

    #[test]
    fn test_hash_sampler_decorrelates() {
        let sampler = HashSampler;
        let id = Vector2u::new(3, 9);
        let t = sampler.sample_triple(id, 1.0);
        assert_ne!(t.x, t.y);
        assert_ne!(t.y, t.z);
        assert_ne!(t, sampler.sample_triple(id, 2.0));
        assert_ne!(t, sampler.sample_triple(Vector2u::new(4, 9), 1.0));
    }

    #[test]
    fn test_hash_sampler_mean() {
        let sampler = HashSampler;
        let mut sum = 0.0f64;
        let mut n = 0;
        for y in 0..64 {
            for x in 0..64 {
                sum += sampler.sample(Vector2u::new(x, y), TRIPLE_OFFSETS[0], 0.25) as f64;
                n += 1;
            }
        }
        let mean = sum / n as f64;
        assert!((mean - 0.5).abs() < 0.05, "mean {} too far from 0.5", mean);
    }

    #[test]
    fn test_direction_sampler_is_pure_in_its_triple() {
        let warp = WarpDirectionSampler;
        let rand = Vector3f::new(0.1, 0.6, 0.3);
        let p = warp.sphere_point(&rand);
        assert!((p.norm() - 1.0).abs() < 1e-5);
        assert_eq!(p, warp.sphere_point(&rand));

        let dir = warp.hemisphere_direction(&rand, &p);
        assert!(dir.dot(&p) >= -1e-5);
        assert!((dir.norm() - 1.0).abs() < 1e-4);
        assert_eq!(dir, warp.hemisphere_direction(&rand, &p));
    }
}
