// Copyright @yucwang 2026

use crate::core::face::Face;
use crate::core::interaction::{Deposit, SurfaceHit};
use crate::core::kernel::{DispatchParams, Kernel};
use crate::core::photon_cache::PhotonCache;
use crate::core::sampler::{DirectionSampler, HashSampler, Sampler, WarpDirectionSampler};
use crate::core::scene::Scene;
use crate::math::constants::{Float, Vector2u};
use crate::math::ray::Ray3f;

pub const BASE_INTENSITY: Float = 1.0;

/// Light-tracing kernel: one photon per invocation, one bounce, deposited
/// straight into the irradiance cache.
pub struct PhotonKernel {
    base_intensity: Float,
    sampler: Box<dyn Sampler>,
    warp: Box<dyn DirectionSampler>,
}

impl Default for PhotonKernel {
    fn default() -> Self {
        Self::new(BASE_INTENSITY)
    }
}

impl PhotonKernel {
    pub fn new(base_intensity: Float) -> Self {
        Self::with_samplers(base_intensity, Box::new(HashSampler), Box::new(WarpDirectionSampler))
    }

    pub fn with_samplers(base_intensity: Float,
                         sampler: Box<dyn Sampler>,
                         warp: Box<dyn DirectionSampler>) -> Self {
        Self { base_intensity, sampler, warp }
    }

    /// Photon leaving the scene's light for this invocation.
    pub fn emit(&self, invocation_id: Vector2u, params: &DispatchParams, scene: &Scene) -> Ray3f {
        let light = scene.light();
        let rand = self.sampler.sample_triple(invocation_id, params.time);
        let position = light.sample_position(self.warp.as_ref(), &rand);
        let dir = light.sample_direction(self.warp.as_ref(), &rand, &position);
        Ray3f::new(position.p, dir)
    }

    pub fn main(&self, invocation_id: Vector2u, params: &DispatchParams,
                scene: &Scene, cache: &PhotonCache) -> Option<Deposit> {
        let ray = self.emit(invocation_id, params, scene);
        self.trace(&ray, scene, cache)
    }

    /// Follows `ray` to the first box and deposits its contribution there.
    /// Rays that escape leave the cache untouched, and so do hits whose box
    /// has no layers in `cache`.
    ///
    /// A ray entering within `EPSILON` of an edge can be classified onto the
    /// neighbouring face it travels away from. The cosine term is clamped at
    /// zero so such hits count as a dark sample instead of a negative one.
    pub fn trace(&self, ray: &Ray3f, scene: &Scene, cache: &PhotonCache) -> Option<Deposit> {
        let hit_info = scene.ray_intersection(ray)?;
        let bbox = &scene.boxes()[hit_info.box_index];

        let p = ray.at(hit_info.near);
        let face = Face::classify(&p, bbox);
        let normal = face.normal();
        let uv = face.tex_coord(&p, bbox);

        // the sampled light point acts as a point source for this photon
        let dist2 = (ray.origin() - p).norm_squared();
        let attenuation = normal.dot(&(-ray.dir())).max(0.0) / dist2;
        let value = attenuation * self.base_intensity;

        cache.deposit(hit_info.box_index, face, &uv, value)?;

        Some(Deposit {
            hit: SurfaceHit { p, t: hit_info.near, box_index: hit_info.box_index, face, normal, uv },
            attenuation,
            value,
        })
    }
}

impl Kernel for PhotonKernel {
    fn invoke(&self, invocation_id: Vector2u, params: &DispatchParams, scene: &Scene, cache: &PhotonCache) {
        self.main(invocation_id, params, scene, cache);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::photon_cache::CacheStats;
    use crate::emitters::sphere::SphereLight;
    use crate::math::aabb::AABB;
    use crate::math::constants::{Vector2f, Vector3f};

    fn unit_box_scene() -> Scene {
        Scene::with_boxes(vec![AABB::new(Vector3f::new(-1.0, -1.0, -1.0), Vector3f::new(1.0, 1.0, 1.0))],
                          SphereLight::new(Vector3f::new(0.0, 0.0, 5.0), 0.25))
    }

    #[test]
    fn test_trace_hits_top_face() {
        let scene = unit_box_scene();
        let cache = PhotonCache::new(scene.len(), 8);
        let kernel = PhotonKernel::new(2.0);

        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0));
        let deposit = kernel.trace(&ray, &scene, &cache).expect("ray should hit the box");

        assert!((deposit.hit.p - Vector3f::new(0.0, 0.0, 1.0)).norm() < 1e-6);
        assert_eq!(deposit.hit.face, Face::PosZ);
        assert_eq!(deposit.hit.normal, Vector3f::new(0.0, 0.0, 1.0));
        assert!((deposit.hit.uv - Vector2f::new(0.5, 0.5)).norm() < 1e-6);
        assert!((deposit.attenuation - 1.0 / 16.0).abs() < 1e-6);
        assert!((deposit.value - 2.0 / 16.0).abs() < 1e-6);

        let texel = cache.texel(PhotonCache::layer_index(0, Face::PosZ), 4, 4).expect("in range");
        assert_eq!(texel.count, 1.0);
        assert!((texel.intensity - deposit.value).abs() < 1e-7);
    }

    #[test]
    fn test_trace_hits_pos_x_face() {
        let scene = unit_box_scene();
        let cache = PhotonCache::new(scene.len(), 8);
        let kernel = PhotonKernel::default();

        let ray = Ray3f::new(Vector3f::new(5.0, 0.0, 0.0), Vector3f::new(-1.0, 0.0, 0.0));
        let deposit = kernel.trace(&ray, &scene, &cache).expect("ray should hit the box");

        assert!((deposit.hit.p - Vector3f::new(1.0, 0.0, 0.0)).norm() < 1e-6);
        assert_eq!(deposit.hit.face, Face::PosX);
        assert_eq!(deposit.hit.normal, Vector3f::new(1.0, 0.0, 0.0));
        assert_eq!(cache.layer_stats(PhotonCache::layer_index(0, Face::PosX)).touched_texels, 1);
    }

    #[test]
    fn test_edge_hit_on_back_facing_side_deposits_zero() {
        let scene = unit_box_scene();
        let cache = PhotonCache::new(scene.len(), 8);
        let kernel = PhotonKernel::default();

        // enters through +Z a hair inside x = max while moving towards +x
        let ray = Ray3f::new(Vector3f::new(0.95995, 0.0, 5.0), Vector3f::new(0.01, 0.0, -1.0));
        let deposit = kernel.trace(&ray, &scene, &cache).expect("ray should hit the box");

        assert_eq!(deposit.hit.face, Face::PosX);
        assert!(deposit.hit.normal.dot(&(-ray.dir())) < 0.0);
        assert_eq!(deposit.attenuation, 0.0);
        assert_eq!(deposit.value, 0.0);

        let stats = cache.layer_stats(PhotonCache::layer_index(0, Face::PosX));
        assert_eq!(stats.total_samples, 1.0);
        assert_eq!(stats.max_intensity, 0.0);
    }

    #[test]
    fn test_hit_outside_cache_is_not_reported() {
        let scene = unit_box_scene();
        // cache sized for no boxes, so box 0 has nowhere to go
        let cache = PhotonCache::new(0, 8);
        let kernel = PhotonKernel::default();
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(scene.ray_intersection(&ray).is_some());
        assert!(kernel.trace(&ray, &scene, &cache).is_none());
    }

    #[test]
    fn test_emit_uses_one_triple_for_both_draws() {
        let scene = unit_box_scene();
        let kernel = PhotonKernel::default();
        let warp = WarpDirectionSampler;
        let light = *scene.light();
        for i in 0..32u32 {
            let id = Vector2u::new(7 * i, i + 1);
            let params = DispatchParams { time: 0.25 * i as Float, bounce_count: 1 };
            let triple = HashSampler.sample_triple(id, params.time);
            let n = warp.sphere_point(&triple);

            let ray = kernel.emit(id, &params, &scene);
            assert!((ray.origin() - (light.center + light.radius * n)).norm() < 1e-5);
            let expected = warp.hemisphere_direction(&triple, &n).normalize();
            assert!((ray.dir() - expected).norm() < 1e-5);
        }
    }

    #[test]
    fn test_trace_empty_scene_leaves_cache_alone() {
        let scene = Scene::with_boxes(Vec::new(), SphereLight::new(Vector3f::zeros(), 1.0));
        let cache = PhotonCache::new(0, 8);
        let kernel = PhotonKernel::default();
        let params = DispatchParams { time: 0.5, bounce_count: 4 };

        for y in 0..8 {
            for x in 0..8 {
                assert!(kernel.main(Vector2u::new(x, y), &params, &scene, &cache).is_none());
            }
        }
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, -1.0));
        assert!(kernel.trace(&ray, &scene, &cache).is_none());
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_escaping_ray_leaves_cache_alone() {
        let scene = unit_box_scene();
        let cache = PhotonCache::new(scene.len(), 8);
        let kernel = PhotonKernel::default();
        let ray = Ray3f::new(Vector3f::new(0.0, 0.0, 5.0), Vector3f::new(0.0, 0.0, 1.0));
        assert!(kernel.trace(&ray, &scene, &cache).is_none());
        assert_eq!(cache.stats().touched_texels, 0);
    }

    #[test]
    fn test_emit_starts_on_light_and_points_outward() {
        let scene = unit_box_scene();
        let kernel = PhotonKernel::default();
        let light = *scene.light();
        for i in 0..64u32 {
            let params = DispatchParams { time: i as Float * 0.1, bounce_count: 1 };
            let ray = kernel.emit(Vector2u::new(i, 3 * i), &params, &scene);
            let n = (ray.origin() - light.center) / light.radius;
            assert!((n.norm() - 1.0).abs() < 1e-4);
            assert!(ray.dir().dot(&n) >= -1e-4);
        }
    }

    #[test]
    fn test_main_is_deterministic_and_ignores_bounce_count() {
        let scene = unit_box_scene();
        let kernel = PhotonKernel::default();
        let a = PhotonCache::new(1, 8);
        let b = PhotonCache::new(1, 8);
        for y in 0..16 {
            for x in 0..16 {
                let id = Vector2u::new(x, y);
                let da = kernel.main(id, &DispatchParams { time: 1.5, bounce_count: 1 }, &scene, &a);
                let db = kernel.main(id, &DispatchParams { time: 1.5, bounce_count: 7 }, &scene, &b);
                assert_eq!(da, db);
            }
        }
        assert_eq!(a.stats(), b.stats());
    }

    #[test]
    fn test_many_photons_land_on_facing_side() {
        let scene = unit_box_scene();
        let cache = PhotonCache::new(1, 4);
        let kernel = PhotonKernel::default();
        let params = DispatchParams { time: 0.0, bounce_count: 1 };
        let mut hits = 0;
        for y in 0..64 {
            for x in 0..64 {
                if let Some(deposit) = kernel.main(Vector2u::new(x, y), &params, &scene, &cache) {
                    hits += 1;
                    assert!(deposit.value >= 0.0);
                    assert!(deposit.hit.t > 0.0);
                    // light hovers above the box, photons can only reach the upper side
                    assert_ne!(deposit.hit.face, Face::NegZ);
                }
            }
        }
        assert!(hits > 0);
        assert!(cache.layer_stats(PhotonCache::layer_index(0, Face::PosZ)).touched_texels > 0);
    }
}
