// Copyright @yucwang 2026

use crate::core::interaction::HitInfo;
use crate::emitters::sphere::SphereLight;
use crate::math::aabb::AABB;
use crate::math::constants::Vector3f;
use crate::math::ray::Ray3f;

/// Nearest box whose entry distance is strictly positive.
///
/// Boxes are visited in index order and only a strictly smaller `near`
/// replaces the current best, so equal distances keep the lower index.
pub fn intersect_all(origin: &Vector3f, dir: &Vector3f, boxes: &[AABB]) -> Option<HitInfo> {
    let mut best: Option<HitInfo> = None;
    for (box_index, bbox) in boxes.iter().enumerate() {
        let (near, far) = bbox.intersect_slab(origin, dir);
        let candidate = HitInfo { near, far, box_index };
        if !candidate.is_valid() {
            continue;
        }
        if best.map_or(true, |b| near < b.near) {
            best = Some(candidate);
        }
    }
    best
}

pub struct Scene {
    boxes: Vec<AABB>,
    light: SphereLight,
}

impl Scene {
    pub fn with_boxes(boxes: Vec<AABB>, light: SphereLight) -> Self {
        Self { boxes, light }
    }

    pub fn boxes(&self) -> &[AABB] {
        &self.boxes
    }

    pub fn light(&self) -> &SphereLight {
        &self.light
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn ray_intersection(&self, ray: &Ray3f) -> Option<HitInfo> {
        intersect_all(&ray.origin(), &ray.dir(), &self.boxes)
    }
}
