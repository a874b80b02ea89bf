// Copyright @yucwang 2026

use crate::core::photon_cache::PhotonCache;
use crate::core::scene::Scene;
use crate::math::constants::{Float, Vector2u};

/// Per-dispatch uniforms.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DispatchParams {
    pub time: Float,
    /// Accepted for interface compatibility; the photon kernel traces a
    /// single bounce regardless of this value.
    pub bounce_count: u32,
}

/// Work executed once per grid cell of a dispatch.
pub trait Kernel: Sync {
    fn invoke(&self, invocation_id: Vector2u, params: &DispatchParams, scene: &Scene, cache: &PhotonCache);
}
