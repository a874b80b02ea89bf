// Copyright @yucwang 2021

use crate::core::kernel::{DispatchParams, Kernel};
use crate::core::photon_cache::PhotonCache;
use crate::core::scene::Scene;

pub trait Dispatcher {
    fn dispatch(&self, kernel: &dyn Kernel, scene: &Scene, cache: &PhotonCache, params: &DispatchParams);
}
