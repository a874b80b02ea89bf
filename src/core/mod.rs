// Copyright @yucwang 2021

pub mod face;
pub mod interaction;
pub mod kernel;
pub mod photon_cache;
pub mod rng;
pub mod sampler;
pub mod scene;
pub mod scene_loader;
