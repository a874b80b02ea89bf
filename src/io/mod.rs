// Copyright @yucwang 2026

pub mod exr_utils;
pub mod png_utils;

use crate::core::face::Face;
use crate::core::photon_cache::{CacheTexel, PhotonCache};

#[derive(Debug)]
pub enum CacheIoError {
    Exr(String),
    Image(String),
    Shape(String),
}

impl std::fmt::Display for CacheIoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheIoError::Exr(msg) => write!(f, "exr error: {}", msg),
            CacheIoError::Image(msg) => write!(f, "image error: {}", msg),
            CacheIoError::Shape(msg) => write!(f, "bad cache layout: {}", msg),
        }
    }
}

impl std::error::Error for CacheIoError {}

/// Cache laid out as one image: a row of tiles per box, one tile per face
/// in layer order, each tile `resolution` square with v pointing up.
pub fn atlas_size(cache: &PhotonCache) -> (usize, usize) {
    let res = cache.resolution();
    (Face::COUNT * res, cache.box_count() * res)
}

/// `(layer, texel x, texel y)` behind an atlas pixel.
pub fn atlas_to_texel(res: usize, x: usize, y: usize) -> (usize, usize, usize) {
    let box_index = y / res;
    let face = x / res;
    let tx = x % res;
    let ty = res - 1 - (y % res);
    (box_index * Face::COUNT + face, tx, ty)
}

pub fn atlas_texel(cache: &PhotonCache, x: usize, y: usize) -> CacheTexel {
    let (layer, tx, ty) = atlas_to_texel(cache.resolution(), x, y);
    cache.texel(layer, tx, ty).unwrap_or_default()
}
