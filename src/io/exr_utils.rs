/* Copyright 2020 @TwoCookingMice */

use crate::core::face::Face;
use crate::core::photon_cache::{CacheTexel, PhotonCache};
use crate::io::{atlas_size, atlas_texel, atlas_to_texel, CacheIoError};

use exr::prelude::*;

struct Pixels {
    width: usize,
    height: usize,
    data: Vec<(f32, f32)>,
}

// Write cache atlas to file: R = intensity, G = sample count
pub fn write_cache_exr(cache: &PhotonCache, file_path: &str) -> std::result::Result<(), CacheIoError> {
    log::info!("Starting writing cache atlas: {}.", file_path);

    let (width, height) = atlas_size(cache);
    if width == 0 || height == 0 {
        return Err(CacheIoError::Shape(String::from("cache has no texels")));
    }

    write_rgb_file(file_path, width, height, |x, y| {
        let texel = atlas_texel(cache, x, y);
        (texel.intensity, texel.count, 0.0f32)
    }).map_err(|e| CacheIoError::Exr(e.to_string()))?;

    log::info!("Cache written to: {} ({}x{}).", file_path, width, height);
    Ok(())
}

// Read a cache atlas previously written by `write_cache_exr`
pub fn read_cache_exr(file_path: &str) -> std::result::Result<PhotonCache, CacheIoError> {
    log::info!("Starting reading cache atlas from: {}.", file_path);

    let image = read()
        .no_deep_data()
        .largest_resolution_level()
        .rgba_channels(
            |resolution, _| Pixels {
                width: resolution.width(),
                height: resolution.height(),
                data: vec![(0.0, 0.0); resolution.width() * resolution.height()],
            },
            |image, position, (r, g, _b, _a): (f32, f32, f32, f32)| {
                let idx = position.y() * image.width + position.x();
                image.data[idx] = (r, g);
            },
        )
        .first_valid_layer()
        .all_attributes()
        .from_file(file_path)
        .map_err(|e| CacheIoError::Exr(format!("failed to read {}: {}", file_path, e)))?;

    let pixels = image.layer_data.channel_data.pixels;
    if pixels.width == 0 || pixels.width % Face::COUNT != 0 {
        return Err(CacheIoError::Shape(format!("width {} is not a multiple of {}", pixels.width, Face::COUNT)));
    }
    let res = pixels.width / Face::COUNT;
    if pixels.height % res != 0 {
        return Err(CacheIoError::Shape(format!("height {} is not a multiple of {}", pixels.height, res)));
    }

    let cache = PhotonCache::new(pixels.height / res, res);
    for y in 0..pixels.height {
        for x in 0..pixels.width {
            let (intensity, count) = pixels.data[y * pixels.width + x];
            let (layer, tx, ty) = atlas_to_texel(res, x, y);
            cache.set_texel(layer, tx, ty, CacheTexel { intensity, count });
        }
    }

    log::info!("Cache loaded, resolution = {}, boxes = {}.", res, cache.box_count());
    Ok(cache)
}
