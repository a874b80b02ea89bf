// Copyright @yucwang 2026

use crate::core::photon_cache::PhotonCache;
use crate::io::{atlas_size, atlas_texel, CacheIoError};
use crate::math::constants::Float;

use image::{Rgb, RgbImage};

fn linear_to_srgb(v: Float) -> Float {
    if v <= 0.0031308 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

/// Reinhard-tonemapped intensity, encoded to 8-bit sRGB.
pub fn tonemap(intensity: Float, exposure: Float) -> u8 {
    let c = (intensity * exposure).max(0.0);
    let mapped = linear_to_srgb(c / (1.0 + c));
    (mapped * 255.0 + 0.5).max(0.0).min(255.0) as u8
}

/// Preview of the cache atlas. Texels that never received a sample are
/// painted dark blue so they stand out from dim ones.
pub fn write_cache_png(cache: &PhotonCache, file_path: &str, exposure: Float) -> std::result::Result<(), CacheIoError> {
    let (width, height) = atlas_size(cache);
    if width == 0 || height == 0 {
        return Err(CacheIoError::Shape(String::from("cache has no texels")));
    }

    let img = RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let texel = atlas_texel(cache, x as usize, y as usize);
        if texel.count <= 0.0 {
            return Rgb([0, 0, 40]);
        }
        let v = tonemap(texel.intensity, exposure);
        Rgb([v, v, v])
    });

    img.save(file_path).map_err(|e| CacheIoError::Image(e.to_string()))?;
    log::info!("Preview written to: {}.", file_path);
    Ok(())
}
