// Copyright @yucwang 2026

use crate::core::face::Face;
use crate::math::constants::{Float, Vector2f};
use std::sync::atomic::{AtomicU64, Ordering};

/// One cache cell: running-mean intensity and the number of samples behind
/// it. The count is kept as a float, so it saturates past 2^24.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CacheTexel {
    pub intensity: Float,
    pub count: Float,
}

impl CacheTexel {
    pub const EMPTY: CacheTexel = CacheTexel { intensity: 0.0, count: 0.0 };

    fn pack(self) -> u64 {
        (self.intensity.to_bits() as u64) | ((self.count.to_bits() as u64) << 32)
    }

    fn unpack(bits: u64) -> Self {
        Self {
            intensity: Float::from_bits(bits as u32),
            count: Float::from_bits((bits >> 32) as u32),
        }
    }

    /// Folds one more sample into the running mean.
    pub fn blend(self, value: Float) -> Self {
        let w = self.count / (self.count + 1.0);
        Self {
            intensity: w * self.intensity + (1.0 - w) * value,
            count: self.count + 1.0,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct CacheStats {
    pub total_samples: f64,
    pub touched_texels: usize,
    pub mean_intensity: Float,
    pub max_intensity: Float,
}

/// Irradiance cache laid out as a cube array: six square layers per box,
/// layer `box_index * 6 + face`.
///
/// Deposits are a plain load followed by a plain store of the whole texel.
/// Two invocations hitting the same texel can overwrite each other and drop
/// a sample; a texel is never observed half-written.
pub struct PhotonCache {
    resolution: usize,
    layers: usize,
    texels: Vec<AtomicU64>,
}

impl PhotonCache {
    pub fn new(box_count: usize, resolution: usize) -> Self {
        let layers = box_count * Face::COUNT;
        let len = layers * resolution * resolution;
        let empty = CacheTexel::EMPTY.pack();
        Self {
            resolution,
            layers,
            texels: (0..len).map(|_| AtomicU64::new(empty)).collect(),
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn layer_count(&self) -> usize {
        self.layers
    }

    pub fn box_count(&self) -> usize {
        self.layers / Face::COUNT
    }

    pub fn layer_index(box_index: usize, face: Face) -> usize {
        box_index * Face::COUNT + face.index()
    }

    fn offset(&self, layer: usize, x: usize, y: usize) -> Option<usize> {
        if layer >= self.layers || x >= self.resolution || y >= self.resolution {
            return None;
        }
        Some((layer * self.resolution + y) * self.resolution + x)
    }

    pub fn texel(&self, layer: usize, x: usize, y: usize) -> Option<CacheTexel> {
        let offset = self.offset(layer, x, y)?;
        Some(CacheTexel::unpack(self.texels[offset].load(Ordering::Relaxed)))
    }

    /// Overwrites a texel. Used when importing a previously saved cache.
    pub fn set_texel(&self, layer: usize, x: usize, y: usize, texel: CacheTexel) -> bool {
        match self.offset(layer, x, y) {
            Some(offset) => {
                self.texels[offset].store(texel.pack(), Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Integer texel for a face coordinate in `[0, 1]^2`. A coordinate of
    /// exactly 1 lands in the last row/column.
    pub fn texel_coord(&self, uv: &Vector2f) -> (usize, usize) {
        let res = self.resolution as Float;
        let last = self.resolution.saturating_sub(1);
        let x = ((uv.x * res).floor().max(0.0) as usize).min(last);
        let y = ((uv.y * res).floor().max(0.0) as usize).min(last);
        (x, y)
    }

    /// Blends `value` into the running mean of the texel under `uv`.
    ///
    /// Returns the texel as written, or `None` if the address falls outside
    /// the cache.
    pub fn deposit(&self, box_index: usize, face: Face, uv: &Vector2f, value: Float) -> Option<CacheTexel> {
        let (x, y) = self.texel_coord(uv);
        let layer = Self::layer_index(box_index, face);
        let offset = match self.offset(layer, x, y) {
            Some(offset) => offset,
            None => {
                log::trace!("deposit outside cache: layer {} texel ({}, {})", layer, x, y);
                return None;
            }
        };

        let slot = &self.texels[offset];
        let updated = CacheTexel::unpack(slot.load(Ordering::Relaxed)).blend(value);
        slot.store(updated.pack(), Ordering::Relaxed);
        Some(updated)
    }

    /// Resets every texel. Only the host calls this; the kernel never does.
    pub fn clear(&mut self) {
        let empty = CacheTexel::EMPTY.pack();
        for slot in self.texels.iter_mut() {
            *slot.get_mut() = empty;
        }
    }

    pub fn layer_texels(&self, layer: usize) -> Vec<CacheTexel> {
        let size = self.resolution * self.resolution;
        if layer >= self.layers {
            return Vec::new();
        }
        self.texels[layer * size..(layer + 1) * size]
            .iter()
            .map(|slot| CacheTexel::unpack(slot.load(Ordering::Relaxed)))
            .collect()
    }

    pub fn stats(&self) -> CacheStats {
        self.summarize(0..self.layers)
    }

    pub fn layer_stats(&self, layer: usize) -> CacheStats {
        self.summarize(layer..(layer + 1).min(self.layers))
    }

    fn summarize(&self, layers: std::ops::Range<usize>) -> CacheStats {
        let mut stats = CacheStats::default();
        let mut intensity_sum = 0.0f64;
        for layer in layers {
            for texel in self.layer_texels(layer) {
                if texel.count <= 0.0 {
                    continue;
                }
                stats.total_samples += texel.count as f64;
                stats.touched_texels += 1;
                intensity_sum += texel.intensity as f64;
                stats.max_intensity = stats.max_intensity.max(texel.intensity);
            }
        }
        if stats.touched_texels > 0 {
            stats.mean_intensity = (intensity_sum / stats.touched_texels as f64) as Float;
        }
        stats
    }
}
