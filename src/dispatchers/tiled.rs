// Copyright @yucwang 2021

use crate::core::kernel::{DispatchParams, Kernel};
use crate::core::photon_cache::PhotonCache;
use crate::core::scene::Scene;
use crate::math::constants::{Float, Vector2u};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

pub use super::dispatcher::Dispatcher;

pub const TILE_SIZE: usize = 8;

/// Runs a kernel over a `width x height` grid, handing out 8x8 tiles to one
/// worker per core. Tiles and the invocations inside them run in no
/// particular order and never wait on each other.
pub struct TiledDispatcher {
    width: usize,
    height: usize,
    thread_count: usize,
}

impl Dispatcher for TiledDispatcher {
    fn dispatch(&self, kernel: &dyn Kernel, scene: &Scene, cache: &PhotonCache, params: &DispatchParams) {
        if self.width == 0 || self.height == 0 {
            return;
        }

        let tiles_x = (self.width + TILE_SIZE - 1) / TILE_SIZE;
        let tiles_y = (self.height + TILE_SIZE - 1) / TILE_SIZE;
        let total_tiles = tiles_x * tiles_y;
        let next_tile = AtomicUsize::new(0);
        let (width, height) = (self.width, self.height);

        thread::scope(|scope| {
            for _ in 0..self.thread_count.min(total_tiles) {
                let next_tile = &next_tile;
                scope.spawn(move || {
                    loop {
                        let tile_index = next_tile.fetch_add(1, Ordering::Relaxed);
                        if tile_index >= total_tiles {
                            break;
                        }

                        let x0 = (tile_index % tiles_x) * TILE_SIZE;
                        let y0 = (tile_index / tiles_x) * TILE_SIZE;
                        let x1 = (x0 + TILE_SIZE).min(width);
                        let y1 = (y0 + TILE_SIZE).min(height);

                        for y in y0..y1 {
                            for x in x0..x1 {
                                let id = Vector2u::new(x as u32, y as u32);
                                kernel.invoke(id, params, scene, cache);
                            }
                        }
                    }
                });
            }
        });
    }
}

impl TiledDispatcher {
    pub fn new(width: usize, height: usize) -> Self {
        let thread_count = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self { width, height, thread_count }
    }

    pub fn with_threads(mut self, thread_count: usize) -> Self {
        self.thread_count = thread_count.max(1);
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn invocations(&self) -> usize {
        self.width * self.height
    }

    /// Issues `frames` dispatches back to back, advancing the time uniform
    /// by `time_step` each frame. The cache keeps accumulating throughout.
    pub fn run(&self, kernel: &dyn Kernel, scene: &Scene, cache: &PhotonCache,
               params: &DispatchParams, frames: u32, time_step: Float) {
        let progress = ProgressBar::new(frames as u64);
        progress.set_style(
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} dispatches")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let mut frame_params = *params;
        for frame in 0..frames {
            frame_params.time = params.time + frame as Float * time_step;
            self.dispatch(kernel, scene, cache, &frame_params);
            log::debug!("dispatch {} done at t = {}", frame, frame_params.time);
            progress.inc(1);
        }
        progress.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::face::Face;
    use crate::emitters::sphere::SphereLight;
    use crate::kernels::photon::PhotonKernel;
    use crate::math::aabb::AABB;
    use crate::math::constants::{Vector2f, Vector3f};
    use std::sync::Mutex;

    /// Records every invocation id it sees.
    struct RecordingKernel {
        seen: Mutex<Vec<(u32, u32)>>,
    }

    impl Kernel for RecordingKernel {
        fn invoke(&self, invocation_id: Vector2u, _params: &DispatchParams, _scene: &Scene, _cache: &PhotonCache) {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push((invocation_id.x, invocation_id.y));
            }
        }
    }

    /// Every invocation deposits into the same texel.
    struct SameTexelKernel;

    impl Kernel for SameTexelKernel {
        fn invoke(&self, _invocation_id: Vector2u, _params: &DispatchParams, _scene: &Scene, cache: &PhotonCache) {
            cache.deposit(0, Face::PosY, &Vector2f::new(0.5, 0.5), 3.0);
        }
    }

    fn scene() -> Scene {
        Scene::with_boxes(vec![AABB::new(Vector3f::new(-1.0, -1.0, -1.0), Vector3f::new(1.0, 1.0, 1.0))],
                          SphereLight::new(Vector3f::new(0.0, 3.0, 0.0), 0.5))
    }

    #[test]
    fn test_every_cell_invoked_once() {
        let kernel = RecordingKernel { seen: Mutex::new(Vec::new()) };
        let scene = scene();
        let cache = PhotonCache::new(scene.len(), 4);
        // non-multiple of the tile size to cover partial tiles
        let dispatcher = TiledDispatcher::new(19, 10).with_threads(3);
        dispatcher.dispatch(&kernel, &scene, &cache, &DispatchParams::default());

        let mut seen = kernel.seen.into_inner().expect("lock poisoned");
        seen.sort();
        let mut expected = Vec::new();
        for x in 0..19u32 {
            for y in 0..10u32 {
                expected.push((x, y));
            }
        }
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_contended_texel_is_lossy_but_bounded() {
        let scene = scene();
        let cache = PhotonCache::new(scene.len(), 2);
        let dispatcher = TiledDispatcher::new(64, 64);
        dispatcher.dispatch(&SameTexelKernel, &scene, &cache, &DispatchParams::default());

        let texel = cache.texel(PhotonCache::layer_index(0, Face::PosY), 1, 1).expect("in range");
        assert!(texel.count >= 1.0);
        assert!(texel.count <= dispatcher.invocations() as Float);
        assert!((texel.intensity - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_run_accumulates_across_frames() {
        let scene = scene();
        let cache = PhotonCache::new(scene.len(), 4);
        let kernel = PhotonKernel::default();
        let dispatcher = TiledDispatcher::new(32, 32).with_threads(1);
        let params = DispatchParams { time: 0.0, bounce_count: 1 };

        dispatcher.dispatch(&kernel, &scene, &cache, &params);
        let first = cache.stats().total_samples;
        dispatcher.run(&kernel, &scene, &cache, &params, 3, 0.0);
        let after = cache.stats().total_samples;

        assert!(first > 0.0);
        // single worker and a frozen clock: every frame repeats the same
        // photons and none of their deposits are lost
        assert_eq!(after, 4.0 * first);
    }

    #[test]
    fn test_empty_grid_is_a_no_op() {
        let scene = scene();
        let cache = PhotonCache::new(scene.len(), 4);
        TiledDispatcher::new(0, 16).dispatch(&PhotonKernel::default(), &scene, &cache, &DispatchParams::default());
        assert_eq!(cache.stats().touched_texels, 0);
    }
}
