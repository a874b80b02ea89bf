// Copyright 2020 TwoCookingMice

use photoncache::core::face::Face;
use photoncache::core::kernel::DispatchParams;
use photoncache::core::photon_cache::PhotonCache;
use photoncache::core::scene_loader::load_scene_with_settings;
use photoncache::dispatchers::tiled::TiledDispatcher;
use photoncache::io::{exr_utils, png_utils};
use photoncache::kernels::photon::{PhotonKernel, BASE_INTENSITY};
use photoncache::math::constants::Float;

use std::env;
use std::time::Instant;

const DEFAULT_RESOLUTION: usize = 32;
const DEFAULT_GRID: (usize, usize) = (256, 256);
const DEFAULT_FRAMES: u32 = 16;
const DEFAULT_TIME_STEP: Float = 1.0;

fn parse_grid(value: &str) -> Option<(usize, usize)> {
    let mut parts = value.split('x');
    let w = parts.next()?.trim().parse::<usize>().ok()?;
    let h = parts.next()?.trim().parse::<usize>().ok()?;
    Some((w, h))
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} <scene.xml> <output.exr> [--frames N] [--grid WxH] [--resolution N] \
                   [--seed-time T] [--png path] [--exposure E] [--resume cache.exr]", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    let output_path = &args[2];
    let mut frames_override: Option<u32> = None;
    let mut grid_override: Option<(usize, usize)> = None;
    let mut resolution_override: Option<usize> = None;
    let mut seed_time: Float = 0.0;
    let mut png_path: Option<String> = None;
    let mut exposure: Float = 1.0;
    let mut resume_path: Option<String> = None;

    let mut i = 3;
    while i < args.len() {
        match args[i].as_str() {
            "--frames" => {
                i += 1;
                frames_override = args.get(i).and_then(|v| v.parse::<u32>().ok());
            }
            "--grid" => {
                i += 1;
                grid_override = args.get(i).and_then(|v| parse_grid(v));
            }
            "--resolution" => {
                i += 1;
                resolution_override = args.get(i).and_then(|v| v.parse::<usize>().ok()).filter(|r| *r > 0);
            }
            "--seed-time" => {
                i += 1;
                seed_time = args.get(i).and_then(|v| v.parse::<Float>().ok()).unwrap_or(0.0);
            }
            "--png" => {
                i += 1;
                png_path = args.get(i).cloned();
            }
            "--exposure" => {
                i += 1;
                exposure = args.get(i).and_then(|v| v.parse::<Float>().ok()).unwrap_or(exposure);
            }
            "--resume" => {
                i += 1;
                resume_path = args.get(i).cloned();
            }
            other => log::warn!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    let load_result = match load_scene_with_settings(input_path) {
        Ok(result) => result,
        Err(e) => {
            log::error!("Failed to load scene {}: {}", input_path, e);
            std::process::exit(2);
        }
    };

    let scene = load_result.scene;
    let resolution = resolution_override.or(load_result.cache_resolution).unwrap_or(DEFAULT_RESOLUTION);
    let (width, height) = grid_override.or(load_result.grid).unwrap_or(DEFAULT_GRID);
    let frames = frames_override.or(load_result.frames).unwrap_or(DEFAULT_FRAMES);
    let time_step = load_result.time_step.unwrap_or(DEFAULT_TIME_STEP);
    let intensity = load_result.intensity.unwrap_or(BASE_INTENSITY);
    let params = DispatchParams {
        time: seed_time,
        bounce_count: load_result.bounce_count.unwrap_or(1),
    };

    let cache = match resume_path {
        Some(path) => {
            let cache = match exr_utils::read_cache_exr(&path) {
                Ok(cache) => cache,
                Err(e) => {
                    log::error!("Failed to resume from {}: {}", path, e);
                    std::process::exit(3);
                }
            };
            if cache.box_count() != scene.len() {
                log::error!("Cache {} holds {} boxes but the scene has {}.", path, cache.box_count(), scene.len());
                std::process::exit(3);
            }
            if resolution_override.map_or(false, |r| r != cache.resolution()) {
                log::warn!("Keeping the resumed cache resolution {}.", cache.resolution());
            }
            cache
        }
        None => PhotonCache::new(scene.len(), resolution),
    };

    log::info!("Tracing {} frames of {}x{} photons into a {}x{} cache over {} boxes.",
               frames, width, height, cache.resolution(), cache.resolution(), scene.len());

    let kernel = PhotonKernel::new(intensity);
    let dispatcher = TiledDispatcher::new(width, height);
    let start = Instant::now();
    dispatcher.run(&kernel, &scene, &cache, &params, frames, time_step);
    log::info!("Dispatch finished in {:.3}s.", start.elapsed().as_secs_f64());

    let stats = cache.stats();
    log::info!("Samples kept: {} of {} traced, texels touched: {}, mean intensity: {:.6}, max intensity: {:.6}.",
               stats.total_samples, dispatcher.invocations() as u64 * frames as u64,
               stats.touched_texels, stats.mean_intensity, stats.max_intensity);
    for box_index in 0..scene.len() {
        for face in Face::ALL.iter() {
            let face_stats = cache.layer_stats(PhotonCache::layer_index(box_index, *face));
            log::debug!("box {} {}: {} samples, mean {:.6}", box_index, face.name(),
                        face_stats.total_samples, face_stats.mean_intensity);
        }
    }

    if let Err(e) = exr_utils::write_cache_exr(&cache, output_path) {
        log::error!("Failed to write {}: {}", output_path, e);
        std::process::exit(4);
    }
    if let Some(path) = png_path {
        if let Err(e) = png_utils::write_cache_png(&cache, &path, exposure) {
            log::error!("Failed to write {}: {}", path, e);
            std::process::exit(4);
        }
    }
}
