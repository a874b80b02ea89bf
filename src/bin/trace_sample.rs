use photoncache::core::kernel::DispatchParams;
use photoncache::core::photon_cache::PhotonCache;
use photoncache::core::scene_loader::load_scene_with_settings;
use photoncache::kernels::photon::{PhotonKernel, BASE_INTENSITY};
use photoncache::math::constants::{Float, Vector2u};
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <scene.xml> <x> <y> [--time T] [--resolution N]", args[0]);
        std::process::exit(1);
    }

    let scene_path = &args[1];
    let x: u32 = args[2].parse().unwrap_or(0);
    let y: u32 = args[3].parse().unwrap_or(0);

    let mut time: Float = 0.0;
    let mut resolution: Option<usize> = None;

    let mut i = 4;
    while i < args.len() {
        match args[i].as_str() {
            "--time" => {
                i += 1;
                time = args.get(i).and_then(|v| v.parse::<Float>().ok()).unwrap_or(time);
            }
            "--resolution" => {
                i += 1;
                resolution = args.get(i).and_then(|v| v.parse::<usize>().ok()).filter(|r| *r > 0);
            }
            _ => {}
        }
        i += 1;
    }

    let load_result = load_scene_with_settings(scene_path)
        .unwrap_or_else(|e| panic!("failed to load scene: {}", e));
    let scene = load_result.scene;
    let resolution = resolution.or(load_result.cache_resolution).unwrap_or(32);
    let cache = PhotonCache::new(scene.len(), resolution);
    let kernel = PhotonKernel::new(load_result.intensity.unwrap_or(BASE_INTENSITY));
    let params = DispatchParams { time, bounce_count: load_result.bounce_count.unwrap_or(1) };

    let id = Vector2u::new(x, y);
    let ray = kernel.emit(id, &params, &scene);
    println!("Invocation: ({}, {}) at t = {}", x, y, time);
    println!("Light point: {:.6}, {:.6}, {:.6}", ray.origin().x, ray.origin().y, ray.origin().z);
    println!("Direction: {:.6}, {:.6}, {:.6}", ray.dir().x, ray.dir().y, ray.dir().z);

    match kernel.trace(&ray, &scene, &cache) {
        Some(deposit) => {
            let hit = deposit.hit;
            let (tx, ty) = cache.texel_coord(&hit.uv);
            println!("Hit: box {} face {} at t = {:.6}", hit.box_index, hit.face.name(), hit.t);
            println!("Point: {:.6}, {:.6}, {:.6}", hit.p.x, hit.p.y, hit.p.z);
            println!("Tex coord: {:.6}, {:.6} (texel {}, {})", hit.uv.x, hit.uv.y, tx, ty);
            println!("Attenuation: {:.6}", deposit.attenuation);
            println!("Deposited: {:.6}", deposit.value);
        }
        None => println!("Escaped: no box along the ray"),
    }
}
