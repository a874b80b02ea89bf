use photoncache::core::face::Face;
use photoncache::core::photon_cache::PhotonCache;
use photoncache::io::exr_utils::read_cache_exr;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <cache.exr>", args[0]);
        std::process::exit(1);
    }

    let cache = read_cache_exr(&args[1])
        .unwrap_or_else(|e| panic!("failed to read {}: {}", args[1], e));

    let total = cache.stats();
    println!("Boxes: {}, resolution: {}x{}", cache.box_count(), cache.resolution(), cache.resolution());
    println!("Samples: {}, touched texels: {} of {}", total.total_samples, total.touched_texels,
             cache.layer_count() * cache.resolution() * cache.resolution());
    println!("Mean intensity: {:.6}, max intensity: {:.6}", total.mean_intensity, total.max_intensity);

    for box_index in 0..cache.box_count() {
        println!("Box {}:", box_index);
        for face in Face::ALL.iter() {
            let stats = cache.layer_stats(PhotonCache::layer_index(box_index, *face));
            println!("  {:>2}  samples {:>10}  texels {:>6}  mean {:.6}  max {:.6}",
                     face.name(), stats.total_samples, stats.touched_texels,
                     stats.mean_intensity, stats.max_intensity);
        }
    }
}
