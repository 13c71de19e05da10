//! Collage layout CLI - Search a layout for an image manifest from JSON configuration.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use collage_layout::{
    compute::{CollageRunner, EvolutionPhase},
    schema::{CollageConfig, Dimension, FeatureImage, Rotation, SourceImage},
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 && args[1] == "--example" {
        print_example_files();
        return;
    }

    if args.len() < 3 {
        eprintln!("Usage: {} <config.json> <images.json> [name:weight ...]", args[0]);
        eprintln!();
        eprintln!("Search a collage layout for a list of images.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to collage configuration file");
        eprintln!("  images.json  Path to a JSON array of source images");
        eprintln!("  name:weight  Feature images and their desired relative size");
        eprintln!();
        eprintln!("Example input files are generated with --example flag.");
        std::process::exit(1);
    }

    let mut config = CollageConfig::from_json_file(&args[1]).unwrap_or_else(|e| {
        eprintln!("Error loading config: {}", e);
        std::process::exit(1);
    });

    for arg in &args[3..] {
        let feature: FeatureImage = arg.parse().unwrap_or_else(|e| {
            eprintln!("{}", e);
            std::process::exit(1);
        });
        config.feature_images.push(feature);
    }

    let images_path = PathBuf::from(&args[2]);
    let images_str = fs::read_to_string(&images_path).unwrap_or_else(|e| {
        eprintln!("Error reading image list: {}", e);
        std::process::exit(1);
    });
    let mut images: Vec<SourceImage> = serde_json::from_str(&images_str).unwrap_or_else(|e| {
        eprintln!("Error parsing image list: {}", e);
        std::process::exit(1);
    });

    config.apply_feature_weights(&mut images);
    let config = config.with_weight_sum(&images);

    println!("Collage Layout Search");
    println!("=====================");
    println!("Canvas: {}x{}", config.target_width, config.target_height);
    println!(
        "Images: {} ({} featured)",
        images.len(),
        images.iter().filter(|image| image.is_feature()).count()
    );
    println!("Population: {}", config.population_size);
    println!("Generations: {}", config.num_generations);
    println!();

    println!("Running search...");
    let start = Instant::now();
    let report_every = (config.num_generations / 10).max(1);

    let outcome = CollageRunner::run_with_callback(&config, &images, |progress| {
        if progress.phase == EvolutionPhase::Initializing {
            println!("  Initial best cost: {:.6}", progress.best_score);
        } else if progress.generation % report_every == 0
            || progress.phase == EvolutionPhase::Terminated
        {
            println!(
                "  Generation {}/{}: best={:.6}, generation best={:.6}, improvements={}",
                progress.generation,
                progress.total_generations,
                progress.best_score,
                progress.generation_best,
                progress.improvements
            );
        }
    })
    .unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let elapsed = start.elapsed();
    let best = outcome.best.individual;

    println!();
    println!("Best layout (cost {:.6}):", outcome.best.score);
    print!("{}", best);
    println!();
    println!(
        "Time: {:.2}s ({} generations, {:?})",
        elapsed.as_secs_f32(),
        outcome.generations,
        outcome.stop_reason
    );
    println!();

    match serde_json::to_string_pretty(&best.render_plan()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing render plan: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_example_files() {
    let config = CollageConfig {
        target_width: 1200,
        target_height: 800,
        population_size: 200,
        num_generations: 100,
        ..Default::default()
    };

    let images = vec![
        SourceImage::new("photos/beach.jpg", Dimension::new(4000.0, 3000.0), 1),
        SourceImage::new("photos/portrait.jpg", Dimension::new(3000.0, 4000.0), 1)
            .with_rotation(Rotation::RotCw90),
        SourceImage::new("photos/sunset.jpg", Dimension::new(6000.0, 4000.0), 1),
        SourceImage::new("photos/dog.png", Dimension::new(1080.0, 1080.0), 1),
    ];

    println!("config.json:");
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_default()
    );
    println!();
    println!("images.json:");
    println!(
        "{}",
        serde_json::to_string_pretty(&images).unwrap_or_default()
    );
}
