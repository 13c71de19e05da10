//! Quick layout search performance test

use collage_layout::{
    CollageRunner,
    schema::{CollageConfig, Dimension, SourceImage},
};
use std::time::Instant;

fn images(count: usize) -> Vec<SourceImage> {
    (0..count)
        .map(|i| {
            let (width, height) = match i % 4 {
                0 => (4000.0, 3000.0),
                1 => (3000.0, 4000.0),
                2 => (6000.0, 4000.0),
                _ => (1080.0, 1080.0),
            };
            let weight = if i == 0 { 4 } else { 1 };
            SourceImage::new(format!("image_{i}.jpg"), Dimension::new(width, height), weight)
        })
        .collect()
}

fn main() {
    println!("=== Layout Search Performance Test ===\n");

    // Test different image counts
    for count in [5, 20, 80] {
        println!("Images: {}", count);

        let images = images(count);
        let config = CollageConfig {
            population_size: 200,
            num_generations: 50,
            random_seed: Some(42),
            ..Default::default()
        }
        .with_weight_sum(&images);

        let start = Instant::now();
        let outcome = CollageRunner::run(&config, &images).unwrap();
        let elapsed = start.elapsed();

        let total_evals = (outcome.generations + 1) * config.population_size;
        let evals_per_sec = total_evals as f64 / elapsed.as_secs_f64();

        println!("  Generations:    {}", outcome.generations);
        println!("  Evaluations:    {}", total_evals);
        println!("  Elapsed:        {:.2}s", elapsed.as_secs_f64());
        println!("  Evals/sec:      {:.1}", evals_per_sec);
        println!("  Improvements:   {}", outcome.improvements);
        println!("  Best cost:      {:.4}", outcome.best.score);
        println!();
    }

    println!("=== Parallel vs Sequential (40 images) ===\n");

    let images = images(40);
    for parallel in [false, true] {
        let config = CollageConfig {
            population_size: 400,
            num_generations: 20,
            random_seed: Some(7),
            parallel,
            ..Default::default()
        }
        .with_weight_sum(&images);

        let start = Instant::now();
        let outcome = CollageRunner::run(&config, &images).unwrap();
        println!(
            "  parallel={:<5}  {:.2}s  best cost {:.4}",
            parallel,
            start.elapsed().as_secs_f64(),
            outcome.best.score
        );
    }
}
