//! Parent selection strategies.

use rand::Rng;

use super::genome::{GenomeRng, ScoredIndividual};

/// Number of leading individuals eligible for selection.
///
/// `floor(len * fraction)`, clamped to `1..=len`.
pub fn fittest_part_len(len: usize, fraction: f64) -> usize {
    let part = (len as f64 * fraction).floor();
    if part.is_nan() || part < 1.0 {
        1
    } else {
        (part as usize).min(len.max(1))
    }
}

/// Select an individual uniformly from the fittest `fraction` of a population
/// sorted by ascending cost.
///
/// `fraction = 1.0` is uniform selection over the whole population.
///
/// # Panics
///
/// Panics if `population` is empty.
pub fn from_fittest_part_selection<'a, T>(
    population: &'a [ScoredIndividual<T>],
    fraction: f64,
    rng: &mut GenomeRng,
) -> &'a T {
    let upper = fittest_part_len(population.len(), fraction);
    &population[rng.gen_range(0..upper)].individual
}

#[cfg(test)]
mod tests {
    use super::*;

    fn population() -> Vec<ScoredIndividual<String>> {
        (1..=100)
            .map(|i| ScoredIndividual::new(i as f64, format!("Individual {i}")))
            .collect()
    }

    #[test]
    fn test_fittest_part_len() {
        assert_eq!(fittest_part_len(100, 0.25), 25);
        assert_eq!(fittest_part_len(10, 0.25), 2);
        assert_eq!(fittest_part_len(3, 0.25), 1);
        assert_eq!(fittest_part_len(4, 1.0), 4);
        assert_eq!(fittest_part_len(4, 2.0), 4);
        assert_eq!(fittest_part_len(4, 0.0), 1);
    }

    #[test]
    fn test_selection_stays_within_fittest_part() {
        let population = population();
        let mut rng = GenomeRng::new(42);

        for (fraction, limit) in [(0.25, 25.0), (0.5, 50.0), (1.0, 100.0)] {
            for _ in 0..500 {
                let chosen = from_fittest_part_selection(&population, fraction, &mut rng);
                let score = population
                    .iter()
                    .find(|s| &s.individual == chosen)
                    .map(|s| s.score)
                    .unwrap();
                assert!(score <= limit, "{chosen} outside fittest {fraction}");
            }
        }
    }

    #[test]
    fn test_full_fraction_reaches_whole_population() {
        let population = population();
        let mut rng = GenomeRng::new(1);
        let mut seen_tail = false;
        for _ in 0..2000 {
            let chosen = from_fittest_part_selection(&population, 1.0, &mut rng);
            if chosen == "Individual 100" {
                seen_tail = true;
                break;
            }
        }
        assert!(seen_tail);
    }

    #[test]
    fn test_single_individual() {
        let population = vec![ScoredIndividual::new(0.0, 'x')];
        let mut rng = GenomeRng::new(3);
        assert_eq!(*from_fittest_part_selection(&population, 0.1, &mut rng), 'x');
    }
}
