// Tournament selection

use rand::Rng;

use crate::population::Individual;

fn score(individual: &Individual) -> u64 {
    individual
        .fitness()
        .expect("tournament selection requires an evaluated population")
}

/// Pick a parent by tournament
///
/// Draws `size` individuals uniformly at random with replacement and returns
/// the one with the lowest fitness; ties go to whichever was drawn first.
///
/// When `size` is at least the population length, the tournament covers the
/// whole population instead of sampling, and the global best (first in
/// population order on ties) always wins. That path draws nothing from `rng`,
/// for `size == len` and `size > len` alike. `size == 1` is uniform random
/// selection.
///
/// # Panics
/// Panics if `individuals` is empty, `size` is zero, or any individual
/// involved has no fitness yet. Selecting before evaluation is a bug in the
/// caller, not a runtime condition.
pub fn tournament<'a, R: Rng + ?Sized>(
    individuals: &'a [Individual],
    size: usize,
    rng: &mut R,
) -> &'a Individual {
    assert!(!individuals.is_empty(), "cannot select from an empty population");
    assert!(size > 0, "tournament size must be at least 1");

    if size >= individuals.len() {
        return individuals
            .iter()
            .min_by_key(|i| score(i))
            .expect("population is non-empty");
    }

    let mut winner = &individuals[rng.gen_range(0..individuals.len())];
    let mut best = score(winner);

    for _ in 1..size {
        let challenger = &individuals[rng.gen_range(0..individuals.len())];
        let challenger_score = score(challenger);
        // Strict comparison keeps the earliest draw on ties
        if challenger_score < best {
            winner = challenger;
            best = challenger_score;
        }
    }

    winner
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genes::{Color, Genome, Point, Triangle};
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    /// Evaluated individuals with the given scores, each with a distinct genome
    fn ranked(scores: &[u64]) -> Vec<Individual> {
        scores
            .iter()
            .map(|&s| {
                let tri = Triangle::new(
                    [Point::new(s as f32, 0.0), Point::new(0.0, 1.0), Point::new(1.0, 1.0)],
                    Color::BLACK,
                );
                let mut individual = Individual::new(Genome::from_triangles(vec![tri]));
                individual.set_fitness(s);
                individual
            })
            .collect()
    }

    #[test]
    fn test_matches_manual_draws() {
        let scores: Vec<u64> = vec![7, 3, 9, 3, 1, 8, 6, 2, 5, 4];
        let population = ranked(&scores);
        let mut rng = Pcg64::seed_from_u64(2024);

        for _ in 0..500 {
            let mut replay = rng.clone();
            let draws: Vec<usize> = (0..4).map(|_| replay.gen_range(0..scores.len())).collect();
            let expected = draws.iter().map(|&i| scores[i]).min().unwrap();
            let sample_max = draws.iter().map(|&i| scores[i]).max().unwrap();

            let winner = tournament(&population, 4, &mut rng);
            let got = winner.fitness().unwrap();

            assert_eq!(got, expected);
            assert!(got <= sample_max);
        }
    }

    #[test]
    fn test_ties_go_to_first_draw() {
        let population = ranked(&[5, 5, 5, 5, 5, 5]);
        let mut rng = Pcg64::seed_from_u64(77);

        for _ in 0..200 {
            let mut replay = rng.clone();
            let first = replay.gen_range(0..population.len());

            let winner = tournament(&population, 3, &mut rng);
            assert!(std::ptr::eq(winner, &population[first]));
        }
    }

    #[test]
    fn test_full_tournament_returns_global_best() {
        let population = ranked(&[12, 4, 9, 4, 30]);
        let mut rng = Pcg64::seed_from_u64(1);

        for size in [5, 6, 100] {
            for _ in 0..50 {
                let winner = tournament(&population, size, &mut rng);
                assert!(std::ptr::eq(winner, &population[1]));
            }
        }
    }

    #[test]
    fn test_full_tournament_leaves_rng_untouched() {
        let population = ranked(&[6, 2, 8]);
        let mut rng = Pcg64::seed_from_u64(12);
        let mut untouched = rng.clone();

        for size in [3, 4, 50] {
            tournament(&population, size, &mut rng);
        }
        assert_eq!(rng.gen::<u64>(), untouched.gen::<u64>());
    }

    #[test]
    fn test_size_one_reaches_everyone() {
        let population = ranked(&[0, 1, 2, 3, 4, 5, 6, 7]);
        let mut rng = Pcg64::seed_from_u64(8);

        let mut seen = [false; 8];
        for _ in 0..1_000 {
            let winner = tournament(&population, 1, &mut rng);
            seen[winner.fitness().unwrap() as usize] = true;
        }
        assert!(seen.iter().all(|&s| s), "uniform selection should hit every index");
    }

    #[test]
    fn test_pressure_favours_better_individuals() {
        let scores: Vec<u64> = (0..20).collect();
        let population = ranked(&scores);
        let mut rng = Pcg64::seed_from_u64(99);

        let trials = 5_000;
        let mean = (0..trials)
            .map(|_| tournament(&population, 5, &mut rng).fitness().unwrap() as f64)
            .sum::<f64>()
            / trials as f64;

        // Population mean is 9.5; best-of-5 sits far below it
        assert!(mean < 6.0, "mean selected fitness too high: {}", mean);
    }

    #[test]
    fn test_single_individual_population() {
        let population = ranked(&[17]);
        let mut rng = Pcg64::seed_from_u64(3);

        for size in [1, 5] {
            let winner = tournament(&population, size, &mut rng);
            assert!(std::ptr::eq(winner, &population[0]));
        }
    }

    #[test]
    fn test_does_not_modify_population() {
        let population = ranked(&[3, 1, 2]);
        let snapshot: Vec<Option<u64>> = population.iter().map(|i| i.fitness()).collect();
        let mut rng = Pcg64::seed_from_u64(4);

        for _ in 0..10 {
            tournament(&population, 2, &mut rng);
        }
        let after: Vec<Option<u64>> = population.iter().map(|i| i.fitness()).collect();
        assert_eq!(snapshot, after);
    }

    #[test]
    #[should_panic(expected = "evaluated population")]
    fn test_unevaluated_population_panics() {
        let population = vec![
            Individual::new(Genome::from_triangles(vec![])),
            Individual::new(Genome::from_triangles(vec![])),
        ];
        let mut rng = Pcg64::seed_from_u64(0);
        tournament(&population, 1, &mut rng);
    }
}
