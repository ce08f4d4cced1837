use super::genome::Genome;
use super::statistics::GenerationStatistics;
use rand::Rng;
use thiserror::Error;

/// Draws allowed before `select_parent` gives up on the wheel.
pub const MAX_SELECTION_DRAWS: usize = 10_000;

/// Why a single roulette draw produced no parent.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMiss {
    #[error("population is empty")]
    EmptyPopulation,

    #[error("no above-average individual past the drawn slice")]
    BelowAverage,
}

/// Roulette wheel selection gated on average fitness.
///
/// Draws a slice in `[0, total)` and walks the population accumulating
/// fitness. The first individual whose running sum passes the slice and whose
/// own fitness is at least the generation average is returned. A draw can
/// miss, in which case the caller draws again.
pub fn roulette_selection_gated<R: Rng>(
    population: &[Genome],
    stats: &GenerationStatistics,
    rng: &mut R,
) -> Result<usize, SelectionMiss> {
    if population.is_empty() {
        return Err(SelectionMiss::EmptyPopulation);
    }

    let slice = rng.gen::<f64>() * stats.total;
    let mut sum = 0.0;

    for (idx, genome) in population.iter().enumerate() {
        let fitness = genome.fitness();
        sum += fitness;
        if sum > slice && fitness >= stats.average {
            return Ok(idx);
        }
    }

    Err(SelectionMiss::BelowAverage)
}

/// Repeats gated roulette draws until one hits.
///
/// After `MAX_SELECTION_DRAWS` misses the fittest individual is returned;
/// it always clears the gate, which keeps degenerate populations (all zero
/// fitness, say) from stalling the run.
pub fn select_parent<R: Rng>(
    population: &[Genome],
    stats: &GenerationStatistics,
    rng: &mut R,
) -> Result<usize, SelectionMiss> {
    for _ in 0..MAX_SELECTION_DRAWS {
        match roulette_selection_gated(population, stats, rng) {
            Ok(idx) => return Ok(idx),
            Err(SelectionMiss::EmptyPopulation) => return Err(SelectionMiss::EmptyPopulation),
            Err(SelectionMiss::BelowAverage) => continue,
        }
    }

    log::warn!(
        "Roulette missed {} times; selecting the fittest individual",
        MAX_SELECTION_DRAWS
    );
    population
        .iter()
        .enumerate()
        .max_by(|a, b| {
            a.1.fitness()
                .partial_cmp(&b.1.fitness())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(idx, _)| idx)
        .ok_or(SelectionMiss::EmptyPopulation)
}

/// Chance-gated mutation: with probability `rate` flip up to
/// `max_count - 1` genes.
pub fn maybe_mutate<R: Rng>(genome: &mut Genome, rate: f64, max_count: usize, rng: &mut R) {
    if rng.gen::<f64>() < rate {
        let count = if max_count == 0 {
            0
        } else {
            rng.gen_range(0..max_count)
        };
        genome.mutate(count, rng);
    }
}
