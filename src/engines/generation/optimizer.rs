use super::genome::{Genome, BITS_PER_SLOT};
use super::operators::{maybe_mutate, select_parent};
use super::progress::ProgressCallback;
use super::statistics::{BestEver, GenerationStatistics};
use crate::config::{ConfigSection, EvolutionConfig};
use crate::engines::evaluation::{fitness_from_time, Evaluator};
use crate::error::{Result, TierbiasError};
use crate::types::{Assignment, OptimizationResult};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Lifecycle of a `GeneticOptimizer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerState {
    Uninitialized,
    Initialized,
    Evolving,
    Terminated,
}

/// Generational genetic search over tier assignments.
///
/// Each generation fully replaces the population with children of
/// fitness-proportionate parents, then mutates and rescores it. No genome is
/// carried over, but the best candidate ever scored is kept on the side and
/// is what the run reports.
///
/// Evaluation is strictly sequential: the optimizer owns the evaluator and
/// hands it one decoded genome at a time.
pub struct GeneticOptimizer<E: Evaluator> {
    config: EvolutionConfig,
    genome_length: usize,
    evaluator: E,
    population: Vec<Genome>,
    statistics: Option<GenerationStatistics>,
    best_ever: Option<BestEver>,
    generation: usize,
    state: OptimizerState,
    rng: StdRng,
}

impl<E: Evaluator> GeneticOptimizer<E> {
    pub fn new(config: EvolutionConfig, genome_length: usize, evaluator: E) -> Result<Self> {
        config.validate()?;
        if genome_length == 0 {
            return Err(TierbiasError::Configuration(
                "Genome length must be positive".to_string(),
            ));
        }
        if genome_length % BITS_PER_SLOT != 0 {
            return Err(TierbiasError::Configuration(format!(
                "Genome length {} is not a multiple of {}",
                genome_length, BITS_PER_SLOT
            )));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            config,
            genome_length,
            evaluator,
            population: Vec::new(),
            statistics: None,
            best_ever: None,
            generation: 0,
            state: OptimizerState::Uninitialized,
            rng,
        })
    }

    /// Builds an optimizer with one two-bit slot per decision.
    pub fn for_slots(config: EvolutionConfig, slot_count: usize, evaluator: E) -> Result<Self> {
        Self::new(config, slot_count * BITS_PER_SLOT, evaluator)
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn genome_length(&self) -> usize {
        self.genome_length
    }

    pub fn state(&self) -> OptimizerState {
        self.state
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn population(&self) -> &[Genome] {
        &self.population
    }

    pub fn statistics(&self) -> Option<&GenerationStatistics> {
        self.statistics.as_ref()
    }

    pub fn best_ever(&self) -> Option<&BestEver> {
        self.best_ever.as_ref()
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn into_evaluator(self) -> E {
        self.evaluator
    }

    /// Seeds a random population and scores it as generation 0.
    pub fn initialize(&mut self) -> Result<()> {
        self.initialize_with_callback(&mut NullProgress)
    }

    /// Replaces the population with the given genomes and scores them as
    /// generation 0.
    pub fn seed_population(&mut self, population: Vec<Genome>) -> Result<()> {
        if population.len() != self.config.population_size {
            return Err(TierbiasError::Configuration(format!(
                "Seed population has {} genomes, expected {}",
                population.len(),
                self.config.population_size
            )));
        }
        if let Some(genome) = population.iter().find(|g| g.len() != self.genome_length) {
            return Err(TierbiasError::Configuration(format!(
                "Seed genome has {} genes, expected {}",
                genome.len(),
                self.genome_length
            )));
        }

        self.reset_run();
        self.population = population;
        self.score_population(&mut NullProgress)?;
        self.state = OptimizerState::Initialized;
        Ok(())
    }

    /// Advances exactly one generation.
    pub fn step(&mut self) -> Result<&GenerationStatistics> {
        self.step_with_callback(&mut NullProgress)
    }

    /// Initializes, runs every configured generation and reports the best
    /// candidate seen.
    pub fn run<C: ProgressCallback>(&mut self, callback: &mut C) -> Result<OptimizationResult> {
        self.initialize_with_callback(callback)?;

        for _ in 0..self.config.num_generations {
            self.step_with_callback(callback)?;
        }

        self.state = OptimizerState::Terminated;
        self.result()
    }

    /// Best-ever candidate in the exposed result shape.
    pub fn result(&self) -> Result<OptimizationResult> {
        let best = self.best_ever.as_ref().ok_or_else(|| {
            TierbiasError::Evaluation("no candidate has been scored".to_string())
        })?;

        Ok(OptimizationResult {
            assignment: best.assignment.clone(),
            fitness: best.fitness,
            elapsed: best.elapsed,
            generation_found: best.generation,
            placements: best.placements.clone(),
        })
    }

    fn reset_run(&mut self) {
        self.population.clear();
        self.statistics = None;
        self.best_ever = None;
        self.generation = 0;
    }

    fn initialize_with_callback<C: ProgressCallback>(&mut self, callback: &mut C) -> Result<()> {
        self.reset_run();
        callback.on_generation_start(0);

        let mut population = Vec::with_capacity(self.config.population_size);
        for _ in 0..self.config.population_size {
            population.push(Genome::random(self.genome_length, &mut self.rng)?);
        }
        self.population = population;

        let stats = self.score_population(callback)?;
        self.state = OptimizerState::Initialized;
        callback.on_generation_complete(0, &stats, self.best_ever_fitness());
        Ok(())
    }

    fn step_with_callback<C: ProgressCallback>(
        &mut self,
        callback: &mut C,
    ) -> Result<&GenerationStatistics> {
        match self.state {
            OptimizerState::Initialized | OptimizerState::Evolving => {}
            OptimizerState::Uninitialized | OptimizerState::Terminated => {
                return Err(TierbiasError::Configuration(format!(
                    "Cannot evolve an optimizer in state {:?}",
                    self.state
                )));
            }
        }

        self.generation += 1;
        self.state = OptimizerState::Evolving;
        callback.on_generation_start(self.generation);

        self.population = self.breed_next_generation()?;
        self.mutate_population();
        let stats = self.score_population(callback)?;

        callback.on_generation_complete(self.generation, &stats, self.best_ever_fitness());
        self.statistics
            .as_ref()
            .ok_or_else(|| TierbiasError::Evaluation("generation produced no scores".to_string()))
    }

    fn breed_next_generation(&mut self) -> Result<Vec<Genome>> {
        let stats = self
            .statistics
            .ok_or_else(|| TierbiasError::Evaluation("population is not scored".to_string()))?;
        let size = self.config.population_size;
        let mut children = Vec::with_capacity(size);

        while children.len() < size {
            let p1 = select_parent(&self.population, &stats, &mut self.rng)
                .map_err(|miss| TierbiasError::Evaluation(miss.to_string()))?;
            let p2 = select_parent(&self.population, &stats, &mut self.rng)
                .map_err(|miss| TierbiasError::Evaluation(miss.to_string()))?;

            let (child1, child2) =
                Genome::crossover(&self.population[p1], &self.population[p2], &mut self.rng)?;

            children.push(child1);
            if children.len() < size {
                children.push(child2);
            }
        }

        Ok(children)
    }

    fn mutate_population(&mut self) {
        let rate = self.config.mutation_rate;
        let max_count = self.config.max_mutation_count;
        for genome in &mut self.population {
            maybe_mutate(genome, rate, max_count, &mut self.rng);
        }
    }

    /// Scores every genome in order, refreshes the statistics and the
    /// best-ever record. Any evaluation error aborts the generation.
    fn score_population<C: ProgressCallback>(
        &mut self,
        callback: &mut C,
    ) -> Result<GenerationStatistics> {
        let total = self.population.len();
        let mut generation_best: Option<Candidate> = None;

        for idx in 0..total {
            let assignment = self.population[idx].decode()?;
            let evaluation = self.evaluator.evaluate(&assignment)?;
            let fitness = fitness_from_time(evaluation.elapsed)?;
            self.population[idx].set_score(fitness);

            debug!(
                "genome {}/{} elapsed {:.6} fitness {:.6}",
                idx + 1,
                total,
                evaluation.elapsed,
                fitness
            );
            callback.on_genome_evaluated(idx + 1, total);

            if generation_best.as_ref().map_or(true, |best| fitness > best.fitness) {
                generation_best = Some(Candidate {
                    assignment,
                    fitness,
                    elapsed: evaluation.elapsed,
                    placements: evaluation.placements,
                });
            }
        }

        let scores: Vec<f64> = self.population.iter().map(Genome::fitness).collect();
        let stats = GenerationStatistics::from_scores(&scores)
            .ok_or_else(|| TierbiasError::Evaluation("population is empty".to_string()))?;
        self.statistics = Some(stats);

        if let Some(best) = generation_best {
            if BestEver::is_beaten_by(self.best_ever.as_ref(), best.fitness) {
                info!(
                    "New best at generation {}: fitness {:.6}, elapsed {:.6}",
                    self.generation, best.fitness, best.elapsed
                );
                self.best_ever = Some(BestEver {
                    assignment: best.assignment,
                    fitness: best.fitness,
                    elapsed: best.elapsed,
                    generation: self.generation,
                    placements: best.placements,
                });
            }
        }

        Ok(stats)
    }

    fn best_ever_fitness(&self) -> f64 {
        self.best_ever
            .as_ref()
            .map_or(f64::NEG_INFINITY, |best| best.fitness)
    }
}

/// Runs a full optimization for `slot_count` decision slots.
pub fn run_optimization<E: Evaluator, C: ProgressCallback>(
    config: EvolutionConfig,
    slot_count: usize,
    evaluator: E,
    callback: &mut C,
) -> Result<OptimizationResult> {
    let mut optimizer = GeneticOptimizer::for_slots(config, slot_count, evaluator)?;
    optimizer.run(callback)
}

struct Candidate {
    assignment: Assignment,
    fitness: f64,
    elapsed: f64,
    placements: Option<Assignment>,
}

struct NullProgress;

impl ProgressCallback for NullProgress {
    fn on_generation_start(&mut self, _generation: usize) {}

    fn on_generation_complete(
        &mut self,
        _generation: usize,
        _stats: &GenerationStatistics,
        _best_ever_fitness: f64,
    ) {
    }

    fn on_genome_evaluated(&mut self, _genome_num: usize, _total: usize) {}
}
