use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::TierbiasError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub num_generations: usize,
    /// Probability that an individual is mutated at all in a generation
    pub mutation_rate: f64,
    /// Exclusive upper bound on bit flips applied to a mutated individual
    pub max_mutation_count: usize,
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 200,
            num_generations: 300,
            mutation_rate: 0.1,
            max_mutation_count: 20,
            seed: None,
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), TierbiasError> {
        if self.population_size == 0 {
            return Err(TierbiasError::Configuration(
                "Population size must be positive".to_string()
            ));
        }
        if self.population_size % 2 != 0 {
            return Err(TierbiasError::Configuration(format!(
                "Population size must be even, got {}",
                self.population_size
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(TierbiasError::Configuration(
                "Mutation rate must be between 0 and 1".to_string()
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Evolution".to_string(),
            fields: vec![
                FieldManifest::new(
                    "population_size",
                    "integer",
                    serde_json::json!(200),
                    Some(2.0),
                    None,
                    "Number of genomes per generation (even)",
                ),
                FieldManifest::new(
                    "num_generations",
                    "integer",
                    serde_json::json!(300),
                    Some(0.0),
                    None,
                    "Generations to run after initialization",
                ),
                FieldManifest::new(
                    "mutation_rate",
                    "float",
                    serde_json::json!(0.1),
                    Some(0.0),
                    Some(1.0),
                    "Chance an individual is mutated each generation",
                ),
                FieldManifest::new(
                    "max_mutation_count",
                    "integer",
                    serde_json::json!(20),
                    Some(0.0),
                    None,
                    "Upper bound (exclusive) on bit flips per mutation",
                ),
                FieldManifest::new(
                    "seed",
                    "integer",
                    serde_json::Value::Null,
                    None,
                    None,
                    "Random seed; unset draws from entropy",
                ),
            ],
        }
    }
}
