//! Bit-string genome for tier assignment.
//!
//! Genes are read two at a time; each pair is one decision slot and decodes
//! to a small integer that names a storage tier:
//!
//! | genes           | value |
//! |-----------------|-------|
//! | `false, false`  | 0     |
//! | `false, true`   | 1     |
//! | `true,  false`  | 2     |
//! | `true,  true`   | 3     |
//!
//! Genetic operators never modify their inputs in place: `crossover` clones
//! both parents before swapping segments.
//!
//! # Example
//!
//! ```
//! use tierbias::engines::generation::Genome;
//!
//! let genome = Genome::from_genes(vec![false, true, true, false]);
//! assert_eq!(genome.decode().unwrap(), vec![1, 2]);
//! ```

use crate::error::{GenomeError, Result, TierbiasError};
use rand::Rng;

/// Genes per decision slot
pub const BITS_PER_SLOT: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Genome {
    genes: Vec<bool>,
    score: Option<f64>,
}

impl Genome {
    /// Each gene is set with probability 0.5.
    pub fn random<R: Rng>(length: usize, rng: &mut R) -> Result<Self> {
        if length == 0 {
            return Err(TierbiasError::Configuration(
                "Genome length must be positive".to_string(),
            ));
        }
        let genes = (0..length).map(|_| rng.gen_bool(0.5)).collect();
        Ok(Self::from_genes(genes))
    }

    pub fn from_genes(genes: Vec<bool>) -> Self {
        Self { genes, score: None }
    }

    pub fn genes(&self) -> &[bool] {
        &self.genes
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    /// Score used by selection; an unscored genome counts as zero.
    pub fn fitness(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }

    pub fn set_score(&mut self, score: f64) {
        self.score = Some(score);
    }

    /// Copies the genes into a fresh, unscored genome.
    pub fn try_clone(&self) -> std::result::Result<Self, GenomeError> {
        if self.genes.is_empty() {
            return Err(GenomeError::Empty);
        }
        Ok(Self::from_genes(self.genes.clone()))
    }

    /// Segment-swap crossover.
    ///
    /// Two cut points are drawn independently from `0..len`, then the
    /// inclusive range between them is exchanged between copies of the
    /// parents. Equal cut points swap exactly one gene.
    pub fn crossover<R: Rng>(
        parent1: &Genome,
        parent2: &Genome,
        rng: &mut R,
    ) -> std::result::Result<(Genome, Genome), GenomeError> {
        if parent1.len() != parent2.len() {
            return Err(GenomeError::LengthMismatch {
                left: parent1.len(),
                right: parent2.len(),
            });
        }

        let mut child1 = parent1.try_clone()?;
        let mut child2 = parent2.try_clone()?;

        let size = child1.len();
        let a = rng.gen_range(0..size);
        let b = rng.gen_range(0..size);
        let (start, end) = if a <= b { (a, b) } else { (b, a) };

        child1.genes[start..=end].swap_with_slice(&mut child2.genes[start..=end]);

        Ok((child1, child2))
    }

    /// Flips `count` genes picked with replacement, so a gene hit twice
    /// ends up unchanged.
    pub fn mutate<R: Rng>(&mut self, count: usize, rng: &mut R) {
        if self.genes.is_empty() {
            return;
        }
        for _ in 0..count {
            let at = rng.gen_range(0..self.genes.len());
            self.genes[at] = !self.genes[at];
        }
    }

    /// Reads each gene pair `(hi, lo)` as `2 * hi + lo`.
    pub fn decode(&self) -> std::result::Result<Vec<usize>, GenomeError> {
        if self.genes.len() % BITS_PER_SLOT != 0 {
            return Err(GenomeError::OddLength(self.genes.len()));
        }
        Ok(self
            .genes
            .chunks_exact(BITS_PER_SLOT)
            .map(|pair| 2 * usize::from(pair[0]) + usize::from(pair[1]))
            .collect())
    }
}
