use crate::types::Assignment;
use serde::{Deserialize, Serialize};

/// Fitness summary of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationStatistics {
    pub best: f64,
    pub worst: f64,
    pub total: f64,
    /// Mean fitness, never above `best`
    pub average: f64,
}

impl GenerationStatistics {
    /// Returns `None` for an empty slice.
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        let first = *scores.first()?;
        let (best, worst, total) = scores.iter().fold(
            (first, first, 0.0),
            |(best, worst, total), &score| (best.max(score), worst.min(score), total + score),
        );
        let average = (total / scores.len() as f64).min(best);

        Some(Self {
            best,
            worst,
            total,
            average,
        })
    }
}

/// Highest-fitness candidate seen so far in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestEver {
    pub assignment: Assignment,
    pub fitness: f64,
    pub elapsed: f64,
    pub generation: usize,
    pub placements: Option<Assignment>,
}

impl BestEver {
    /// True when `fitness` strictly improves on the current record.
    pub fn is_beaten_by(record: Option<&BestEver>, fitness: f64) -> bool {
        match record {
            Some(best) => fitness > best.fitness,
            None => fitness.is_finite(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_basic() {
        let stats = GenerationStatistics::from_scores(&[10.0, 20.0, 30.0, 40.0]).unwrap();
        assert_eq!(stats.best, 40.0);
        assert_eq!(stats.worst, 10.0);
        assert_eq!(stats.total, 100.0);
        assert_eq!(stats.average, 25.0);
    }

    #[test]
    fn test_average_never_exceeds_best() {
        let score = 0.1 + 0.2;
        let stats = GenerationStatistics::from_scores(&[score; 3]).unwrap();
        assert!(stats.average <= stats.best);
    }

    #[test]
    fn test_empty_scores() {
        assert!(GenerationStatistics::from_scores(&[]).is_none());
    }

    #[test]
    fn test_best_ever_needs_strict_improvement() {
        let record = BestEver {
            assignment: vec![0, 1],
            fitness: 990.0,
            elapsed: 1.0,
            generation: 3,
            placements: None,
        };
        assert!(!BestEver::is_beaten_by(Some(&record), 990.0));
        assert!(BestEver::is_beaten_by(Some(&record), 990.5));
        assert!(BestEver::is_beaten_by(None, 1.0));
    }
}
