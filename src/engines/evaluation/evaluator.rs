use crate::config::DecodePolicy;
use crate::error::{Result, TierbiasError};
use crate::types::{Assignment, TierIndex};
use log::warn;

/// Constant the log-time is subtracted from.
pub const FITNESS_CEILING: f64 = 1000.0;

/// Result of simulating one candidate assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub elapsed: f64,
    /// Tier each slot actually ended up on, when the evaluator tracks it
    pub placements: Option<Assignment>,
}

impl Evaluation {
    pub fn elapsed(elapsed: f64) -> Self {
        Self {
            elapsed,
            placements: None,
        }
    }
}

/// Simulates a tier assignment and reports the elapsed time.
///
/// Takes `&mut self`: evaluators usually wrap stateful simulators, so the
/// optimizer owns its evaluator and calls it one candidate at a time.
pub trait Evaluator {
    fn evaluate(&mut self, assignment: &[usize]) -> Result<Evaluation>;
}

impl<F> Evaluator for F
where
    F: FnMut(&[usize]) -> Result<f64>,
{
    fn evaluate(&mut self, assignment: &[usize]) -> Result<Evaluation> {
        self(assignment).map(Evaluation::elapsed)
    }
}

/// `1000 - ln(time)`: shorter runs score higher.
pub fn fitness_from_time(elapsed: f64) -> Result<f64> {
    if !elapsed.is_finite() || elapsed <= 0.0 {
        return Err(TierbiasError::Evaluation(format!(
            "elapsed time must be positive and finite, got {}",
            elapsed
        )));
    }
    Ok(FITNESS_CEILING - elapsed.ln())
}

/// Maps decoded slot values onto the tiers that exist.
///
/// A two-bit slot can decode to 3 while the reference hierarchy has three
/// tiers; the policy decides whether such values clamp to the last tier or
/// invalidate the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierMapping {
    tier_count: usize,
    policy: DecodePolicy,
}

impl TierMapping {
    pub fn new(tier_count: usize, policy: DecodePolicy) -> Result<Self> {
        if tier_count == 0 {
            return Err(TierbiasError::Configuration(
                "Tier mapping needs at least one tier".to_string(),
            ));
        }
        Ok(Self { tier_count, policy })
    }

    pub fn tier_count(&self) -> usize {
        self.tier_count
    }

    pub fn map(&self, decoded: usize) -> Result<TierIndex> {
        if decoded < self.tier_count {
            return Ok(decoded);
        }
        match self.policy {
            DecodePolicy::Clamp => Ok(self.tier_count - 1),
            DecodePolicy::Reject => Err(TierbiasError::UnknownTier(decoded)),
        }
    }

    pub fn map_all(&self, decoded: &[usize]) -> Result<Assignment> {
        decoded.iter().map(|&value| self.map(value)).collect()
    }
}

/// Scores infeasible candidates instead of aborting the run.
///
/// Capacity failures from the wrapped evaluator become a fixed, large
/// elapsed time. Every other error still propagates.
pub struct InfeasiblePenalty<E> {
    inner: E,
    penalty: f64,
}

impl<E: Evaluator> InfeasiblePenalty<E> {
    pub fn new(inner: E, penalty: f64) -> Result<Self> {
        fitness_from_time(penalty)?;
        Ok(Self { inner, penalty })
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

impl<E: Evaluator> Evaluator for InfeasiblePenalty<E> {
    fn evaluate(&mut self, assignment: &[usize]) -> Result<Evaluation> {
        match self.inner.evaluate(assignment) {
            Err(err) if err.is_capacity() => {
                warn!("Infeasible candidate scored with penalty: {}", err);
                Ok(Evaluation::elapsed(self.penalty))
            }
            other => other,
        }
    }
}
