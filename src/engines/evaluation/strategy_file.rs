use super::workflow::SlotLayout;
use crate::error::{Result, TierbiasError};
use crate::types::{Assignment, OptimizationResult};
use std::fmt::Write as _;
use std::path::Path;

pub const STRATEGY_HEADER: &str = "slot\tsignature\tfile\ttier";

/// Renders one row per slot; the tier column is always last.
///
/// Uses the tiers the evaluator actually placed files on when known.
pub fn render_strategy(layout: &SlotLayout, result: &OptimizationResult) -> Result<String> {
    let tiers = result.placements.as_ref().unwrap_or(&result.assignment);
    let slots = layout.slots();
    if slots.len() != tiers.len() {
        return Err(TierbiasError::Evaluation(format!(
            "layout has {} slots but result has {}",
            slots.len(),
            tiers.len()
        )));
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", STRATEGY_HEADER);
    for (info, tier) in slots.iter().zip(tiers) {
        let _ = writeln!(out, "{}\t{}\t{}\t{}", info.slot, info.signature, info.file, tier);
    }
    Ok(out)
}

pub fn write_strategy<P: AsRef<Path>>(
    path: P,
    layout: &SlotLayout,
    result: &OptimizationResult,
) -> Result<()> {
    std::fs::write(path, render_strategy(layout, result)?)?;
    Ok(())
}

/// Reads the last tab-separated column of every line after the header.
pub fn parse_strategy(contents: &str) -> Result<Assignment> {
    contents
        .lines()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            let value = line.rsplit('\t').next().unwrap_or_default().trim();
            value.parse::<usize>().map_err(|_| {
                TierbiasError::DataLoading(format!(
                    "line {}: '{}' is not a tier index",
                    number + 1,
                    value
                ))
            })
        })
        .collect()
}

pub fn read_strategy<P: AsRef<Path>>(path: P) -> Result<Assignment> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        TierbiasError::DataLoading(format!(
            "Failed to read strategy {}: {}",
            path.as_ref().display(),
            e
        ))
    })?;
    parse_strategy(&contents)
}
