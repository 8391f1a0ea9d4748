//! Pick the unit whose magnitude reads most naturally
//!
//! "Natural" means closest to 1 on a log scale, so 10 and 0.1 tie.

use reckon_core::Number;
use crate::algebra::CompoundUnit;
use crate::{ConversionGraph, UnitError, UnitName};

/// The candidate whose magnitude is closest to 1 in |log10|
///
/// Ties go to the earliest candidate. Returns `None` for an empty input.
pub fn most_natural<T>(candidates: impl IntoIterator<Item = (Number, T)>) -> Option<(Number, T)> {
    let mut best: Option<(f64, Number, T)> = None;

    for (magnitude, label) in candidates {
        let distance = magnitude.log10_distance();
        let better = match &best {
            Some((d, _, _)) => distance < *d,
            None => true,
        };
        if better {
            best = Some((distance, magnitude, label));
        }
    }

    best.map(|(_, magnitude, label)| (magnitude, label))
}

/// Re-express a single-unit magnitude in the most natural unit of its
/// dimension
///
/// Units outside the conversion graph and zero magnitudes come back as
/// given.
pub fn minimize_scalar(
    graph: &ConversionGraph,
    magnitude: &Number,
    unit: &UnitName,
) -> Result<(Number, UnitName), UnitError> {
    if !graph.contains(unit) || magnitude.is_zero() {
        return Ok((magnitude.clone(), unit.clone()));
    }

    let mut candidates = Vec::new();
    for candidate in graph.units() {
        if let Ok(scale) = graph.relative_scale(unit, candidate) {
            candidates.push((scale.apply(magnitude), candidate.clone()));
        }
    }

    Ok(most_natural(candidates).unwrap_or_else(|| (magnitude.clone(), unit.clone())))
}

/// Minimize one numerator position at a time and keep the best result
///
/// Denominators are never rewritten.
pub fn minimize_compound(
    graph: &ConversionGraph,
    magnitude: &Number,
    unit: &CompoundUnit,
) -> Result<(Number, CompoundUnit), UnitError> {
    let mut candidates = Vec::with_capacity(unit.numerator.len());

    for (i, name) in unit.numerator.iter().enumerate() {
        let (scaled, replacement) = minimize_scalar(graph, magnitude, name)?;
        let mut substituted = unit.clone();
        substituted.numerator[i] = replacement;
        candidates.push((scaled, substituted));
    }

    match most_natural(candidates) {
        Some(best) => Ok(best),
        None => Ok((magnitude.clone(), unit.clone())),
    }
}
