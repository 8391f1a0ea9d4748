//! Compound units and their prime-ratio encoding
//!
//! A compound unit maps to `product(numerator primes) / product(denominator
//! primes)`. Because primes are distinct per unit name, reducing that
//! fraction cancels exactly the unit names shared by numerator and
//! denominator, and factoring it back recovers the simplified unit.

use std::fmt;
use dashu_int::UBig;
use serde::{Deserialize, Serialize};
use tracing::trace;
use reckon_core::Number;
use crate::{ConversionGraph, UnitError, UnitName, UnitRegistry};

/// Ordered numerator and denominator unit names
///
/// Order matters: conversion pairs units by position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CompoundUnit {
    pub numerator: Vec<UnitName>,
    pub denominator: Vec<UnitName>,
}

impl CompoundUnit {
    pub fn new(numerator: Vec<UnitName>, denominator: Vec<UnitName>) -> Self {
        CompoundUnit { numerator, denominator }
    }

    /// No units at all
    pub fn dimensionless() -> Self {
        Self::default()
    }

    /// A single unit in the numerator
    pub fn single(name: UnitName) -> Self {
        CompoundUnit { numerator: vec![name], denominator: Vec::new() }
    }

    /// Build from raw spellings (not canonicalized)
    pub fn from_names(numerator: &[&str], denominator: &[&str]) -> Self {
        CompoundUnit {
            numerator: numerator.iter().map(|n| UnitName::new(n)).collect(),
            denominator: denominator.iter().map(|n| UnitName::new(n)).collect(),
        }
    }

    pub fn is_dimensionless(&self) -> bool {
        self.numerator.is_empty() && self.denominator.is_empty()
    }

    /// Swap numerator and denominator
    pub fn inverse(&self) -> Self {
        CompoundUnit {
            numerator: self.denominator.clone(),
            denominator: self.numerator.clone(),
        }
    }

    /// Concatenate numerators and denominators (no cancellation)
    pub fn concat(&self, other: &CompoundUnit) -> Self {
        let mut numerator = self.numerator.clone();
        numerator.extend(other.numerator.iter().cloned());
        let mut denominator = self.denominator.clone();
        denominator.extend(other.denominator.iter().cloned());
        CompoundUnit { numerator, denominator }
    }

    /// Same numerator and denominator lengths
    pub fn same_shape(&self, other: &CompoundUnit) -> bool {
        self.numerator.len() == other.numerator.len()
            && self.denominator.len() == other.denominator.len()
    }

    /// Every unit name, numerator first
    pub fn names(&self) -> impl Iterator<Item = &UnitName> {
        self.numerator.iter().chain(self.denominator.iter())
    }
}

impl fmt::Display for CompoundUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |names: &[UnitName]| {
            names.iter().map(UnitName::as_str).collect::<Vec<_>>().join(" ")
        };
        let numerator = join(&self.numerator);
        match (numerator.is_empty(), self.denominator.is_empty()) {
            (_, true) => f.write_str(&numerator),
            (true, false) => write!(f, "/ {}", join(&self.denominator)),
            (false, false) => write!(f, "{} / {}", numerator, join(&self.denominator)),
        }
    }
}

/// A compound unit encoded as a fraction of prime products
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRatio {
    numerator: UBig,
    denominator: UBig,
}

impl UnitRatio {
    pub fn new(numerator: UBig, denominator: UBig) -> Self {
        UnitRatio { numerator, denominator }
    }

    pub fn numerator(&self) -> &UBig {
        &self.numerator
    }

    pub fn denominator(&self) -> &UBig {
        &self.denominator
    }

    /// Divide both sides by their greatest common divisor
    pub fn reduce(&self) -> Self {
        let divisor = gcd(self.numerator.clone(), self.denominator.clone());
        if divisor == UBig::ONE || divisor == UBig::ZERO {
            return self.clone();
        }
        UnitRatio {
            numerator: &self.numerator / &divisor,
            denominator: &self.denominator / &divisor,
        }
    }

    pub fn is_one(&self) -> bool {
        self.numerator == self.denominator
    }
}

fn gcd(mut a: UBig, mut b: UBig) -> UBig {
    while b != UBig::ZERO {
        let r = &a % &b;
        a = b;
        b = r;
    }
    a
}

/// Encode a compound unit; every name must already be registered
pub fn to_ratio(registry: &UnitRegistry, unit: &CompoundUnit) -> Result<UnitRatio, UnitError> {
    let product = |names: &[UnitName]| -> Result<UBig, UnitError> {
        let mut acc = UBig::ONE;
        for name in names {
            let prime = registry.prime_of(name)
                .ok_or_else(|| UnitError::UnregisteredUnit(name.to_string()))?;
            acc *= UBig::from(prime);
        }
        Ok(acc)
    };

    Ok(UnitRatio::new(product(&unit.numerator)?, product(&unit.denominator)?))
}

/// Factor a ratio back into unit names by trial division over the
/// registered primes, in ascending prime order
pub fn from_ratio(registry: &UnitRegistry, ratio: &UnitRatio) -> CompoundUnit {
    factor(registry.primes(), ratio)
}

fn factor<'a>(
    primes: impl Iterator<Item = (u64, &'a UnitName)>,
    ratio: &UnitRatio,
) -> CompoundUnit {
    let mut numerator = ratio.numerator.clone();
    let mut denominator = ratio.denominator.clone();
    let mut unit = CompoundUnit::dimensionless();

    for (prime, name) in primes {
        if numerator == UBig::ONE && denominator == UBig::ONE {
            break;
        }
        let p = UBig::from(prime);
        while &numerator % &p == UBig::ZERO {
            numerator = &numerator / &p;
            unit.numerator.push(name.clone());
        }
        while &denominator % &p == UBig::ZERO {
            denominator = &denominator / &p;
            unit.denominator.push(name.clone());
        }
    }

    unit
}

/// Cancel unit names shared by numerator and denominator
///
/// Equivalent to `from_ratio(reduce(to_ratio(unit)))`, but only the primes
/// of names present in `unit` are tried while factoring.
pub fn simplify(registry: &UnitRegistry, unit: &CompoundUnit) -> Result<CompoundUnit, UnitError> {
    let reduced = to_ratio(registry, unit)?.reduce();

    let mut candidates: Vec<(u64, &UnitName)> = Vec::new();
    for name in unit.names() {
        if let Some(prime) = registry.prime_of(name) {
            candidates.push((prime, name));
        }
    }
    candidates.sort_by_key(|(p, _)| *p);
    candidates.dedup_by_key(|(p, _)| *p);

    let simplified = factor(candidates.into_iter(), &reduced);
    trace!(from = %unit, to = %simplified, "simplified unit");
    Ok(simplified)
}

/// Re-express `magnitude` from `src` units in `dst` units
///
/// Units are paired strictly by position: numerator i of `src` with
/// numerator i of `dst`, likewise for denominators.
pub fn convert(
    graph: &ConversionGraph,
    magnitude: &Number,
    src: &CompoundUnit,
    dst: &CompoundUnit,
) -> Result<Number, UnitError> {
    if !src.same_shape(dst) {
        return Err(UnitError::UnitShapeMismatch {
            from: src.to_string(),
            to: dst.to_string(),
        });
    }

    let mut value = magnitude.clone();
    for (from, to) in src.numerator.iter().zip(&dst.numerator) {
        value = graph.relative_scale(from, to)?.apply(&value);
    }
    for (from, to) in src.denominator.iter().zip(&dst.denominator) {
        value = graph.relative_scale(from, to)?.unapply(&value)?;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UnitTable;

    fn setup() -> (UnitRegistry, ConversionGraph) {
        let table = UnitTable::builtin();
        (UnitRegistry::from_table(&table), ConversionGraph::new(&table).unwrap())
    }

    fn unit(num: &[&str], den: &[&str]) -> CompoundUnit {
        CompoundUnit::from_names(num, den)
    }

    #[test]
    fn test_simplify_cancels_completely() {
        let (registry, _) = setup();
        let simplified = simplify(&registry, &unit(&["meter"], &["meter"])).unwrap();
        assert_eq!(simplified, CompoundUnit::dimensionless());
    }

    #[test]
    fn test_simplify_cancels_partially() {
        let (registry, _) = setup();
        let simplified = simplify(&registry, &unit(&["meter", "meter"], &["meter", "second"])).unwrap();
        assert_eq!(simplified, unit(&["meter"], &["second"]));

        let simplified = simplify(&registry, &unit(&["meter"], &["meter", "second"])).unwrap();
        assert_eq!(simplified, unit(&[], &["second"]));
    }

    #[test]
    fn test_simplify_keeps_repeated_numerators() {
        let (registry, _) = setup();
        let area = unit(&["meter", "meter"], &[]);
        assert_eq!(simplify(&registry, &area).unwrap(), area);
    }

    #[test]
    fn test_simplify_is_idempotent() {
        let (registry, _) = setup();
        let units = [
            unit(&["meter", "second", "meter"], &["second", "byte"]),
            unit(&["gram"], &["gram", "gram"]),
            unit(&["hour", "byte"], &["meter"]),
            unit(&[], &[]),
        ];
        for u in &units {
            let once = simplify(&registry, u).unwrap();
            let twice = simplify(&registry, &once).unwrap();
            assert_eq!(once, twice, "simplify not idempotent for {}", u);
        }
    }

    #[test]
    fn test_simplify_without_overlap_is_noop() {
        let (registry, _) = setup();
        let u = unit(&["second"], &["meter"]);
        assert_eq!(simplify(&registry, &u).unwrap(), u);
    }

    #[test]
    fn test_simplify_unregistered_fails() {
        let (registry, _) = setup();
        let err = simplify(&registry, &unit(&["furlong"], &[])).unwrap_err();
        assert_eq!(err, UnitError::UnregisteredUnit("furlong".to_string()));
    }

    #[test]
    fn test_ratio_roundtrip() {
        let (registry, _) = setup();
        let u = unit(&["second", "meter"], &["byte"]);
        let ratio = to_ratio(&registry, &u).unwrap();
        assert_eq!(from_ratio(&registry, &ratio), u);
    }

    #[test]
    fn test_reduce() {
        let ratio = UnitRatio::new(UBig::from(12u32), UBig::from(18u32)).reduce();
        assert_eq!(ratio.numerator(), &UBig::from(2u32));
        assert_eq!(ratio.denominator(), &UBig::from(3u32));
        assert!(UnitRatio::new(UBig::from(7u32), UBig::from(7u32)).is_one());
    }

    #[test]
    fn test_convert_identity() {
        let (registry, graph) = setup();
        let x = Number::from_str("12.75").unwrap();
        for name in registry.names() {
            let u = CompoundUnit::single(name.clone());
            assert_eq!(convert(&graph, &x, &u, &u).unwrap(), x, "identity failed for {}", name);
        }
    }

    #[test]
    fn test_convert_positional() {
        let (_, graph) = setup();
        let one = Number::from_i64(1);
        // 1 kilometer/hour in meter/second
        let speed = convert(&graph, &Number::from_i64(36), &unit(&["kilometer"], &["hour"]), &unit(&["meter"], &["second"])).unwrap();
        assert_eq!(speed, Number::from_i64(10));

        let bytes = convert(&graph, &one, &unit(&["kilobyte"], &[]), &unit(&["bit"], &[])).unwrap();
        assert_eq!(bytes, Number::from_i64(8000));
    }

    #[test]
    fn test_convert_shape_mismatch() {
        let (_, graph) = setup();
        let err = convert(&graph, &Number::from_i64(1), &unit(&["meter"], &[]), &unit(&["meter"], &["second"]))
            .unwrap_err();
        assert!(matches!(err, UnitError::UnitShapeMismatch { .. }));
    }

    #[test]
    fn test_convert_incompatible() {
        let (_, graph) = setup();
        let err = convert(&graph, &Number::from_i64(1), &unit(&["meter", "second"], &[]), &unit(&["second", "meter"], &[]))
            .unwrap_err();
        assert!(matches!(err, UnitError::IncompatibleDimension { .. }));
    }

    #[test]
    fn test_display() {
        assert_eq!(unit(&["meter", "second"], &[]).to_string(), "meter second");
        assert_eq!(unit(&["meter"], &["second", "second"]).to_string(), "meter / second second");
        assert_eq!(unit(&[], &["second"]).to_string(), "/ second");
        assert_eq!(CompoundUnit::dimensionless().to_string(), "");
    }
}
