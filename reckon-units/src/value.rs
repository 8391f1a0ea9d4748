//! Unit-aware values
//!
//! A `Value` is always stored in canonical form: unit names canonicalized,
//! shared names cancelled and every unit scaled into its base unit. Two
//! values are therefore equal exactly when their canonical magnitudes and
//! units are equal, whatever spelling they were built from.

use std::fmt;
use serde::Serialize;
use tracing::trace;
use reckon_core::Number;
use crate::algebra::CompoundUnit;
use crate::{UnitError, UnitSystem};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Value {
    magnitude: Number,
    unit: CompoundUnit,
}

impl Value {
    /// Build a canonical value from any spelling of `unit`
    ///
    /// `Value::new(1, kilometer)` stores `1000 meter`. Names cancel before
    /// they are normalized, so `1 km/m` stays `1000 meter / meter`.
    pub fn new(magnitude: Number, unit: &CompoundUnit, system: &UnitSystem) -> Result<Self, UnitError> {
        let canonical = system.canonicalize(unit)?;
        let simplified = system.simplify(&canonical)?;
        let (magnitude, unit) = system.normalize(&magnitude, &simplified)?;
        trace!(%magnitude, %unit, "canonical value");
        Ok(Value { magnitude, unit })
    }

    /// A plain number with no units
    pub fn dimensionless(magnitude: Number) -> Self {
        Value { magnitude, unit: CompoundUnit::dimensionless() }
    }

    /// Magnitude in base units
    pub fn magnitude(&self) -> &Number {
        &self.magnitude
    }

    /// Canonical unit
    pub fn unit(&self) -> &CompoundUnit {
        &self.unit
    }

    pub fn is_dimensionless(&self) -> bool {
        self.unit.is_dimensionless()
    }

    fn with_magnitude(&self, magnitude: Number) -> Self {
        Value { magnitude, unit: self.unit.clone() }
    }

    fn require_same_unit(&self, other: &Value) -> Result<(), UnitError> {
        if self.unit != other.unit {
            return Err(UnitError::UnitMismatch {
                left: describe(&self.unit),
                right: describe(&other.unit),
            });
        }
        Ok(())
    }

    // ========== Value (op) Value ==========

    pub fn add(&self, other: &Value) -> Result<Value, UnitError> {
        self.require_same_unit(other)?;
        Ok(self.with_magnitude(self.magnitude.add(&other.magnitude)))
    }

    pub fn sub(&self, other: &Value) -> Result<Value, UnitError> {
        self.require_same_unit(other)?;
        Ok(self.with_magnitude(self.magnitude.sub(&other.magnitude)))
    }

    /// Multiply magnitudes and concatenate units, then re-canonicalize
    pub fn mul(&self, other: &Value, system: &UnitSystem) -> Result<Value, UnitError> {
        let unit = self.unit.concat(&other.unit);
        Value::new(self.magnitude.mul(&other.magnitude), &unit, system)
    }

    /// Divide magnitudes and concatenate with the divisor's unit inverted
    pub fn div(&self, other: &Value, system: &UnitSystem) -> Result<Value, UnitError> {
        let magnitude = self.magnitude.checked_div(&other.magnitude)?;
        let unit = self.unit.concat(&other.unit.inverse());
        Value::new(magnitude, &unit, system)
    }

    // ========== Value (op) Number, unit unchanged ==========

    pub fn add_scalar(&self, n: &Number) -> Value {
        self.with_magnitude(self.magnitude.add(n))
    }

    pub fn sub_scalar(&self, n: &Number) -> Value {
        self.with_magnitude(self.magnitude.sub(n))
    }

    pub fn mul_scalar(&self, n: &Number) -> Value {
        self.with_magnitude(self.magnitude.mul(n))
    }

    pub fn div_scalar(&self, n: &Number) -> Result<Value, UnitError> {
        Ok(self.with_magnitude(self.magnitude.checked_div(n)?))
    }

    /// `n - self`, keeping this value's unit
    pub fn rsub_scalar(&self, n: &Number) -> Value {
        self.with_magnitude(n.sub(&self.magnitude))
    }

    /// `n / self`, keeping this value's unit (not its inverse)
    pub fn rdiv_scalar(&self, n: &Number) -> Result<Value, UnitError> {
        Ok(self.with_magnitude(n.checked_div(&self.magnitude)?))
    }

    // ========== Conversion and display ==========

    /// Express this value in `target` units
    ///
    /// The target is canonicalized and simplified the same way values are,
    /// then paired positionally with this value's unit.
    pub fn convert_to(
        &self,
        target: &CompoundUnit,
        system: &UnitSystem,
    ) -> Result<(Number, CompoundUnit), UnitError> {
        let target = system.simplify(&system.canonicalize(target)?)?;
        let magnitude = system.convert(&self.magnitude, &self.unit, &target)?;
        Ok((magnitude, target))
    }

    /// Human-friendly text: simplified, then minimized
    ///
    /// `Value::new(1, kilometer)` renders as "1 kilometer".
    pub fn render(&self, system: &UnitSystem) -> Result<String, UnitError> {
        let simplified = system.simplify(&self.unit)?;
        let (magnitude, unit) = system.minimize(&self.magnitude, &simplified)?;
        Ok(format_quantity(&magnitude, &unit))
    }
}

/// "<magnitude> <unit>", or just the magnitude when dimensionless
pub fn format_quantity(magnitude: &Number, unit: &CompoundUnit) -> String {
    if unit.is_dimensionless() {
        magnitude.as_natural()
    } else {
        format!("{} {}", magnitude.as_natural(), unit)
    }
}

fn describe(unit: &CompoundUnit) -> String {
    if unit.is_dimensionless() {
        "dimensionless".to_string()
    } else {
        unit.to_string()
    }
}

/// A value equals a plain number only when it has no units left
impl PartialEq<Number> for Value {
    fn eq(&self, other: &Number) -> bool {
        self.is_dimensionless() && self.magnitude == *other
    }
}

/// Canonical (base unit) form
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_quantity(&self.magnitude, &self.unit))
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::dimensionless(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reckon_core::NumberError;

    fn system() -> UnitSystem {
        UnitSystem::default()
    }

    fn num(s: &str) -> Number {
        Number::from_str(s).unwrap()
    }

    fn unit(num: &[&str], den: &[&str]) -> CompoundUnit {
        CompoundUnit::from_names(num, den)
    }

    fn value(sys: &UnitSystem, magnitude: &str, numer: &[&str], denom: &[&str]) -> Value {
        Value::new(num(magnitude), &unit(numer, denom), sys).unwrap()
    }

    #[test]
    fn test_construction_normalizes() {
        let sys = system();
        let v = value(&sys, "1", &["kilometer"], &[]);
        assert_eq!(v.magnitude(), &num("1000"));
        assert_eq!(v.unit(), &unit(&["meter"], &[]));
        assert_eq!(v.render(&sys).unwrap(), "1 kilometer");
    }

    #[test]
    fn test_construction_accepts_spellings() {
        let sys = system();
        assert_eq!(value(&sys, "2", &["km"], &[]), value(&sys, "2000", &["meters"], &[]));
        assert_eq!(value(&sys, "3", &["hours"], &[]), value(&sys, "180", &["min"], &[]));
    }

    #[test]
    fn test_construction_simplifies() {
        let sys = system();
        let v = value(&sys, "1", &["meter"], &["meter"]);
        assert!(v.is_dimensionless());
        assert_eq!(v, num("1"));

        // cancellation happens before normalization, so km/m does not cancel
        let v = value(&sys, "1", &["kilometer"], &["meter"]);
        assert_eq!(v.unit(), &unit(&["meter"], &["meter"]));
        assert_eq!(v.magnitude(), &num("1000"));
    }

    #[test]
    fn test_add_same_unit() {
        let sys = system();
        let one = value(&sys, "1", &["meter"], &[]);
        let two = value(&sys, "2", &["meter"], &[]);
        assert_eq!(one.add(&one).unwrap(), two);
        assert_eq!(two.sub(&one).unwrap(), one);

        // different spellings, same canonical unit
        let km = value(&sys, "1", &["km"], &[]);
        assert_eq!(km.add(&one).unwrap(), value(&sys, "1001", &["meter"], &[]));
    }

    #[test]
    fn test_add_mismatch() {
        let sys = system();
        let meter = value(&sys, "1", &["meter"], &[]);
        let second = value(&sys, "1", &["second"], &[]);
        let err = meter.add(&second).unwrap_err();
        assert_eq!(err, UnitError::UnitMismatch {
            left: "meter".to_string(),
            right: "second".to_string(),
        });
        assert!(matches!(meter.sub(&second), Err(UnitError::UnitMismatch { .. })));
        assert!(meter.add(&Value::dimensionless(num("1"))).is_err());
    }

    #[test]
    fn test_mul_concatenates() {
        let sys = system();
        let meter = value(&sys, "1", &["meter"], &[]);
        let second = value(&sys, "1", &["second"], &[]);
        let product = meter.mul(&second, &sys).unwrap();
        assert_eq!(product.magnitude(), &num("1"));
        assert!(product.unit().denominator.is_empty());
        assert_eq!(product.unit().numerator.len(), 2);
        assert!(product.unit().numerator.iter().any(|n| n.as_str() == "meter"));
        assert!(product.unit().numerator.iter().any(|n| n.as_str() == "second"));
    }

    #[test]
    fn test_div_cancels() {
        let sys = system();
        let distance = value(&sys, "36", &["km"], &[]);
        let time = value(&sys, "1", &["hour"], &[]);
        let speed = distance.div(&time, &sys).unwrap();
        assert_eq!(speed.magnitude(), &num("10"));
        assert_eq!(speed.unit(), &unit(&["meter"], &["second"]));

        let ratio = distance.div(&distance, &sys).unwrap();
        assert_eq!(ratio, num("1"));
    }

    #[test]
    fn test_div_by_zero() {
        let sys = system();
        let v = value(&sys, "5", &["meter"], &[]);
        let zero = value(&sys, "0", &["second"], &[]);
        assert_eq!(v.div(&zero, &sys).unwrap_err(), UnitError::Number(NumberError::DivisionByZero));
        assert!(v.div_scalar(&num("0")).is_err());
        assert!(zero.rdiv_scalar(&num("3")).is_err());
    }

    #[test]
    fn test_scalar_ops_keep_unit() {
        let sys = system();
        let v = value(&sys, "10", &["meter"], &[]);
        assert_eq!(v.mul_scalar(&num("3")), value(&sys, "30", &["meter"], &[]));
        assert_eq!(v.add_scalar(&num("1")), value(&sys, "11", &["meter"], &[]));
        assert_eq!(v.sub_scalar(&num("1")), value(&sys, "9", &["meter"], &[]));
        assert_eq!(v.div_scalar(&num("4")).unwrap(), value(&sys, "2.5", &["meter"], &[]));
        assert_eq!(v.rsub_scalar(&num("15")), value(&sys, "5", &["meter"], &[]));
        assert_eq!(v.rdiv_scalar(&num("20")).unwrap(), value(&sys, "2", &["meter"], &[]));
    }

    #[test]
    fn test_number_equality_requires_no_units() {
        let sys = system();
        assert_ne!(value(&sys, "1", &["meter"], &[]), num("1"));
        assert_eq!(Value::dimensionless(num("4")), num("4"));
        assert_ne!(Value::dimensionless(num("4")), num("5"));
    }

    #[test]
    fn test_convert_to() {
        let sys = system();
        let speed = value(&sys, "10", &["meter"], &["second"]);
        let (m, u) = speed.convert_to(&unit(&["km"], &["h"]), &sys).unwrap();
        assert_eq!(m, num("36"));
        assert_eq!(u, unit(&["kilometer"], &["hour"]));

        let err = speed.convert_to(&unit(&["km"], &[]), &sys).unwrap_err();
        assert!(matches!(err, UnitError::UnitShapeMismatch { .. }));
        let err = speed.convert_to(&unit(&["byte"], &["h"]), &sys).unwrap_err();
        assert!(matches!(err, UnitError::IncompatibleDimension { .. }));
    }

    #[test]
    fn test_convert_to_round_trip() {
        let sys = system();
        let v = value(&sys, "2.5", &["kilobyte"], &[]);
        let (in_bits, bits) = v.convert_to(&unit(&["bit"], &[]), &sys).unwrap();
        assert_eq!(in_bits, num("20000"));
        assert_eq!(Value::new(in_bits, &bits, &sys).unwrap(), v);
    }

    #[test]
    fn test_render() {
        let sys = system();
        assert_eq!(value(&sys, "0.05", &["meter"], &[]).render(&sys).unwrap(), "5 centimeter");
        assert_eq!(value(&sys, "7200", &["s"], &[]).render(&sys).unwrap(), "2 hour");
        assert_eq!(value(&sys, "36", &["km"], &["h"]).render(&sys).unwrap(), "10 meter / second");
        assert_eq!(value(&sys, "2.5", &["meter"], &[]).render(&sys).unwrap(), "2.5 meter");
        assert_eq!(Value::dimensionless(num("42")).render(&sys).unwrap(), "42");
        assert_eq!(value(&sys, "0", &["meter"], &[]).render(&sys).unwrap(), "0 meter");
    }

    #[test]
    fn test_render_denominator_only() {
        let sys = system();
        let v = value(&sys, "2", &[], &["second"]);
        assert_eq!(v.render(&sys).unwrap(), "2 / second");
    }

    #[test]
    fn test_render_coined_unit() {
        let sys = system();
        let v = value(&sys, "3", &["widgets"], &[]);
        assert_eq!(v.render(&sys).unwrap(), "3 widget");
    }

    #[test]
    fn test_display_is_canonical() {
        let sys = system();
        assert_eq!(value(&sys, "1", &["kilometer"], &[]).to_string(), "1000 meter");
    }

    #[test]
    fn test_serialize() {
        let sys = system();
        let v = value(&sys, "2", &["km"], &[]);
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["unit"]["numerator"][0], "meter");
        assert_eq!(json["magnitude"].as_str().map(|s| Number::from_str(s).unwrap()), Some(num("2000")));
    }
}
