//! Exact positive conversion multipliers

use std::fmt;
use std::str::FromStr;
use dashu_int::{IBig, UBig};
use dashu_ratio::RBig;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use reckon_core::Number;
use crate::UnitError;

/// A positive rational multiplier between two units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scale(RBig);

impl Scale {
    /// The identity multiplier
    pub fn one() -> Self {
        Scale(RBig::from_parts(IBig::ONE, UBig::ONE))
    }

    /// A whole-number multiplier
    pub fn integer(n: u64) -> Result<Self, UnitError> {
        Self::new(n, 1)
    }

    /// `num / den`, both strictly positive
    pub fn new(num: u64, den: u64) -> Result<Self, UnitError> {
        if num == 0 || den == 0 {
            return Err(UnitError::Configuration(
                format!("multiplier {}/{} must be positive", num, den)
            ));
        }
        Ok(Scale(RBig::from_parts(IBig::from(num), UBig::from(den))))
    }

    /// Parse "1000", "1/8" or "0.125"
    pub fn parse(s: &str) -> Result<Self, UnitError> {
        let s = s.trim();
        let invalid = || UnitError::Configuration(format!("invalid multiplier '{}'", s));

        let (num, den) = if let Some((n, d)) = s.split_once('/') {
            let n: UBig = n.trim().parse().map_err(|_| invalid())?;
            let d: UBig = d.trim().parse().map_err(|_| invalid())?;
            (n, d)
        } else if let Some((int_part, frac_part)) = s.split_once('.') {
            if frac_part.is_empty() || !frac_part.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            let digits = format!("{}{}", int_part, frac_part);
            let n: UBig = digits.parse().map_err(|_| invalid())?;
            (n, UBig::from(10u8).pow(frac_part.len()))
        } else {
            let n: UBig = s.parse().map_err(|_| invalid())?;
            (n, UBig::ONE)
        };

        if num == UBig::ZERO || den == UBig::ZERO {
            return Err(UnitError::Configuration(
                format!("multiplier '{}' must be positive", s)
            ));
        }
        Ok(Scale(RBig::from_parts(IBig::from(num), den)))
    }

    pub fn is_one(&self) -> bool {
        *self == Self::one()
    }

    /// Compose two multipliers
    pub fn mul(&self, other: &Scale) -> Scale {
        Scale(&self.0 * &other.0)
    }

    /// Relative multiplier; never divides by zero since scales are positive
    pub fn div(&self, other: &Scale) -> Scale {
        Scale(&self.0 / &other.0)
    }

    /// Multiply a magnitude by this scale
    pub fn apply(&self, magnitude: &Number) -> Number {
        magnitude.mul_ratio(&self.0)
    }

    /// Divide a magnitude by this scale
    pub fn unapply(&self, magnitude: &Number) -> Result<Number, UnitError> {
        Ok(magnitude.div_ratio(&self.0)?)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self.0.denominator() == UBig::ONE {
            write!(f, "{}", self.0.numerator())
        } else {
            write!(f, "{}/{}", self.0.numerator(), self.0.denominator())
        }
    }
}

impl FromStr for Scale {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Scale {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Scale {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
