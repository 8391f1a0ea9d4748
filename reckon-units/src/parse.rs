//! Quantity literal and unit string parsing
//!
//! Produces raw spellings only; canonicalization happens when a `Value`
//! is built.

use reckon_core::Number;
use crate::algebra::CompoundUnit;
use crate::{UnitError, UnitName};

/// Parse a unit string into raw numerator and denominator names
///
/// Supported formats:
/// - Simple: "m", "kilometers"
/// - Products: "m*s", "m s"
/// - Quotients: "km/h", "m / s s"
/// - Powers: "m^2", "s^-1" (a negative power moves the name across `/`)
pub fn parse_unit(s: &str) -> Result<CompoundUnit, UnitError> {
    let s = s.trim();
    let mut unit = CompoundUnit::dimensionless();

    if s.is_empty() {
        return Ok(unit);
    }

    let (numerator, denominator) = match s.split_once('/') {
        Some((n, d)) => (n, Some(d)),
        None => (s, None),
    };
    if denominator.is_some_and(|d| d.contains('/')) {
        return Err(UnitError::InvalidLiteral(s.to_string()));
    }

    for factor in factors(numerator) {
        let (name, power) = parse_power(factor, s)?;
        push_power(&mut unit, name, power);
    }
    if let Some(denominator) = denominator {
        let mut any = false;
        for factor in factors(denominator) {
            let (name, power) = parse_power(factor, s)?;
            push_power(&mut unit, name, -power);
            any = true;
        }
        if !any {
            return Err(UnitError::InvalidLiteral(s.to_string()));
        }
    }

    Ok(unit)
}

fn factors(s: &str) -> impl Iterator<Item = &str> {
    s.split(|c: char| c == '*' || c.is_whitespace())
        .filter(|p| !p.is_empty())
}

/// "m^2" -> ("m", 2); "s" -> ("s", 1)
fn parse_power<'a>(factor: &'a str, whole: &str) -> Result<(&'a str, i32), UnitError> {
    let invalid = || UnitError::InvalidLiteral(whole.to_string());

    let (name, power) = match factor.split_once('^') {
        Some((name, exp)) => (name, exp.parse::<i32>().map_err(|_| invalid())?),
        None => (factor, 1),
    };

    if !is_unit_name(name) || power == 0 {
        return Err(invalid());
    }
    Ok((name, power))
}

fn push_power(unit: &mut CompoundUnit, name: &str, power: i32) {
    let side = if power > 0 { &mut unit.numerator } else { &mut unit.denominator };
    for _ in 0..power.unsigned_abs() {
        side.push(UnitName::new(name));
    }
}

/// Letters and underscores only
pub fn is_unit_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic() || c == '_')
}

/// Parse a quantity literal like "5 m", "100kg", "-2.5e3 bytes" or "36 km/h"
///
/// A bare number yields a dimensionless unit.
pub fn parse_quantity(s: &str) -> Result<(Number, CompoundUnit), UnitError> {
    let s = s.trim();
    let split_pos = number_prefix_len(s);

    if split_pos == 0 {
        return Err(UnitError::InvalidLiteral(s.to_string()));
    }

    let num_str = &s[..split_pos];
    let unit_str = s[split_pos..].trim();

    let magnitude = Number::from_str(num_str)
        .map_err(|_| UnitError::InvalidLiteral(s.to_string()))?;
    let unit = parse_unit(unit_str)?;

    Ok((magnitude, unit))
}

/// Byte length of the leading number: sign, digits, optional fraction and
/// an exponent only when `e` is followed by digits
fn number_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let digits_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if !bytes[digits_start..i].iter().any(u8::is_ascii_digit) {
        return 0;
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }

    i
}
