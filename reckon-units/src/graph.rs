//! Conversion graph: each unit points at `(multiplier, next unit)`
//!
//! Following the edges from any configured unit ends at the base unit of
//! its dimension, the one unit whose edge points back at itself.

use std::collections::HashMap;
use reckon_core::Number;
use crate::algebra::{self, CompoundUnit};
use crate::{Scale, UnitError, UnitName, UnitTable};

#[derive(Debug, Clone)]
pub struct ConversionGraph {
    edges: HashMap<UnitName, (Scale, UnitName)>,
    /// Configured units in table order
    order: Vec<UnitName>,
}

impl ConversionGraph {
    /// Build from a table, failing on non-converging chains
    pub fn new(table: &UnitTable) -> Result<Self, UnitError> {
        table.validate()?;

        let mut edges = HashMap::new();
        let mut order = Vec::new();
        for t in &table.transformations {
            let unit = UnitName::new(&t.unit);
            edges.insert(unit.clone(), (t.multiplier.clone(), UnitName::new(&t.target)));
            order.push(unit);
        }

        Ok(ConversionGraph { edges, order })
    }

    pub fn contains(&self, name: &UnitName) -> bool {
        self.edges.contains_key(name)
    }

    pub fn is_base_unit(&self, name: &UnitName) -> bool {
        matches!(self.edges.get(name), Some((_, target)) if target == name)
    }

    /// Configured units in table order
    pub fn units(&self) -> &[UnitName] {
        &self.order
    }

    pub fn base_units(&self) -> Vec<&UnitName> {
        self.order.iter().filter(|u| self.is_base_unit(u)).collect()
    }

    /// Every configured unit sharing `base` as its base unit, in table order
    pub fn units_of_dimension(&self, base: &UnitName) -> Vec<&UnitName> {
        self.order
            .iter()
            .filter(|u| self.preferred_unit(u).1 == *base)
            .collect()
    }

    /// Walk to the base unit, accumulating the multiplier
    ///
    /// kilometer -> (1000, meter); megabyte -> (1000000, byte). A name
    /// with no edge is its own base with multiplier 1.
    pub fn preferred_unit(&self, name: &UnitName) -> (Scale, UnitName) {
        let mut multiplier = Scale::one();
        let mut current = name;

        // Validated tables converge within `order.len()` hops.
        for _ in 0..=self.order.len() {
            match self.edges.get(current) {
                Some((scale, target)) if target != current => {
                    multiplier = multiplier.mul(scale);
                    current = target;
                }
                _ => break,
            }
        }

        (multiplier, current.clone())
    }

    /// Factor taking a magnitude in `src` units to `dst` units
    ///
    /// kilometer -> meter gives 1000; meter -> kilometer gives 1/1000.
    pub fn relative_scale(&self, src: &UnitName, dst: &UnitName) -> Result<Scale, UnitError> {
        let (src_scale, src_base) = self.preferred_unit(src);
        let (dst_scale, dst_base) = self.preferred_unit(dst);

        if src_base != dst_base {
            return Err(UnitError::IncompatibleDimension {
                from: src.to_string(),
                to: dst.to_string(),
            });
        }

        Ok(src_scale.div(&dst_scale))
    }

    /// Replace every unit with its base unit, scaling the magnitude
    pub fn normalize(
        &self,
        magnitude: &Number,
        unit: &CompoundUnit,
    ) -> Result<(Number, CompoundUnit), UnitError> {
        let preferred = CompoundUnit::new(
            unit.numerator.iter().map(|n| self.preferred_unit(n).1).collect(),
            unit.denominator.iter().map(|n| self.preferred_unit(n).1).collect(),
        );
        let value = algebra::convert(self, magnitude, unit, &preferred)?;
        Ok((value, preferred))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> ConversionGraph {
        ConversionGraph::new(&UnitTable::builtin()).unwrap()
    }

    fn name(s: &str) -> UnitName {
        UnitName::new(s)
    }

    #[test]
    fn test_preferred_unit() {
        let g = graph();
        assert_eq!(g.preferred_unit(&name("kilometer")), (Scale::integer(1000).unwrap(), name("meter")));
        assert_eq!(g.preferred_unit(&name("megabyte")), (Scale::integer(1_000_000).unwrap(), name("byte")));
        assert_eq!(g.preferred_unit(&name("meter")), (Scale::one(), name("meter")));
        assert_eq!(g.preferred_unit(&name("day")), (Scale::integer(86_400).unwrap(), name("second")));
        assert_eq!(g.preferred_unit(&name("nanometer")), (Scale::new(1, 1_000_000_000).unwrap(), name("meter")));
    }

    #[test]
    fn test_preferred_unit_unknown() {
        let g = graph();
        assert_eq!(g.preferred_unit(&name("made_up_unit")), (Scale::one(), name("made_up_unit")));
    }

    #[test]
    fn test_relative_scale() {
        let g = graph();
        assert_eq!(g.relative_scale(&name("kilometer"), &name("meter")).unwrap(), Scale::integer(1000).unwrap());
        assert_eq!(g.relative_scale(&name("meter"), &name("kilometer")).unwrap(), Scale::new(1, 1000).unwrap());
        // 1 kilobyte = 8000 bit
        assert_eq!(g.relative_scale(&name("kilobyte"), &name("bit")).unwrap(), Scale::integer(8000).unwrap());
    }

    #[test]
    fn test_relative_scale_incompatible() {
        let g = graph();
        let err = g.relative_scale(&name("kilobyte"), &name("meter")).unwrap_err();
        assert_eq!(err, UnitError::IncompatibleDimension {
            from: "kilobyte".to_string(),
            to: "meter".to_string(),
        });
        // Unknown units are only compatible with themselves
        assert!(g.relative_scale(&name("widget"), &name("meter")).is_err());
        assert!(g.relative_scale(&name("widget"), &name("widget")).unwrap().is_one());
    }

    #[test]
    fn test_base_units() {
        let g = graph();
        let bases: Vec<&str> = g.base_units().iter().map(|u| u.as_str()).collect();
        assert_eq!(bases, vec!["second", "meter", "gram", "byte"]);
        assert!(g.is_base_unit(&name("gram")));
        assert!(!g.is_base_unit(&name("kilogram")));
    }

    #[test]
    fn test_units_of_dimension() {
        let g = graph();
        let mass: Vec<&str> = g.units_of_dimension(&name("gram")).iter().map(|u| u.as_str()).collect();
        assert_eq!(mass, vec!["milligram", "gram", "kilogram", "ton"]);
    }

    #[test]
    fn test_normalize() {
        let g = graph();
        let (value, unit) = g.normalize(&Number::from_i64(1), &CompoundUnit::from_names(&["kilometer"], &[])).unwrap();
        assert_eq!(value, Number::from_i64(1000));
        assert_eq!(unit, CompoundUnit::from_names(&["meter"], &[]));

        let (value, unit) = g.normalize(&Number::from_i64(18), &CompoundUnit::from_names(&["kilometer"], &["hour"])).unwrap();
        assert_eq!(value, Number::from_i64(5));
        assert_eq!(unit, CompoundUnit::from_names(&["meter"], &["second"]));
    }

    #[test]
    fn test_rejects_invalid_table() {
        let table = UnitTable::new().with_transformation("a", Scale::integer(2).unwrap(), "b");
        assert!(matches!(ConversionGraph::new(&table), Err(UnitError::Configuration(_))));
    }
}
