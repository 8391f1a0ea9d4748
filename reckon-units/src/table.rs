//! Static unit configuration: transformations, abbreviations, plurals
//!
//! Each transformation says "one `unit` equals `multiplier` of `target`".
//! Chains must converge on a base unit defined in terms of itself
//! (`second = 1 second`). Define each unit in terms of its neighbour so a
//! dimension reads as a linear chain.

use std::collections::{BTreeMap, HashMap, HashSet};
use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::{Scale, UnitError};

/// One edge of the conversion graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    pub unit: String,
    pub multiplier: Scale,
    pub target: String,
}

/// Unit vocabulary supplied at process start
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitTable {
    /// Ordered edges; order decides prime assignment and candidate order
    #[serde(default)]
    pub transformations: Vec<Transformation>,
    /// Abbreviation -> full unit name
    #[serde(default)]
    pub abbreviations: BTreeMap<String, String>,
    /// Irregular plural -> singular unit name
    #[serde(default)]
    pub plurals: BTreeMap<String, String>,
}

impl UnitTable {
    /// An empty table: every unit is its own dimension
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a table from JSON
    pub fn from_json(json: &str) -> Result<Self, UnitError> {
        serde_json::from_str(json)
            .map_err(|e| UnitError::Configuration(format!("unreadable unit table: {}", e)))
    }

    pub fn to_json(&self) -> Result<String, UnitError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| UnitError::Configuration(e.to_string()))
    }

    /// Builder: add `1 unit = multiplier target`
    pub fn with_transformation(mut self, unit: &str, multiplier: Scale, target: &str) -> Self {
        self.transformations.push(Transformation {
            unit: unit.to_string(),
            multiplier,
            target: target.to_string(),
        });
        self
    }

    /// Builder: add a base unit (`1 unit = 1 unit`)
    pub fn with_base_unit(self, unit: &str) -> Self {
        self.with_transformation(unit, Scale::one(), unit)
    }

    /// Builder: add an abbreviation
    pub fn with_abbreviation(mut self, abbreviation: &str, unit: &str) -> Self {
        self.abbreviations.insert(abbreviation.to_string(), unit.to_string());
        self
    }

    /// Builder: add an irregular plural
    pub fn with_plural(mut self, plural: &str, unit: &str) -> Self {
        self.plurals.insert(plural.to_string(), unit.to_string());
        self
    }

    /// Check that every unit converges on a self-referential base unit
    pub fn validate(&self) -> Result<(), UnitError> {
        let result = self.check();
        if let Err(ref e) = result {
            warn!(error = %e, "rejected unit table");
        }
        result
    }

    fn check(&self) -> Result<(), UnitError> {
        let mut edges: HashMap<&str, (&Scale, &str)> = HashMap::new();

        for t in &self.transformations {
            if t.unit.is_empty() || t.target.is_empty() {
                return Err(UnitError::Configuration("unit names must not be empty".to_string()));
            }
            if edges.insert(&t.unit, (&t.multiplier, &t.target)).is_some() {
                return Err(UnitError::Configuration(
                    format!("'{}' is defined more than once", t.unit)
                ));
            }
            if t.unit == t.target && !t.multiplier.is_one() {
                return Err(UnitError::Configuration(
                    format!("base unit '{}' must map to itself with multiplier 1", t.unit)
                ));
            }
        }

        for t in &self.transformations {
            if !edges.contains_key(t.target.as_str()) {
                return Err(UnitError::Configuration(
                    format!("'{}' refers to undefined unit '{}'", t.unit, t.target)
                ));
            }
        }

        // A chain longer than the table itself must revisit a unit.
        let max_hops = edges.len();
        for t in &self.transformations {
            let mut current = t.unit.as_str();
            let mut visited = HashSet::new();
            loop {
                let (_, next) = edges[current];
                if next == current {
                    break;
                }
                if !visited.insert(current) || visited.len() > max_hops {
                    return Err(UnitError::Configuration(
                        format!("'{}' never reaches a base unit (cycle through '{}')", t.unit, current)
                    ));
                }
                current = next;
            }
        }

        for (abbreviation, unit) in &self.abbreviations {
            if abbreviation.is_empty() || unit.is_empty() {
                return Err(UnitError::Configuration(
                    format!("abbreviation '{}' -> '{}' must name both sides", abbreviation, unit)
                ));
            }
        }

        Ok(())
    }

    /// The built-in vocabulary: time, length, mass and data
    pub fn builtin() -> Self {
        fn ratio(num: u64, den: u64) -> Scale {
            Scale::new(num, den).unwrap_or_else(|_| Scale::one())
        }

        let mut table = UnitTable::new()
            // Time
            .with_transformation("nanosecond", ratio(1, 1000), "microsecond")
            .with_transformation("microsecond", ratio(1, 1000), "millisecond")
            .with_transformation("millisecond", ratio(1, 1000), "second")
            .with_base_unit("second")
            .with_transformation("minute", ratio(60, 1), "second")
            .with_transformation("hour", ratio(60, 1), "minute")
            .with_transformation("day", ratio(24, 1), "hour")
            .with_transformation("week", ratio(7, 1), "day")
            .with_transformation("month", ratio(30, 1), "day")
            .with_transformation("year", ratio(365, 1), "day")
            .with_transformation("decade", ratio(10, 1), "year")
            .with_transformation("century", ratio(100, 1), "year")
            // Length
            .with_transformation("nanometer", ratio(1, 1000), "micrometer")
            .with_transformation("micrometer", ratio(1, 1000), "millimeter")
            .with_transformation("millimeter", ratio(1, 10), "centimeter")
            .with_transformation("centimeter", ratio(1, 100), "meter")
            .with_base_unit("meter")
            .with_transformation("kilometer", ratio(1000, 1), "meter")
            // Mass
            .with_transformation("milligram", ratio(1, 1000), "gram")
            .with_base_unit("gram")
            .with_transformation("kilogram", ratio(1000, 1), "gram")
            .with_transformation("ton", ratio(1000, 1), "kilogram")
            // Data
            .with_transformation("bit", ratio(1, 8), "byte")
            .with_base_unit("byte")
            .with_transformation("kilobyte", ratio(1000, 1), "byte")
            .with_transformation("megabyte", ratio(1000, 1), "kilobyte")
            .with_transformation("gigabyte", ratio(1000, 1), "megabyte")
            .with_transformation("terabyte", ratio(1000, 1), "gigabyte");

        for (abbreviation, unit) in [
            ("ns", "nanosecond"), ("us", "microsecond"), ("ms", "millisecond"),
            ("s", "second"), ("min", "minute"), ("h", "hour"),
            ("nm", "nanometer"), ("um", "micrometer"), ("mm", "millimeter"),
            ("cm", "centimeter"), ("m", "meter"), ("km", "kilometer"),
            ("mg", "milligram"), ("g", "gram"), ("kg", "kilogram"),
            ("b", "byte"), ("kb", "kilobyte"), ("mb", "megabyte"),
            ("gb", "gigabyte"), ("tb", "terabyte"),
        ] {
            table = table.with_abbreviation(abbreviation, unit);
        }

        table.with_plural("centuries", "century")
    }
}
