//! Reckon - Unit-aware calculator engine
//!
//! Builds values from text, combines them, and renders them in the most
//! natural unit.

mod operand;
mod render;

pub use operand::{apply, Op, Operand};
pub use render::{Rendered, Renderer};

use reckon_core::{Number, ReckonError};
use reckon_units::{parse_quantity, parse_unit, CompoundUnit, UnitSystem, UnitTable, Value};
use std::sync::Arc;
use tracing::debug;

/// Main Reckon engine
#[derive(Debug, Clone)]
pub struct Reckon {
    units: Arc<UnitSystem>,
}

impl Reckon {
    /// Engine over a custom unit table
    pub fn new(table: UnitTable) -> Result<Self, ReckonError> {
        Ok(Self::with_system(Arc::new(UnitSystem::new(table)?)))
    }

    /// Share an existing unit system
    pub fn with_system(units: Arc<UnitSystem>) -> Self {
        Self { units }
    }

    pub fn with_builtin_units() -> Self {
        Self::with_system(Arc::new(UnitSystem::default()))
    }

    pub fn units(&self) -> &UnitSystem {
        &self.units
    }

    /// Build a value from a magnitude and a unit string ("km/h", "m^2")
    pub fn quantity(&self, magnitude: &str, unit: &str) -> Result<Value, ReckonError> {
        let magnitude = Number::from_str(magnitude)
            .map_err(|e| ReckonError::from(e).with_input(magnitude))?;
        let unit = parse_unit(unit).map_err(|e| ReckonError::from(e).with_input(unit))?;
        Ok(Value::new(magnitude, &unit, &self.units)?)
    }

    /// Build a value from a literal like "5 km", "100kg" or "36 km/h"
    pub fn literal(&self, text: &str) -> Result<Value, ReckonError> {
        let (magnitude, unit) = parse_quantity(text)
            .map_err(|e| ReckonError::from(e).with_input(text))?;
        let value = Value::new(magnitude, &unit, &self.units)?;
        debug!(input = text, canonical = %value, "parsed literal");
        Ok(value)
    }

    /// Single-unit lookup by any known spelling, without registering it
    pub fn unit_by_name(&self, name: &str) -> Result<Option<CompoundUnit>, ReckonError> {
        Ok(self.units.unit_by_name(name)?)
    }

    pub fn apply(&self, op: Op, lhs: &Operand, rhs: &Operand) -> Result<Operand, ReckonError> {
        Ok(operand::apply(&self.units, op, lhs, rhs)?)
    }

    /// Add values left to right; an empty list sums to dimensionless zero
    pub fn sum(&self, values: &[Value]) -> Result<Value, ReckonError> {
        let mut iter = values.iter();
        let first = match iter.next() {
            Some(v) => v.clone(),
            None => return Ok(Value::dimensionless(Number::from_i64(0))),
        };
        iter.try_fold(first, |acc, v| acc.add(v))
            .map_err(|e| ReckonError::from(e).with_note("while summing values"))
    }

    /// Express `value` in the units named by `unit` ("km/h")
    pub fn convert(&self, value: &Value, unit: &str) -> Result<String, ReckonError> {
        let target = parse_unit(unit).map_err(|e| ReckonError::from(e).with_input(unit))?;
        let (magnitude, target) = value.convert_to(&target, &self.units)?;
        Ok(reckon_units::format_quantity(&magnitude, &target))
    }

    /// Minimized human-readable text
    pub fn render(&self, operand: &Operand) -> Result<String, ReckonError> {
        Ok(Renderer::new(&self.units).text(&operand.to_value())?)
    }

    pub fn renderer(&self) -> Renderer<'_> {
        Renderer::new(&self.units)
    }
}

impl Default for Reckon {
    fn default() -> Self {
        Self::with_builtin_units()
    }
}
