//! A unit registry and conversion graph bundled for shared use
//!
//! The graph never changes after construction. The registry only grows:
//! reads take the shared lock, and coining a new name takes the write lock
//! and re-checks before assigning a prime.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;
use reckon_core::Number;
use crate::algebra::{self, CompoundUnit, UnitRatio};
use crate::minimize;
use crate::{ConversionGraph, Registration, UnitError, UnitName, UnitRegistry, UnitTable};

#[derive(Debug)]
pub struct UnitSystem {
    registry: RwLock<UnitRegistry>,
    graph: ConversionGraph,
}

impl UnitSystem {
    /// Validate `table` and seed the registry from it
    pub fn new(table: UnitTable) -> Result<Self, UnitError> {
        let graph = ConversionGraph::new(&table)?;
        let registry = UnitRegistry::from_table(&table);

        info!(
            transformations = table.transformations.len(),
            abbreviations = table.abbreviations.len(),
            units = registry.len(),
            "built unit system"
        );

        Ok(UnitSystem {
            registry: RwLock::new(registry),
            graph,
        })
    }

    /// The built-in time, length, mass and data vocabulary
    pub fn builtin() -> Result<Self, UnitError> {
        Self::new(UnitTable::builtin())
    }

    pub fn graph(&self) -> &ConversionGraph {
        &self.graph
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, UnitRegistry>, UnitError> {
        self.registry.read().map_err(|_| UnitError::RegistryPoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, UnitRegistry>, UnitError> {
        self.registry.write().map_err(|_| UnitError::RegistryPoisoned)
    }

    /// Canonicalize a spelling, coining a prime for it if needed
    pub fn register_or_get(&self, name: &str) -> Result<Registration, UnitError> {
        if let Some(known) = self.read()?.lookup(name) {
            return Ok(known);
        }
        Ok(self.write()?.register_or_get(name))
    }

    /// Canonicalize a spelling without registering it
    pub fn lookup(&self, name: &str) -> Result<Option<Registration>, UnitError> {
        Ok(self.read()?.lookup(name))
    }

    /// A single-unit compound for a known spelling ("km" -> kilometer)
    pub fn unit_by_name(&self, name: &str) -> Result<Option<CompoundUnit>, UnitError> {
        Ok(self.lookup(name)?.map(|r| CompoundUnit::single(r.name)))
    }

    /// Number of registered unit names
    pub fn unit_count(&self) -> Result<usize, UnitError> {
        Ok(self.read()?.len())
    }

    /// Snapshot of the registry as it stands
    pub fn registry(&self) -> Result<UnitRegistry, UnitError> {
        Ok(self.read()?.clone())
    }

    /// Rewrite every name in `unit` to its canonical spelling, registering
    /// unknown names in one critical section
    pub fn canonicalize(&self, unit: &CompoundUnit) -> Result<CompoundUnit, UnitError> {
        {
            let registry = self.read()?;
            let resolved = resolve_all(unit, |name| registry.lookup(name));
            if let Some(canonical) = resolved {
                return Ok(canonical);
            }
        }

        let mut registry = self.write()?;
        let mut canonical = CompoundUnit::dimensionless();
        for name in &unit.numerator {
            canonical.numerator.push(registry.register_or_get(name.as_str()).name);
        }
        for name in &unit.denominator {
            canonical.denominator.push(registry.register_or_get(name.as_str()).name);
        }
        Ok(canonical)
    }

    pub fn to_ratio(&self, unit: &CompoundUnit) -> Result<UnitRatio, UnitError> {
        algebra::to_ratio(&*self.read()?, unit)
    }

    pub fn from_ratio(&self, ratio: &UnitRatio) -> Result<CompoundUnit, UnitError> {
        Ok(algebra::from_ratio(&*self.read()?, ratio))
    }

    /// Cancel names shared by numerator and denominator
    pub fn simplify(&self, unit: &CompoundUnit) -> Result<CompoundUnit, UnitError> {
        algebra::simplify(&*self.read()?, unit)
    }

    pub fn convert(
        &self,
        magnitude: &Number,
        src: &CompoundUnit,
        dst: &CompoundUnit,
    ) -> Result<Number, UnitError> {
        algebra::convert(&self.graph, magnitude, src, dst)
    }

    pub fn normalize(
        &self,
        magnitude: &Number,
        unit: &CompoundUnit,
    ) -> Result<(Number, CompoundUnit), UnitError> {
        self.graph.normalize(magnitude, unit)
    }

    /// Most natural rendering of `magnitude` in `unit`
    pub fn minimize(
        &self,
        magnitude: &Number,
        unit: &CompoundUnit,
    ) -> Result<(Number, CompoundUnit), UnitError> {
        minimize::minimize_compound(&self.graph, magnitude, unit)
    }
}

impl Default for UnitSystem {
    /// The built-in system. Panics only if the built-in table is broken.
    fn default() -> Self {
        Self::builtin().unwrap_or_else(|e| panic!("built-in unit table is invalid: {}", e))
    }
}

/// Canonical form of `unit` if every name is already known
fn resolve_all(
    unit: &CompoundUnit,
    lookup: impl Fn(&str) -> Option<Registration>,
) -> Option<CompoundUnit> {
    let resolve = |names: &[UnitName]| -> Option<Vec<_>> {
        names.iter().map(|n| lookup(n.as_str()).map(|r| r.name)).collect()
    };
    Some(CompoundUnit::new(resolve(&unit.numerator)?, resolve(&unit.denominator)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_builtin_system() {
        let system = UnitSystem::builtin().unwrap();
        assert!(system.unit_count().unwrap() >= 26);
        assert!(system.graph().is_base_unit(&"second".into()));
    }

    #[test]
    fn test_invalid_table_rejected() {
        let table = UnitTable::new().with_transformation("a", crate::Scale::integer(3).unwrap(), "b");
        assert!(matches!(UnitSystem::new(table), Err(UnitError::Configuration(_))));
    }

    #[test]
    fn test_unit_by_name() {
        let system = UnitSystem::default();
        assert_eq!(
            system.unit_by_name("km").unwrap(),
            Some(CompoundUnit::from_names(&["kilometer"], &[]))
        );
        assert_eq!(
            system.unit_by_name("hours").unwrap(),
            Some(CompoundUnit::from_names(&["hour"], &[]))
        );
        assert_eq!(system.unit_by_name("furlong").unwrap(), None);
    }

    #[test]
    fn test_canonicalize_registers_new_names() {
        let system = UnitSystem::default();
        let before = system.unit_count().unwrap();
        let unit = CompoundUnit::from_names(&["km", "widgets"], &["s"]);
        let canonical = system.canonicalize(&unit).unwrap();
        assert_eq!(canonical, CompoundUnit::from_names(&["kilometer", "widget"], &["second"]));
        assert_eq!(system.unit_count().unwrap(), before + 1);

        // already known: no growth
        system.canonicalize(&unit).unwrap();
        assert_eq!(system.unit_count().unwrap(), before + 1);
    }

    #[test]
    fn test_concurrent_registration_assigns_one_prime() {
        let system = Arc::new(UnitSystem::default());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let system = Arc::clone(&system);
                thread::spawn(move || system.register_or_get("gizmos").unwrap().prime)
            })
            .collect();

        let primes: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(primes.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(system.lookup("gizmo").unwrap().unwrap().prime, primes[0]);
    }

    #[test]
    fn test_ratio_roundtrip_through_system() {
        let system = UnitSystem::default();
        let unit = CompoundUnit::from_names(&["second", "meter"], &["byte"]);
        let ratio = system.to_ratio(&unit).unwrap();
        assert_eq!(system.from_ratio(&ratio).unwrap(), unit);
    }

    #[test]
    fn test_minimize() {
        let system = UnitSystem::default();
        let (m, u) = system
            .minimize(&Number::from_i64(1000), &CompoundUnit::from_names(&["meter"], &[]))
            .unwrap();
        assert_eq!(m, Number::from_i64(1));
        assert_eq!(u, CompoundUnit::from_names(&["kilometer"], &[]));
    }
}
