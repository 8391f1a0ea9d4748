//! Unit names, abbreviations and prime assignment
//!
//! Every canonical unit name gets a distinct prime, handed out in order of
//! first appearance. Compound units are then encoded as ratios of prime
//! products, which is what makes cancellation exact.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;
use crate::UnitTable;

/// An interned, canonical (singular, de-abbreviated) unit name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitName(Arc<str>);

impl UnitName {
    pub fn new(name: &str) -> Self {
        UnitName(Arc::from(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for UnitName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UnitName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UnitName {
    fn from(name: &str) -> Self {
        UnitName::new(name)
    }
}

impl Serialize for UnitName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UnitName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(UnitName::new(&s))
    }
}

/// Outcome of resolving a unit name against the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: UnitName,
    pub prime: u64,
    /// True when this call coined the name
    pub fresh: bool,
}

/// Canonical unit names and their primes
#[derive(Debug, Clone, Default)]
pub struct UnitRegistry {
    abbreviations: HashMap<String, UnitName>,
    plurals: HashMap<String, UnitName>,
    primes: HashMap<UnitName, u64>,
    /// Reverse index, ascending by prime (= registration order)
    by_prime: Vec<(u64, UnitName)>,
}

impl UnitRegistry {
    /// An empty registry with no abbreviations
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a table: transformation units first, in table order, then
    /// any abbreviation or plural targets the transformations did not name.
    pub fn from_table(table: &UnitTable) -> Self {
        let mut registry = UnitRegistry::new();

        for (abbreviation, unit) in &table.abbreviations {
            registry.abbreviations.insert(abbreviation.clone(), UnitName::new(unit));
        }
        for (plural, unit) in &table.plurals {
            registry.plurals.insert(plural.clone(), UnitName::new(unit));
        }

        for t in &table.transformations {
            registry.insert(&t.unit);
        }
        for unit in table.abbreviations.values().chain(table.plurals.values()) {
            registry.insert(unit);
        }

        registry
    }

    pub fn is_abbreviation(&self, name: &str) -> bool {
        self.abbreviations.contains_key(name)
    }

    /// Full name for a known abbreviation, otherwise the name unchanged
    pub fn resolve_abbreviation(&self, name: &str) -> UnitName {
        match self.abbreviations.get(name) {
            Some(unit) => unit.clone(),
            None => UnitName::new(name),
        }
    }

    /// Drop one trailing "s" unless the name is an abbreviation
    ///
    /// seconds -> second, gram -> gram, ms -> ms. Irregular plurals from
    /// the table take precedence over the suffix rule.
    pub fn singularize(&self, name: &str) -> String {
        if self.is_abbreviation(name) {
            return name.to_string();
        }
        if let Some(unit) = self.plurals.get(name) {
            return unit.to_string();
        }
        match name.strip_suffix('s') {
            Some(stem) if !stem.is_empty() => stem.to_string(),
            _ => name.to_string(),
        }
    }

    /// Singularize, then resolve abbreviations
    pub fn canonical_name(&self, name: &str) -> UnitName {
        self.resolve_abbreviation(&self.singularize(name))
    }

    /// Canonicalize `name`, assigning the next prime if it is new
    pub fn register_or_get(&mut self, name: &str) -> Registration {
        let canonical = self.canonical_name(name);
        if let Some(&prime) = self.primes.get(&canonical) {
            return Registration { name: canonical, prime, fresh: false };
        }

        let prime = self.insert(canonical.as_str());
        debug!(unit = %canonical, prime, "coined unit name");
        Registration { name: canonical, prime, fresh: true }
    }

    /// Canonicalize `name` without registering it
    pub fn lookup(&self, name: &str) -> Option<Registration> {
        let canonical = self.canonical_name(name);
        let prime = *self.primes.get(&canonical)?;
        Some(Registration { name: canonical, prime, fresh: false })
    }

    pub fn contains(&self, name: &UnitName) -> bool {
        self.primes.contains_key(name)
    }

    pub fn prime_of(&self, name: &UnitName) -> Option<u64> {
        self.primes.get(name).copied()
    }

    pub fn name_of_prime(&self, prime: u64) -> Option<&UnitName> {
        self.by_prime
            .binary_search_by_key(&prime, |(p, _)| *p)
            .ok()
            .map(|i| &self.by_prime[i].1)
    }

    /// (prime, name) pairs in ascending prime order
    pub fn primes(&self) -> impl Iterator<Item = (u64, &UnitName)> {
        self.by_prime.iter().map(|(p, name)| (*p, name))
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &UnitName> {
        self.by_prime.iter().map(|(_, name)| name)
    }

    pub fn len(&self) -> usize {
        self.by_prime.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_prime.is_empty()
    }

    fn insert(&mut self, name: &str) -> u64 {
        let name = UnitName::new(name);
        if let Some(&prime) = self.primes.get(&name) {
            return prime;
        }
        let prime = self.next_prime();
        self.primes.insert(name.clone(), prime);
        self.by_prime.push((prime, name));
        prime
    }

    fn next_prime(&self) -> u64 {
        let mut candidate = self.by_prime.last().map(|(p, _)| p + 1).unwrap_or(2);
        while !is_prime(candidate) {
            candidate += 1;
        }
        candidate
    }
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    let mut d = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}
