//! Reckon Units - Unit-aware values with exact unit algebra
//!
//! Pipeline, leaf-first:
//! - `UnitRegistry`: canonical unit names, abbreviations, and one prime per name
//! - `ConversionGraph`: `unit -> (multiplier, target)` edges built from a `UnitTable`
//! - `algebra`: compound units as prime ratios; simplification and conversion
//! - `minimize`: pick the unit whose magnitude reads closest to 1
//! - `Value`: a magnitude and a compound unit, always stored canonically
//!
//! `UnitSystem` bundles a registry and a graph so values can be built and
//! rendered from several threads.

mod error;
mod scale;
mod table;
mod registry;
mod graph;
mod system;
mod value;
mod parse;

pub mod algebra;
pub mod minimize;

pub use error::UnitError;
pub use scale::Scale;
pub use table::{Transformation, UnitTable};
pub use registry::{Registration, UnitName, UnitRegistry};
pub use graph::ConversionGraph;
pub use algebra::{CompoundUnit, UnitRatio};
pub use system::UnitSystem;
pub use value::{format_quantity, Value};
pub use parse::{is_unit_name, parse_quantity, parse_unit};
