//! Errors raised by the unit system

use reckon_core::{NumberError, ReckonError};
use thiserror::Error;

/// Errors that can occur while building, combining or converting units
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    /// Addition or subtraction between values with different canonical units
    #[error("cannot combine {left} with {right}: units differ")]
    UnitMismatch { left: String, right: String },

    /// Paired units do not share a base unit
    #[error("cannot convert {from} to {to}: incompatible dimensions")]
    IncompatibleDimension { from: String, to: String },

    /// Numerator/denominator lengths differ between source and target
    #[error("cannot convert {from} to {to}: numerator/denominator lengths differ")]
    UnitShapeMismatch { from: String, to: String },

    /// The transformation table does not converge
    #[error("invalid unit table: {0}")]
    Configuration(String),

    /// A unit name was used with a unit system that never registered it
    #[error("unit '{0}' is not registered in this unit system")]
    UnregisteredUnit(String),

    /// Text could not be read as a quantity or unit
    #[error("invalid quantity literal: {0}")]
    InvalidLiteral(String),

    /// A thread panicked while holding the registry lock
    #[error("unit registry lock poisoned")]
    RegistryPoisoned,

    #[error(transparent)]
    Number(#[from] NumberError),
}

impl From<UnitError> for ReckonError {
    fn from(err: UnitError) -> Self {
        match err {
            UnitError::UnitMismatch { left, right } => ReckonError::unit_mismatch(&left, &right),
            UnitError::IncompatibleDimension { from, to } => {
                ReckonError::incompatible_dimension(&from, &to)
            }
            UnitError::UnitShapeMismatch { from, to } => {
                ReckonError::unit_shape_mismatch(&from, &to)
            }
            UnitError::Configuration(details) => ReckonError::configuration(details),
            UnitError::InvalidLiteral(text) => {
                ReckonError::parse_error(format!("invalid quantity '{}'", text)).with_input(text)
            }
            UnitError::Number(e) => e.into(),
            e @ (UnitError::UnregisteredUnit(_) | UnitError::RegistryPoisoned) => {
                ReckonError::internal(e.to_string())
            }
        }
    }
}
