//! Operands: a unit-aware value or a plain number
//!
//! Callers mix the two freely; a plain number applied to a value only
//! touches the magnitude.

use std::fmt;
use reckon_core::Number;
use reckon_units::{UnitError, UnitSystem, Value};
use serde::{Deserialize, Serialize};

/// Binary arithmetic supported between operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Add,
    Sub,
    Mul,
    Div,
}

impl Op {
    pub fn symbol(&self) -> char {
        match self {
            Op::Add => '+',
            Op::Sub => '-',
            Op::Mul => '*',
            Op::Div => '/',
        }
    }

    pub fn from_symbol(c: char) -> Option<Op> {
        match c {
            '+' => Some(Op::Add),
            '-' => Some(Op::Sub),
            '*' => Some(Op::Mul),
            '/' => Some(Op::Div),
            _ => None,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum Operand {
    Quantity(Value),
    Scalar(Number),
}

impl Operand {
    // ========== Safe Accessors (never panic) ==========

    pub fn as_quantity(&self) -> Option<&Value> {
        match self {
            Operand::Quantity(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Number> {
        match self {
            Operand::Scalar(n) => Some(n),
            _ => None,
        }
    }

    /// View as a value; a scalar becomes dimensionless
    pub fn to_value(&self) -> Value {
        match self {
            Operand::Quantity(v) => v.clone(),
            Operand::Scalar(n) => Value::dimensionless(n.clone()),
        }
    }
}

/// Apply `op` with `lhs` on the left
///
/// A scalar on either side keeps the value's unit, including `n - v` and
/// `n / v`.
pub fn apply(
    system: &UnitSystem,
    op: Op,
    lhs: &Operand,
    rhs: &Operand,
) -> Result<Operand, UnitError> {
    use Operand::{Quantity, Scalar};

    let result = match (lhs, rhs) {
        (Quantity(a), Quantity(b)) => Quantity(match op {
            Op::Add => a.add(b)?,
            Op::Sub => a.sub(b)?,
            Op::Mul => a.mul(b, system)?,
            Op::Div => a.div(b, system)?,
        }),
        (Quantity(a), Scalar(n)) => Quantity(match op {
            Op::Add => a.add_scalar(n),
            Op::Sub => a.sub_scalar(n),
            Op::Mul => a.mul_scalar(n),
            Op::Div => a.div_scalar(n)?,
        }),
        (Scalar(n), Quantity(a)) => Quantity(match op {
            Op::Add => a.add_scalar(n),
            Op::Sub => a.rsub_scalar(n),
            Op::Mul => a.mul_scalar(n),
            Op::Div => a.rdiv_scalar(n)?,
        }),
        (Scalar(x), Scalar(y)) => Scalar(match op {
            Op::Add => x.add(y),
            Op::Sub => x.sub(y),
            Op::Mul => x.mul(y),
            Op::Div => x.checked_div(y)?,
        }),
    };

    Ok(result)
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Quantity(v)
    }
}

impl From<Number> for Operand {
    fn from(n: Number) -> Self {
        Operand::Scalar(n)
    }
}

impl From<i64> for Operand {
    fn from(n: i64) -> Self {
        Operand::Scalar(Number::from_i64(n))
    }
}
