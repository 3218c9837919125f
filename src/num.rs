// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Numeric values as seen by the match engine.
//!
//! The engine distinguishes numbers that fit IEEE 754 doubles from
//! arbitrary-precision decimals. When either side of a comparison is
//! arbitrary-precision the comparison goes through [BigDecimal]; otherwise
//! both sides are compared by double magnitude. There is NO silent coercion
//! of an arbitrary-precision value down to a double.
//!

use bigdecimal::{BigDecimal, FromPrimitive, ToPrimitive};
use core::fmt;

/// A numeric payload. Integers, unsigned integers and floats all flatten to
/// this one type; [Num::Big] carries arbitrary precision.
#[derive(Clone, Debug)]
pub enum Num {
    /// Signed machine integer.
    Int(i64),
    /// Unsigned machine integer that does not fit `i64`.
    UInt(u64),
    /// Double-precision float.
    Float(f64),
    /// Arbitrary-precision decimal.
    Big(BigDecimal),
}

impl fmt::Display for Num {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Num::Int(x) => write!(f, "{x}"),
            Num::UInt(x) => write!(f, "{x}"),
            Num::Float(x) => write!(f, "{x}"),
            Num::Big(x) => write!(f, "{x}"),
        }
    }
}

impl Num {
    /// Return TRUE if this is an arbitrary-precision value; FALSE otherwise.
    pub fn is_big(&self) -> bool {
        matches!(self, Num::Big(_))
    }

    /// This value as a double, lossy for big decimals that exceed the `f64`
    /// range. Use only where the other side is known NOT to be
    /// arbitrary-precision.
    pub fn as_f64(&self) -> f64 {
        match self {
            Num::Int(x) => *x as f64,
            Num::UInt(x) => *x as f64,
            Num::Float(x) => *x,
            Num::Big(x) => x.to_f64().unwrap_or(f64::NAN),
        }
    }

    // Promote to a BigDecimal for high-precision comparison.
    fn as_big(&self) -> Option<BigDecimal> {
        match self {
            Num::Int(x) => Some(BigDecimal::from(*x)),
            Num::UInt(x) => Some(BigDecimal::from(*x)),
            Num::Float(x) => BigDecimal::from_f64(*x),
            Num::Big(x) => Some(x.clone()),
        }
    }

    /// The engine's equality rule: `compare_to == 0` when either side is
    /// arbitrary-precision, double `==` otherwise.
    pub fn matches(&self, other: &Self) -> bool {
        if self.is_big() || other.is_big() {
            match (self.as_big(), other.as_big()) {
                (Some(a), Some(b)) => a == b,
                // NaN and friends never promote; they never match either...
                _ => false,
            }
        } else {
            self.as_f64() == other.as_f64()
        }
    }

    /// Ordering under the same promotion rule as [Num::matches].
    pub fn compare(&self, other: &Self) -> Option<std::cmp::Ordering> {
        if self.is_big() || other.is_big() {
            match (self.as_big(), other.as_big()) {
                (Some(a), Some(b)) => Some(a.cmp(&b)),
                _ => None,
            }
        } else {
            self.as_f64().partial_cmp(&other.as_f64())
        }
    }
}

impl From<&serde_json::Number> for Num {
    fn from(value: &serde_json::Number) -> Self {
        if let Some(x) = value.as_i64() {
            Num::Int(x)
        } else if let Some(x) = value.as_u64() {
            Num::UInt(x)
        } else {
            Num::Float(value.as_f64().unwrap_or(f64::NAN))
        }
    }
}

impl From<i64> for Num {
    fn from(value: i64) -> Self {
        Num::Int(value)
    }
}

impl From<f64> for Num {
    fn from(value: f64) -> Self {
        Num::Float(value)
    }
}

impl From<BigDecimal> for Num {
    fn from(value: BigDecimal) -> Self {
        Num::Big(value)
    }
}
