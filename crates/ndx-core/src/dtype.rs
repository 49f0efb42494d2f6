//! Element dtypes and the type-promotion table
//!
//! The dtype set mirrors what the array layer stores: a boolean type, signed
//! integers of four widths, an unsigned byte, and two float widths.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Broad category of a dtype
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DtypeKind {
    Bool,
    Int,
    UInt,
    Float,
}

/// Element type of an array
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    Float32,
    Float64,
}

impl Dtype {
    /// Every dtype, in promotion order within each kind
    pub const ALL: [Dtype; 8] = [
        Dtype::Bool,
        Dtype::Int8,
        Dtype::Int16,
        Dtype::Int32,
        Dtype::Int64,
        Dtype::UInt8,
        Dtype::Float32,
        Dtype::Float64,
    ];

    /// Size of one element in bytes
    pub fn item_size(self) -> usize {
        match self {
            Dtype::Bool | Dtype::Int8 | Dtype::UInt8 => 1,
            Dtype::Int16 => 2,
            Dtype::Int32 | Dtype::Float32 => 4,
            Dtype::Int64 | Dtype::Float64 => 8,
        }
    }

    pub fn kind(self) -> DtypeKind {
        match self {
            Dtype::Bool => DtypeKind::Bool,
            Dtype::Int8 | Dtype::Int16 | Dtype::Int32 | Dtype::Int64 => DtypeKind::Int,
            Dtype::UInt8 => DtypeKind::UInt,
            Dtype::Float32 | Dtype::Float64 => DtypeKind::Float,
        }
    }

    /// True for bool and every integer dtype
    pub fn is_integral(self) -> bool {
        !matches!(self.kind(), DtypeKind::Float)
    }

    pub fn name(self) -> &'static str {
        match self {
            Dtype::Bool => "bool",
            Dtype::Int8 => "int8",
            Dtype::Int16 => "int16",
            Dtype::Int32 => "int32",
            Dtype::Int64 => "int64",
            Dtype::UInt8 => "uint8",
            Dtype::Float32 => "float32",
            Dtype::Float64 => "float64",
        }
    }

    fn signed_for_size(size: usize) -> Dtype {
        match size {
            1 => Dtype::Int8,
            2 => Dtype::Int16,
            4 => Dtype::Int32,
            _ => Dtype::Int64,
        }
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dtype {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Dtype::ALL
            .iter()
            .copied()
            .find(|d| d.name() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown dtype '{s}'")))
    }
}

/// Result dtype of combining two operands elementwise.
///
/// The table is symmetric. Bool yields to anything, signed integers widen to
/// the larger operand, `uint8` mixed with a signed integer widens to the
/// smallest signed type that holds both, and floats absorb integers (with
/// `float32` kept only when every integer value of the other operand fits).
pub fn promote_types(a: Dtype, b: Dtype) -> Dtype {
    use DtypeKind::*;

    if a == b {
        return a;
    }
    match (a.kind(), b.kind()) {
        (Bool, _) => b,
        (_, Bool) => a,
        (Int, Int) => {
            if a.item_size() >= b.item_size() {
                a
            } else {
                b
            }
        }
        (UInt, Int) | (Int, UInt) => {
            let signed = if a.kind() == Int { a } else { b };
            Dtype::signed_for_size(signed.item_size().max(2))
        }
        (UInt, UInt) => a,
        (Float, Float) => Dtype::Float64,
        (Float, _) | (_, Float) => {
            let (float, other) = if a.kind() == Float { (a, b) } else { (b, a) };
            if float == Dtype::Float32 && other.item_size() <= 2 {
                Dtype::Float32
            } else {
                Dtype::Float64
            }
        }
    }
}
