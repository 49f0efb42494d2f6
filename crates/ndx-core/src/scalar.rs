//! Tagged scalar values used by array-scalar operations

use crate::dtype::{Dtype, DtypeKind};
use crate::element::Element;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A numeric value with an associated kind
///
/// Integers are held as `i64` and floats as `f64`; `cast_to` narrows a
/// scalar into the domain of a concrete dtype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
}

impl Scalar {
    pub fn kind(&self) -> DtypeKind {
        match self {
            Scalar::Bool(_) => DtypeKind::Bool,
            Scalar::Int(_) => DtypeKind::Int,
            Scalar::Float(_) => DtypeKind::Float,
        }
    }

    /// The widest dtype of this scalar's kind
    pub fn dtype(&self) -> Dtype {
        match self {
            Scalar::Bool(_) => Dtype::Bool,
            Scalar::Int(_) => Dtype::Int64,
            Scalar::Float(_) => Dtype::Float64,
        }
    }

    /// Convert into the value domain of `dtype`.
    ///
    /// Integer targets wrap, float-to-integer truncates toward zero and
    /// saturates, and a bool target is `value != 0`.
    pub fn cast_to(self, dtype: Dtype) -> Scalar {
        match dtype {
            Dtype::Bool => Scalar::Bool(bool::from_scalar(self)),
            Dtype::Int8 => Scalar::Int(i8::from_scalar(self) as i64),
            Dtype::Int16 => Scalar::Int(i16::from_scalar(self) as i64),
            Dtype::Int32 => Scalar::Int(i32::from_scalar(self) as i64),
            Dtype::Int64 => Scalar::Int(i64::from_scalar(self)),
            Dtype::UInt8 => Scalar::Int(u8::from_scalar(self) as i64),
            Dtype::Float32 => Scalar::Float(f32::from_scalar(self) as f64),
            Dtype::Float64 => Scalar::Float(f64::from_scalar(self)),
        }
    }

    /// Extract the value as a concrete element type
    pub fn to_element<T: Element>(self) -> T {
        T::from_scalar(self)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

macro_rules! impl_from_int {
    ($($type:ty),*) => {
        $(
            impl From<$type> for Scalar {
                fn from(value: $type) -> Self {
                    Scalar::Int(value as i64)
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Scalar {
    fn from(value: f32) -> Self {
        Scalar::Float(value as f64)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}
