//! Typed element storage
//!
//! `Buffer` is the owned, dtype-tagged backing store of an array and
//! `Element` ties each Rust primitive to its `Dtype` and buffer variant.
//! Kernels get typed slices out of a buffer through `Element::slice` /
//! `Element::slice_mut` and never see raw bytes.

use crate::dtype::Dtype;
use crate::scalar::Scalar;
use num_traits::AsPrimitive;
use std::fmt::Debug;

/// Owned element storage, one variant per dtype
#[derive(Clone, Debug, PartialEq)]
pub enum Buffer {
    Bool(Vec<bool>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    UInt8(Vec<u8>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

impl Buffer {
    /// Zero-initialised buffer of `len` elements
    pub fn zeros(dtype: Dtype, len: usize) -> Self {
        match dtype {
            Dtype::Bool => Buffer::Bool(vec![false; len]),
            Dtype::Int8 => Buffer::Int8(vec![0; len]),
            Dtype::Int16 => Buffer::Int16(vec![0; len]),
            Dtype::Int32 => Buffer::Int32(vec![0; len]),
            Dtype::Int64 => Buffer::Int64(vec![0; len]),
            Dtype::UInt8 => Buffer::UInt8(vec![0; len]),
            Dtype::Float32 => Buffer::Float32(vec![0.0; len]),
            Dtype::Float64 => Buffer::Float64(vec![0.0; len]),
        }
    }

    pub fn dtype(&self) -> Dtype {
        match self {
            Buffer::Bool(_) => Dtype::Bool,
            Buffer::Int8(_) => Dtype::Int8,
            Buffer::Int16(_) => Dtype::Int16,
            Buffer::Int32(_) => Dtype::Int32,
            Buffer::Int64(_) => Dtype::Int64,
            Buffer::UInt8(_) => Dtype::UInt8,
            Buffer::Float32(_) => Dtype::Float32,
            Buffer::Float64(_) => Dtype::Float64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Buffer::Bool(v) => v.len(),
            Buffer::Int8(v) => v.len(),
            Buffer::Int16(v) => v.len(),
            Buffer::Int32(v) => v.len(),
            Buffer::Int64(v) => v.len(),
            Buffer::UInt8(v) => v.len(),
            Buffer::Float32(v) => v.len(),
            Buffer::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read one element as a sign-extended 64-bit integer.
    ///
    /// Returns `None` for float buffers and out-of-range indices.
    pub fn integral_at(&self, index: usize) -> Option<i64> {
        match self {
            Buffer::Bool(v) => v.get(index).map(|&x| x.to_i64_bits()),
            Buffer::Int8(v) => v.get(index).map(|&x| x.to_i64_bits()),
            Buffer::Int16(v) => v.get(index).map(|&x| x.to_i64_bits()),
            Buffer::Int32(v) => v.get(index).map(|&x| x.to_i64_bits()),
            Buffer::Int64(v) => v.get(index).map(|&x| x.to_i64_bits()),
            Buffer::UInt8(v) => v.get(index).map(|&x| x.to_i64_bits()),
            Buffer::Float32(_) | Buffer::Float64(_) => None,
        }
    }
}

/// A Rust primitive that can be stored in an array
pub trait Element: Copy + Debug + PartialEq + Send + Sync + 'static {
    /// The dtype this type represents
    const DTYPE: Dtype;

    /// Borrow the buffer as a typed slice, if the dtypes agree
    fn slice(buffer: &Buffer) -> Option<&[Self]>;

    /// Mutably borrow the buffer as a typed slice, if the dtypes agree
    fn slice_mut(buffer: &mut Buffer) -> Option<&mut [Self]>;

    /// Wrap a vector into a buffer
    fn into_buffer(data: Vec<Self>) -> Buffer;

    /// Convert a scalar into this type with `as`-cast semantics
    /// (integers wrap, floats truncate toward zero and saturate)
    fn from_scalar(scalar: Scalar) -> Self;
}

/// Elements with an integer bit pattern: bool and the integer types
pub trait Integral: Element {
    /// Sign- or zero-extend to 64 bits
    fn to_i64_bits(self) -> i64;

    /// Truncate a 64-bit pattern to this width (bool: non-zero is true)
    fn from_i64_bits(bits: i64) -> Self;
}

macro_rules! impl_element {
    ($type:ty, $variant:ident) => {
        impl Element for $type {
            const DTYPE: Dtype = Dtype::$variant;

            fn slice(buffer: &Buffer) -> Option<&[Self]> {
                match buffer {
                    Buffer::$variant(v) => Some(v.as_slice()),
                    _ => None,
                }
            }

            fn slice_mut(buffer: &mut Buffer) -> Option<&mut [Self]> {
                match buffer {
                    Buffer::$variant(v) => Some(v.as_mut_slice()),
                    _ => None,
                }
            }

            fn into_buffer(data: Vec<Self>) -> Buffer {
                Buffer::$variant(data)
            }

            fn from_scalar(scalar: Scalar) -> Self {
                match scalar {
                    Scalar::Bool(b) => (b as u8).as_(),
                    Scalar::Int(v) => v.as_(),
                    Scalar::Float(v) => v.as_(),
                }
            }
        }
    };
}

macro_rules! impl_integral {
    ($type:ty) => {
        impl Integral for $type {
            fn to_i64_bits(self) -> i64 {
                self as i64
            }

            fn from_i64_bits(bits: i64) -> Self {
                bits as $type
            }
        }
    };
}

impl_element!(i8, Int8);
impl_element!(i16, Int16);
impl_element!(i32, Int32);
impl_element!(i64, Int64);
impl_element!(u8, UInt8);
impl_element!(f32, Float32);
impl_element!(f64, Float64);

impl_integral!(i8);
impl_integral!(i16);
impl_integral!(i32);
impl_integral!(i64);
impl_integral!(u8);

impl Element for bool {
    const DTYPE: Dtype = Dtype::Bool;

    fn slice(buffer: &Buffer) -> Option<&[Self]> {
        match buffer {
            Buffer::Bool(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    fn slice_mut(buffer: &mut Buffer) -> Option<&mut [Self]> {
        match buffer {
            Buffer::Bool(v) => Some(v.as_mut_slice()),
            _ => None,
        }
    }

    fn into_buffer(data: Vec<Self>) -> Buffer {
        Buffer::Bool(data)
    }

    fn from_scalar(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Bool(b) => b,
            Scalar::Int(v) => v != 0,
            Scalar::Float(v) => v != 0.0,
        }
    }
}

impl Integral for bool {
    fn to_i64_bits(self) -> i64 {
        self as i64
    }

    fn from_i64_bits(bits: i64) -> Self {
        bits != 0
    }
}
