//! Array-level bitwise routines
//!
//! Each routine allocates (or borrows) the output, then hands the call to
//! the dispatcher over the process-wide registry. The native backend is
//! installed on first use if nothing else was installed.
//!
//! | form                      | result                       |
//! |---------------------------|------------------------------|
//! | `bitwise_and(x1, x2)`     | new array, broadcast shape   |
//! | `bitwise_and_scalar(x, s)`| new array, `x`'s shape/dtype |
//! | `scalar_bitwise_and(s, x)`| same, scalar on the left     |
//! | `bitwise_and_into(..)`    | writes a caller's output     |
//! | `bitwise_and_assign(..)`  | `x1 &= x2` in place          |

use crate::init;
use ndx_core::{promote_types, Array, Result, Scalar};
use ndx_kernel::{broadcast_shapes, check_devices, Dispatcher, OpName};

fn dispatcher() -> Result<Dispatcher> {
    init().map(Dispatcher::new)
}

fn binary(op: OpName, x1: &Array, x2: &Array) -> Result<Array> {
    let device = check_devices(op, &[x1, x2])?;
    let shape = broadcast_shapes(op, x1.shape(), x2.shape())?;
    let out = Array::zeros(shape, promote_types(x1.dtype(), x2.dtype()), device.clone());
    dispatcher()?.call_binary(op, x1, x2, &out)?;
    Ok(out)
}

fn array_scalar(op: OpName, x1: &Array, x2: Scalar) -> Result<Array> {
    let out = Array::zeros(x1.shape().clone(), x1.dtype(), x1.device().clone());
    dispatcher()?.call_array_scalar(op, x1, x2, &out)?;
    Ok(out)
}

fn scalar_array(op: OpName, x1: Scalar, x2: &Array) -> Result<Array> {
    let out = Array::zeros(x2.shape().clone(), x2.dtype(), x2.device().clone());
    dispatcher()?.call_scalar_array(op, x1, x2, &out)?;
    Ok(out)
}

macro_rules! bitwise_routines {
    ($($sym:literal: $op:ident => $name:ident, $scalar:ident, $scalar_left:ident, $into:ident, $assign:ident, $assign_scalar:ident;)*) => {
        $(
            #[doc = concat!("Elementwise `x1 ", $sym, " x2` with broadcasting and dtype promotion")]
            pub fn $name(x1: &Array, x2: &Array) -> Result<Array> {
                binary(OpName::$op, x1, x2)
            }

            #[doc = concat!("Elementwise `x1 ", $sym, " scalar`; the scalar is cast to `x1`'s dtype")]
            pub fn $scalar(x1: &Array, x2: impl Into<Scalar>) -> Result<Array> {
                array_scalar(OpName::$op, x1, x2.into())
            }

            #[doc = concat!("Elementwise `scalar ", $sym, " x2`")]
            pub fn $scalar_left(x1: impl Into<Scalar>, x2: &Array) -> Result<Array> {
                scalar_array(OpName::$op, x1.into(), x2)
            }

            #[doc = concat!("`out = x1 ", $sym, " x2` into a pre-allocated output")]
            pub fn $into<'o>(x1: &Array, x2: &Array, out: &'o Array) -> Result<&'o Array> {
                dispatcher()?.call_binary(OpName::$op, x1, x2, out)
            }

            #[doc = concat!("`x1 ", $sym, "= x2` in place; `x2` must broadcast to `x1`'s shape")]
            pub fn $assign(x1: &Array, x2: &Array) -> Result<()> {
                dispatcher()?.call_binary(OpName::$op, x1, x2, x1)?;
                Ok(())
            }

            #[doc = concat!("`x1 ", $sym, "= scalar` in place")]
            pub fn $assign_scalar(x1: &Array, x2: impl Into<Scalar>) -> Result<()> {
                dispatcher()?.call_array_scalar(OpName::$op, x1, x2.into(), x1)?;
                Ok(())
            }
        )*
    };
}

bitwise_routines! {
    "&": BitwiseAnd => bitwise_and, bitwise_and_scalar, scalar_bitwise_and,
        bitwise_and_into, bitwise_and_assign, bitwise_and_assign_scalar;
    "|": BitwiseOr => bitwise_or, bitwise_or_scalar, scalar_bitwise_or,
        bitwise_or_into, bitwise_or_assign, bitwise_or_assign_scalar;
    "^": BitwiseXor => bitwise_xor, bitwise_xor_scalar, scalar_bitwise_xor,
        bitwise_xor_into, bitwise_xor_assign, bitwise_xor_assign_scalar;
}
