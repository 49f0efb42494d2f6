//! Invocation contract checks
//!
//! Every check here runs before a kernel is called. None of them touch array
//! data, so a failed dispatch leaves the output buffer exactly as it was.

use crate::op::OpName;
use ndx_core::{promote_types, Array, Device, Dtype, DtypeKind, Error, Result, Scalar, Shape};

/// Broadcast two shapes against each other.
///
/// Dimensions are aligned from the right. A size-1 dimension stretches to
/// match the other operand; any other mismatch fails. Zero-size dimensions
/// follow the same rule (`0` against `1` gives `0`).
pub fn broadcast_shapes(op: OpName, a: &Shape, b: &Shape) -> Result<Shape> {
    let ndim = a.ndim().max(b.ndim());
    let mut dims = vec![0; ndim];
    for (i, dim) in dims.iter_mut().enumerate() {
        // Walk from the trailing dimension
        let da = dim_from_right(a, ndim - 1 - i);
        let db = dim_from_right(b, ndim - 1 - i);
        *dim = match (da, db) {
            (x, y) if x == y => x,
            (1, y) => y,
            (x, 1) => x,
            _ => {
                return Err(Error::shape_mismatch(
                    op.as_str(),
                    format!("operands with shapes {a} and {b} cannot be broadcast together"),
                ))
            }
        };
    }
    Ok(Shape::new(dims))
}

fn dim_from_right(shape: &Shape, k: usize) -> usize {
    if k < shape.ndim() {
        shape[shape.ndim() - 1 - k]
    } else {
        1
    }
}

/// The output must already have the broadcast shape; it is never resized
pub fn check_output_shape(op: OpName, expected: &Shape, out: &Array) -> Result<()> {
    if out.shape() != expected {
        return Err(Error::shape_mismatch(
            op.as_str(),
            format!("output has shape {}, expected {}", out.shape(), expected),
        ));
    }
    Ok(())
}

fn check_supported(op: OpName, role: &str, dtype: Dtype) -> Result<()> {
    let family = op.family();
    if !family.supports(dtype) {
        return Err(Error::dtype(
            op.as_str(),
            format!("{role} dtype {dtype} is not supported by {} operations", family.name()),
        ));
    }
    Ok(())
}

/// Array-array dtype rule: both operands in the family's domain and the
/// output dtype equal to their promoted type
pub fn check_dtypes(op: OpName, x1: Dtype, x2: Dtype, out: Dtype) -> Result<Dtype> {
    check_supported(op, "x1", x1)?;
    check_supported(op, "x2", x2)?;
    let result = promote_types(x1, x2);
    if out != result {
        return Err(Error::dtype(
            op.as_str(),
            format!("output dtype {out} does not match result dtype {result} of {x1} and {x2}"),
        ));
    }
    Ok(result)
}

/// Array-scalar dtype rule: the array is in the family's domain and the
/// output keeps the array's dtype
pub fn check_scalar_dtypes(op: OpName, x1: Dtype, out: Dtype) -> Result<Dtype> {
    check_supported(op, "x1", x1)?;
    if out != x1 {
        return Err(Error::dtype(
            op.as_str(),
            format!("output dtype {out} does not match array dtype {x1}"),
        ));
    }
    Ok(x1)
}

/// Convert a scalar operand into `dtype`.
///
/// Integral families reject float scalars. Integer scalars wrap to the
/// target width, booleans become 0/1, and an integer cast to bool is
/// `value != 0`.
pub fn cast_scalar(op: OpName, scalar: Scalar, dtype: Dtype) -> Result<Scalar> {
    check_supported(op, "array", dtype)?;
    if scalar.kind() == DtypeKind::Float && !op.family().supports(Dtype::Float64) {
        return Err(Error::dtype(
            op.as_str(),
            format!("float scalar {scalar} is not supported by {} operations", op.family().name()),
        ));
    }
    Ok(scalar.cast_to(dtype))
}

/// Self-aliasing rule for one call.
///
/// The output may not write an element twice (broadcast views), and any
/// input sharing storage with it must either be exactly the same view (and
/// the family must allow in-place use) or address disjoint memory.
pub fn check_aliasing(op: OpName, inputs: &[&Array], out: &Array) -> Result<()> {
    if out.has_internal_overlap() {
        return Err(Error::aliasing(
            op.as_str(),
            format!(
                "output with shape {} and strides {:?} maps several elements to one location",
                out.shape(),
                out.strides()
            ),
        ));
    }

    for (i, input) in inputs.iter().enumerate() {
        if !input.shares_storage(out) {
            continue;
        }
        if input.same_view(out) {
            if !op.family().tolerates_inplace() {
                return Err(Error::aliasing(
                    op.as_str(),
                    format!("{} operations cannot run in place", op.family().name()),
                ));
            }
        } else if input.overlaps(out) {
            return Err(Error::aliasing(
                op.as_str(),
                format!("input {} partially overlaps the output", i + 1),
            ));
        }
    }
    Ok(())
}

/// All operands must live on one device; returns it
pub fn check_devices<'a>(op: OpName, arrays: &[&'a Array]) -> Result<&'a Device> {
    let (first, rest) = arrays.split_first().ok_or_else(|| {
        Error::InvalidInput(format!("{op} called without array operands"))
    })?;
    let device = first.device();
    if let Some(other) = rest.iter().find(|a| a.device() != device) {
        return Err(Error::device_mismatch(
            op.as_str(),
            format!("operands on {device} and {}", other.device()),
        ));
    }
    Ok(device)
}
