//! Kernel dispatch
//!
//! The dispatcher is the single path from an operator routine to a kernel:
//!
//! 1. resolve the device every operand lives on,
//! 2. look up the kernel registered for that device's backend,
//! 3. validate shapes, dtypes and aliasing,
//! 4. call the kernel and hand the populated output back.
//!
//! It owns an `Arc<KernelRegistry>` and nothing else, so it is cheap to clone
//! and safe to share between threads. Lookups never take a lock.

use crate::check::{
    broadcast_shapes, cast_scalar, check_aliasing, check_devices, check_dtypes,
    check_output_shape, check_scalar_dtypes,
};
use crate::global;
use crate::op::{KernelVariant, OpName};
use crate::registry::KernelRegistry;
use ndx_core::{Array, Error, Result, Scalar};
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// Routes operation calls to registered kernels
#[derive(Clone, Debug)]
pub struct Dispatcher {
    registry: Arc<KernelRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<KernelRegistry>) -> Self {
        Self { registry }
    }

    /// Dispatcher over the process-wide registry
    pub fn global() -> Result<Self> {
        global::registry().map(Self::new)
    }

    pub fn registry(&self) -> &KernelRegistry {
        &self.registry
    }

    /// `out = x1 op x2` with broadcasting
    ///
    /// `op` must be an array-array operation. `out` must already have the
    /// broadcast shape of the operands and their promoted dtype.
    #[instrument(skip_all, fields(op = %op))]
    pub fn call_binary<'o>(
        &self,
        op: OpName,
        x1: &Array,
        x2: &Array,
        out: &'o Array,
    ) -> Result<&'o Array> {
        if op.variant() != KernelVariant::ArrayArray {
            return Err(Error::VariantMismatch {
                op: op.as_str().to_string(),
                detail: "array-array dispatch requires an array-array operation".to_string(),
            });
        }

        let device = check_devices(op, &[x1, x2, out])?;
        let kernel = self.registry.lookup_binary(device.backend(), op)?;
        trace!(backend = %device.backend(), kernel = kernel.name(), "resolved kernel");

        let shape = broadcast_shapes(op, x1.shape(), x2.shape())?;
        check_output_shape(op, &shape, out)?;
        check_dtypes(op, x1.dtype(), x2.dtype(), out.dtype())?;
        check_aliasing(op, &[x1, x2], out)?;

        debug!(device = %device, shape = %shape, dtype = %out.dtype(), "dispatching");
        kernel.call(x1, x2, out)?;
        Ok(out)
    }

    /// `out = x1 op scalar`
    ///
    /// Either the array-array name or its array-scalar twin may be passed;
    /// the array-scalar kernel is used. The scalar is cast to `x1`'s dtype
    /// before the kernel sees it.
    #[instrument(skip_all, fields(op = %op))]
    pub fn call_array_scalar<'o>(
        &self,
        op: OpName,
        x1: &Array,
        x2: Scalar,
        out: &'o Array,
    ) -> Result<&'o Array> {
        let op = op.array_scalar();
        let device = check_devices(op, &[x1, out])?;
        let kernel = self.registry.lookup_array_scalar(device.backend(), op)?;
        trace!(backend = %device.backend(), kernel = kernel.name(), "resolved kernel");

        check_output_shape(op, x1.shape(), out)?;
        let dtype = check_scalar_dtypes(op, x1.dtype(), out.dtype())?;
        let scalar = cast_scalar(op, x2, dtype)?;
        check_aliasing(op, &[x1], out)?;

        debug!(device = %device, shape = %out.shape(), dtype = %dtype, scalar = %scalar, "dispatching");
        kernel.call(x1, scalar, out)?;
        Ok(out)
    }

    /// `out = scalar op x2`
    ///
    /// There are no scalar-left kernels. Every registered operation is
    /// commutative, so the array-scalar kernel runs with the operands swapped.
    #[instrument(skip_all, fields(op = %op))]
    pub fn call_scalar_array<'o>(
        &self,
        op: OpName,
        x1: Scalar,
        x2: &Array,
        out: &'o Array,
    ) -> Result<&'o Array> {
        debug_assert!(op.is_commutative(), "{op} cannot swap its operands");
        self.call_array_scalar(op, x2, x1, out)
    }
}
