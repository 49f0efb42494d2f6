//! Shared utilities for integration tests

#![allow(dead_code)]

use ndx_core::{Array, BackendId, Buffer, Result, Scalar};
use ndx_kernel::{
    ArrayScalarKernel, BackendModule, BackendRegistrar, BinaryKernel, Kernel, KernelSlot, OpName,
};

/// Set every element of `out` to the bit pattern 1
pub fn fill_ones(out: &Array) {
    let offsets: Vec<usize> = out.offsets().collect();
    let mut buffer = out.storage().write();
    macro_rules! fill {
        ($data:expr, $one:expr) => {
            for i in offsets {
                $data[i] = $one;
            }
        };
    }
    match &mut *buffer {
        Buffer::Bool(v) => fill!(v, true),
        Buffer::Int8(v) => fill!(v, 1),
        Buffer::Int16(v) => fill!(v, 1),
        Buffer::Int32(v) => fill!(v, 1),
        Buffer::Int64(v) => fill!(v, 1),
        Buffer::UInt8(v) => fill!(v, 1),
        Buffer::Float32(v) => fill!(v, 1.0),
        Buffer::Float64(v) => fill!(v, 1.0),
    }
}

/// Kernel that writes ones into its output, whatever the operation
pub struct FillKernel(pub OpName);

impl Kernel for FillKernel {
    fn name(&self) -> &'static str {
        self.0.as_str()
    }
}

impl BinaryKernel for FillKernel {
    fn call(&self, _x1: &Array, _x2: &Array, out: &Array) -> Result<()> {
        fill_ones(out);
        Ok(())
    }
}

impl ArrayScalarKernel for FillKernel {
    fn call(&self, _x1: &Array, _x2: Scalar, out: &Array) -> Result<()> {
        fill_ones(out);
        Ok(())
    }
}

/// Kernel that fails the way a lost device would
pub struct FailingKernel(pub OpName);

impl Kernel for FailingKernel {
    fn name(&self) -> &'static str {
        self.0.as_str()
    }
}

impl BinaryKernel for FailingKernel {
    fn call(&self, _x1: &Array, _x2: &Array, _out: &Array) -> Result<()> {
        Err(anyhow::anyhow!("device lost during {}", self.0).into())
    }
}

/// Slot of the right variant for `op`
pub fn fill_slot(op: OpName) -> KernelSlot {
    match op.variant() {
        ndx_kernel::KernelVariant::ArrayArray => KernelSlot::binary(FillKernel(op)),
        ndx_kernel::KernelVariant::ArrayScalar => KernelSlot::array_scalar(FillKernel(op)),
    }
}

/// Backend registering `FillKernel`s for a fixed set of operations, in order
pub struct FillBackend {
    pub id: &'static str,
    pub ops: Vec<OpName>,
}

impl FillBackend {
    pub fn all(id: &'static str) -> Self {
        Self {
            id,
            ops: OpName::ALL.to_vec(),
        }
    }
}

impl BackendModule for FillBackend {
    fn backend_id(&self) -> BackendId {
        BackendId::from_static(self.id)
    }

    fn register_kernels(&self, registrar: &mut BackendRegistrar<'_>) -> Result<()> {
        for &op in &self.ops {
            registrar.register(op.as_str(), fill_slot(op))?;
        }
        Ok(())
    }
}
