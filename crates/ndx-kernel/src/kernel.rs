//! Kernel interface traits
//!
//! One trait per operand layout. A backend implements the trait once per
//! operation it supports; the registry owns the resulting trait objects.
//!
//! # Contract
//!
//! - The kernel writes every element of `out` and nothing else.
//! - `out` already has the broadcast shape and result dtype; kernels never
//!   resize or retype it.
//! - Preconditions (shapes, dtypes, devices, aliasing) were validated by the
//!   dispatcher. Kernels do not re-check them.
//! - Scalars arrive already cast to `out.dtype()`.
//! - Backend failures (device errors) are returned as `Error::Kernel` and
//!   reach the caller unchanged.
//!
//! # Implementing a Kernel
//!
//! ```ignore
//! struct MyAnd;
//!
//! impl Kernel for MyAnd {
//!     fn name(&self) -> &'static str {
//!         OpName::BitwiseAnd.as_str()
//!     }
//! }
//!
//! impl BinaryKernel for MyAnd {
//!     fn call(&self, x1: &Array, x2: &Array, out: &Array) -> Result<()> {
//!         // elementwise loop over out's index space
//!         Ok(())
//!     }
//! }
//! ```

use crate::op::KernelVariant;
use ndx_core::{Array, Result, Scalar};
use std::fmt;
use std::sync::Arc;

/// Base trait for all kernels
pub trait Kernel: Send + Sync + 'static {
    /// Name of the operation this kernel implements
    fn name(&self) -> &'static str;
}

/// Array-array kernel: `out = x1 op x2`
pub trait BinaryKernel: Kernel {
    fn call(&self, x1: &Array, x2: &Array, out: &Array) -> Result<()>;
}

/// Array-scalar kernel: `out = x1 op x2` with a scalar right operand
pub trait ArrayScalarKernel: Kernel {
    fn call(&self, x1: &Array, x2: Scalar, out: &Array) -> Result<()>;
}

/// A registered kernel of either variant
#[derive(Clone)]
pub enum KernelSlot {
    Binary(Arc<dyn BinaryKernel>),
    ArrayScalar(Arc<dyn ArrayScalarKernel>),
}

impl KernelSlot {
    pub fn binary(kernel: impl BinaryKernel) -> Self {
        KernelSlot::Binary(Arc::new(kernel))
    }

    pub fn array_scalar(kernel: impl ArrayScalarKernel) -> Self {
        KernelSlot::ArrayScalar(Arc::new(kernel))
    }

    /// Name of the operation the wrapped kernel implements
    pub fn name(&self) -> &'static str {
        match self {
            KernelSlot::Binary(k) => k.name(),
            KernelSlot::ArrayScalar(k) => k.name(),
        }
    }

    pub fn variant(&self) -> KernelVariant {
        match self {
            KernelSlot::Binary(_) => KernelVariant::ArrayArray,
            KernelSlot::ArrayScalar(_) => KernelVariant::ArrayScalar,
        }
    }

    pub fn as_binary(&self) -> Option<&dyn BinaryKernel> {
        match self {
            KernelSlot::Binary(k) => Some(k.as_ref()),
            KernelSlot::ArrayScalar(_) => None,
        }
    }

    pub fn as_array_scalar(&self) -> Option<&dyn ArrayScalarKernel> {
        match self {
            KernelSlot::ArrayScalar(k) => Some(k.as_ref()),
            KernelSlot::Binary(_) => None,
        }
    }
}

impl fmt::Debug for KernelSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelSlot")
            .field("name", &self.name())
            .field("variant", &self.variant())
            .finish()
    }
}
