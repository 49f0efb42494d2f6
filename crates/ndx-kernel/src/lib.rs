//! Kernel identities, registry and dispatch
//!
//! This crate is the seam between operator routines and backend code.
//!
//! # Architecture Overview
//!
//! 1. **Operation identity** (`op`) - a closed enum of operation variants,
//!    each with one stable string name used as the registry key
//! 2. **Kernel interface** (`kernel`) - one trait per operand layout
//! 3. **Registry** (`registry`, `backend`, `global`) - backends register
//!    kernels into a builder; the frozen registry is read without locks
//! 4. **Contract checks** (`check`) - broadcasting, dtype, device and
//!    aliasing rules shared by every kernel
//! 5. **Dispatcher** (`dispatch`) - device resolution, lookup, validation,
//!    kernel call
//!
//! # Example
//!
//! ```rust
//! use ndx_kernel::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = RegistryBuilder::new().build();
//! let dispatcher = Dispatcher::new(Arc::new(registry));
//!
//! let a = Array::from_vec(vec![true, false], [2], Device::default()).unwrap();
//! let err = dispatcher.call_binary(OpName::BitwiseAnd, &a, &a, &a).unwrap_err();
//! assert!(matches!(err, Error::KernelNotFound { .. }));
//! ```

pub mod backend;
pub mod check;
pub mod dispatch;
pub mod global;
pub mod kernel;
pub mod op;
pub mod registry;

pub use backend::BackendModule;
pub use check::{
    broadcast_shapes, cast_scalar, check_aliasing, check_devices, check_dtypes,
    check_output_shape, check_scalar_dtypes,
};
pub use dispatch::Dispatcher;
pub use kernel::{ArrayScalarKernel, BinaryKernel, Kernel, KernelSlot};
pub use op::{KernelVariant, OpFamily, OpName};
pub use registry::{BackendRegistrar, KernelRegistry, RegistryBuilder};

pub use ndx_core::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        ArrayScalarKernel, BackendModule, BackendRegistrar, BinaryKernel, Dispatcher, Kernel,
        KernelRegistry, KernelSlot, OpName, RegistryBuilder,
    };
    pub use ndx_core::{Array, BackendId, Device, Dtype, Error, Result, Scalar, Shape};
}
