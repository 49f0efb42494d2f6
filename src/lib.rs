//! Multi-backend N-dimensional array operations
//!
//! `ndx` ties the workspace together: array types from `ndx-core`, the
//! kernel registry and dispatcher from `ndx-kernel`, and the native CPU
//! backend from `ndx-native`.
//!
//! # Architecture Overview
//!
//! 1. **Routines** - `bitwise_and`, `bitwise_or_scalar`, ... allocate or take
//!    an output array and call the dispatcher
//! 2. **Dispatcher** - resolves the operands' device, looks up the kernel for
//!    its backend and validates the call
//! 3. **Backends** - register one kernel per supported operation at load time
//!
//! # Example
//!
//! ```rust
//! use ndx::prelude::*;
//!
//! let a = Array::from_vec(vec![true, false, true], [3], Device::default()).unwrap();
//! let b = Array::from_vec(vec![true, true, false], [3], Device::default()).unwrap();
//!
//! let c = ndx::bitwise_and(&a, &b).unwrap();
//! assert_eq!(c.to_vec::<bool>().unwrap(), vec![true, false, false]);
//!
//! let x = Array::from_vec(vec![6i64, 3], [2], Device::default()).unwrap();
//! let y = ndx::bitwise_and_scalar(&x, 2i64).unwrap();
//! assert_eq!(y.to_vec::<i64>().unwrap(), vec![2, 2]);
//! ```

pub mod routines;

pub use routines::*;

// Re-export workspace crates
pub use ndx_core;
pub use ndx_kernel;
pub use ndx_native;

pub use ndx_core::{Array, BackendId, Device, Dtype, Element, Error, Result, Scalar, Shape};
pub use ndx_kernel::{Dispatcher, KernelRegistry, OpName, RegistryBuilder};
pub use ndx_native::{ExecutionStrategy, NativeBackend, NativeConfig};

use ndx_kernel::global;
use std::sync::Arc;
use tracing::info;

/// Registry with the native backend loaded
pub fn native_registry(config: NativeConfig) -> Result<KernelRegistry> {
    let mut builder = RegistryBuilder::new();
    builder.load_backend(&NativeBackend::new(config))?;
    Ok(builder.build())
}

/// Install the default native registry unless a registry is already installed
pub fn init() -> Result<Arc<KernelRegistry>> {
    global::get_or_install(|| native_registry(NativeConfig::default()))
}

/// Replace the process-wide registry with a native one using `config`
pub fn init_with(config: NativeConfig) -> Result<Arc<KernelRegistry>> {
    info!(?config, "initializing native backend");
    global::install(native_registry(config)?);
    global::registry()
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::routines::*;
    pub use crate::{init, init_with};
    pub use ndx_core::{Array, Device, Dtype, Error, Result, Scalar, Shape};
    pub use ndx_kernel::{Dispatcher, OpName};
    pub use ndx_native::{ExecutionStrategy, NativeConfig};
}
