//! Native CPU backend
//!
//! Registers a kernel for every bitwise operation under the `"native"`
//! backend. Loops are strided, so any view works as an input, and compute
//! in the output element type.
//!
//! With the `parallel` feature, large contiguous outputs that do not alias
//! an input are split across the rayon pool according to [`NativeConfig`].
//!
//! # Example
//!
//! ```rust
//! use ndx_kernel::{Dispatcher, OpName, RegistryBuilder};
//! use ndx_native::NativeBackend;
//! use ndx_core::{Array, Device, Dtype, Scalar};
//! use std::sync::Arc;
//!
//! let mut builder = RegistryBuilder::new();
//! builder.load_backend(&NativeBackend::default()).unwrap();
//! let dispatcher = Dispatcher::new(Arc::new(builder.build()));
//!
//! let a = Array::from_vec(vec![6i32, 3], [2], Device::default()).unwrap();
//! let out = Array::zeros([2], Dtype::Int32, Device::default());
//! dispatcher.call_array_scalar(OpName::BitwiseAnd, &a, Scalar::Int(2), &out).unwrap();
//! assert_eq!(out.to_vec::<i32>().unwrap(), vec![2, 2]);
//! ```

pub mod backend;
pub mod config;
pub mod kernels;

pub use backend::{NativeBackend, NATIVE};
pub use config::{ExecutionStrategy, NativeConfig};
pub use kernels::{
    BitwiseAndKernel, BitwiseAndScalarKernel, BitwiseOrKernel, BitwiseOrScalarKernel,
    BitwiseXorKernel, BitwiseXorScalarKernel,
};
