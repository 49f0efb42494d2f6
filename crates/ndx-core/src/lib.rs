//! Core types shared by the ndx kernel crates
//!
//! This crate holds everything the dispatch layer consumes but does not own:
//! the array view type and its storage, dtypes and the promotion table,
//! shapes, devices, scalars, and the unified error type.
//!
//! # Example
//!
//! ```rust
//! use ndx_core::{Array, Device, Dtype, Shape};
//!
//! let a = Array::from_vec(vec![1i32, 2, 3, 4, 5, 6], [2, 3], Device::default()).unwrap();
//! assert_eq!(a.dtype(), Dtype::Int32);
//! assert_eq!(a.transpose().shape(), &Shape::from([3, 2]));
//! assert_eq!(a.transpose().to_vec::<i32>().unwrap(), vec![1, 4, 2, 5, 3, 6]);
//! ```

pub mod array;
pub mod device;
pub mod dtype;
pub mod element;
pub mod error;
pub mod scalar;
pub mod shape;

// Re-export core types
pub use array::{Array, Storage};
pub use device::{BackendId, Device};
pub use dtype::{promote_types, Dtype, DtypeKind};
pub use element::{Buffer, Element, Integral};
pub use error::{Error, Result};
pub use scalar::Scalar;
pub use shape::{Shape, StridedOffsets};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
