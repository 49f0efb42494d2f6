//! Error types for kernel dispatch
//!
//! Provides a unified error type for all ndx crates. Every variant that can
//! be raised while dispatching an operation carries the operation name so
//! failures stay attributable.

use thiserror::Error;

/// Core error type for ndx operations
#[derive(Error, Debug)]
pub enum Error {
    /// No kernel is registered for the operation on the given backend
    #[error("Kernel not found: no '{op}' kernel registered for backend '{backend}'")]
    KernelNotFound { backend: String, op: String },

    /// A kernel was registered twice for the same (backend, operation) pair
    #[error("Duplicate registration: backend '{backend}' already has a '{op}' kernel")]
    DuplicateRegistration { backend: String, op: String },

    /// Operand shapes cannot be broadcast, or the output has the wrong shape
    #[error("Shape mismatch in {op}: {detail}")]
    ShapeMismatch { op: String, detail: String },

    /// Operand or output dtypes are not valid for the operation
    #[error("Dtype error in {op}: {detail}")]
    Dtype { op: String, detail: String },

    /// The output overlaps an input in a way the operation cannot tolerate
    #[error("Aliasing error in {op}: {detail}")]
    Aliasing { op: String, detail: String },

    /// Operands live on different devices
    #[error("Device mismatch in {op}: {detail}")]
    DeviceMismatch { op: String, detail: String },

    /// The operation name is not part of the known operation set
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    /// A kernel was registered under a name other than the one it implements
    #[error("Kernel name mismatch: registered as '{expected}' but kernel implements '{actual}'")]
    KernelNameMismatch { expected: String, actual: String },

    /// A kernel of the wrong variant (array-array vs array-scalar) was supplied
    #[error("Variant mismatch in {op}: {detail}")]
    VariantMismatch { op: String, detail: String },

    /// The process-wide registry has not been installed yet
    #[error("Kernel registry not initialized")]
    NotInitialized,

    /// Invalid input data outside of a dispatched operation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Failure raised inside a kernel (device errors and the like)
    #[error("Kernel error: {0}")]
    Kernel(#[from] anyhow::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

// Helper functions for common error patterns

impl Error {
    /// Create a kernel-not-found error
    pub fn kernel_not_found(backend: impl Into<String>, op: impl Into<String>) -> Self {
        Self::KernelNotFound {
            backend: backend.into(),
            op: op.into(),
        }
    }

    /// Create a duplicate registration error
    pub fn duplicate_registration(backend: impl Into<String>, op: impl Into<String>) -> Self {
        Self::DuplicateRegistration {
            backend: backend.into(),
            op: op.into(),
        }
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch(op: &str, detail: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            op: op.to_string(),
            detail: detail.into(),
        }
    }

    /// Create a dtype error
    pub fn dtype(op: &str, detail: impl Into<String>) -> Self {
        Self::Dtype {
            op: op.to_string(),
            detail: detail.into(),
        }
    }

    /// Create an aliasing error
    pub fn aliasing(op: &str, detail: impl Into<String>) -> Self {
        Self::Aliasing {
            op: op.to_string(),
            detail: detail.into(),
        }
    }

    /// Create a device mismatch error
    pub fn device_mismatch(op: &str, detail: impl Into<String>) -> Self {
        Self::DeviceMismatch {
            op: op.to_string(),
            detail: detail.into(),
        }
    }

    /// Create an error for size mismatch
    pub fn size_mismatch(expected: usize, actual: usize, context: &str) -> Self {
        Self::InvalidInput(format!(
            "Size mismatch in {context}: expected {expected}, got {actual}"
        ))
    }

    /// Whether this error was caused by how the caller invoked an operation,
    /// as opposed to backend configuration or kernel failures
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::ShapeMismatch { .. }
                | Self::Dtype { .. }
                | Self::Aliasing { .. }
                | Self::DeviceMismatch { .. }
        )
    }
}
