//! Backend registration entry point

use crate::registry::BackendRegistrar;
use ndx_core::{BackendId, Result};

/// A compute backend that contributes kernels to the registry
///
/// `register_kernels` is called exactly once when the backend is loaded
/// into a [`RegistryBuilder`](crate::RegistryBuilder). The registrar is
/// scoped to `backend_id()`, so a backend can only populate its own entries.
///
/// # Implementing a Backend
///
/// ```ignore
/// struct MyBackend;
///
/// impl BackendModule for MyBackend {
///     fn backend_id(&self) -> BackendId {
///         BackendId::from_static("my-device")
///     }
///
///     fn register_kernels(&self, registrar: &mut BackendRegistrar<'_>) -> Result<()> {
///         registrar.register_binary(MyAndKernel)?;
///         registrar.register_array_scalar(MyAndScalarKernel)?;
///         Ok(())
///     }
/// }
/// ```
pub trait BackendModule {
    /// Identity every kernel of this backend is registered under
    fn backend_id(&self) -> BackendId;

    /// Register every kernel this backend implements
    fn register_kernels(&self, registrar: &mut BackendRegistrar<'_>) -> Result<()>;
}
