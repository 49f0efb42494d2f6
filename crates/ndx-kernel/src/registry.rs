//! Kernel registry
//!
//! The registry maps `(backend, operation name)` to one owned kernel. Its
//! lifecycle has two phases that are separate types:
//!
//! 1. [`RegistryBuilder`] is the write phase. Backends are loaded and every
//!    registration is validated (known name, matching kernel name and
//!    variant, no duplicates).
//! 2. [`KernelRegistry`] is the read phase. It is immutable and lookups
//!    take no lock.
//!
//! Reopening a built registry goes through [`KernelRegistry::into_builder`].
//!
//! # Example
//!
//! ```ignore
//! let mut builder = RegistryBuilder::new();
//! builder.load_backend(&NativeBackend::default())?;
//! let registry = builder.build();
//!
//! let kernel = registry.lookup(&"native".into(), "BitwiseAnd")?;
//! assert_eq!(kernel.name(), "BitwiseAnd");
//! ```

use crate::backend::BackendModule;
use crate::kernel::{ArrayScalarKernel, BinaryKernel, KernelSlot};
use crate::op::OpName;
use ndx_core::{BackendId, Error, Result};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

type BackendTable = HashMap<String, KernelSlot>;

/// Check that `slot` may be registered under `op_name`
fn validate(op_name: &str, slot: &KernelSlot) -> Result<()> {
    let op: OpName = op_name.parse()?;
    if slot.name() != op_name {
        return Err(Error::KernelNameMismatch {
            expected: op_name.to_string(),
            actual: slot.name().to_string(),
        });
    }
    if slot.variant() != op.variant() {
        return Err(Error::VariantMismatch {
            op: op_name.to_string(),
            detail: format!("expected {:?} kernel, got {:?}", op.variant(), slot.variant()),
        });
    }
    Ok(())
}

/// Mutable registry used while backends are being loaded
#[derive(Clone, Default)]
pub struct RegistryBuilder {
    kernels: HashMap<BackendId, BackendTable>,
}

impl RegistryBuilder {
    /// Creates an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a kernel under `(backend, op_name)`.
    ///
    /// Fails with `DuplicateRegistration` if the pair is already taken; the
    /// existing kernel stays registered.
    pub fn register(
        &mut self,
        backend: impl Into<BackendId>,
        op_name: &str,
        slot: KernelSlot,
    ) -> Result<()> {
        let backend = backend.into();
        validate(op_name, &slot)?;

        let table = self.kernels.entry(backend.clone()).or_default();
        if table.contains_key(op_name) {
            warn!(backend = %backend, op = op_name, "duplicate kernel registration rejected");
            return Err(Error::duplicate_registration(backend.as_str(), op_name));
        }
        debug!(backend = %backend, op = op_name, "registered kernel");
        table.insert(op_name.to_string(), slot);
        Ok(())
    }

    /// Register an array-array kernel under its own name
    pub fn register_binary(
        &mut self,
        backend: impl Into<BackendId>,
        kernel: impl BinaryKernel,
    ) -> Result<()> {
        let slot = KernelSlot::binary(kernel);
        self.register(backend, slot.name(), slot)
    }

    /// Register an array-scalar kernel under its own name
    pub fn register_array_scalar(
        &mut self,
        backend: impl Into<BackendId>,
        kernel: impl ArrayScalarKernel,
    ) -> Result<()> {
        let slot = KernelSlot::array_scalar(kernel);
        self.register(backend, slot.name(), slot)
    }

    /// Load every kernel a backend provides.
    ///
    /// The load is all-or-nothing: if any registration fails, none of the
    /// backend's new kernels are kept and the error is returned.
    pub fn load_backend(&mut self, module: &dyn BackendModule) -> Result<()> {
        let backend = module.backend_id();
        let existing = self.kernels.get(&backend);
        let mut registrar = BackendRegistrar {
            backend: backend.clone(),
            existing,
            staged: HashMap::new(),
        };
        module.register_kernels(&mut registrar)?;

        let staged = registrar.staged;
        let count = staged.len();
        self.kernels.entry(backend.clone()).or_default().extend(staged);
        info!(backend = %backend, kernels = count, "loaded backend");
        Ok(())
    }

    /// Number of registered kernels across all backends
    pub fn len(&self) -> usize {
        self.kernels.values().map(HashMap::len).sum()
    }

    /// Returns `true` if nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freeze into a read-only registry
    pub fn build(self) -> KernelRegistry {
        KernelRegistry {
            kernels: self.kernels,
        }
    }
}

impl fmt::Debug for RegistryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("kernels", &self.len())
            .finish()
    }
}

/// Registration handle scoped to a single backend
///
/// Handed to [`BackendModule::register_kernels`]. Registrations are staged
/// and only merged into the builder once the backend finished without error.
pub struct BackendRegistrar<'a> {
    backend: BackendId,
    existing: Option<&'a BackendTable>,
    staged: BackendTable,
}

impl BackendRegistrar<'_> {
    /// The backend this registrar registers under
    pub fn backend_id(&self) -> &BackendId {
        &self.backend
    }

    /// Register a kernel under `op_name`
    pub fn register(&mut self, op_name: &str, slot: KernelSlot) -> Result<()> {
        validate(op_name, &slot)?;
        let taken = self.staged.contains_key(op_name)
            || self.existing.is_some_and(|table| table.contains_key(op_name));
        if taken {
            warn!(backend = %self.backend, op = op_name, "duplicate kernel registration rejected");
            return Err(Error::duplicate_registration(self.backend.as_str(), op_name));
        }
        self.staged.insert(op_name.to_string(), slot);
        Ok(())
    }

    pub fn register_binary(&mut self, kernel: impl BinaryKernel) -> Result<()> {
        let slot = KernelSlot::binary(kernel);
        self.register(slot.name(), slot)
    }

    pub fn register_array_scalar(&mut self, kernel: impl ArrayScalarKernel) -> Result<()> {
        let slot = KernelSlot::array_scalar(kernel);
        self.register(slot.name(), slot)
    }
}

/// Read-only mapping from `(backend, operation)` to kernel
pub struct KernelRegistry {
    kernels: HashMap<BackendId, BackendTable>,
}

impl KernelRegistry {
    /// Creates an empty registry
    pub fn empty() -> Self {
        Self {
            kernels: HashMap::new(),
        }
    }

    /// Look up the kernel registered for `op_name` on `backend`
    pub fn lookup(&self, backend: &BackendId, op_name: &str) -> Result<&KernelSlot> {
        self.kernels
            .get(backend)
            .and_then(|table| table.get(op_name))
            .ok_or_else(|| Error::kernel_not_found(backend.as_str(), op_name))
    }

    /// Look up an array-array kernel
    pub fn lookup_binary(&self, backend: &BackendId, op: OpName) -> Result<&dyn BinaryKernel> {
        self.lookup(backend, op.as_str())?
            .as_binary()
            .ok_or_else(|| Error::kernel_not_found(backend.as_str(), op.as_str()))
    }

    /// Look up an array-scalar kernel
    pub fn lookup_array_scalar(
        &self,
        backend: &BackendId,
        op: OpName,
    ) -> Result<&dyn ArrayScalarKernel> {
        self.lookup(backend, op.as_str())?
            .as_array_scalar()
            .ok_or_else(|| Error::kernel_not_found(backend.as_str(), op.as_str()))
    }

    /// Returns `true` if `backend` has a kernel for `op_name`
    pub fn contains(&self, backend: &BackendId, op_name: &str) -> bool {
        self.lookup(backend, op_name).is_ok()
    }

    /// Returns `true` if `backend` registered at least one kernel
    pub fn has_backend(&self, backend: &BackendId) -> bool {
        self.kernels.get(backend).is_some_and(|table| !table.is_empty())
    }

    /// Registered backends, sorted
    pub fn backends(&self) -> Vec<&BackendId> {
        let mut backends: Vec<_> = self
            .kernels
            .iter()
            .filter(|(_, table)| !table.is_empty())
            .map(|(backend, _)| backend)
            .collect();
        backends.sort();
        backends
    }

    /// Operation names registered for `backend`, sorted
    pub fn operations(&self, backend: &BackendId) -> Vec<&str> {
        let mut ops: Vec<&str> = self
            .kernels
            .get(backend)
            .map(|table| table.keys().map(String::as_str).collect())
            .unwrap_or_default();
        ops.sort_unstable();
        ops
    }

    /// Number of registered kernels across all backends
    pub fn len(&self) -> usize {
        self.kernels.values().map(HashMap::len).sum()
    }

    /// Returns `true` if no kernels are registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reopen for registration
    pub fn into_builder(self) -> RegistryBuilder {
        RegistryBuilder {
            kernels: self.kernels,
        }
    }
}

impl Default for KernelRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for KernelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for backend in self.backends() {
            map.entry(&backend.as_str(), &self.operations(backend));
        }
        map.finish()
    }
}
