//! The native backend module

use crate::config::NativeConfig;
use crate::kernels::{
    BitwiseAndKernel, BitwiseAndScalarKernel, BitwiseOrKernel, BitwiseOrScalarKernel,
    BitwiseXorKernel, BitwiseXorScalarKernel,
};
use ndx_core::{BackendId, Result};
use ndx_kernel::{BackendModule, BackendRegistrar};
use tracing::debug;

/// Identity of the native backend; arrays on `native:<n>` dispatch here
pub const NATIVE: BackendId = BackendId::from_static("native");

/// CPU backend providing every bitwise kernel
#[derive(Debug, Clone, Default)]
pub struct NativeBackend {
    config: NativeConfig,
}

impl NativeBackend {
    pub fn new(config: NativeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NativeConfig {
        &self.config
    }
}

impl BackendModule for NativeBackend {
    fn backend_id(&self) -> BackendId {
        NATIVE
    }

    fn register_kernels(&self, registrar: &mut BackendRegistrar<'_>) -> Result<()> {
        debug!(config = ?self.config, "registering native kernels");
        let config = &self.config;
        registrar.register_binary(BitwiseAndKernel::new(config.clone()))?;
        registrar.register_array_scalar(BitwiseAndScalarKernel::new(config.clone()))?;
        registrar.register_binary(BitwiseOrKernel::new(config.clone()))?;
        registrar.register_array_scalar(BitwiseOrScalarKernel::new(config.clone()))?;
        registrar.register_binary(BitwiseXorKernel::new(config.clone()))?;
        registrar.register_array_scalar(BitwiseXorScalarKernel::new(config.clone()))?;
        Ok(())
    }
}
