//! Configuration for the native backend

use serde::{Deserialize, Serialize};

/// How elementwise loops are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStrategy {
    /// Process elements sequentially
    Sequential,
    /// Split large outputs across the rayon pool
    Parallel,
    /// Parallel once the output reaches the configured threshold
    Auto,
}

impl Default for ExecutionStrategy {
    fn default() -> Self {
        Self::Auto
    }
}

/// Native backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeConfig {
    pub execution: ExecutionStrategy,
    /// Minimum output size for parallel execution under `Auto`
    pub parallel_threshold: usize,
    /// Elements per parallel task
    pub chunk_size: usize,
}

impl NativeConfig {
    pub const DEFAULT_PARALLEL_THRESHOLD: usize = 16 * 1024;
    pub const DEFAULT_CHUNK_SIZE: usize = 4096;

    pub fn sequential() -> Self {
        Self::default().with_execution(ExecutionStrategy::Sequential)
    }

    pub fn with_execution(mut self, execution: ExecutionStrategy) -> Self {
        self.execution = execution;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Whether an output of `len` elements should be split across threads.
    ///
    /// Always `false` without the `parallel` feature.
    pub fn use_parallel(&self, len: usize) -> bool {
        if !cfg!(feature = "parallel") || len == 0 {
            return false;
        }
        match self.execution {
            ExecutionStrategy::Sequential => false,
            ExecutionStrategy::Parallel => true,
            ExecutionStrategy::Auto => len >= self.parallel_threshold,
        }
    }
}

impl Default for NativeConfig {
    fn default() -> Self {
        Self {
            execution: ExecutionStrategy::default(),
            parallel_threshold: Self::DEFAULT_PARALLEL_THRESHOLD,
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }
}
