//! Shared utilities for integration tests

#![allow(dead_code)]

use ndx::{Array, Device, Element};

/// Install a test subscriber honouring `RUST_LOG`; repeated calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Dense array on `native:0`
pub fn array<T: Element>(data: Vec<T>, shape: &[usize]) -> Array {
    Array::from_vec(data, shape.to_vec(), Device::default()).expect("size matches shape")
}

/// Dense array on another device
pub fn array_on<T: Element>(data: Vec<T>, shape: &[usize], device: &str) -> Array {
    let device: Device = device.parse().expect("valid device");
    Array::from_vec(data, shape.to_vec(), device).expect("size matches shape")
}

/// Shapes covering scalars, empty dimensions and broadcasting
pub fn edge_case_shapes() -> Vec<Vec<usize>> {
    vec![
        vec![],        // Zero-dimensional
        vec![0],       // Empty
        vec![1],       // Single element
        vec![2, 3],    // Small matrix
        vec![2, 0, 3], // Empty in the middle
    ]
}
