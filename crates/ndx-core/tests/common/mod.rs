//! Shared utilities for integration tests

use ndx_core::{Array, Device};

/// Shapes covering scalars, empty dimensions and broadcast-friendly sizes
pub fn edge_case_shapes() -> Vec<Vec<usize>> {
    vec![
        vec![],        // Zero-dimensional
        vec![0],       // Empty
        vec![1],       // Single element
        vec![2, 3],    // Small matrix
        vec![1, 1, 1], // All broadcastable
        vec![2, 0, 3], // Empty in the middle
        vec![3, 1, 4], // Mixed
    ]
}

/// Dense int64 array whose values encode their row-major position
pub fn arange_i64(shape: &[usize]) -> Array {
    let size: usize = shape.iter().product();
    Array::from_vec((0..size as i64).collect(), shape.to_vec(), Device::default())
        .expect("size matches shape")
}
