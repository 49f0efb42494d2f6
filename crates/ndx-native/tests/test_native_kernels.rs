//! Native kernels driven through the dispatcher

use ndx_core::{Array, Device, Dtype, Scalar, Shape};
use ndx_kernel::{Dispatcher, OpName, RegistryBuilder};
use ndx_native::{ExecutionStrategy, NativeBackend, NativeConfig};
use proptest::prelude::*;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn dispatcher(config: NativeConfig) -> Dispatcher {
    let mut builder = RegistryBuilder::new();
    builder.load_backend(&NativeBackend::new(config)).unwrap();
    Dispatcher::new(Arc::new(builder.build()))
}

fn native() -> Device {
    Device::default()
}

fn configs() -> Vec<NativeConfig> {
    vec![
        NativeConfig::sequential(),
        NativeConfig::default()
            .with_execution(ExecutionStrategy::Parallel)
            .with_chunk_size(3),
        NativeConfig::default().with_parallel_threshold(1).with_chunk_size(5),
    ]
}

#[test]
fn test_end_to_end_bool_and() {
    let d = dispatcher(NativeConfig::default());
    let a = Array::from_vec(vec![true, false, true], [3], native()).unwrap();
    let b = Array::from_vec(vec![true, true, false], [3], native()).unwrap();
    let out = Array::zeros([3], Dtype::Bool, native());

    let result = d.call_binary(OpName::BitwiseAnd, &a, &b, &out).unwrap();
    assert_eq!(result.to_vec::<bool>().unwrap(), vec![true, false, false]);
}

#[test]
fn test_broadcast_outer_product() {
    for config in configs() {
        let d = dispatcher(config);
        let col = Array::from_vec(vec![0b0001i32, 0b0010, 0b0100], [3, 1], native()).unwrap();
        let row = Array::from_vec(vec![0b0001i32, 0b0011, 0b0110, 0b1111], [1, 4], native()).unwrap();
        let out = Array::zeros([3, 4], Dtype::Int32, native());

        d.call_binary(OpName::BitwiseOr, &col, &row, &out).unwrap();
        assert_eq!(
            out.to_vec::<i32>().unwrap(),
            vec![1, 3, 7, 15, 3, 3, 6, 15, 5, 7, 6, 15]
        );
    }
}

#[test]
fn test_transposed_input_and_narrowed_output() {
    let d = dispatcher(NativeConfig::sequential());
    let a = Array::from_vec((0..6i64).collect(), [2, 3], native()).unwrap();
    let b = Array::full([3, 2], 1i64, native());

    // Write into the middle rows of a larger buffer
    let backing = Array::full([5, 2], -1i64, native());
    let out = backing.narrow(0, 1, 3).unwrap();
    d.call_binary(OpName::BitwiseXor, &a.transpose(), &b, &out).unwrap();

    assert_eq!(out.to_vec::<i64>().unwrap(), vec![1, 2, 0, 5, 3, 4]);
    assert_eq!(
        backing.to_vec::<i64>().unwrap(),
        vec![-1, -1, 1, 2, 0, 5, 3, 4, -1, -1]
    );
}

#[test]
fn test_in_place_same_view() {
    for config in configs() {
        let d = dispatcher(config);
        let a = Array::from_vec(vec![0b1100u8, 0b1010, 0b0110], [3], native()).unwrap();
        let b = Array::from_vec(vec![0b1010u8, 0b1010, 0b1010], [3], native()).unwrap();

        d.call_binary(OpName::BitwiseAnd, &a, &b, &a).unwrap();
        assert_eq!(a.to_vec::<u8>().unwrap(), vec![0b1000, 0b1010, 0b0010]);

        // Both operands and the output are one view
        d.call_binary(OpName::BitwiseXor, &a, &a, &a).unwrap();
        assert_eq!(a.to_vec::<u8>().unwrap(), vec![0, 0, 0]);

        d.call_array_scalar(OpName::BitwiseOr, &a, Scalar::Int(0b0101), &a).unwrap();
        assert_eq!(a.to_vec::<u8>().unwrap(), vec![5, 5, 5]);
    }
}

#[test]
fn test_in_place_with_broadcast_operand_from_other_storage() {
    let d = dispatcher(NativeConfig::sequential());
    let a = Array::from_vec((0..6i16).collect(), [2, 3], native()).unwrap();
    let mask = Array::from_vec(vec![1i16], [1], native()).unwrap();
    d.call_binary(OpName::BitwiseAnd, &a, &mask, &a).unwrap();
    assert_eq!(a.to_vec::<i16>().unwrap(), vec![0, 1, 0, 1, 0, 1]);
}

#[test]
fn test_disjoint_halves_of_one_buffer() {
    let d = dispatcher(NativeConfig::sequential());
    let buffer = Array::from_vec(vec![1i32, 2, 3, 4, 0, 0], [6], native()).unwrap();
    let low = buffer.narrow(0, 0, 2).unwrap();
    let mid = buffer.narrow(0, 2, 2).unwrap();
    let high = buffer.narrow(0, 4, 2).unwrap();

    d.call_binary(OpName::BitwiseOr, &low, &mid, &high).unwrap();
    assert_eq!(buffer.to_vec::<i32>().unwrap(), vec![1, 2, 3, 4, 3, 6]);
}

#[test]
fn test_scalar_cast_wraps_to_width() {
    let d = dispatcher(NativeConfig::default());
    let a = Array::from_vec(vec![0xffu8, 0x0f], [2], native()).unwrap();
    let out = Array::zeros([2], Dtype::UInt8, native());

    // 0x1f0 wraps to 0xf0 in uint8
    d.call_array_scalar(OpName::BitwiseAnd, &a, Scalar::Int(0x1f0), &out).unwrap();
    assert_eq!(out.to_vec::<u8>().unwrap(), vec![0xf0, 0x00]);

    let flags = Array::from_vec(vec![true, false], [2], native()).unwrap();
    let out = Array::zeros([2], Dtype::Bool, native());
    d.call_scalar_array(OpName::BitwiseXor, Scalar::Bool(true), &flags, &out).unwrap();
    assert_eq!(out.to_vec::<bool>().unwrap(), vec![false, true]);
}

#[test]
fn test_zero_size_and_scalar_shapes() {
    for config in configs() {
        let d = dispatcher(config);
        let a = Array::zeros([2, 0, 3], Dtype::Int32, native());
        let b = Array::zeros([0, 1], Dtype::Int32, native());
        let out = Array::zeros([2, 0, 3], Dtype::Int32, native());
        d.call_binary(OpName::BitwiseAnd, &a, &b, &out).unwrap();
        assert!(out.to_vec::<i32>().unwrap().is_empty());

        let x = Array::full(Shape::scalar(), 12i32, native());
        let y = Array::full(Shape::scalar(), 10i32, native());
        let out = Array::zeros(Shape::scalar(), Dtype::Int32, native());
        d.call_binary(OpName::BitwiseXor, &x, &y, &out).unwrap();
        assert_eq!(out.to_vec::<i32>().unwrap(), vec![6]);
    }
}

#[test]
fn test_crossed_dispatches_do_not_deadlock() {
    let d = dispatcher(NativeConfig::sequential());
    let a = Array::from_vec((0..4096i64).collect(), [4096], native()).unwrap();
    let b = Array::zeros([4096], Dtype::Int64, native());
    let (tx, rx) = mpsc::channel();

    // One thread writes b from a while the other writes a from b
    for (src, dst) in [(a.clone(), b.clone()), (b.clone(), a.clone())] {
        let d = d.clone();
        let tx = tx.clone();
        thread::spawn(move || {
            for _ in 0..2_000 {
                d.call_binary(OpName::BitwiseOr, &src, &src, &dst).unwrap();
            }
            tx.send(()).unwrap();
        });
    }
    for _ in 0..2 {
        rx.recv_timeout(Duration::from_secs(30))
            .expect("crossed dispatches finished");
    }
}

#[test]
fn test_interleaved_columns_of_one_matrix() {
    let d = dispatcher(NativeConfig::sequential());
    let m = Array::from_vec(vec![1i32, 0, 2, 0, 4, 0], [3, 2], native()).unwrap();
    let left = m.narrow(1, 0, 1).unwrap();
    let right = m.narrow(1, 1, 1).unwrap();
    let mask = Array::full([3, 1], 8i32, native());

    d.call_binary(OpName::BitwiseOr, &left, &mask, &right).unwrap();
    assert_eq!(m.to_vec::<i32>().unwrap(), vec![1, 9, 2, 10, 4, 12]);
}

#[test]
fn test_mixed_dtype_column_of_a_wide_buffer() {
    let d = dispatcher(NativeConfig::sequential());
    let wide = Array::from_vec((0..40i8).collect(), [4, 10], native()).unwrap();
    let column = wide.narrow(1, 3, 1).unwrap();
    let row = Array::from_vec(vec![0x100i32, 0x200], [1, 2], native()).unwrap();
    let out = Array::zeros([4, 2], Dtype::Int32, native());

    d.call_binary(OpName::BitwiseXor, &column, &row, &out).unwrap();
    assert_eq!(
        out.to_vec::<i32>().unwrap(),
        vec![0x103, 0x203, 0x10d, 0x20d, 0x117, 0x217, 0x121, 0x221]
    );
}

fn naive_broadcast(values: &[i32], shape: &[usize], target: &[usize]) -> Vec<i32> {
    let lead = target.len() - shape.len();
    let size: usize = target.iter().product();
    (0..size)
        .map(|flat| {
            let mut rest = flat;
            let mut index = vec![0; target.len()];
            for d in (0..target.len()).rev() {
                index[d] = rest % target[d];
                rest /= target[d];
            }
            let mut src = 0;
            for (d, &dim) in shape.iter().enumerate() {
                let i = if dim == 1 { 0 } else { index[lead + d] };
                src = src * dim + i;
            }
            values[src]
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_matches_naive_reference(
        dims in proptest::collection::vec(1usize..5, 1..4),
        mask in proptest::collection::vec(any::<bool>(), 4),
        seed in any::<i32>(),
        parallel in any::<bool>(),
    ) {
        let reduced: Vec<usize> = dims
            .iter()
            .zip(&mask)
            .map(|(&d, &one)| if one { 1 } else { d })
            .collect();
        let full_size: usize = dims.iter().product();
        let reduced_size: usize = reduced.iter().product();
        let a_values: Vec<i32> = (0..full_size as i32).map(|i| i.wrapping_mul(seed)).collect();
        let b_values: Vec<i32> = (0..reduced_size as i32).map(|i| seed.rotate_left(i as u32)).collect();

        let config = if parallel {
            NativeConfig::default().with_execution(ExecutionStrategy::Parallel).with_chunk_size(7)
        } else {
            NativeConfig::sequential()
        };
        let d = dispatcher(config);
        let a = Array::from_vec(a_values.clone(), dims.clone(), native()).unwrap();
        let b = Array::from_vec(b_values.clone(), reduced.clone(), native()).unwrap();
        let out = Array::zeros(dims.clone(), Dtype::Int32, native());

        let b_full = naive_broadcast(&b_values, &reduced, &dims);
        let expected: Vec<i32> = a_values.iter().zip(&b_full).map(|(x, y)| x ^ y).collect();

        d.call_binary(OpName::BitwiseXor, &a, &b, &out).unwrap();
        prop_assert_eq!(out.to_vec::<i32>().unwrap(), expected);
    }
}
