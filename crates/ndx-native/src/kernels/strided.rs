//! Strided elementwise loops
//!
//! The loops walk the output in row-major order and read each input through
//! its broadcast strides, so views (transposed, narrowed, broadcast) are
//! handled without copying. An input whose dtype differs from the output is
//! gathered once into a dense `Vec` of the output type, covering only the
//! elements the view visits; everything is computed in the output type.
//!
//! An input that shares storage with the output is read from the output
//! buffer under the same write lock. The dispatcher only lets that happen
//! for the exact same view or for disjoint elements, so every element is
//! read before it is overwritten.
//!
//! Storage locks are taken in address order, whichever storage is the
//! output, so two kernels never wait on each other's locks in a cycle.

use crate::config::NativeConfig;
use anyhow::anyhow;
use ndx_core::{Array, Buffer, Element, Integral, Result, Shape, Storage, StridedOffsets};
use std::sync::{Arc, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

/// Read lock on an input storage, keyed by the storage address
type ReadLock<'a> = (*const Storage, RwLockReadGuard<'a, Buffer>);

/// Lock the output storage for writing and every other distinct storage
/// among `inputs` for reading
fn lock_storages<'a>(
    out: &'a Array,
    inputs: &[&'a Array],
) -> (RwLockWriteGuard<'a, Buffer>, Vec<ReadLock<'a>>) {
    let out_ptr = Arc::as_ptr(out.storage());
    let mut storages: Vec<&'a Arc<Storage>> = inputs
        .iter()
        .map(|&a| a.storage())
        .filter(|s| Arc::as_ptr(*s) != out_ptr)
        .collect();
    storages.sort_by_key(|s| Arc::as_ptr(*s));
    storages.dedup_by_key(|s| Arc::as_ptr(*s));

    let split = storages.partition_point(|s| Arc::as_ptr(*s) < out_ptr);
    let mut reads = Vec::with_capacity(storages.len());
    for &storage in &storages[..split] {
        reads.push((Arc::as_ptr(storage), storage.read()));
    }
    let output = out.storage().write();
    for &storage in &storages[split..] {
        reads.push((Arc::as_ptr(storage), storage.read()));
    }
    (output, reads)
}

/// The read-locked buffer behind `array`, `None` if it is the output's
fn locked_input<'r, 'g>(reads: &'r [ReadLock<'g>], array: &Array) -> Option<&'r Buffer> {
    let ptr = Arc::as_ptr(array.storage());
    reads
        .iter()
        .find(|(p, _)| *p == ptr)
        .map(|(_, guard)| &**guard)
}

/// Read-only elements of an input that does not alias the output
enum Input<'a, T> {
    Borrowed(&'a [T]),
    Converted(Vec<T>),
}

impl<T: Integral> Input<'_, T> {
    #[inline]
    fn get(&self, i: usize) -> T {
        match self {
            Input::Borrowed(data) => data[i],
            Input::Converted(data) => data[i],
        }
    }
}

/// Where an operand is read from
enum Source<'a, T> {
    /// The output buffer itself
    Output,
    Input(Input<'a, T>),
}

/// One input with the strides and offset that walk it over the output shape
struct Operand<'a, T> {
    source: Source<'a, T>,
    strides: Vec<usize>,
    offset: usize,
}

impl<'a, T: Integral> Operand<'a, T> {
    fn new(array: &Array, out: &Array, buffer: Option<&'a Buffer>) -> Result<Self> {
        let strides = input_strides(array, out)?;
        let buffer = match buffer {
            Some(buffer) => buffer,
            None => {
                return Ok(Self {
                    source: Source::Output,
                    strides,
                    offset: array.offset(),
                })
            }
        };
        if let Some(data) = T::slice(buffer) {
            return Ok(Self {
                source: Source::Input(Input::Borrowed(data)),
                strides,
                offset: array.offset(),
            });
        }
        let data = convert(buffer, array.offsets())?;
        Ok(Self {
            source: Source::Input(Input::Converted(data)),
            strides: dense_strides(array, out.shape()),
            offset: 0,
        })
    }

    #[cfg(feature = "parallel")]
    fn input(&self) -> Option<&Input<'a, T>> {
        match &self.source {
            Source::Output => None,
            Source::Input(input) => Some(input),
        }
    }

    #[inline]
    fn get(&self, output: &[T], i: usize) -> T {
        match &self.source {
            Source::Output => output[i],
            Source::Input(input) => input.get(i),
        }
    }

    fn offsets(&self, dims: &[usize]) -> StridedOffsets {
        StridedOffsets::new(dims, &self.strides, self.offset)
    }

    #[cfg(feature = "parallel")]
    fn range(&self, dims: &[usize], start: usize, len: usize) -> StridedOffsets {
        StridedOffsets::range(dims, &self.strides, self.offset, start, len)
    }
}

/// Gather the elements at `offsets` into `T` by bit pattern
fn convert<T: Integral>(buffer: &Buffer, offsets: StridedOffsets) -> Result<Vec<T>> {
    macro_rules! convert_bits {
        ($data:expr) => {
            Ok(offsets.map(|i| T::from_i64_bits($data[i].to_i64_bits())).collect())
        };
    }
    match buffer {
        Buffer::Bool(v) => convert_bits!(v),
        Buffer::Int8(v) => convert_bits!(v),
        Buffer::Int16(v) => convert_bits!(v),
        Buffer::Int32(v) => convert_bits!(v),
        Buffer::Int64(v) => convert_bits!(v),
        Buffer::UInt8(v) => convert_bits!(v),
        Buffer::Float32(_) | Buffer::Float64(_) => Err(anyhow!(
            "{} operand cannot be read as {}",
            buffer.dtype(),
            T::DTYPE
        )
        .into()),
    }
}

/// Broadcast strides of a dense row-major copy of `input`
fn dense_strides(input: &Array, target: &Shape) -> Vec<usize> {
    let dense = input.shape().contiguous_strides();
    let lead = target.ndim() - input.ndim();
    let mut strides = vec![0; target.ndim()];
    for (i, (&dim, &stride)) in input.shape().iter().zip(&dense).enumerate() {
        if dim != 1 {
            strides[lead + i] = stride;
        }
    }
    strides
}

fn input_strides(input: &Array, out: &Array) -> Result<Vec<usize>> {
    input.broadcast_strides(out.shape()).ok_or_else(|| {
        anyhow!("operand of shape {} does not broadcast to {}", input.shape(), out.shape()).into()
    })
}

fn output_slice<T: Element>(buffer: &mut Buffer) -> Result<&mut [T]> {
    let dtype = buffer.dtype();
    T::slice_mut(buffer)
        .ok_or_else(|| anyhow!("output buffer holds {dtype}, kernel computes {}", T::DTYPE).into())
}

/// `out[i] = f(x1[i], x2[i])` over the broadcast index space of `out`
pub(crate) fn binary<T, F>(
    config: &NativeConfig,
    x1: &Array,
    x2: &Array,
    out: &Array,
    f: F,
) -> Result<()>
where
    T: Integral,
    F: Fn(T, T) -> T + Send + Sync,
{
    let dims = out.shape().dims();
    let (mut out_guard, reads) = lock_storages(out, &[x1, x2]);
    let op1 = Operand::<T>::new(x1, out, locked_input(&reads, x1))?;
    let op2 = Operand::<T>::new(x2, out, locked_input(&reads, x2))?;

    let data = output_slice::<T>(&mut out_guard)?;
    let len = out.size();

    #[cfg(feature = "parallel")]
    if let (Some(in1), Some(in2)) = (op1.input(), op2.input()) {
        if config.use_parallel(len) && out.is_contiguous() {
            use rayon::prelude::*;

            trace!(len, chunk = config.chunk_size, "parallel binary loop");
            let chunk = config.chunk_size.max(1);
            let region = &mut data[out.offset()..out.offset() + len];
            region.par_chunks_mut(chunk).enumerate().for_each(|(c, block)| {
                let start = c * chunk;
                let offsets1 = op1.range(dims, start, block.len());
                let offsets2 = op2.range(dims, start, block.len());
                for ((slot, i1), i2) in block.iter_mut().zip(offsets1).zip(offsets2) {
                    *slot = f(in1.get(i1), in2.get(i2));
                }
            });
            return Ok(());
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = config;

    trace!(len, "sequential binary loop");
    for ((o, i1), i2) in out.offsets().zip(op1.offsets(dims)).zip(op2.offsets(dims)) {
        let value = f(op1.get(data, i1), op2.get(data, i2));
        data[o] = value;
    }
    Ok(())
}

/// `out[i] = f(x1[i], value)` over the index space of `out`
pub(crate) fn array_scalar<T, F>(
    config: &NativeConfig,
    x1: &Array,
    value: T,
    out: &Array,
    f: F,
) -> Result<()>
where
    T: Integral,
    F: Fn(T, T) -> T + Send + Sync,
{
    let dims = out.shape().dims();
    let (mut out_guard, reads) = lock_storages(out, &[x1]);
    let op1 = Operand::<T>::new(x1, out, locked_input(&reads, x1))?;

    let data = output_slice::<T>(&mut out_guard)?;
    let len = out.size();

    #[cfg(feature = "parallel")]
    if let Some(in1) = op1.input() {
        if config.use_parallel(len) && out.is_contiguous() {
            use rayon::prelude::*;

            trace!(len, chunk = config.chunk_size, "parallel array-scalar loop");
            let chunk = config.chunk_size.max(1);
            let region = &mut data[out.offset()..out.offset() + len];
            region.par_chunks_mut(chunk).enumerate().for_each(|(c, block)| {
                let offsets1 = op1.range(dims, c * chunk, block.len());
                for (slot, i1) in block.iter_mut().zip(offsets1) {
                    *slot = f(in1.get(i1), value);
                }
            });
            return Ok(());
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = config;

    trace!(len, "sequential array-scalar loop");
    for (o, i1) in out.offsets().zip(op1.offsets(dims)) {
        let result = f(op1.get(data, i1), value);
        data[o] = result;
    }
    Ok(())
}
