//! Array handles over shared, dtype-tagged storage
//!
//! An `Array` is a cheap-to-clone view: shared storage plus shape, element
//! strides, and an element offset. Views created by `transpose`, `narrow`
//! and `broadcast_to` share storage with their source, so two arrays can
//! alias. Writers take the storage lock; kernels receive `&Array` and write
//! through it.

use crate::device::Device;
use crate::dtype::Dtype;
use crate::element::{Buffer, Element};
use crate::error::{Error, Result};
use crate::shape::{Shape, StridedOffsets};
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Backing memory shared by every view of an array
#[derive(Debug)]
pub struct Storage {
    buffer: RwLock<Buffer>,
}

impl Storage {
    pub fn new(buffer: Buffer) -> Self {
        Self {
            buffer: RwLock::new(buffer),
        }
    }

    /// Shared access to the buffer
    pub fn read(&self) -> RwLockReadGuard<'_, Buffer> {
        self.buffer.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exclusive access to the buffer
    pub fn write(&self) -> RwLockWriteGuard<'_, Buffer> {
        self.buffer.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// N-dimensional array view
#[derive(Clone, Debug)]
pub struct Array {
    storage: Arc<Storage>,
    shape: Shape,
    strides: Vec<usize>,
    offset: usize,
    dtype: Dtype,
    device: Device,
}

impl Array {
    /// Create a dense array from a buffer
    pub fn from_buffer(buffer: Buffer, shape: impl Into<Shape>, device: Device) -> Result<Self> {
        let shape = shape.into();
        if buffer.len() != shape.size() {
            return Err(Error::size_mismatch(shape.size(), buffer.len(), "array data"));
        }
        Ok(Self {
            dtype: buffer.dtype(),
            strides: shape.contiguous_strides(),
            storage: Arc::new(Storage::new(buffer)),
            shape,
            offset: 0,
            device,
        })
    }

    /// Create a dense array from row-major data
    pub fn from_vec<T: Element>(data: Vec<T>, shape: impl Into<Shape>, device: Device) -> Result<Self> {
        Self::from_buffer(T::into_buffer(data), shape, device)
    }

    pub fn zeros(shape: impl Into<Shape>, dtype: Dtype, device: Device) -> Self {
        let shape = shape.into();
        Self {
            storage: Arc::new(Storage::new(Buffer::zeros(dtype, shape.size()))),
            strides: shape.contiguous_strides(),
            shape,
            offset: 0,
            dtype,
            device,
        }
    }

    pub fn full<T: Element>(shape: impl Into<Shape>, value: T, device: Device) -> Self {
        let shape = shape.into();
        let data = vec![value; shape.size()];
        Self {
            storage: Arc::new(Storage::new(T::into_buffer(data))),
            strides: shape.contiguous_strides(),
            shape,
            offset: 0,
            dtype: T::DTYPE,
            device,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn dtype(&self) -> Dtype {
        self.dtype
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    pub fn size(&self) -> usize {
        self.shape.size()
    }

    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// Row-major with no gaps (size-1 dimensions may carry any stride)
    pub fn is_contiguous(&self) -> bool {
        let expected = self.shape.contiguous_strides();
        self.shape
            .iter()
            .zip(self.strides.iter().zip(&expected))
            .all(|(&dim, (&actual, &dense))| dim <= 1 || actual == dense)
    }

    /// Storage offsets of every element, in row-major order
    pub fn offsets(&self) -> StridedOffsets {
        StridedOffsets::new(&self.shape, &self.strides, self.offset)
    }

    /// Strides that walk this array as if it had `target`'s shape.
    ///
    /// Dimensions are aligned from the right; size-1 and missing leading
    /// dimensions get stride 0. Returns `None` if the shapes are incompatible.
    pub fn broadcast_strides(&self, target: &Shape) -> Option<Vec<usize>> {
        if self.ndim() > target.ndim() {
            return None;
        }
        let lead = target.ndim() - self.ndim();
        let mut strides = vec![0; target.ndim()];
        for (i, (&dim, &stride)) in self.shape.iter().zip(&self.strides).enumerate() {
            let target_dim = target[lead + i];
            strides[lead + i] = if dim == target_dim {
                stride
            } else if dim == 1 {
                0
            } else {
                return None;
            };
        }
        Some(strides)
    }

    /// Read-only broadcast view with the given shape
    pub fn broadcast_to(&self, shape: impl Into<Shape>) -> Result<Self> {
        let shape = shape.into();
        let strides = self.broadcast_strides(&shape).ok_or_else(|| {
            Error::InvalidInput(format!("cannot broadcast {} to {}", self.shape, shape))
        })?;
        Ok(Self {
            storage: Arc::clone(&self.storage),
            shape,
            strides,
            offset: self.offset,
            dtype: self.dtype,
            device: self.device.clone(),
        })
    }

    /// View with the axis order reversed
    pub fn transpose(&self) -> Self {
        let mut dims = self.shape.to_vec();
        dims.reverse();
        let mut strides = self.strides.clone();
        strides.reverse();
        Self {
            storage: Arc::clone(&self.storage),
            shape: Shape::new(dims),
            strides,
            offset: self.offset,
            dtype: self.dtype,
            device: self.device.clone(),
        }
    }

    /// View of `len` entries along `axis` starting at `start`
    pub fn narrow(&self, axis: usize, start: usize, len: usize) -> Result<Self> {
        let dim = *self.shape.get(axis).ok_or_else(|| {
            Error::InvalidInput(format!("axis {axis} out of range for {} dimensions", self.ndim()))
        })?;
        if start + len > dim {
            return Err(Error::InvalidInput(format!(
                "range {start}..{} out of bounds for axis {axis} of size {dim}",
                start + len
            )));
        }
        let mut dims = self.shape.to_vec();
        dims[axis] = len;
        Ok(Self {
            storage: Arc::clone(&self.storage),
            shape: Shape::new(dims),
            strides: self.strides.clone(),
            offset: self.offset + start * self.strides[axis],
            dtype: self.dtype,
            device: self.device.clone(),
        })
    }

    /// Dense copy of this view tagged with another device
    pub fn copy_to(&self, device: Device) -> Self {
        let buffer = gather(&self.storage.read(), self.offsets());
        Self {
            storage: Arc::new(Storage::new(buffer)),
            strides: self.shape.contiguous_strides(),
            shape: self.shape.clone(),
            offset: 0,
            dtype: self.dtype,
            device,
        }
    }

    /// True if both arrays are views of the same storage
    pub fn shares_storage(&self, other: &Array) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }

    /// True if both arrays address exactly the same elements in the same order
    pub fn same_view(&self, other: &Array) -> bool {
        self.shares_storage(other)
            && self.offset == other.offset
            && self.shape == other.shape
            && self.strides == other.strides
    }

    /// Inclusive range of storage offsets touched by this view, `None` if empty
    pub fn memory_span(&self) -> Option<(usize, usize)> {
        if self.size() == 0 {
            return None;
        }
        let last = self
            .shape
            .iter()
            .zip(&self.strides)
            .map(|(&dim, &stride)| (dim - 1) * stride)
            .sum::<usize>();
        Some((self.offset, self.offset + last))
    }

    /// Conservative overlap test: shared storage with intersecting spans
    pub fn may_overlap(&self, other: &Array) -> bool {
        if !self.shares_storage(other) {
            return false;
        }
        match (self.memory_span(), other.memory_span()) {
            (Some((a0, a1)), Some((b0, b1))) => a0 <= b1 && b0 <= a1,
            _ => false,
        }
    }

    /// True if some storage slot is addressed by both views
    ///
    /// Exact, so interleaved views such as two columns of one matrix are
    /// disjoint even though their spans intersect.
    pub fn overlaps(&self, other: &Array) -> bool {
        if !self.may_overlap(other) {
            return false;
        }
        let (small, large) = if self.size() <= other.size() {
            (self, other)
        } else {
            (other, self)
        };
        let slots: HashSet<usize> = small.offsets().collect();
        large.offsets().any(|i| slots.contains(&i))
    }

    /// True if two distinct elements of this view map to the same storage slot
    pub fn has_internal_overlap(&self) -> bool {
        self.shape
            .iter()
            .zip(&self.strides)
            .any(|(&dim, &stride)| dim > 1 && stride == 0)
    }

    /// Copy the elements out in row-major order
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        let buffer = self.storage.read();
        let data = T::slice(&buffer).ok_or_else(|| {
            Error::InvalidInput(format!(
                "array has dtype {}, requested {}",
                self.dtype,
                T::DTYPE
            ))
        })?;
        Ok(self.offsets().map(|i| data[i]).collect())
    }

    /// Clone of the entire backing buffer, including elements outside this view
    pub fn snapshot(&self) -> Buffer {
        self.storage.read().clone()
    }
}

fn gather(buffer: &Buffer, offsets: StridedOffsets) -> Buffer {
    macro_rules! gather_variant {
        ($variant:ident, $data:expr) => {
            Buffer::$variant(offsets.map(|i| $data[i]).collect())
        };
    }
    match buffer {
        Buffer::Bool(v) => gather_variant!(Bool, v),
        Buffer::Int8(v) => gather_variant!(Int8, v),
        Buffer::Int16(v) => gather_variant!(Int16, v),
        Buffer::Int32(v) => gather_variant!(Int32, v),
        Buffer::Int64(v) => gather_variant!(Int64, v),
        Buffer::UInt8(v) => gather_variant!(UInt8, v),
        Buffer::Float32(v) => gather_variant!(Float32, v),
        Buffer::Float64(v) => gather_variant!(Float64, v),
    }
}
