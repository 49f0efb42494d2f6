//! Array shapes and strided index walking

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Ordered sequence of dimension sizes
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape(Vec<usize>);

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Self(dims)
    }

    /// Zero-dimensional shape of a single element
    pub fn scalar() -> Self {
        Self(Vec::new())
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    pub fn ndim(&self) -> usize {
        self.0.len()
    }

    /// Number of elements (1 for a zero-dimensional shape)
    pub fn size(&self) -> usize {
        self.0.iter().product()
    }

    /// Row-major element strides for a dense array of this shape
    pub fn contiguous_strides(&self) -> Vec<usize> {
        let mut strides = vec![0; self.0.len()];
        let mut acc = 1;
        for (stride, &dim) in strides.iter_mut().zip(&self.0).rev() {
            *stride = acc;
            acc *= dim.max(1);
        }
        strides
    }
}

impl Deref for Shape {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Self(dims.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Self(dims.to_vec())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, dim) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{dim}")?;
        }
        if self.0.len() == 1 {
            write!(f, ",")?;
        }
        write!(f, ")")
    }
}

/// Iterator over storage offsets of a strided view, in row-major order
///
/// Dimensions with stride 0 revisit the same storage element, which is how
/// broadcast operands are walked.
#[derive(Clone, Debug)]
pub struct StridedOffsets {
    dims: Vec<usize>,
    strides: Vec<usize>,
    index: Vec<usize>,
    current: usize,
    remaining: usize,
}

impl StridedOffsets {
    pub fn new(dims: &[usize], strides: &[usize], offset: usize) -> Self {
        let total = dims.iter().product();
        Self::range(dims, strides, offset, 0, total)
    }

    /// Walk `len` elements starting at row-major position `start`
    pub fn range(dims: &[usize], strides: &[usize], offset: usize, start: usize, len: usize) -> Self {
        debug_assert_eq!(dims.len(), strides.len());
        let total: usize = dims.iter().product();
        let start = start.min(total);
        let remaining = len.min(total - start);

        let mut index = vec![0; dims.len()];
        let mut current = offset;
        if remaining > 0 {
            let mut rest = start;
            for d in (0..dims.len()).rev() {
                index[d] = rest % dims[d];
                rest /= dims[d];
                current += index[d] * strides[d];
            }
        }

        Self {
            dims: dims.to_vec(),
            strides: strides.to_vec(),
            index,
            current,
            remaining,
        }
    }
}

impl Iterator for StridedOffsets {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let result = self.current;
        self.remaining -= 1;

        for d in (0..self.dims.len()).rev() {
            self.index[d] += 1;
            self.current += self.strides[d];
            if self.index[d] < self.dims[d] {
                break;
            }
            self.current -= self.strides[d] * self.dims[d];
            self.index[d] = 0;
        }
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for StridedOffsets {}
