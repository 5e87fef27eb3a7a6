//! Contiguous N-dimensional tensor storage.
//!
//! One backing `Vec<T>` per tensor plus an explicit shape and row-major
//! stride descriptor. The last axis is the fastest-varying one, so for an
//! image `[width, height, channel]` the channels of one pixel are adjacent.

use std::io::{self, Write};
use std::ops::{Index, IndexMut};

use rayon::prelude::*;

use crate::error::ConvError;

/// Dense row-major tensor of rank `R`.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T, const R: usize> {
    data: Vec<T>,
    shape: [usize; R],
    strides: [usize; R],
}

/// Input image: `[width + k, height + k, nchannels]`.
pub type Image = Tensor<f32, 3>;
/// Kernel bank: `[nkernels, nchannels, k, k]`.
pub type Kernels = Tensor<i16, 4>;
/// Convolution output: `[nkernels, width, height]`.
pub type Output = Tensor<f32, 3>;

fn row_major_strides<const R: usize>(shape: &[usize; R]) -> [usize; R] {
    let mut strides = [0usize; R];
    let mut acc = 1usize;
    for axis in (0..R).rev() {
        strides[axis] = acc;
        acc *= shape[axis];
    }
    strides
}

impl<T: Copy + Default, const R: usize> Tensor<T, R> {
    /// Allocate a tensor with every element set to `T::default()`.
    pub fn zeros(shape: [usize; R]) -> Self {
        let len = shape.iter().product();
        Self {
            data: vec![T::default(); len],
            shape,
            strides: row_major_strides(&shape),
        }
    }
}

impl<T, const R: usize> Tensor<T, R> {
    /// Wrap an existing row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ConvError::ShapeMismatch`] if `data.len()` is not the
    /// product of `shape`.
    pub fn from_vec(shape: [usize; R], data: Vec<T>) -> Result<Self, ConvError> {
        let len: usize = shape.iter().product();
        if data.len() != len {
            return Err(ConvError::ShapeMismatch {
                what: "tensor buffer",
                expected: vec![len],
                actual: vec![data.len()],
            });
        }
        Ok(Self {
            data,
            shape,
            strides: row_major_strides(&shape),
        })
    }

    /// Build a tensor by evaluating `f` at every multi-index, in row-major order.
    pub fn from_fn(shape: [usize; R], mut f: impl FnMut([usize; R]) -> T) -> Self {
        let len: usize = shape.iter().product();
        let strides = row_major_strides(&shape);
        let data = (0..len).map(|flat| f(unravel(flat, &shape, &strides))).collect();
        Self {
            data,
            shape,
            strides,
        }
    }

    /// Overwrite every element with `f(index)`, visiting in row-major order.
    pub fn fill_with(&mut self, mut f: impl FnMut([usize; R]) -> T) {
        let shape = self.shape;
        let strides = self.strides;
        for (flat, slot) in self.data.iter_mut().enumerate() {
            *slot = f(unravel(flat, &shape, &strides));
        }
    }

    pub fn shape(&self) -> [usize; R] {
        self.shape
    }

    pub fn strides(&self) -> [usize; R] {
        self.strides
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat offset of `idx`, or `None` if any coordinate is out of range.
    #[inline]
    pub fn offset(&self, idx: [usize; R]) -> Option<usize> {
        let mut off = 0usize;
        for axis in 0..R {
            if idx[axis] >= self.shape[axis] {
                return None;
            }
            off += idx[axis] * self.strides[axis];
        }
        Some(off)
    }

    pub fn get(&self, idx: [usize; R]) -> Option<&T> {
        self.offset(idx).map(|off| &self.data[off])
    }

    pub fn get_mut(&mut self, idx: [usize; R]) -> Option<&mut T> {
        self.offset(idx).map(|off| &mut self.data[off])
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Number of elements under one outer index.
    pub fn outer_slab_len(&self) -> usize {
        self.strides.first().copied().unwrap_or(1)
    }

    /// Disjoint mutable slabs along axis 0, one per outer index, for
    /// parallel iteration. Each slab is owned by exactly one task.
    ///
    /// # Panics
    ///
    /// Panics if the tensor is empty.
    pub fn par_outer_slabs_mut(&mut self) -> rayon::slice::ChunksExactMut<'_, T>
    where
        T: Send,
    {
        let slab = self.outer_slab_len();
        assert!(slab > 0, "outer slab is empty");
        self.data.par_chunks_exact_mut(slab)
    }

    /// Shared slabs along axis 0, matching [`Self::par_outer_slabs_mut`].
    ///
    /// # Panics
    ///
    /// Panics if the tensor is empty.
    pub fn par_outer_slabs(&self) -> rayon::slice::ChunksExact<'_, T>
    where
        T: Sync,
    {
        let slab = self.outer_slab_len();
        assert!(slab > 0, "outer slab is empty");
        self.data.par_chunks_exact(slab)
    }

    pub fn same_shape<U>(&self, other: &Tensor<U, R>) -> bool {
        self.shape == other.shape
    }
}

fn unravel<const R: usize>(
    mut flat: usize,
    shape: &[usize; R],
    strides: &[usize; R],
) -> [usize; R] {
    let mut idx = [0usize; R];
    for axis in 0..R {
        debug_assert!(shape[axis] > 0, "unravel on empty tensor");
        idx[axis] = flat / strides[axis];
        flat %= strides[axis];
    }
    idx
}

impl<T, const R: usize> Index<[usize; R]> for Tensor<T, R> {
    type Output = T;

    #[inline]
    fn index(&self, idx: [usize; R]) -> &T {
        match self.offset(idx) {
            Some(off) => &self.data[off],
            None => panic!("index {idx:?} out of bounds for shape {:?}", self.shape),
        }
    }
}

impl<T, const R: usize> IndexMut<[usize; R]> for Tensor<T, R> {
    #[inline]
    fn index_mut(&mut self, idx: [usize; R]) -> &mut T {
        match self.offset(idx) {
            Some(off) => &mut self.data[off],
            None => panic!("index {idx:?} out of bounds for shape {:?}", self.shape),
        }
    }
}

/// Write a 3D tensor as text: one block per outer index, one line per
/// middle index, innermost values comma-separated.
pub fn write_tensor3<T: std::fmt::Display, W: Write>(
    out: &mut W,
    tensor: &Tensor<T, 3>,
) -> io::Result<()> {
    let [d0, d1, d2] = tensor.shape();
    for i in 0..d0 {
        writeln!(out, "Outer dimension number {i}")?;
        for j in 0..d1 {
            let row: Vec<String> = (0..d2).map(|k| tensor[[i, j, k]].to_string()).collect();
            writeln!(out, "{}", row.join(", "))?;
        }
    }
    Ok(())
}
