//! Kernel-parallel convolution with per-order row reducers.
//!
//! The kernel index is the only parallel axis: each rayon task owns one
//! kernel's `width x height` output slab and one kernel's `c x k x k` weights,
//! both handed out as disjoint chunks. Every inner loop runs sequentially.

use rayon::prelude::*;
use tracing::debug;

use super::rows::{Order1, Order3, Order3Simd, Order5, Order5Simd, Order7, RowReduce};
use super::Backend;
use crate::shape::{ConvShape, KernelOrder};
use crate::tensor::{Image, Kernels, Output};

/// Optimized multichannel multi-kernel convolution.
///
/// Computes the same function as [`super::conv_reference`], distributing
/// kernels across the ambient rayon pool. Run inside
/// [`rayon::ThreadPool::install`] to bound the worker count.
///
/// The running sum for each output cell is `f64` across the whole
/// `(c, x, y)` reduction; only the association inside one kernel row can
/// differ from the reference.
///
/// # Panics
///
/// Panics if any tensor's dimensions disagree with `shape`.
pub fn conv_optimized(
    image: &Image,
    kernels: &Kernels,
    shape: &ConvShape,
    output: &mut Output,
    backend: Backend,
) {
    shape.assert_matches(image, kernels, output);
    debug!(%shape, %backend, "optimized convolution");

    match (shape.order, backend) {
        (KernelOrder::One, _) => conv_with::<Order1>(image, kernels, shape, output),
        (KernelOrder::Three, Backend::Scalar) => conv_with::<Order3>(image, kernels, shape, output),
        (KernelOrder::Three, Backend::Simd) => {
            conv_with::<Order3Simd>(image, kernels, shape, output);
        }
        (KernelOrder::Five, Backend::Scalar) => conv_with::<Order5>(image, kernels, shape, output),
        (KernelOrder::Five, Backend::Simd) => {
            conv_with::<Order5Simd>(image, kernels, shape, output);
        }
        (KernelOrder::Seven, _) => conv_with::<Order7>(image, kernels, shape, output),
    }
}

fn conv_with<R: RowReduce>(
    image: &Image,
    kernels: &Kernels,
    shape: &ConvShape,
    output: &mut Output,
) {
    debug_assert_eq!(R::ORDER, shape.k());
    output
        .par_outer_slabs_mut()
        .zip(kernels.par_outer_slabs())
        .for_each(|(slab, bank)| kernel_slab::<R>(image, bank, shape, slab));
}

/// Fill one kernel's output slab (`[width][height]`) from its weight bank
/// (`[nchannels][k][k]`).
fn kernel_slab<R: RowReduce>(image: &Image, bank: &[i16], shape: &ConvShape, slab: &mut [f32]) {
    let k = R::ORDER;
    let k2 = k * k;
    let [w_stride, h_stride, c_stride] = image.strides();
    debug_assert_eq!(c_stride, 1);
    let pixels = image.as_slice();

    for w in 0..shape.width {
        let out_row = &mut slab[w * shape.height..(w + 1) * shape.height];
        for (h, cell) in out_row.iter_mut().enumerate() {
            let mut sum = 0.0_f64;
            for c in 0..shape.nchannels {
                let taps = &bank[c * k2..(c + 1) * k2];
                for x in 0..k {
                    let start = (w + x) * w_stride + h * h_stride + c;
                    sum += R::reduce(&pixels[start..], h_stride, &taps[x * k..(x + 1) * k]);
                }
            }
            *cell = sum as f32;
        }
    }
}
