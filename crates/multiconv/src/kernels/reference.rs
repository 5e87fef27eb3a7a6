//! Reference multichannel convolution.
//!
//! Plain nested loops in the canonical summation order: channel, then kernel
//! row, then kernel column. Slow on purpose; every other variant is judged
//! against this one.

use crate::shape::ConvShape;
use crate::tensor::{Image, Kernels, Output};

/// Scalar reference implementation of the multichannel multi-kernel
/// convolution.
///
/// For every kernel `m` and output cell `(w, h)`:
///
/// `output[m][w][h] = Σ_c Σ_x Σ_y image[w+x][h+y][c] * kernels[m][c][x][y]`
///
/// accumulated in `f64` (each `i16` weight is widened to `f64` before the
/// multiply) and narrowed to `f32` once per cell.
///
/// # Panics
///
/// Panics if any tensor's dimensions disagree with `shape`.
pub fn conv_reference(image: &Image, kernels: &Kernels, shape: &ConvShape, output: &mut Output) {
    shape.assert_matches(image, kernels, output);
    let k = shape.k();

    for m in 0..shape.nkernels {
        for w in 0..shape.width {
            for h in 0..shape.height {
                output[[m, w, h]] = output_cell(image, kernels, shape.nchannels, k, m, w, h);
            }
        }
    }
}

/// Full `(c, x, y)` reduction for one output cell.
fn output_cell(
    image: &Image,
    kernels: &Kernels,
    nchannels: usize,
    k: usize,
    m: usize,
    w: usize,
    h: usize,
) -> f32 {
    let mut sum = 0.0_f64;
    for c in 0..nchannels {
        for x in 0..k {
            for y in 0..k {
                sum += f64::from(image[[w + x, h + y, c]]) * f64::from(kernels[[m, c, x, y]]);
            }
        }
    }
    sum as f32
}
