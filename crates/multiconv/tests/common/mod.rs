//! Shared helpers for the convolution falsification tests.

#![allow(dead_code)]

use multiconv::kernels::{conv_optimized, conv_reference, Backend};
use multiconv::populate::random_inputs;
use multiconv::shape::ConvShape;
use multiconv::tensor::{Image, Kernels, Output};

/// Every supported kernel order.
pub const ORDERS: [usize; 4] = [1, 3, 5, 7];

/// Both optimized backends.
pub const BACKENDS: [Backend; 2] = [Backend::Scalar, Backend::Simd];

/// Reference output for `shape` on the given inputs.
pub fn control(image: &Image, kernels: &Kernels, shape: &ConvShape) -> Output {
    let mut out = shape.new_output();
    conv_reference(image, kernels, shape, &mut out);
    out
}

/// Optimized output for `shape` on the given inputs.
pub fn candidate(image: &Image, kernels: &Kernels, shape: &ConvShape, backend: Backend) -> Output {
    let mut out = shape.new_output();
    conv_optimized(image, kernels, shape, &mut out, backend);
    out
}

/// Seeded inputs plus both outputs.
pub fn seeded_pair(shape: &ConvShape, seed: u64, backend: Backend) -> (Output, Output) {
    let (image, kernels) = random_inputs(shape, seed);
    (
        control(&image, &kernels, shape),
        candidate(&image, &kernels, shape, backend),
    )
}

/// Image of all ones, kernels of all ones.
pub fn ones(shape: &ConvShape) -> (Image, Kernels) {
    (
        Image::from_fn(shape.image_dims(), |_| 1.0),
        Kernels::from_fn(shape.kernel_dims(), |_| 1),
    )
}

/// Asserts every element in a slice is finite.
pub fn assert_all_finite(slice: &[f32]) {
    for (i, &val) in slice.iter().enumerate() {
        assert!(val.is_finite(), "Element [{i}] is not finite: {val}");
    }
}
