//! Seeded random population of convolution inputs.
//!
//! Value ranges are kept small so that every product and partial sum is an
//! integer exactly representable in `f64`; reordering the reduction then
//! cannot drift the result, which keeps the equivalence check meaningful.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::shape::ConvShape;
use crate::tensor::{Image, Kernels};

/// Image values are drawn from `[IMAGE_BIAS, IMAGE_BIAS + IMAGE_RANGE)`.
pub const IMAGE_RANGE: u32 = 1 << 12;
pub const IMAGE_BIAS: u32 = 1 << 10;
/// Kernel weights are drawn from `[0, KERNEL_RANGE)`.
pub const KERNEL_RANGE: i16 = 1 << 10;

pub fn fill_image_random<G: Rng + ?Sized>(image: &mut Image, rng: &mut G) {
    for v in image.as_mut_slice() {
        *v = (rng.gen_range(0..IMAGE_RANGE) + IMAGE_BIAS) as f32;
    }
}

pub fn fill_kernels_random<G: Rng + ?Sized>(kernels: &mut Kernels, rng: &mut G) {
    for v in kernels.as_mut_slice() {
        *v = rng.gen_range(0..KERNEL_RANGE);
    }
}

/// Allocate and populate an image and kernel bank for `shape`.
///
/// The same `seed` always produces the same tensors.
pub fn random_inputs(shape: &ConvShape, seed: u64) -> (Image, Kernels) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut image = shape.new_image();
    let mut kernels = shape.new_kernels();
    fill_image_random(&mut image, &mut rng);
    fill_kernels_random(&mut kernels, &mut rng);
    (image, kernels)
}
