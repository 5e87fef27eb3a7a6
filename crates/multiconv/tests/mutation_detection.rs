//! Mutation detection: broken convolution variants implemented inline must be
//! flagged as suspect by the equivalence checker, proving the threshold
//! catches systematic errors rather than only rounding noise.

mod common;

use multiconv::check::{check_equivalence, Verdict};
use multiconv::populate::random_inputs;
use multiconv::shape::ConvShape;
use multiconv::tensor::{Image, Kernels, Output};

/// Reference loop with a pluggable index mapping for the mutation under test.
fn mutated_conv(
    image: &Image,
    kernels: &Kernels,
    shape: &ConvShape,
    read: impl Fn(&Image, &Kernels, [usize; 6]) -> f64,
) -> Output {
    let k = shape.k();
    let mut out = shape.new_output();
    for m in 0..shape.nkernels {
        for w in 0..shape.width {
            for h in 0..shape.height {
                let mut sum = 0.0_f64;
                for c in 0..shape.nchannels {
                    for x in 0..k {
                        for y in 0..k {
                            sum += read(image, kernels, [m, w, h, c, x, y]);
                        }
                    }
                }
                out[[m, w, h]] = sum as f32;
            }
        }
    }
    out
}

fn assert_suspect(shape: &ConvShape, mutated: &Output, image: &Image, kernels: &Kernels) {
    let control = common::control(image, kernels, shape);
    let eq = check_equivalence(&control, mutated).unwrap();
    assert_eq!(eq.verdict, Verdict::Suspect, "mutation undetected: sad {}", eq.sum_abs_diff);
}

/// Mutation: kernel taps transposed (`kernel[m][c][y][x]`).
#[test]
fn mutation_detect_transposed_kernel() {
    let shape = ConvShape::new(6, 6, 3, 2, 2).unwrap();
    let (image, kernels) = random_inputs(&shape, 1);
    let mutated = mutated_conv(&image, &kernels, &shape, |img, ker, [m, w, h, c, x, y]| {
        f64::from(img[[w + x, h + y, c]]) * f64::from(ker[[m, c, y, x]])
    });
    assert_suspect(&shape, &mutated, &image, &kernels);
}

/// Mutation: every kernel index applies kernel 0.
#[test]
fn mutation_detect_wrong_kernel() {
    let shape = ConvShape::new(5, 4, 5, 2, 3).unwrap();
    let (image, kernels) = random_inputs(&shape, 2);
    let mutated = mutated_conv(&image, &kernels, &shape, |img, ker, [_, w, h, c, x, y]| {
        f64::from(img[[w + x, h + y, c]]) * f64::from(ker[[0, c, x, y]])
    });
    assert_suspect(&shape, &mutated, &image, &kernels);
}

/// Mutation: the last channel is skipped.
#[test]
fn mutation_detect_missing_channel() {
    let shape = ConvShape::new(4, 4, 1, 3, 2).unwrap();
    let (image, kernels) = random_inputs(&shape, 3);
    let last = shape.nchannels - 1;
    let mutated = mutated_conv(&image, &kernels, &shape, |img, ker, [m, w, h, c, x, y]| {
        if c == last {
            0.0
        } else {
            f64::from(img[[w + x, h + y, c]]) * f64::from(ker[[m, c, x, y]])
        }
    });
    assert_suspect(&shape, &mutated, &image, &kernels);
}

/// Mutation: window shifted by one image row.
#[test]
fn mutation_detect_shifted_window() {
    let shape = ConvShape::new(4, 4, 7, 1, 1).unwrap();
    let (image, kernels) = random_inputs(&shape, 4);
    let mutated = mutated_conv(&image, &kernels, &shape, |img, ker, [m, w, h, c, x, y]| {
        f64::from(img[[w + x + 1, h + y, c]]) * f64::from(ker[[m, c, x, y]])
    });
    assert_suspect(&shape, &mutated, &image, &kernels);
}

/// Products formed in `f32` before widening are exact for small integer
/// inputs; the checker must not false-fail on such a harmless variant.
#[test]
fn mutation_f32_products_tolerated_when_exact() {
    let shape = ConvShape::new(2, 2, 1, 1, 1).unwrap();
    let (image, kernels) = common::ones(&shape);
    let mutated = mutated_conv(&image, &kernels, &shape, |img, ker, [m, w, h, c, x, y]| {
        f64::from(img[[w + x, h + y, c]] * f32::from(ker[[m, c, x, y]]))
    });
    let control = common::control(&image, &kernels, &shape);
    assert!(check_equivalence(&control, &mutated).unwrap().is_acceptable());
}
