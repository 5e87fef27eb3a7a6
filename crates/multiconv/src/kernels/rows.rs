//! Per-order kernel-row reducers.
//!
//! A row reducer computes `Σ_y pixels[y * stride] * taps[y]` for one kernel
//! row of `ORDER` taps. `pixels` starts at `image[w+x][h][c]`, so consecutive
//! taps are one image row (`stride` elements) apart. Each reducer returns
//! the same mathematical sum as the plain loop; only the association order
//! inside the row may differ.
//!
//! The optimized convolution picks one reducer type per call and is
//! monomorphized over it, so the hot loop carries no order dispatch.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::{
    _mm_add_pd, _mm_add_sd, _mm_cvtsd_f64, _mm_mul_pd, _mm_mul_sd, _mm_set_pd, _mm_set_sd,
    _mm_unpackhi_pd,
};

/// Reduction of one kernel row.
pub trait RowReduce {
    /// Taps per row (the kernel order).
    const ORDER: usize;

    fn reduce(pixels: &[f32], stride: usize, taps: &[i16]) -> f64;
}

#[inline(always)]
fn px(pixels: &[f32], stride: usize, y: usize) -> f64 {
    f64::from(pixels[y * stride])
}

#[inline(always)]
fn tap(taps: &[i16], y: usize) -> f64 {
    f64::from(taps[y])
}

/// Order 1: a single multiply.
pub struct Order1;

impl RowReduce for Order1 {
    const ORDER: usize = 1;

    #[inline(always)]
    fn reduce(pixels: &[f32], _stride: usize, taps: &[i16]) -> f64 {
        f64::from(pixels[0]) * f64::from(taps[0])
    }
}

/// Order 3, portable.
pub struct Order3;

impl RowReduce for Order3 {
    const ORDER: usize = 3;

    #[inline(always)]
    fn reduce(pixels: &[f32], stride: usize, taps: &[i16]) -> f64 {
        px(pixels, stride, 0) * tap(taps, 0)
            + px(pixels, stride, 1) * tap(taps, 1)
            + px(pixels, stride, 2) * tap(taps, 2)
    }
}

/// Order 3 as a two-lane `f64` dot product: `[p0, p1]·[t0, t1] + [p2, 0]·[t2, 0]`.
pub struct Order3Simd;

impl RowReduce for Order3Simd {
    const ORDER: usize = 3;

    #[inline(always)]
    fn reduce(pixels: &[f32], stride: usize, taps: &[i16]) -> f64 {
        #[cfg(target_arch = "x86_64")]
        {
            let p = [px(pixels, stride, 0), px(pixels, stride, 1), px(pixels, stride, 2)];
            let t = [tap(taps, 0), tap(taps, 1), tap(taps, 2)];
            // SAFETY: SSE2 is part of the x86-64 baseline.
            unsafe { dot3_sse2(p, t) }
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            Order3::reduce(pixels, stride, taps)
        }
    }
}

#[cfg(target_arch = "x86_64")]
#[inline(always)]
unsafe fn dot3_sse2(p: [f64; 3], t: [f64; 3]) -> f64 {
    let img_lo = _mm_set_pd(p[1], p[0]);
    let img_hi = _mm_set_sd(p[2]);
    let ker_lo = _mm_set_pd(t[1], t[0]);
    let ker_hi = _mm_set_sd(t[2]);
    // lanes: [p0*t0 + p2*t2, p1*t1 + 0]
    let acc = _mm_add_pd(_mm_mul_pd(img_lo, ker_lo), _mm_mul_pd(img_hi, ker_hi));
    _mm_cvtsd_f64(_mm_add_sd(acc, _mm_unpackhi_pd(acc, acc)))
}

/// Order 5, portable.
pub struct Order5;

impl RowReduce for Order5 {
    const ORDER: usize = 5;

    #[inline(always)]
    fn reduce(pixels: &[f32], stride: usize, taps: &[i16]) -> f64 {
        let mut sum = 0.0;
        for y in 0..5 {
            sum += px(pixels, stride, y) * tap(taps, y);
        }
        sum
    }
}

/// Order 5 as two `f64x2` multiplies over taps 1..5 plus a scalar tap 0,
/// folded with a horizontal add.
pub struct Order5Simd;

impl RowReduce for Order5Simd {
    const ORDER: usize = 5;

    #[inline(always)]
    fn reduce(pixels: &[f32], stride: usize, taps: &[i16]) -> f64 {
        #[cfg(target_arch = "x86_64")]
        {
            let p = [
                px(pixels, stride, 0),
                px(pixels, stride, 1),
                px(pixels, stride, 2),
                px(pixels, stride, 3),
                px(pixels, stride, 4),
            ];
            let t = [tap(taps, 0), tap(taps, 1), tap(taps, 2), tap(taps, 3), tap(taps, 4)];
            // SAFETY: SSE2 is part of the x86-64 baseline.
            unsafe { dot5_sse2(p, t) }
        }
        #[cfg(not(target_arch = "x86_64"))]
        {
            Order5::reduce(pixels, stride, taps)
        }
    }
}

#[cfg(target_arch = "x86_64")]
#[inline(always)]
unsafe fn dot5_sse2(p: [f64; 5], t: [f64; 5]) -> f64 {
    let mul_hi = _mm_mul_pd(_mm_set_pd(p[4], p[3]), _mm_set_pd(t[4], t[3]));
    let mul_mid = _mm_mul_pd(_mm_set_pd(p[2], p[1]), _mm_set_pd(t[2], t[1]));
    let mul_lo = _mm_mul_sd(_mm_set_sd(p[0]), _mm_set_sd(t[0]));
    // lanes: [p3*t3 + p1*t1, p4*t4 + p2*t2]
    let pair = _mm_add_pd(mul_hi, mul_mid);
    let upper = _mm_add_sd(mul_lo, _mm_unpackhi_pd(pair, pair));
    _mm_cvtsd_f64(_mm_add_sd(pair, upper))
}

/// Order 7: seven unrolled scalar multiply-adds, no vector instructions.
pub struct Order7;

impl RowReduce for Order7 {
    const ORDER: usize = 7;

    #[inline(always)]
    fn reduce(pixels: &[f32], stride: usize, taps: &[i16]) -> f64 {
        let mut sum = px(pixels, stride, 0) * tap(taps, 0);
        sum += px(pixels, stride, 1) * tap(taps, 1);
        sum += px(pixels, stride, 2) * tap(taps, 2);
        sum += px(pixels, stride, 3) * tap(taps, 3);
        sum += px(pixels, stride, 4) * tap(taps, 4);
        sum += px(pixels, stride, 5) * tap(taps, 5);
        sum += px(pixels, stride, 6) * tap(taps, 6);
        sum
    }
}
