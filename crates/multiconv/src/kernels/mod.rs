//! Convolution kernels: scalar reference and parallel specialized variant.
//!
//! - [`reference::conv_reference`]: full nested summation (ground truth)
//! - [`optimized::conv_optimized`]: kernel-parallel, per-order row reducers
//!
//! Both compute, for every kernel `m` and output cell `(w, h)`,
//! `Σ_c Σ_x Σ_y image[w+x][h+y][c] * kernel[m][c][x][y]` in `f64`, narrowed
//! to `f32` on store.

// Kernel code naturally uses single-character index names (m, w, h, c, x, y)
// and integer/float casts at the mixed-precision boundary.
#![allow(
    clippy::many_single_char_names,
    clippy::similar_names,
    clippy::cast_possible_truncation,
    clippy::needless_range_loop,
    clippy::inline_always,
    unsafe_op_in_unsafe_fn
)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod optimized;
pub mod reference;
pub mod rows;

pub use optimized::conv_optimized;
pub use reference::conv_reference;

/// Instruction set used by the row reducers of the optimized convolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Portable scalar reducers.
    Scalar,
    /// SSE2 `f64x2` reducers for orders 3 and 5; scalar elsewhere.
    Simd,
}

impl Backend {
    /// Best backend for the current target. SSE2 is part of the x86-64
    /// baseline, so no runtime probe is needed there.
    pub const fn detect() -> Self {
        if cfg!(target_arch = "x86_64") {
            Self::Simd
        } else {
            Self::Scalar
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::detect()
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Scalar => "scalar",
            Self::Simd => "simd",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Backend {
    type Err = String;

    /// Parses `scalar`, `simd`, or `auto` (same as [`Backend::detect`]).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scalar" => Ok(Self::Scalar),
            "simd" => Ok(Self::Simd),
            "auto" => Ok(Self::detect()),
            other => Err(format!(
                "unknown backend '{other}': expected auto, scalar, or simd"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_str() {
        assert_eq!("scalar".parse::<Backend>().unwrap(), Backend::Scalar);
        assert_eq!("simd".parse::<Backend>().unwrap(), Backend::Simd);
        assert_eq!("auto".parse::<Backend>().unwrap(), Backend::detect());
        assert!("avx512".parse::<Backend>().is_err());
    }

    #[test]
    fn test_backend_display_roundtrip() {
        for b in [Backend::Scalar, Backend::Simd] {
            assert_eq!(b.to_string().parse::<Backend>().unwrap(), b);
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_detect_prefers_simd_on_x86_64() {
        assert_eq!(Backend::detect(), Backend::Simd);
    }
}
