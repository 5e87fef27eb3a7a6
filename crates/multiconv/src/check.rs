//! Equivalence check between a control and a candidate output.
//!
//! The metric is the sum of absolute differences (SAD) over every cell.
//! Reordered `f64` reductions may move individual cells by rounding noise;
//! a small aggregate threshold still catches wrong indices, a wrong kernel,
//! or a dropped channel.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConvError;
use crate::tensor::Output;
use crate::ulp::ulp_distance;

/// SAD threshold above which a run is suspect.
pub const EPSILON: f64 = 0.0625;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Acceptable,
    Suspect,
}

/// Outcome of comparing two outputs of identical shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equivalence {
    pub sum_abs_diff: f64,
    pub epsilon: f64,
    pub verdict: Verdict,
    /// Largest single-cell absolute difference.
    pub max_abs_diff: f64,
    /// `[m, w, h]` of `max_abs_diff`; the first cell when all are equal.
    pub max_index: [usize; 3],
    pub max_ulp: u32,
}

impl Equivalence {
    pub fn is_acceptable(&self) -> bool {
        self.verdict == Verdict::Acceptable
    }
}

impl fmt::Display for Equivalence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.verdict {
            Verdict::Acceptable => write!(
                f,
                "COMMENT: sum of absolute differences ({:.6})  within acceptable range ({:.6})",
                self.sum_abs_diff, self.epsilon
            ),
            Verdict::Suspect => write!(
                f,
                "WARNING: sum of absolute differences ({:.6}) > EPSILON ({:.6})",
                self.sum_abs_diff, self.epsilon
            ),
        }
    }
}

/// Compare `candidate` against `control`.
///
/// A SAD above [`EPSILON`] is [`Verdict::Suspect`]; this is reported, not
/// returned as an error.
///
/// # Errors
///
/// Returns [`ConvError::ShapeMismatch`] if the shapes differ. Outputs are
/// never compared up to the shorter length.
///
/// # Panics
///
/// Panics if a per-cell difference is negative (NaN cells included).
pub fn check_equivalence(control: &Output, candidate: &Output) -> Result<Equivalence, ConvError> {
    if !control.same_shape(candidate) {
        return Err(ConvError::ShapeMismatch {
            what: "candidate output",
            expected: control.shape().to_vec(),
            actual: candidate.shape().to_vec(),
        });
    }

    let mut sum_abs_diff = 0.0_f64;
    let mut max_abs_diff = 0.0_f64;
    let mut max_flat = 0usize;
    let mut max_ulp = 0u32;

    for (flat, (&a, &b)) in control.as_slice().iter().zip(candidate.as_slice()).enumerate() {
        let diff = (f64::from(a) - f64::from(b)).abs();
        assert!(diff >= 0.0, "negative absolute difference {diff} at flat index {flat}");
        sum_abs_diff += diff;
        if diff > max_abs_diff {
            max_abs_diff = diff;
            max_flat = flat;
        }
        max_ulp = max_ulp.max(ulp_distance(a, b));
    }

    let verdict = if sum_abs_diff > EPSILON {
        Verdict::Suspect
    } else {
        Verdict::Acceptable
    };

    let result = Equivalence {
        sum_abs_diff,
        epsilon: EPSILON,
        verdict,
        max_abs_diff,
        max_index: unflatten(max_flat, control.shape()),
        max_ulp,
    };

    match verdict {
        Verdict::Acceptable => info!(sum_abs_diff, epsilon = EPSILON, "outputs equivalent"),
        Verdict::Suspect => warn!(
            sum_abs_diff,
            epsilon = EPSILON,
            max_abs_diff,
            max_index = ?result.max_index,
            "outputs diverge"
        ),
    }

    Ok(result)
}

fn unflatten(flat: usize, shape: [usize; 3]) -> [usize; 3] {
    let plane = shape[1] * shape[2];
    if plane == 0 {
        return [0; 3];
    }
    [flat / plane, (flat % plane) / shape[2], flat % shape[2]]
}
