//! Timed runs and YAML run suites.
//!
//! A run populates inputs from an explicit seed, times the reference and the
//! optimized convolution, and checks the two outputs for equivalence.

use std::fmt::Write as _;
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::check::{check_equivalence, Equivalence};
use crate::error::ConvError;
use crate::kernels::{conv_optimized, conv_reference, Backend};
use crate::populate::random_inputs;
use crate::shape::ConvShape;
use crate::tensor::Output;

pub const DEFAULT_SEED: u64 = 0x5eed;

/// One harness run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub shape: ConvShape,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub backend: Backend,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl RunConfig {
    pub fn new(shape: ConvShape) -> Self {
        Self {
            shape,
            seed: DEFAULT_SEED,
            backend: Backend::detect(),
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }
}

/// Timings and verdict of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub shape: ConvShape,
    pub seed: u64,
    pub backend: Backend,
    pub control_micros: u64,
    pub candidate_micros: u64,
    /// `control / candidate`; `None` when the candidate took under 1µs.
    pub speedup: Option<f64>,
    pub equivalence: Equivalence,
}

/// Run once and discard the outputs.
pub fn run_once(config: &RunConfig) -> Result<RunReport, ConvError> {
    run_once_with_output(config).map(|(report, _)| report)
}

/// Run once and also return the candidate output.
pub fn run_once_with_output(config: &RunConfig) -> Result<(RunReport, Output), ConvError> {
    let shape = &config.shape;
    debug!(%shape, seed = config.seed, backend = %config.backend, "starting run");

    let (image, kernels) = random_inputs(shape, config.seed);
    let mut control = shape.new_output();
    let mut candidate = shape.new_output();

    let start = Instant::now();
    conv_reference(&image, &kernels, shape, &mut control);
    let control_micros = elapsed_micros(start);

    let start = Instant::now();
    conv_optimized(&image, &kernels, shape, &mut candidate, config.backend);
    let candidate_micros = elapsed_micros(start);

    let equivalence = check_equivalence(&control, &candidate)?;

    #[allow(clippy::cast_precision_loss)]
    let speedup = (candidate_micros > 0).then(|| control_micros as f64 / candidate_micros as f64);

    let report = RunReport {
        shape: *shape,
        seed: config.seed,
        backend: config.backend,
        control_micros,
        candidate_micros,
        speedup,
        equivalence,
    };
    Ok((report, candidate))
}

fn elapsed_micros(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX)
}

/// A batch of shapes sharing one seed and backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suite {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default)]
    pub backend: Backend,
    pub runs: Vec<ConvShape>,
}

/// Parse a YAML suite file.
///
/// # Errors
///
/// [`ConvError::Io`] if the file cannot be read, [`ConvError::Yaml`] if it is
/// malformed or any shape fails validation.
pub fn parse_suite(path: &Path) -> Result<Suite, ConvError> {
    let content = std::fs::read_to_string(path)?;
    parse_suite_str(&content)
}

pub fn parse_suite_str(yaml: &str) -> Result<Suite, ConvError> {
    let suite: Suite = serde_yaml::from_str(yaml)?;
    Ok(suite)
}

/// Run every shape in order. Suspect verdicts do not stop the suite.
pub fn run_suite(suite: &Suite) -> Result<Vec<RunReport>, ConvError> {
    suite
        .runs
        .iter()
        .enumerate()
        .map(|(i, shape)| {
            debug!(run = i, total = suite.runs.len(), "suite run");
            run_once(&RunConfig {
                shape: *shape,
                seed: suite.seed,
                backend: suite.backend,
            })
        })
        .collect()
}

/// Shape and timing lines of the text report, without the verdict.
pub fn format_timings(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Shape: {} (seed {}, backend {})",
        report.shape, report.seed, report.backend
    );
    let _ = writeln!(out, "Control conv time: {} microseconds", report.control_micros);
    let _ = writeln!(out, "Optimized conv time: {} microseconds", report.candidate_micros);
    if let Some(speedup) = report.speedup {
        let _ = writeln!(out, "Speedup: {speedup:.2}x");
    }
    out
}

/// Text report in the harness's line-oriented format: timings, then the
/// verdict line.
pub fn format_text(report: &RunReport) -> String {
    let mut out = format_timings(report);
    let _ = writeln!(out, "{}", report.equivalence);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::Verdict;
    use crate::shape::KernelOrder;

    #[test]
    fn test_run_once_acceptable() {
        let shape = ConvShape::new(10, 6, 3, 4, 5).unwrap();
        let report = run_once(&RunConfig::new(shape).with_seed(17)).unwrap();
        assert_eq!(report.shape, shape);
        assert_eq!(report.seed, 17);
        assert_eq!(report.equivalence.verdict, Verdict::Acceptable);
    }

    #[test]
    fn test_run_once_with_output_shape() {
        let shape = ConvShape::new(4, 3, 7, 2, 3).unwrap();
        let config = RunConfig::new(shape).with_backend(Backend::Scalar);
        let (report, output) = run_once_with_output(&config).unwrap();
        assert_eq!(report.backend, Backend::Scalar);
        assert_eq!(output.shape(), shape.output_dims());
    }

    #[test]
    fn test_parse_suite_defaults() {
        let suite = parse_suite_str(
            "runs:\n  - { width: 8, height: 8, order: 3, nchannels: 2, nkernels: 2 }\n",
        )
        .unwrap();
        assert_eq!(suite.seed, DEFAULT_SEED);
        assert_eq!(suite.backend, Backend::detect());
        assert_eq!(suite.runs.len(), 1);
        assert_eq!(suite.runs[0].order, KernelOrder::Three);
    }

    #[test]
    fn test_parse_suite_explicit() {
        let yaml = r"
seed: 9
backend: scalar
runs:
  - { width: 4, height: 5, order: 1, nchannels: 3, nkernels: 2 }
  - { width: 6, height: 2, order: 5, nchannels: 1, nkernels: 4 }
";
        let suite = parse_suite_str(yaml).unwrap();
        assert_eq!(suite.seed, 9);
        assert_eq!(suite.backend, Backend::Scalar);
        let reports = run_suite(&suite).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.equivalence.is_acceptable()));
        assert_eq!(reports[1].shape.order, KernelOrder::Five);
    }

    #[test]
    fn test_parse_suite_rejects_bad_order() {
        let err = parse_suite_str(
            "runs:\n  - { width: 8, height: 8, order: 4, nchannels: 2, nkernels: 2 }\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConvError::Yaml(_)));
        assert!(err.to_string().contains("kernel_order must be 1, 3, 5 or 7"));
    }

    #[test]
    fn test_parse_suite_missing_file() {
        let err = parse_suite(Path::new("/nonexistent/suite.yaml")).unwrap_err();
        assert!(matches!(err, ConvError::Io(_)));
    }

    #[test]
    fn test_format_text_lines() {
        let shape = ConvShape::new(2, 2, 1, 1, 1).unwrap();
        let report = run_once(&RunConfig::new(shape)).unwrap();
        let text = format_text(&report);
        assert!(text.contains("Control conv time:"));
        assert!(text.contains("Optimized conv time:"));
        assert!(text.contains("COMMENT: sum of absolute differences"));
        assert!(text.starts_with(&format_timings(&report)));
        assert!(!format_timings(&report).contains("COMMENT"));
    }

    #[test]
    fn test_report_serializes_to_json() {
        let shape = ConvShape::new(3, 3, 3, 1, 1).unwrap();
        let report = run_once(&RunConfig::new(shape)).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["shape"]["order"], 3);
        assert_eq!(json["equivalence"]["verdict"], "acceptable");
    }
}
