//! # multiconv
//!
//! Multichannel, multi-kernel 2D convolution computed two ways, plus the
//! check that proves they agree.
//!
//! ## Modules
//!
//! - [`tensor`]: Contiguous tensors with shape/stride descriptors
//! - [`shape`]: Validated convolution shape parameters
//! - [`kernels`]: Reference and optimized convolutions
//! - [`check`]: Sum-of-absolute-differences equivalence check
//! - [`ulp`]: ULP distance helpers
//! - [`populate`]: Seeded random inputs
//! - [`harness`]: Timed runs and YAML run suites
//!
//! ## Example
//!
//! ```
//! use multiconv::check::check_equivalence;
//! use multiconv::kernels::{conv_optimized, conv_reference, Backend};
//! use multiconv::populate::random_inputs;
//! use multiconv::shape::ConvShape;
//!
//! let shape = ConvShape::new(16, 16, 3, 4, 8)?;
//! let (image, kernels) = random_inputs(&shape, 42);
//! let mut control = shape.new_output();
//! let mut candidate = shape.new_output();
//! conv_reference(&image, &kernels, &shape, &mut control);
//! conv_optimized(&image, &kernels, &shape, &mut candidate, Backend::detect());
//! assert!(check_equivalence(&control, &candidate)?.is_acceptable());
//! # Ok::<(), multiconv::error::ConvError>(())
//! ```

pub mod check;
pub mod error;
pub mod harness;
pub mod kernels;
pub mod populate;
pub mod shape;
pub mod tensor;
pub mod ulp;
