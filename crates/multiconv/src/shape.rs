//! Convolution shape parameters and their validation.
//!
//! A [`ConvShape`] can only be built through [`ConvShape::new`] (or
//! deserialized through the same checks), so every value reaching the
//! convolution kernels has positive dimensions and a supported kernel order.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConvError;
use crate::tensor::{Image, Kernels, Output};

/// Spatial side length shared by every kernel in a bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum KernelOrder {
    One,
    Three,
    Five,
    Seven,
}

impl KernelOrder {
    pub const ALL: [Self; 4] = [Self::One, Self::Three, Self::Five, Self::Seven];

    pub const fn side(self) -> usize {
        match self {
            Self::One => 1,
            Self::Three => 3,
            Self::Five => 5,
            Self::Seven => 7,
        }
    }
}

impl TryFrom<usize> for KernelOrder {
    type Error = ConvError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            3 => Ok(Self::Three),
            5 => Ok(Self::Five),
            7 => Ok(Self::Seven),
            other => Err(ConvError::InvalidKernelOrder(other)),
        }
    }
}

impl From<KernelOrder> for usize {
    fn from(order: KernelOrder) -> Self {
        order.side()
    }
}

impl fmt::Display for KernelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.side())
    }
}

/// Shape of one convolution problem.
///
/// `width` and `height` are the *output* spatial dimensions; the image is
/// over-allocated by `order` in both directions instead of being padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawShape")]
pub struct ConvShape {
    pub width: usize,
    pub height: usize,
    pub nchannels: usize,
    pub nkernels: usize,
    pub order: KernelOrder,
}

#[derive(Deserialize)]
struct RawShape {
    width: usize,
    height: usize,
    nchannels: usize,
    nkernels: usize,
    order: usize,
}

impl TryFrom<RawShape> for ConvShape {
    type Error = ConvError;

    fn try_from(raw: RawShape) -> Result<Self, Self::Error> {
        Self::new(raw.width, raw.height, raw.order, raw.nchannels, raw.nkernels)
    }
}

impl ConvShape {
    /// Validate and build a shape. Argument order follows the harness
    /// command line: width, height, kernel order, channels, kernels.
    ///
    /// # Errors
    ///
    /// [`ConvError::InvalidKernelOrder`] if `order` is not 1, 3, 5 or 7;
    /// [`ConvError::ZeroDimension`] if any other parameter is zero;
    /// [`ConvError::DimensionOverflow`] if a padded dimension, a tensor's
    /// byte size, or the MAC count does not fit in `usize`.
    pub fn new(
        width: usize,
        height: usize,
        order: usize,
        nchannels: usize,
        nkernels: usize,
    ) -> Result<Self, ConvError> {
        let order = KernelOrder::try_from(order)?;
        for (name, value) in [
            ("width", width),
            ("height", height),
            ("nchannels", nchannels),
            ("nkernels", nkernels),
        ] {
            if value == 0 {
                return Err(ConvError::ZeroDimension { name });
            }
        }
        let shape = Self {
            width,
            height,
            nchannels,
            nkernels,
            order,
        };
        shape.check_sizes()?;
        Ok(shape)
    }

    /// Every size derived from the shape must be computable without overflow
    /// and each tensor must fit in one allocation.
    fn check_sizes(&self) -> Result<(), ConvError> {
        let k = self.k();
        let overflow = |what| ConvError::DimensionOverflow { what };

        let padded_width = self.width.checked_add(k).ok_or_else(|| overflow("image width"))?;
        let padded_height = self.height.checked_add(k).ok_or_else(|| overflow("image height"))?;
        let image = elements(&[padded_width, padded_height, self.nchannels])
            .ok_or_else(|| overflow("image"))?;
        let kernels =
            elements(&[self.nkernels, self.nchannels, k, k]).ok_or_else(|| overflow("kernels"))?;
        let output =
            elements(&[self.nkernels, self.width, self.height]).ok_or_else(|| overflow("output"))?;

        fits_allocation::<f32>(image).ok_or_else(|| overflow("image"))?;
        fits_allocation::<i16>(kernels).ok_or_else(|| overflow("kernels"))?;
        fits_allocation::<f32>(output).ok_or_else(|| overflow("output"))?;
        output
            .checked_mul(self.nchannels)
            .and_then(|n| n.checked_mul(k * k))
            .ok_or_else(|| overflow("multiply-accumulate count"))?;
        Ok(())
    }

    pub const fn k(&self) -> usize {
        self.order.side()
    }

    /// `[width + k, height + k, nchannels]`
    pub const fn image_dims(&self) -> [usize; 3] {
        [self.width + self.k(), self.height + self.k(), self.nchannels]
    }

    /// `[nkernels, nchannels, k, k]`
    pub const fn kernel_dims(&self) -> [usize; 4] {
        [self.nkernels, self.nchannels, self.k(), self.k()]
    }

    /// `[nkernels, width, height]`
    pub const fn output_dims(&self) -> [usize; 3] {
        [self.nkernels, self.width, self.height]
    }

    /// Multiply-accumulates performed by one full convolution.
    pub const fn macs(&self) -> usize {
        self.nkernels * self.width * self.height * self.nchannels * self.k() * self.k()
    }

    pub fn new_image(&self) -> Image {
        Image::zeros(self.image_dims())
    }

    pub fn new_kernels(&self) -> Kernels {
        Kernels::zeros(self.kernel_dims())
    }

    pub fn new_output(&self) -> Output {
        Output::zeros(self.output_dims())
    }

    /// Panic unless the three tensors have exactly the dims this shape implies.
    pub(crate) fn assert_matches(&self, image: &Image, kernels: &Kernels, output: &Output) {
        assert_eq!(
            image.shape(),
            self.image_dims(),
            "image shape mismatch: expected {:?} got {:?}",
            self.image_dims(),
            image.shape()
        );
        assert_eq!(
            kernels.shape(),
            self.kernel_dims(),
            "kernel shape mismatch: expected {:?} got {:?}",
            self.kernel_dims(),
            kernels.shape()
        );
        assert_eq!(
            output.shape(),
            self.output_dims(),
            "output shape mismatch: expected {:?} got {:?}",
            self.output_dims(),
            output.shape()
        );
    }
}

fn elements(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

fn fits_allocation<T>(len: usize) -> Option<()> {
    let bytes = len.checked_mul(std::mem::size_of::<T>())?;
    (bytes <= isize::MAX.unsigned_abs()).then_some(())
}

impl fmt::Display for ConvShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} k={} c={} m={}",
            self.width, self.height, self.order, self.nchannels, self.nkernels
        )
    }
}
