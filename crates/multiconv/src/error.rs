use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvError {
    #[error("kernel_order must be 1, 3, 5 or 7, not {0}")]
    InvalidKernelOrder(usize),

    #[error("dimension `{name}` must be positive")]
    ZeroDimension { name: &'static str },

    #[error("{what} size overflows: shape is too large")]
    DimensionOverflow { what: &'static str },

    #[error("Shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Failed to read suite file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_kernel_order_display() {
        let err = ConvError::InvalidKernelOrder(4);
        assert_eq!(err.to_string(), "kernel_order must be 1, 3, 5 or 7, not 4");
    }

    #[test]
    fn zero_dimension_display() {
        let err = ConvError::ZeroDimension { name: "nchannels" };
        assert!(err.to_string().contains("nchannels"));
    }

    #[test]
    fn dimension_overflow_display() {
        let err = ConvError::DimensionOverflow { what: "image width" };
        assert_eq!(err.to_string(), "image width size overflows: shape is too large");
    }

    #[test]
    fn shape_mismatch_display() {
        let err = ConvError::ShapeMismatch {
            what: "candidate output",
            expected: vec![2, 3, 4],
            actual: vec![2, 4, 3],
        };
        let s = err.to_string();
        assert!(s.contains("candidate output"));
        assert!(s.contains("[2, 3, 4]"));
        assert!(s.contains("[2, 4, 3]"));
    }

    #[test]
    fn io_error_converts() {
        let err: ConvError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found").into();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn yaml_error_converts() {
        let yaml_err = serde_yaml::from_str::<Vec<u32>>("{{nope").unwrap_err();
        let err: ConvError = yaml_err.into();
        assert!(err.to_string().contains("Failed to parse YAML"));
    }
}
