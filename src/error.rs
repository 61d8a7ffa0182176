use thiserror::Error;

/// Error types for the peakfit-rs library.
#[derive(Error, Debug)]
pub enum PeakFitError {
    /// The x and y arrays differ in length.
    #[error("x and y must have the same length (x: {x_len}, y: {y_len})")]
    MismatchedLengths { x_len: usize, y_len: usize },

    /// Too few samples for the requested operation.
    #[error("Insufficient data: need at least {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// The optimizer ran but did not reach an accepted termination state.
    #[error("Fit failed to converge: {message} (last parameters: {params:?})")]
    ConvergenceFailure { message: String, params: Vec<f64> },

    /// The window search could not bracket the peak on the low side.
    #[error("No lower background bound found: {0}")]
    NoLowBoundFound(String),

    /// The window search could not bracket the peak on the high side.
    #[error("No upper background bound found: {0}")]
    NoHighBoundFound(String),

    /// A crop window selected no samples.
    #[error("Crop window ({low}, {high}] selects no samples")]
    EmptyWindow { low: f64, high: f64 },

    /// Error indicating a mismatch in matrix dimensions.
    #[error("Matrix dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Error indicating a singular matrix was encountered.
    #[error("Singular matrix encountered")]
    SingularMatrix,

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A model name was not present in the registry.
    #[error("Unknown fit model: {0}")]
    UnknownModel(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PeakFitError {
    /// Check that two arrays have matching lengths.
    pub(crate) fn check_lengths(x_len: usize, y_len: usize) -> Result<()> {
        if x_len != y_len {
            return Err(PeakFitError::MismatchedLengths { x_len, y_len });
        }
        Ok(())
    }

    /// Check that at least `required` samples are present.
    pub(crate) fn check_min_len(actual: usize, required: usize) -> Result<()> {
        if actual < required {
            return Err(PeakFitError::InsufficientData { required, actual });
        }
        Ok(())
    }
}

/// Result type alias for peakfit-rs operations.
pub type Result<T> = std::result::Result<T, PeakFitError>;
