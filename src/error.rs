//! Error types for shape construction, extraction and export.

use thiserror::Error;

/// Result type for fallible sdfkit operations.
pub type SdfResult<T> = Result<T, SdfError>;

/// Errors raised while building, meshing or exporting a distance field.
#[derive(Debug, Error)]
pub enum SdfError {
    /// A primitive or operation was given an unusable parameter.
    #[error("invalid {what}: {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        what: &'static str,
        /// Human readable explanation.
        reason: String,
    },

    /// A boolean operation was called without a required operand.
    #[error("missing operand: {0}")]
    MissingOperand(&'static str),

    /// The field's bounding box has zero or negative extent on some axis.
    #[error("degenerate bounding box: min ({min_x}, {min_y}, {min_z}) max ({max_x}, {max_y}, {max_z})")]
    DegenerateBoundingBox {
        /// Minimum corner, x.
        min_x: f64,
        /// Minimum corner, y.
        min_y: f64,
        /// Minimum corner, z (0 for 2D boxes).
        min_z: f64,
        /// Maximum corner, x.
        max_x: f64,
        /// Maximum corner, y.
        max_y: f64,
        /// Maximum corner, z (0 for 2D boxes).
        max_z: f64,
    },

    /// The field evaluated to NaN or infinity during extraction.
    #[error("field is not finite at ({x}, {y}, {z}): {value}")]
    NonFiniteField {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
        /// Z coordinate (0 for 2D fields).
        z: f64,
        /// The offending value.
        value: f64,
    },

    /// Extraction settings are out of range.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Polygon smoothing kept producing replacements past the pass limit.
    #[error("polygon smoothing did not settle after {passes} passes")]
    SmoothingDiverged {
        /// Number of passes executed.
        passes: usize,
    },

    /// The worker pool could not be created.
    #[error("worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// Writing exported output failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SdfError {
    pub(crate) fn invalid(what: &'static str, reason: impl Into<String>) -> Self {
        SdfError::InvalidParameter {
            what,
            reason: reason.into(),
        }
    }
}

/// Reject negative or non-finite lengths.
pub(crate) fn check_non_negative(what: &'static str, v: f64) -> SdfResult<()> {
    if !v.is_finite() {
        return Err(SdfError::invalid(what, format!("{v} is not finite")));
    }
    if v < 0.0 {
        return Err(SdfError::invalid(what, format!("{v} is negative")));
    }
    Ok(())
}

/// Reject zero, negative or non-finite lengths.
pub(crate) fn check_positive(what: &'static str, v: f64) -> SdfResult<()> {
    check_non_negative(what, v)?;
    if v == 0.0 {
        return Err(SdfError::invalid(what, "must be greater than zero"));
    }
    Ok(())
}
