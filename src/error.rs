//! Error types for rotation and transform math.
//!
//! Every operation that would otherwise normalize a zero-length value, or that
//! requires a unit quaternion, returns [`MathResult`]. Pure algebra (the `*`
//! operators, dot products, conjugates) never fails.
//!
//! | Variant | Raised by |
//! |---------|-----------|
//! | [`DegenerateAxis`](MathError::DegenerateAxis) | [`Quaternion::angle_axis`](crate::Quaternion::angle_axis) |
//! | [`ZeroMagnitude`](MathError::ZeroMagnitude) | normalization, inverse, interpolation |
//! | [`NotNormalized`](MathError::NotNormalized) | [`Quaternion::quaternion_to_matrix`](crate::Quaternion::quaternion_to_matrix) |
//! | [`DegenerateScale`](MathError::DegenerateScale) | [`Transform::from_matrix`](crate::Transform::from_matrix) |

use thiserror::Error;

/// Failure modes of the rotation and transform operations.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MathError {
    /// The rotation axis is too short to normalize.
    #[error("rotation axis is degenerate (length {length})")]
    DegenerateAxis { length: f32 },

    /// A zero quaternion cannot be normalized or inverted.
    #[error("quaternion has zero magnitude")]
    ZeroMagnitude,

    /// A unit quaternion was required.
    #[error("quaternion is not normalized (magnitude {magnitude})")]
    NotNormalized { magnitude: f32 },

    /// A basis column of a matrix has collapsed, so no rotation can be recovered.
    #[error("matrix basis column {axis} is degenerate (length {length})")]
    DegenerateScale { axis: usize, length: f32 },
}

/// Convenience alias used throughout the crate.
pub type MathResult<T> = Result<T, MathError>;
