//! # rigid3d
//!
//! **Rotations and rigid transforms for 3D scenes.**
//!
//! Build rotations from axis-angle pairs, Euler angles or matrices, compose them,
//! and place objects with position/rotation/scale transforms that nest into
//! hierarchies.
//!
//! ## Quick Start
//!
//! ```
//! use rigid3d::*;
//!
//! let turn = Quaternion::angle_axis(std::f32::consts::FRAC_PI_2, Vec3::Y).unwrap();
//!
//! let parent = Transform::new().position(Vec3::new(0.0, 0.0, -5.0)).rotation(turn);
//! let child = Transform::from_position(Vec3::X);
//!
//! // The child's transform expressed in the parent's frame
//! let world = child * parent;
//! assert!((world.position - Vec3::new(0.0, 0.0, -6.0)).length() < 1e-5);
//!
//! let matrix = world.local_matrix().unwrap();
//! ```
//!
//! ## Conventions
//!
//! - Quaternions are `(x, y, z, w)`; `a * b` applies `b` first.
//! - Euler angles are radians, composed as yaw (Y) · pitch (X) · roll (Z).
//! - Matrices are column-major [`glam::Mat4`]; transforms apply scale, then rotation,
//!   then translation.
//! - Operations that would normalize a zero-length value, or that need a unit
//!   quaternion, return [`MathResult`] instead of producing NaNs.

pub mod error;
pub mod hierarchy;
mod quaternion;
mod transform;

pub use error::{MathError, MathResult};
pub use quaternion::{DEGENERATE_EPSILON, NORMALIZED_EPSILON, Quaternion, SLERP_THRESHOLD};
pub use transform::Transform;

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec3, Vec4};

// ECS types used by the hierarchy module
pub use hecs::{Entity, World};
