//! Position, rotation and scale for placing objects in 3D space.
//!
//! [`Transform`] describes a local-to-parent transformation applied in SRT order
//! (Scale, then Rotate, then Translate). Its matrix is derived from the three
//! fields on every call to [`Transform::local_matrix`], so there is no cached state
//! to keep in sync when fields change.
//!
//! # Building transforms
//!
//! [`Transform`] uses a builder pattern for ergonomic positioning:
//!
//! ```
//! use rigid3d::{Quaternion, Transform, Vec3};
//!
//! let transform = Transform::new()
//!     .position(Vec3::new(0.0, 2.0, -5.0))
//!     .rotation(Quaternion::euler(0.0, 0.5, 0.0))
//!     .uniform_scale(2.0);
//!
//! let positioned = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));
//! ```
//!
//! # Hierarchies
//!
//! `child * parent` expresses `child` in the parent's own parent frame. Chaining
//! `leaf * mid * root` therefore yields the leaf's world transform. See
//! [`hierarchy`](crate::hierarchy) for resolving whole entity trees.

use std::ops::{Mul, MulAssign};

use glam::{Mat4, Vec3, Vec4};

use crate::error::{MathError, MathResult};
use crate::quaternion::{DEGENERATE_EPSILON, Quaternion};

/// Position, rotation and scale of an object relative to its parent.
///
/// # Default Values
///
/// A default transform places the object at the origin with no rotation and
/// unit scale:
/// - `position`: `(0, 0, 0)`
/// - `rotation`: [`Quaternion::IDENTITY`]
/// - `scale`: `(1, 1, 1)`
///
/// # Example
///
/// ```
/// use rigid3d::{Transform, Vec3};
///
/// let transform = Transform::new()
///     .position(Vec3::new(0.0, 1.0, 0.0))
///     .uniform_scale(2.0);
///
/// // Scale first, then translate
/// let p = transform.transform_point(Vec3::X);
/// assert_eq!(p, Vec3::new(2.0, 1.0, 0.0));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Translation relative to the parent.
    pub position: Vec3,
    /// Rotation, expected to be a unit quaternion.
    pub rotation: Quaternion,
    /// Scale factors for each axis.
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quaternion::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Creates a new identity transform (origin, no rotation, unit scale).
    ///
    /// This is equivalent to `Transform::default()`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a transform from explicit position, rotation and scale.
    pub fn from_trs(position: Vec3, rotation: Quaternion, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Creates a transform positioned at the given location.
    ///
    /// # Example
    ///
    /// ```
    /// use rigid3d::{Transform, Vec3};
    ///
    /// let transform = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
    /// assert_eq!(transform.position, Vec3::new(1.0, 2.0, 3.0));
    /// ```
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Decomposes an affine matrix into position, rotation and scale.
    ///
    /// Position is read from the translation column. Scale is the length of each
    /// basis column; a mirrored basis (negative determinant) is reported as a
    /// negative X scale. The rotation is extracted from the basis with the scale
    /// divided out. Shear cannot be represented and is folded into the rotation.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::DegenerateScale`] if any basis column has (nearly) zero
    /// length.
    ///
    /// # Example
    ///
    /// ```
    /// use rigid3d::{Mat4, Transform, Vec3};
    ///
    /// let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
    ///     * Mat4::from_scale(Vec3::new(2.0, 2.0, 2.0));
    /// let t = Transform::from_matrix(&m).unwrap();
    /// assert!((t.scale - Vec3::splat(2.0)).length() < 1e-5);
    /// assert_eq!(t.position, Vec3::new(1.0, 2.0, 3.0));
    /// ```
    pub fn from_matrix(mat: &Mat4) -> MathResult<Self> {
        let basis = [
            mat.x_axis.truncate(),
            mat.y_axis.truncate(),
            mat.z_axis.truncate(),
        ];

        let mut scale = Vec3::ZERO;
        for (axis, column) in basis.iter().enumerate() {
            let length = column.length();
            if !length.is_finite() || length <= DEGENERATE_EPSILON {
                return Err(MathError::DegenerateScale { axis, length });
            }
            scale[axis] = length;
        }
        if mat.determinant() < 0.0 {
            scale.x = -scale.x;
        }

        let rotation_matrix = Mat4::from_cols(
            (basis[0] / scale.x).extend(0.0),
            (basis[1] / scale.y).extend(0.0),
            (basis[2] / scale.z).extend(0.0),
            Vec4::W,
        );

        Ok(Self {
            position: mat.w_axis.truncate(),
            rotation: Quaternion::matrix_to_quaternion(&rotation_matrix),
            scale,
        })
    }

    /// Sets the position (translation) component.
    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets the rotation component.
    pub fn rotation(mut self, rotation: Quaternion) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets non-uniform scale factors for each axis.
    ///
    /// For uniform scaling, prefer [`Transform::uniform_scale()`].
    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Sets uniform scale on all axes.
    ///
    /// # Example
    ///
    /// ```
    /// use rigid3d::{Transform, Vec3};
    ///
    /// let transform = Transform::new().uniform_scale(2.0);
    /// assert_eq!(transform.scale, Vec3::new(2.0, 2.0, 2.0));
    /// ```
    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Moves the transform by `offset` in parent space.
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Applies `rotation` in local space (`self.rotation * rotation`).
    ///
    /// The product is renormalized, so [`Transform::local_matrix`] keeps succeeding
    /// after any number of calls.
    pub fn rotate(&mut self, rotation: Quaternion) {
        let rotated = self.rotation * rotation;
        self.rotation = rotated.normalized().unwrap_or(rotated);
    }

    /// Multiplies the current scale component-wise.
    pub fn scale_by(&mut self, factors: Vec3) {
        self.scale *= factors;
    }

    /// Replaces the position.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Replaces the scale.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
    }

    /// Replaces the rotation.
    pub fn set_rotation(&mut self, rotation: Quaternion) {
        self.rotation = rotation;
    }

    /// Replaces the rotation with one built from Euler angles (see [`Quaternion::euler`]).
    pub fn set_euler_rotation(&mut self, angles: Vec3) {
        self.rotation = Quaternion::from_euler_vec(angles);
    }

    /// Returns the position.
    pub fn get_position(&self) -> Vec3 {
        self.position
    }

    /// Returns the scale.
    pub fn get_scale(&self) -> Vec3 {
        self.scale
    }

    /// Returns the rotation quaternion.
    pub fn get_rotation(&self) -> Quaternion {
        self.rotation
    }

    /// The rotation as Euler angles, subject to gimbal lock near ±90° pitch.
    pub fn euler_rotation(&self) -> Vec3 {
        self.rotation.euler_angles()
    }

    /// Converts this transform to a 4×4 transformation matrix.
    ///
    /// Computes `T * (R * S)`: scale is applied first, then rotation, then
    /// translation.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::NotNormalized`] if the rotation is not a unit quaternion.
    pub fn local_matrix(&self) -> MathResult<Mat4> {
        let rotation = self.rotation.to_matrix()?;
        Ok(Mat4::from_translation(self.position) * (rotation * Mat4::from_scale(self.scale)))
    }

    /// Maps a point from local space to parent space.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * (self.scale * point) + self.position
    }

    /// Maps a direction from local space to parent space, ignoring translation.
    pub fn transform_vector(&self, vector: Vec3) -> Vec3 {
        self.rotation * (self.scale * vector)
    }
}

impl Mul for Transform {
    type Output = Self;

    /// Expresses `self` (the child) in the frame that `parent` is relative to.
    ///
    /// Rotations compose as `parent.rotation * self.rotation` and scales multiply
    /// per axis. The child's position is scaled, rotated and offset by the parent.
    /// Non-uniform parent scale combined with a rotated child cannot be expressed
    /// exactly as a TRS triple; the per-axis product is used.
    fn mul(self, parent: Self) -> Self {
        Self {
            position: parent.rotation * (parent.scale * self.position) + parent.position,
            rotation: parent.rotation * self.rotation,
            scale: parent.scale * self.scale,
        }
    }
}

impl MulAssign for Transform {
    fn mul_assign(&mut self, parent: Self) {
        *self = *self * parent;
    }
}
