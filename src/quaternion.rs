//! Unit quaternions for representing 3D rotations.
//!
//! This module provides [`Quaternion`], a four-component rotation value with:
//!
//! - Construction from axis-angle pairs, Euler angles and rotation matrices
//! - Hamilton product composition and vector rotation through the `*` operator
//! - Conversion back to Euler angles and 4×4 matrices
//! - Linear and spherical interpolation
//!
//! # Conventions
//!
//! Quaternions are stored as `(x, y, z, w)` where `w` is the real part.
//! Composition follows the Hamilton product: `a * b` applies `b` first, then `a`,
//! so that `(a * b).to_matrix() == a.to_matrix() * b.to_matrix()`.
//!
//! Euler angles are radians and always composed as `yaw(Y) * pitch(X) * roll(Z)`:
//! roll is applied to a vector first, then pitch, then yaw.
//!
//! # Example
//!
//! ```
//! use rigid3d::{Quaternion, Vec3};
//!
//! // Half a turn around the up axis flips X
//! let half_turn = Quaternion::angle_axis(std::f32::consts::PI, Vec3::Y).unwrap();
//! let flipped = half_turn * Vec3::X;
//! assert!((flipped - Vec3::NEG_X).length() < 1e-5);
//! ```

use std::fmt;
use std::ops::{Index, Mul, MulAssign, Neg};

use approx::{AbsDiffEq, RelativeEq, UlpsEq};
use glam::{Mat4, Vec3, Vec4};

use crate::error::{MathError, MathResult};

/// Tolerance on `|q| - 1` for a quaternion to count as a rotation.
pub const NORMALIZED_EPSILON: f32 = 1e-5;

/// Below `1 - SLERP_THRESHOLD` of angular separation, [`Quaternion::slerp`] falls
/// back to [`Quaternion::lerp`].
pub const SLERP_THRESHOLD: f32 = 1e-5;

/// Lengths at or below this are treated as zero when normalizing axes and scales.
pub const DEGENERATE_EPSILON: f32 = 1e-6;

/// A rotation quaternion `w + xi + yj + zk`.
///
/// Raw constructors accept any four components, so a quaternion may be non-unit
/// transiently. Every rotation-producing constructor returns a unit quaternion
/// (within [`NORMALIZED_EPSILON`]), and operations that need a rotation either
/// normalize ([`inverse`](Self::inverse)) or reject non-unit input
/// ([`quaternion_to_matrix`](Self::quaternion_to_matrix)).
///
/// The struct is `#[repr(C)]` and [`bytemuck::Pod`], so it can be written to GPU
/// buffers directly as four `f32`s.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Quaternion {
    /// Coefficient of `i`.
    pub x: f32,
    /// Coefficient of `j`.
    pub y: f32,
    /// Coefficient of `k`.
    pub z: f32,
    /// Real part.
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    /// The rotation that leaves every vector unchanged.
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Creates a quaternion from raw components. No normalization is applied.
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Builds a rotation from Euler angles in radians.
    ///
    /// The result is `yaw(y) * pitch(x) * roll(z)`, with yaw about [`Vec3::Y`],
    /// pitch about [`Vec3::X`] and roll about [`Vec3::Z`]. Applied to a vector,
    /// roll acts first, then pitch, then yaw. This order is fixed; reordering the
    /// factors gives a different rotation.
    ///
    /// # Example
    ///
    /// ```
    /// use rigid3d::{Quaternion, Vec3};
    /// use std::f32::consts::FRAC_PI_2;
    ///
    /// // Roll 90° takes X to Y, then yaw 90° leaves Y alone
    /// let q = Quaternion::euler(0.0, FRAC_PI_2, FRAC_PI_2);
    /// assert!((q * Vec3::X - Vec3::Y).length() < 1e-5);
    /// ```
    pub fn euler(x: f32, y: f32, z: f32) -> Self {
        let yaw = Self::from_unit_axis(Vec3::Y, y);
        let pitch = Self::from_unit_axis(Vec3::X, x);
        let roll = Self::from_unit_axis(Vec3::Z, z);
        yaw * pitch * roll
    }

    /// Same as [`Quaternion::euler`] with the angles packed in a vector.
    pub fn from_euler_vec(angles: Vec3) -> Self {
        Self::euler(angles.x, angles.y, angles.z)
    }

    /// Builds a rotation of `angle` radians around `axis`.
    ///
    /// The axis does not need to be normalized, but it must have a usable length.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::DegenerateAxis`] if `axis` is (nearly) zero or not finite.
    pub fn angle_axis(angle: f32, axis: Vec3) -> MathResult<Self> {
        let length = axis.length();
        if !length.is_finite() || length <= DEGENERATE_EPSILON {
            return Err(MathError::DegenerateAxis { length });
        }
        Self::from_unit_axis(axis / length, angle).normalized()
    }

    /// Axis-angle construction for axes already known to be unit length.
    fn from_unit_axis(axis: Vec3, angle: f32) -> Self {
        let (sin, cos) = (angle * 0.5).sin_cos();
        Self::new(axis.x * sin, axis.y * sin, axis.z * sin, cos)
    }

    /// Returns the inverse rotation.
    ///
    /// For a unit quaternion this is the conjugate. Non-unit input is normalized
    /// first, so the result is always a unit quaternion.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::ZeroMagnitude`] for the zero quaternion.
    pub fn inverse(value: Self) -> MathResult<Self> {
        if value.is_normalized() {
            Ok(value.conjugate())
        } else {
            Ok(value.normalized()?.conjugate())
        }
    }

    /// Four-component dot product.
    ///
    /// For unit quaternions this is the cosine of half the angle between the two
    /// rotations.
    pub fn dot(a: Self, b: Self) -> f32 {
        a.x * b.x + a.y * b.y + a.z * b.z + a.w * b.w
    }

    /// Extracts the rotation stored in the upper-left 3×3 block of `mat`.
    ///
    /// When the trace is positive the real part is the largest component and is
    /// computed directly. Otherwise the largest diagonal entry picks which
    /// imaginary component to solve for first, which keeps the divisor away from
    /// zero. Ties go to the first axis in X, Y, Z order.
    ///
    /// The block is assumed to be a pure rotation. The result is normalized, so
    /// small drift in the input is absorbed.
    pub fn matrix_to_quaternion(mat: &Mat4) -> Self {
        let m = mat.to_cols_array();
        // m[col * 4 + row]
        let (m00, m10, m20) = (m[0], m[1], m[2]);
        let (m01, m11, m21) = (m[4], m[5], m[6]);
        let (m02, m12, m22) = (m[8], m[9], m[10]);

        let trace = m00 + m11 + m22;
        let q = if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            Self::new((m21 - m12) * s, (m02 - m20) * s, (m10 - m01) * s, 0.25 / s)
        } else {
            let mut pivot = 0;
            let mut largest = m00;
            if m11 > largest {
                pivot = 1;
                largest = m11;
            }
            if m22 > largest {
                pivot = 2;
            }

            match pivot {
                0 => {
                    let s = (1.0 + m00 - m11 - m22).sqrt() * 2.0;
                    Self::new(
                        0.25 * s,
                        (m01 + m10) / s,
                        (m02 + m20) / s,
                        (m21 - m12) / s,
                    )
                }
                1 => {
                    let s = (1.0 - m00 + m11 - m22).sqrt() * 2.0;
                    Self::new(
                        (m01 + m10) / s,
                        0.25 * s,
                        (m12 + m21) / s,
                        (m02 - m20) / s,
                    )
                }
                _ => {
                    let s = (1.0 - m00 - m11 + m22).sqrt() * 2.0;
                    Self::new(
                        (m02 + m20) / s,
                        (m12 + m21) / s,
                        0.25 * s,
                        (m10 - m01) / s,
                    )
                }
            }
        };

        q.normalized().unwrap_or(q)
    }

    /// Builds the 4×4 rotation matrix for `value`.
    ///
    /// The translation column and bottom row are those of the identity.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::NotNormalized`] unless `value` is a unit quaternion.
    /// A non-unit quaternion would produce a matrix that also scales.
    pub fn quaternion_to_matrix(value: Self) -> MathResult<Mat4> {
        if !value.is_normalized() {
            return Err(MathError::NotNormalized {
                magnitude: value.magnitude(),
            });
        }

        let Self { x, y, z, w } = value;
        let (xx, yy, zz) = (x * x, y * y, z * z);
        let (xy, xz, yz) = (x * y, x * z, y * z);
        let (xw, yw, zw) = (x * w, y * w, z * w);

        #[rustfmt::skip]
        let cols = [
            1.0 - 2.0 * (yy + zz), 2.0 * (xy + zw),       2.0 * (xz - yw),       0.0,
            2.0 * (xy - zw),       1.0 - 2.0 * (xx + zz), 2.0 * (yz + xw),       0.0,
            2.0 * (xz + yw),       2.0 * (yz - xw),       1.0 - 2.0 * (xx + yy), 0.0,
            0.0,                   0.0,                   0.0,                   1.0,
        ];
        Ok(Mat4::from_cols_array(&cols))
    }

    /// Method form of [`Quaternion::quaternion_to_matrix`].
    pub fn to_matrix(&self) -> MathResult<Mat4> {
        Self::quaternion_to_matrix(*self)
    }

    /// Applies an extra rotation given as Euler angles, in local space.
    ///
    /// Equivalent to `*self = *self * Quaternion::from_euler_vec(angles)`, with the
    /// product renormalized to unit length.
    pub fn rotate(&mut self, angles: Vec3) {
        let rotated = *self * Self::from_euler_vec(angles);
        *self = rotated.normalized().unwrap_or(rotated);
    }

    /// Same as [`Quaternion::rotate`] with separate angles.
    pub fn rotate_xyz(&mut self, x: f32, y: f32, z: f32) {
        self.rotate(Vec3::new(x, y, z));
    }

    /// Sum of the squared components.
    pub fn magnitude_squared(&self) -> f32 {
        Self::dot(*self, *self)
    }

    /// Euclidean length over all four components.
    pub fn magnitude(&self) -> f32 {
        self.magnitude_squared().sqrt()
    }

    /// Scales this quaternion to unit length in place.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::ZeroMagnitude`] and leaves `self` untouched if the
    /// magnitude is zero.
    pub fn normalize(&mut self) -> MathResult<()> {
        *self = self.normalized()?;
        Ok(())
    }

    /// Returns a unit-length copy of this quaternion.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::ZeroMagnitude`] if the magnitude is zero.
    pub fn normalized(&self) -> MathResult<Self> {
        let magnitude = self.magnitude();
        if magnitude.is_nan() || magnitude <= 0.0 {
            return Err(MathError::ZeroMagnitude);
        }
        Ok(Self::new(
            self.x / magnitude,
            self.y / magnitude,
            self.z / magnitude,
            self.w / magnitude,
        ))
    }

    /// Whether the magnitude is within [`NORMALIZED_EPSILON`] of one.
    pub fn is_normalized(&self) -> bool {
        (self.magnitude() - 1.0).abs() <= NORMALIZED_EPSILON
    }

    /// Recovers the Euler angles `(pitch, yaw, roll)` passed to [`Quaternion::euler`].
    ///
    /// Pitch comes from `asin`, yaw and roll from `atan2`. Near ±90° of pitch the
    /// yaw and roll axes line up (gimbal lock) and only their combination is
    /// recoverable; this is a property of Euler angles, not a defect of the
    /// extraction.
    pub fn euler_angles(&self) -> Vec3 {
        let Self { x, y, z, w } = *self;
        let (xx, yy, zz, ww) = (x * x, y * y, z * z, w * w);

        let pitch = (2.0 * (w * x - y * z)).clamp(-1.0, 1.0).asin();
        let yaw = (2.0 * (x * z + w * y)).atan2(ww - xx - yy + zz);
        let roll = (2.0 * (x * y + w * z)).atan2(ww - xx + yy - zz);

        Vec3::new(pitch, yaw, roll)
    }

    /// Associated form of [`Quaternion::euler_angles`].
    pub fn euler_angles_of(value: Self) -> Vec3 {
        value.euler_angles()
    }

    /// The imaginary part `(x, y, z)`.
    pub fn vector_part(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Negates the imaginary part. For unit quaternions this is the inverse.
    pub fn conjugate(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Rotation angle in radians, in `[0, 2π]`.
    pub fn angle(&self) -> f32 {
        self.w.clamp(-1.0, 1.0).acos() * 2.0
    }

    /// Rotation axis. Returns [`Vec3::Z`] when the rotation is (close to) the
    /// identity and the axis is undefined.
    pub fn axis(&self) -> Vec3 {
        let sin_sq = 1.0 - self.w * self.w;
        if sin_sq <= 0.0 {
            return Vec3::Z;
        }
        self.vector_part() / sin_sq.sqrt()
    }

    /// Overwrites all four components.
    pub fn set(&mut self, x: f32, y: f32, z: f32, w: f32) {
        *self = Self::new(x, y, z, w);
    }

    /// Copies the components of `value`.
    pub fn set_from(&mut self, value: Self) {
        *self = value;
    }

    /// Component by index: 0..=3 map to `x`, `y`, `z`, `w`. Any other index yields `0.0`.
    pub fn component(&self, index: usize) -> f32 {
        self[index]
    }

    /// Whether both quaternions describe the same rotation.
    ///
    /// `q` and `-q` encode the same rotation, so the test is on `|dot|` with a
    /// tolerance of [`NORMALIZED_EPSILON`]. Both inputs are expected to be unit.
    pub fn is_same_rotation_as(&self, other: &Self) -> bool {
        Self::dot(*self, *other).abs() >= 1.0 - NORMALIZED_EPSILON
    }

    /// Component-wise linear interpolation, renormalized.
    ///
    /// `t` is not clamped.
    ///
    /// # Errors
    ///
    /// Returns [`MathError::ZeroMagnitude`] when the blend passes through zero,
    /// e.g. halfway between `q` and `-q`.
    pub fn lerp(first: Self, second: Self, t: f32) -> MathResult<Self> {
        Self::new(
            first.x + (second.x - first.x) * t,
            first.y + (second.y - first.y) * t,
            first.z + (second.z - first.z) * t,
            first.w + (second.w - first.w) * t,
        )
        .normalized()
    }

    /// Spherical linear interpolation along the shortest arc.
    ///
    /// When the two rotations are nearly identical the arc's sine term vanishes,
    /// so the blend falls back to [`Quaternion::lerp`].
    ///
    /// # Example
    ///
    /// ```
    /// use rigid3d::{Quaternion, Vec3};
    /// use std::f32::consts::FRAC_PI_2;
    ///
    /// let quarter = Quaternion::angle_axis(FRAC_PI_2, Vec3::Z).unwrap();
    /// let eighth = Quaternion::slerp(Quaternion::IDENTITY, quarter, 0.5).unwrap();
    /// assert!((eighth.angle() - FRAC_PI_2 / 2.0).abs() < 1e-5);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`MathError::ZeroMagnitude`] if an input is the zero quaternion.
    pub fn slerp(first: Self, second: Self, t: f32) -> MathResult<Self> {
        let mut cos_theta = Self::dot(first, second);
        let mut end = second;
        if cos_theta < 0.0 {
            end = -second;
            cos_theta = -cos_theta;
        }

        if cos_theta > 1.0 - SLERP_THRESHOLD {
            return Self::lerp(first, end, t);
        }

        let theta = cos_theta.acos();
        let sin_theta = theta.sin();
        let a = ((1.0 - t) * theta).sin() / sin_theta;
        let b = (t * theta).sin() / sin_theta;

        Self::new(
            first.x * a + end.x * b,
            first.y * a + end.y * b,
            first.z * a + end.z * b,
            first.w * a + end.w * b,
        )
        .normalized()
    }
}

impl Mul for Quaternion {
    type Output = Self;

    /// Hamilton product: the result applies `rhs` first, then `self`.
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

impl MulAssign for Quaternion {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Mul<Vec3> for Quaternion {
    type Output = Vec3;

    /// Rotates `v` without building a matrix.
    ///
    /// Expands `q v q*` as `v + w t + u × t` with `u` the vector part and
    /// `t = 2 (u × v)`. Assumes `self` is unit.
    fn mul(self, v: Vec3) -> Vec3 {
        let u = self.vector_part();
        let t = u.cross(v) * 2.0;
        v + t * self.w + u.cross(t)
    }
}

impl Neg for Quaternion {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl Index<usize> for Quaternion {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            3 => &self.w,
            _ => &0.0,
        }
    }
}

impl fmt::Display for Quaternion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quaternion {{x: {:.6}, y: {:.6}, z: {:.6}, w: {:.6}}}",
            self.x, self.y, self.z, self.w
        )
    }
}

impl From<Vec4> for Quaternion {
    fn from(v: Vec4) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }
}

impl From<Quaternion> for Vec4 {
    fn from(q: Quaternion) -> Self {
        Vec4::new(q.x, q.y, q.z, q.w)
    }
}

impl From<glam::Quat> for Quaternion {
    fn from(q: glam::Quat) -> Self {
        Self::new(q.x, q.y, q.z, q.w)
    }
}

impl From<Quaternion> for glam::Quat {
    fn from(q: Quaternion) -> Self {
        glam::Quat::from_xyzw(q.x, q.y, q.z, q.w)
    }
}

impl AbsDiffEq for Quaternion {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon)
            && self.y.abs_diff_eq(&other.y, epsilon)
            && self.z.abs_diff_eq(&other.z, epsilon)
            && self.w.abs_diff_eq(&other.w, epsilon)
    }
}

impl RelativeEq for Quaternion {
    fn default_max_relative() -> f32 {
        f32::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative)
            && self.y.relative_eq(&other.y, epsilon, max_relative)
            && self.z.relative_eq(&other.z, epsilon, max_relative)
            && self.w.relative_eq(&other.w, epsilon, max_relative)
    }
}

impl UlpsEq for Quaternion {
    fn default_max_ulps() -> u32 {
        f32::default_max_ulps()
    }

    fn ulps_eq(&self, other: &Self, epsilon: f32, max_ulps: u32) -> bool {
        self.x.ulps_eq(&other.x, epsilon, max_ulps)
            && self.y.ulps_eq(&other.y, epsilon, max_ulps)
            && self.z.ulps_eq(&other.z, epsilon, max_ulps)
            && self.w.ulps_eq(&other.w, epsilon, max_ulps)
    }
}
