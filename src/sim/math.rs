use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// Single-precision 3-vector. World space is Y-up; track "forward" at rest is -Z.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Float3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Float3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);
    pub const DOWN: Self = Self::new(0.0, -1.0, 0.0);
    pub const RIGHT: Self = Self::new(1.0, 0.0, 0.0);
    pub const BACK: Self = Self::new(0.0, 0.0, -1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    pub fn magnitude(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or zero for degenerate input.
    pub fn normalize(self) -> Self {
        let len = self.magnitude();
        if len < f32::EPSILON {
            Self::ZERO
        } else {
            self * (1.0 / len)
        }
    }

    /// Component-wise linear blend, `t = 0` gives `self`.
    pub fn lerp(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Add for Float3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Float3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Float3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Float3 {
    type Output = Self;
    fn mul(self, k: f32) -> Self {
        Self::new(self.x * k, self.y * k, self.z * k)
    }
}

impl Neg for Float3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

/// Unit quaternion, `(x, y, z)` vector part and `w` scalar part.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians about `axis` (normalized here).
    pub fn from_axis_angle(axis: Float3, angle: f32) -> Self {
        let (s, c) = (angle * 0.5).sin_cos();
        let n = axis.normalize();
        Self::new(n.x * s, n.y * s, n.z * s, c)
    }

    /// Rotates `v` using the two-cross-product form.
    pub fn mul_vec(self, v: Float3) -> Float3 {
        let q = Float3::new(self.x, self.y, self.z);
        let t = q.cross(v);
        v + t * (2.0 * self.w) + q.cross(t) * 2.0
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Hamilton product; `a * b` applies `b` first.
impl Mul for Quaternion {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

/// Column-major 3x3 matrix, used for rigid re-anchoring of copied paths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3 {
    pub cols: [Float3; 3],
}

impl Matrix3 {
    pub const fn from_columns(c0: Float3, c1: Float3, c2: Float3) -> Self {
        Self { cols: [c0, c1, c2] }
    }

    pub fn transpose(&self) -> Self {
        let [a, b, c] = self.cols;
        Self::from_columns(
            Float3::new(a.x, b.x, c.x),
            Float3::new(a.y, b.y, c.y),
            Float3::new(a.z, b.z, c.z),
        )
    }

    pub fn mul_vec(&self, v: Float3) -> Float3 {
        let [a, b, c] = self.cols;
        a * v.x + b * v.y + c * v.z
    }

    pub fn mul_mat(&self, rhs: &Matrix3) -> Self {
        let [r0, r1, r2] = rhs.cols;
        Self::from_columns(self.mul_vec(r0), self.mul_vec(r1), self.mul_vec(r2))
    }
}
