use super::vec2::Vec2;
use std::ops::Mul;

/// A 2x2 rotation matrix, stored row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat2 {
    pub m00: f64,
    pub m01: f64,
    pub m10: f64,
    pub m11: f64,
}

impl Mat2 {
    pub const IDENTITY: Mat2 = Mat2 { m00: 1.0, m01: 0.0, m10: 0.0, m11: 1.0 };

    /// Counter-clockwise rotation by `radians`.
    pub fn from_angle(radians: f64) -> Self {
        let (s, c) = radians.sin_cos();
        Self { m00: c, m01: -s, m10: s, m11: c }
    }

    pub fn set_angle(&mut self, radians: f64) {
        *self = Self::from_angle(radians);
    }

    /// For a rotation this is also the inverse.
    pub fn transpose(self) -> Self {
        Self { m00: self.m00, m01: self.m10, m10: self.m01, m11: self.m11 }
    }

    pub fn mul_vec(self, v: Vec2) -> Vec2 {
        Vec2::new(self.m00 * v.x + self.m01 * v.y, self.m10 * v.x + self.m11 * v.y)
    }
}

impl Default for Mat2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Vec2> for Mat2 {
    type Output = Vec2;

    fn mul(self, v: Vec2) -> Vec2 {
        self.mul_vec(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    const EPSILON: f64 = 1e-10;

    #[test]
    fn test_mat2_identity() {
        let p = Vec2::new(5.0, -3.0);
        assert_eq!(Mat2::IDENTITY * p, p);
        assert_eq!(Mat2::from_angle(0.0), Mat2::IDENTITY);
    }

    #[test]
    fn test_mat2_rotation_90_deg() {
        let m = Mat2::from_angle(PI / 2.0);
        let r = m * Vec2::new(1.0, 0.0);
        assert!(r.x.abs() < EPSILON);
        assert!((r.y - 1.0).abs() < EPSILON);

        let r2 = m * Vec2::new(0.0, 1.0);
        assert!((r2.x - -1.0).abs() < EPSILON);
        assert!(r2.y.abs() < EPSILON);
    }

    #[test]
    fn test_mat2_rotation_arbitrary_angle() {
        // (2, 1) rotated by atan2(3, 4): cos = 0.8, sin = 0.6
        let a = Mat2::from_angle(3.0f64.atan2(4.0)) * Vec2::new(2.0, 1.0);
        assert!((a.x - 1.0).abs() < EPSILON);
        assert!((a.y - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_mat2_transpose_inverts_rotation() {
        let m = Mat2::from_angle(PI / 4.0);
        let local = Vec2::new(1.0, 1.0);
        let back = m.transpose() * (m * local);
        assert!((back.x - local.x).abs() < EPSILON);
        assert!((back.y - local.y).abs() < EPSILON);
    }

    #[test]
    fn test_mat2_set_angle() {
        let mut m = Mat2::IDENTITY;
        m.set_angle(PI);
        let r = m * Vec2::new(1.0, 0.0);
        assert!((r.x - -1.0).abs() < EPSILON);
        assert!(r.y.abs() < EPSILON);
    }
}
