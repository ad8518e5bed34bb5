//! Animatable channel types
//!
//! Springs integrate any value implementing [`Animatable`]. Scalars, 2D and 3D
//! vectors are provided; the solver applies the same scalar recurrence to
//! every component through the arithmetic operators.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

/// A value a spring can drive.
pub trait Animatable:
    Copy
    + Debug
    + PartialEq
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<f32, Output = Self>
    + 'static
{
    /// Number of scalar components
    const COMPONENTS: usize;

    /// Additive identity
    const ZERO: Self;

    /// Read component `index` (0-based, `index < COMPONENTS`)
    fn component(&self, index: usize) -> f32;

    /// Build a value from per-component samples
    fn from_components(f: impl FnMut(usize) -> f32) -> Self;

    /// Build a value from a slice; missing components are zero
    fn from_slice(values: &[f32]) -> Self {
        Self::from_components(|i| values.get(i).copied().unwrap_or(0.0))
    }

    /// Euclidean length
    fn magnitude(&self) -> f32 {
        (0..Self::COMPONENTS)
            .map(|i| {
                let c = self.component(i);
                c * c
            })
            .sum::<f32>()
            .sqrt()
    }

    fn is_finite(&self) -> bool {
        (0..Self::COMPONENTS).all(|i| self.component(i).is_finite())
    }

    /// Linear interpolation toward `other`
    fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Animatable for f32 {
    const COMPONENTS: usize = 1;
    const ZERO: Self = 0.0;

    #[inline]
    fn component(&self, _index: usize) -> f32 {
        *self
    }

    fn from_components(mut f: impl FnMut(usize) -> f32) -> Self {
        f(0)
    }

    fn magnitude(&self) -> f32 {
        self.abs()
    }
}

/// 2D vector
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const ONE: Vec2 = Vec2 { x: 1.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl Animatable for Vec2 {
    const COMPONENTS: usize = 2;
    const ZERO: Self = Vec2::ZERO;

    fn component(&self, index: usize) -> f32 {
        match index {
            0 => self.x,
            _ => self.y,
        }
    }

    fn from_components(mut f: impl FnMut(usize) -> f32) -> Self {
        Vec2::new(f(0), f(1))
    }

    fn magnitude(&self) -> f32 {
        self.length()
    }
}

/// 3D vector, used for positions and euler rotations (degrees)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };
    pub const ONE: Vec3 = Vec3 {
        x: 1.0,
        y: 1.0,
        z: 1.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn dot(&self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl Animatable for Vec3 {
    const COMPONENTS: usize = 3;
    const ZERO: Self = Vec3::ZERO;

    fn component(&self, index: usize) -> f32 {
        match index {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    fn from_components(mut f: impl FnMut(usize) -> f32) -> Self {
        Vec3::new(f(0), f(1), f(2))
    }

    fn magnitude(&self) -> f32 {
        self.length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_pads_missing_components() {
        assert_eq!(Vec3::from_slice(&[1.0, 2.0]), Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(Vec2::from_slice(&[4.0, 5.0, 6.0]), Vec2::new(4.0, 5.0));
        assert_eq!(f32::from_slice(&[]), 0.0);
    }

    #[test]
    fn test_lerp_is_componentwise() {
        let a = Vec3::new(0.0, 10.0, -2.0);
        let b = Vec3::new(1.0, 20.0, 2.0);
        assert_eq!(a.lerp(b, 0.5), Vec3::new(0.5, 15.0, 0.0));
        assert_eq!(2.0f32.lerp(4.0, 0.25), 2.5);
    }

    #[test]
    fn test_magnitude() {
        assert_eq!((-3.0f32).magnitude(), 3.0);
        assert_eq!(Vec2::new(3.0, 4.0).magnitude(), 5.0);
        assert!(!Vec3::new(f32::NAN, 0.0, 0.0).is_finite());
    }
}
