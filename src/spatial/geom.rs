//! Integer points and floating vectors
//!
//! Positions are integral game units. Motion is computed with `f64` vectors
//! and converted back with truncation toward zero, matching how the game
//! engine resolves movement.

use std::fmt;
use std::ops::{Add, AddAssign, Mul};

use serde::{Deserialize, Serialize};

/// Integer position. Ordering is lexicographic: x first, then y.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Unit vector pointing from `self` to `target` (zero when they coincide)
    pub fn direction_to(&self, target: &Self) -> Vect {
        Vect::new(
            target.x as f64 - self.x as f64,
            target.y as f64 - self.y as f64,
        )
        .normalize()
    }

    /// Translate by `v`, truncating each coordinate toward zero
    pub fn offset(&self, v: Vect) -> Self {
        Self {
            x: (self.x as f64 + v.x) as i32,
            y: (self.y as f64 + v.y) as i32,
        }
    }

    /// Move toward `target` by at most `step`, landing exactly on it when close enough
    pub fn step_toward(&self, target: &Self, step: f64) -> Self {
        if self.distance(target) > step {
            self.offset(self.direction_to(target) * step)
        } else {
            *target
        }
    }

    /// Clamp each axis independently into [0, corner.x] x [0, corner.y]
    pub fn clamp_to(&self, corner: Point) -> Self {
        Self {
            x: self.x.clamp(0, corner.x),
            y: self.y.clamp(0, corner.y),
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Floating direction / displacement vector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vect {
    pub x: f64,
    pub y: f64,
}

impl Vect {
    pub const ZERO: Vect = Vect { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction; a zero vector stays zero
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len != 0.0 {
            Self::new(self.x / len, self.y / len)
        } else {
            *self
        }
    }

    /// Rotated a quarter turn clockwise
    pub fn orthogonal(&self) -> Self {
        Self::new(self.y, -self.x)
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Both components within `eps` of zero
    pub fn is_near_zero(&self, eps: f64) -> bool {
        self.x.abs() <= eps && self.y.abs() <= eps
    }
}

impl Add for Vect {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vect {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Mul<f64> for Vect {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}
