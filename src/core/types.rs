//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Simulation tick counter
pub type Tick = u64;

/// Index-based handle into the simulation's agent slab
///
/// Tiles hold an `AgentId` back-reference instead of an owning pointer,
/// so the grid and the agent list never form a reference cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl AgentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// 2D position or direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 2D cross product; sign gives turn direction
    pub fn cross(&self, other: &Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn distance(&self, other: &Self) -> f32 {
        (*self - *other).length()
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        (*self - *other).length_squared()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0001 {
            Self { x: self.x / len, y: self.y / len }
        } else {
            Self::default()
        }
    }

    /// Left-hand normal (for a facing direction, the direction of the left flank)
    pub fn left(&self) -> Self {
        Self { x: self.y, y: -self.x }
    }

    pub fn rotated(&self, radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }
}

/// Unsigned angle between two directions, in radians
pub fn angle_between(a: Vec2, b: Vec2) -> f32 {
    a.normalize().dot(&b.normalize()).clamp(-1.0, 1.0).acos()
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

impl std::ops::SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self { x: self.x * rhs, y: self.y * rhs }
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self { x: -self.x, y: -self.y }
    }
}

/// Centered circle, every agent's collision envelope
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    /// Radius is clamped to be non-negative.
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius: radius.max(0.0) }
    }

    pub fn overlaps(&self, other: &Circle) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(&other.center) < reach * reach
    }

    /// Penetration depth of two overlapping circles (<= 0 when apart)
    pub fn overlap_depth(&self, other: &Circle) -> f32 {
        self.radius + other.radius - self.center.distance(&other.center)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.center.distance_squared(&point) <= self.radius * self.radius
    }

    /// 1.0 at the center falling linearly to 0.0 at the rim and beyond
    pub fn closeness(&self, point: Vec2) -> f32 {
        if self.radius <= 0.0 {
            return 0.0;
        }
        (1.0 - self.center.distance(&point) / self.radius).max(0.0)
    }

    pub fn bounding_rect(&self) -> Rect {
        Rect::from_center(self.center, self.radius * 2.0, self.radius * 2.0)
    }
}

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(center: Vec2, w: f32, h: f32) -> Self {
        Self { x: center.x - w * 0.5, y: center.y - h * 0.5, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w * 0.5, self.y + self.h * 0.5)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right > x && bottom > y {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }

    /// Nearest point inside the rectangle (used for boundary containment)
    pub fn clamp_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.clamp(self.x, self.right()), p.y.clamp(self.y, self.bottom()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_ops() {
        let a = Vec2::new(3.0, 4.0);
        assert!((a.length() - 5.0).abs() < 1e-6);
        let n = a.normalize();
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
    }

    #[test]
    fn test_left_normal_is_perpendicular() {
        let d = Vec2::new(0.6, 0.8);
        assert!(d.dot(&d.left()).abs() < 1e-6);
    }

    #[test]
    fn test_rotated_quarter_turn() {
        let d = Vec2::new(1.0, 0.0).rotated(std::f32::consts::FRAC_PI_2);
        assert!(d.x.abs() < 1e-6);
        assert!((d.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_angle_between_opposed() {
        let a = Vec2::new(1.0, 0.0);
        let b = Vec2::new(-1.0, 0.0);
        assert!((angle_between(a, b) - std::f32::consts::PI).abs() < 1e-5);
    }

    #[test]
    fn test_circle_radius_clamped() {
        let c = Circle::new(Vec2::ZERO, -4.0);
        assert_eq!(c.radius, 0.0);
    }

    #[test]
    fn test_circle_overlap() {
        let a = Circle::new(Vec2::new(0.0, 0.0), 10.0);
        let b = Circle::new(Vec2::new(15.0, 0.0), 10.0);
        assert!(a.overlaps(&b));
        assert!((a.overlap_depth(&b) - 5.0).abs() < 1e-5);
        let c = Circle::new(Vec2::new(30.0, 0.0), 10.0);
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_circle_closeness_bounds() {
        let c = Circle::new(Vec2::ZERO, 100.0);
        assert!((c.closeness(Vec2::ZERO) - 1.0).abs() < 1e-6);
        assert_eq!(c.closeness(Vec2::new(200.0, 0.0)), 0.0);
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        let i = a.intersection(&b).unwrap();
        assert_eq!((i.x, i.y, i.w, i.h), (5.0, 5.0, 5.0, 5.0));
        let c = Rect::new(20.0, 20.0, 5.0, 5.0);
        assert!(a.intersection(&c).is_none());
    }

    #[test]
    fn test_rect_clamp_point() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        let p = r.clamp_point(Vec2::new(-5.0, 20.0));
        assert_eq!(p, Vec2::new(0.0, 10.0));
    }
}
