use crate::common::Material;
use crate::math::Vec2;
use crate::objects::BodyHandle;

/// Most contact points a single manifold can carry.
pub const MAX_CONTACTS: usize = 2;

/// Result of a narrow-phase test between two shapes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from body A towards body B.
    pub normal: Vec2,
    pub penetration: f64,
    points: [Vec2; MAX_CONTACTS],
    count: usize,
}

impl Contact {
    pub fn single(normal: Vec2, penetration: f64, point: Vec2) -> Self {
        Self {
            normal,
            penetration,
            points: [point, Vec2::ZERO],
            count: 1,
        }
    }

    /// Builds a contact from up to two points. Extra points are ignored.
    pub fn with_points(normal: Vec2, penetration: f64, points: &[Vec2]) -> Self {
        let mut stored = [Vec2::ZERO; MAX_CONTACTS];
        let count = points.len().min(MAX_CONTACTS);
        stored[..count].copy_from_slice(&points[..count]);
        Self {
            normal,
            penetration,
            points: stored,
            count,
        }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points[..self.count]
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Same contact seen from the other body.
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// A contact between two bodies, ready for the solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Manifold {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub contact: Contact,
    /// Combined restitution, zeroed for resting contacts during initialization.
    pub restitution: f64,
    pub static_friction: f64,
    pub dynamic_friction: f64,
}

impl Manifold {
    pub fn new(body_a: BodyHandle, body_b: BodyHandle, contact: Contact) -> Self {
        Self {
            body_a,
            body_b,
            contact,
            restitution: 0.0,
            static_friction: 0.0,
            dynamic_friction: 0.0,
        }
    }

    pub fn normal(&self) -> Vec2 {
        self.contact.normal
    }

    pub fn penetration(&self) -> f64 {
        self.contact.penetration
    }

    pub fn contacts(&self) -> &[Vec2] {
        self.contact.points()
    }

    pub(crate) fn set_material(&mut self, material: Material) {
        self.restitution = material.restitution;
        self.static_friction = material.static_friction;
        self.dynamic_friction = material.dynamic_friction;
    }
}
