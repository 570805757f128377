pub mod circle;
pub mod polygon;

pub use circle::{Circle, CIRCLE_VERTICES};
pub use polygon::{MassProperties, Polygon, MAX_POLYGON_VERTICES};

use crate::math::Mat2;

/// Discriminant of a [`Shape`], handy for dispatch and introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Polygon,
}

/// Geometric shape of a rigid body.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Polygon(Polygon),
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Polygon(_) => ShapeKind::Polygon,
        }
    }

    /// The vertex outline: the polygon itself, or the circle's generated ring.
    pub fn outline(&self) -> &Polygon {
        match self {
            Shape::Circle(circle) => circle.ring(),
            Shape::Polygon(polygon) => polygon,
        }
    }

    pub(crate) fn outline_mut(&mut self) -> &mut Polygon {
        match self {
            Shape::Circle(circle) => circle.ring_mut(),
            Shape::Polygon(polygon) => polygon,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.outline().vertex_count()
    }

    pub fn transform(&self) -> Mat2 {
        self.outline().transform()
    }

    pub fn set_orientation(&mut self, radians: f64) {
        self.outline_mut().set_orientation(radians);
    }
}
