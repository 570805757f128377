use super::polygon::Polygon;
use crate::common::{PhysicsError, Result};

/// Number of vertices in the ring generated for every circle.
pub const CIRCLE_VERTICES: usize = 24;

/// A circle shape.
///
/// Collision response uses the analytic `radius`. The generated `ring` is a
/// regular 24-gon of the same radius; it drives mass/inertia computation and
/// vertex enumeration for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle {
    pub radius: f64,
    ring: Polygon,
}

impl Circle {
    pub fn new(radius: f64) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(PhysicsError::InvalidGeometry(format!(
                "circle radius must be positive, got {radius}"
            )));
        }
        Ok(Self {
            radius,
            ring: Polygon::regular(radius, CIRCLE_VERTICES, 0.0)?,
        })
    }

    pub fn ring(&self) -> &Polygon {
        &self.ring
    }

    pub(crate) fn ring_mut(&mut self) -> &mut Polygon {
        &mut self.ring
    }
}
