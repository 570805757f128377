use crate::common::{PhysicsError, Result};
use crate::math::{Mat2, Vec2, EPSILON};
use std::f64::consts::PI;

/// Upper bound on the vertex count of any polygon shape.
pub const MAX_POLYGON_VERTICES: usize = 24;

const ONE_THIRD: f64 = 1.0 / 3.0;
const MIN_AREA: f64 = 1e-12;

/// Area, centroid and unit-density moment of inertia (about the centroid)
/// of a polygon outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MassProperties {
    pub area: f64,
    pub centroid: Vec2,
    pub inertia: f64,
}

/// A convex polygon in model space.
///
/// Vertices are stored counter-clockwise; `normals[i]` is the outward unit
/// normal of the edge `vertices[i] -> vertices[(i + 1) % n]`. The rotation
/// `transform` maps model space to world orientation and is kept in sync
/// with the owning body's orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vec2>,
    normals: Vec<Vec2>,
    transform: Mat2,
}

impl Polygon {
    /// Builds a polygon from a convex outline. Clockwise outlines are rewound
    /// so the face normals always point outward. Concave and self-intersecting
    /// outlines are rejected.
    pub fn new(mut vertices: Vec<Vec2>) -> Result<Self> {
        let n = vertices.len();
        if n < 3 {
            return Err(PhysicsError::InvalidGeometry(format!(
                "polygon needs at least 3 vertices, got {n}"
            )));
        }
        if n > MAX_POLYGON_VERTICES {
            return Err(PhysicsError::InvalidGeometry(format!(
                "polygon supports at most {MAX_POLYGON_VERTICES} vertices, got {n}"
            )));
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(PhysicsError::InvalidGeometry(
                "polygon vertices must be finite".into(),
            ));
        }

        let area = signed_area(&vertices);
        if area.abs() < MIN_AREA {
            return Err(PhysicsError::InvalidGeometry(
                "polygon vertices are collinear".into(),
            ));
        }
        if area < 0.0 {
            vertices.reverse();
        }
        if !is_convex(&vertices) {
            return Err(PhysicsError::InvalidGeometry(
                "polygon outline must be convex".into(),
            ));
        }

        let normals = face_normals(&vertices);
        Ok(Polygon {
            vertices,
            normals,
            transform: Mat2::IDENTITY,
        })
    }

    /// Regular polygon with `sides` vertices at distance `radius` from the
    /// origin, the first vertex at angle `facing`.
    pub fn regular(radius: f64, sides: usize, facing: f64) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(PhysicsError::InvalidGeometry(format!(
                "radius must be positive, got {radius}"
            )));
        }
        if !(3..=MAX_POLYGON_VERTICES).contains(&sides) {
            return Err(PhysicsError::InvalidGeometry(format!(
                "sides must be in 3..={MAX_POLYGON_VERTICES}, got {sides}"
            )));
        }

        let step = 2.0 * PI / sides as f64;
        let vertices = (0..sides)
            .map(|i| {
                let angle = facing + step * i as f64;
                Vec2::new(angle.cos() * radius, angle.sin() * radius)
            })
            .collect();
        Self::new(vertices)
    }

    /// Axis-aligned `width` x `height` box centred on the origin.
    pub fn rectangle(width: f64, height: f64) -> Result<Self> {
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(PhysicsError::InvalidGeometry(format!(
                "rectangle extents must be positive, got {width} x {height}"
            )));
        }

        let hw = width / 2.0;
        let hh = height / 2.0;
        Self::new(vec![
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
            Vec2::new(-hw, -hh),
        ])
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    pub fn transform(&self) -> Mat2 {
        self.transform
    }

    pub fn set_orientation(&mut self, radians: f64) {
        self.transform.set_angle(radians);
    }

    /// Index of the vertex following `index`, wrapping around.
    pub fn next_index(&self, index: usize) -> usize {
        if index + 1 < self.vertices.len() {
            index + 1
        } else {
            0
        }
    }

    /// World-space position of vertex `index` for a body at `position`.
    pub fn world_vertex(&self, position: Vec2, index: usize) -> Vec2 {
        position + self.transform * self.vertices[index]
    }

    /// Triangle-fan integration against the model-space origin.
    ///
    /// Each edge forms a triangle with the origin; signed areas accumulate
    /// into the total area, the area-weighted centroid and the second moment
    /// `(1/4)(1/3) * cross * (x1² + x1·x2 + x2² + y1² + y1·y2 + y2²)`.
    /// The returned inertia is shifted to the centroid.
    pub fn mass_properties(&self) -> MassProperties {
        let mut area = 0.0;
        let mut center = Vec2::ZERO;
        let mut inertia = 0.0;

        for (i, &p1) in self.vertices.iter().enumerate() {
            let p2 = self.vertices[self.next_index(i)];

            let cross = p1.cross(p2);
            let triangle_area = cross / 2.0;
            area += triangle_area;
            center += (p1 + p2) * (triangle_area * ONE_THIRD);

            let int_x2 = p1.x * p1.x + p2.x * p1.x + p2.x * p2.x;
            let int_y2 = p1.y * p1.y + p2.y * p1.y + p2.y * p2.y;
            inertia += (0.25 * ONE_THIRD * cross) * (int_x2 + int_y2);
        }

        let centroid = center * (1.0 / area);
        MassProperties {
            area,
            centroid,
            inertia: inertia - area * centroid.magnitude_squared(),
        }
    }

    /// Shifts every vertex by `-offset`. Normals are unaffected.
    pub(crate) fn translate(&mut self, offset: Vec2) {
        for v in &mut self.vertices {
            *v -= offset;
        }
    }

    /// Model-space vertex furthest along `direction`.
    pub fn support(&self, direction: Vec2) -> Vec2 {
        let mut best_projection = f64::NEG_INFINITY;
        let mut best_vertex = Vec2::ZERO;

        for &v in &self.vertices {
            let projection = v.dot(direction);
            if projection > best_projection {
                best_projection = projection;
                best_vertex = v;
            }
        }
        best_vertex
    }

    /// Strict containment test for a model-space point.
    pub fn contains_local(&self, point: Vec2) -> bool {
        self.vertices
            .iter()
            .zip(&self.normals)
            .all(|(&v, &n)| n.dot(point - v) < 0.0)
    }
}

fn signed_area(vertices: &[Vec2]) -> f64 {
    let n = vertices.len();
    let mut twice_area = 0.0;
    for i in 0..n {
        twice_area += vertices[i].cross(vertices[(i + 1) % n]);
    }
    twice_area / 2.0
}

/// Every vertex must lie on or inside each edge line of a counter-clockwise
/// outline. Catches self-intersecting stars as well as reflex corners.
fn is_convex(vertices: &[Vec2]) -> bool {
    let n = vertices.len();
    (0..n).all(|i| {
        let start = vertices[i];
        let edge = (vertices[(i + 1) % n] - start).normalize();
        vertices.iter().all(|&v| edge.cross(v - start) >= -EPSILON)
    })
}

fn face_normals(vertices: &[Vec2]) -> Vec<Vec2> {
    let n = vertices.len();
    (0..n)
        .map(|i| (vertices[(i + 1) % n] - vertices[i]).perpendicular_cw().normalize())
        .collect()
}
