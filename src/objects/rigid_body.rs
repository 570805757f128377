use crate::common::{Material, PhysicsError, Result};
use crate::math::Vec2;
use crate::shapes::{Circle, Polygon, Shape, ShapeKind};

#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    // Geometry, stored centroid-relative
    pub shape: Shape,
    pub material: Material,

    // Flags
    pub enabled: bool,
    pub use_gravity: bool,
    pub freeze_orientation: bool,
    pub(crate) is_grounded: bool,

    // Primary state
    pub position: Vec2, // World position of the center of mass
    orientation: f64,   // Radians, kept in sync with the shape transform
    pub linear_velocity: Vec2,
    pub angular_velocity: f64,

    // Accumulators, cleared at the end of every step
    pub force: Vec2,
    pub torque: f64,

    // Mass properties, derived from shape and density
    density: f64,
    mass: f64,
    inv_mass: f64,
    inertia: f64,
    inv_inertia: f64,
}

impl RigidBody {
    /// Builds a body from a shape and density. The shape outline is recentred
    /// so its centroid sits on the model-space origin, and the mass and
    /// inertia come from the triangle-fan integration of that outline. A
    /// density of zero yields a static body.
    pub fn new(position: Vec2, shape: Shape, density: f64) -> Result<Self> {
        if !(density.is_finite() && density >= 0.0) {
            return Err(PhysicsError::InvalidGeometry(format!(
                "density must be finite and non-negative, got {density}"
            )));
        }
        if !position.is_finite() {
            return Err(PhysicsError::InvalidGeometry(
                "body position must be finite".into(),
            ));
        }

        let mut shape = shape;
        let props = shape.outline().mass_properties();
        shape.outline_mut().translate(props.centroid);

        let mass = density * props.area;
        let inertia = density * props.inertia;

        Ok(Self {
            shape,
            material: Material::default(),
            enabled: true,
            use_gravity: true,
            freeze_orientation: false,
            is_grounded: false,
            position,
            orientation: 0.0,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
            density,
            mass,
            inv_mass: if mass != 0.0 { 1.0 / mass } else { 0.0 },
            inertia,
            inv_inertia: if inertia != 0.0 { 1.0 / inertia } else { 0.0 },
        })
    }

    /// Circle body. Mass and inertia come from the generated 24-vertex ring.
    pub fn new_circle(position: Vec2, radius: f64, density: f64) -> Result<Self> {
        Self::new(position, Shape::Circle(Circle::new(radius)?), density)
    }

    pub fn new_rectangle(position: Vec2, width: f64, height: f64, density: f64) -> Result<Self> {
        Self::new(position, Shape::Polygon(Polygon::rectangle(width, height)?), density)
    }

    /// Regular polygon body whose first vertex sits at angle `facing`.
    pub fn new_polygon(
        position: Vec2,
        radius: f64,
        sides: usize,
        density: f64,
        facing: f64,
    ) -> Result<Self> {
        Self::new(
            position,
            Shape::Polygon(Polygon::regular(radius, sides, facing)?),
            density,
        )
    }

    /// Convex polygon body from an arbitrary outline given relative to
    /// `origin`. The body is placed at the outline's centroid, so the
    /// vertices keep their world positions.
    pub fn from_vertices(origin: Vec2, vertices: Vec<Vec2>, density: f64) -> Result<Self> {
        let polygon = Polygon::new(vertices)?;
        let centroid = polygon.mass_properties().centroid;
        Self::new(origin + centroid, Shape::Polygon(polygon), density)
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    pub fn orientation(&self) -> f64 {
        self.orientation
    }

    /// Sets the orientation and rebuilds the shape's rotation transform.
    pub fn set_rotation(&mut self, radians: f64) {
        self.orientation = radians;
        self.shape.set_orientation(radians);
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn inv_mass(&self) -> f64 {
        self.inv_mass
    }

    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    pub fn inv_inertia(&self) -> f64 {
        self.inv_inertia
    }

    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// Whether a contact during the last step had this body on top.
    pub fn is_grounded(&self) -> bool {
        self.is_grounded
    }

    /// Applies a force at the center of mass.
    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Applies a force at a world-space point, generating torque as well.
    pub fn apply_force_at_point(&mut self, force: Vec2, point_world: Vec2) {
        self.force += force;
        self.torque += (point_world - self.position).cross(force);
    }

    pub fn add_torque(&mut self, torque: f64) {
        self.torque += torque;
    }

    pub fn clear_accumulators(&mut self) {
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }

    /// Velocity of the material point currently at `point_world`.
    pub fn velocity_at(&self, point_world: Vec2) -> Vec2 {
        self.linear_velocity + Vec2::cross_scalar(self.angular_velocity, point_world - self.position)
    }

    /// World-space position of outline vertex `index`.
    pub fn shape_vertex(&self, index: usize) -> Result<Vec2> {
        let len = self.shape.vertex_count();
        if index >= len {
            return Err(PhysicsError::OutOfRange { index, len });
        }
        Ok(self.shape.outline().world_vertex(self.position, index))
    }

    /// Every outline vertex in world space, counter-clockwise.
    pub fn world_vertices(&self) -> Vec<Vec2> {
        let outline = self.shape.outline();
        (0..outline.vertex_count())
            .map(|i| outline.world_vertex(self.position, i))
            .collect()
    }
}
