//! Surface properties that drive contact response.

/// Friction and bounciness of a body's surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Coulomb coefficient below which a contact sticks.
    pub static_friction: f64,
    /// Coulomb coefficient applied once a contact slides.
    pub dynamic_friction: f64,
    /// Coefficient of restitution. 0 = no bounce, 1 = perfectly elastic.
    pub restitution: f64,
}

impl Material {
    /// Creates a material, clamping every coefficient to be non-negative and
    /// restitution to at most 1.
    pub fn new(static_friction: f64, dynamic_friction: f64, restitution: f64) -> Self {
        Material {
            static_friction: static_friction.max(0.0),
            dynamic_friction: dynamic_friction.max(0.0),
            restitution: restitution.clamp(0.0, 1.0),
        }
    }

    /// Mixes the materials of two touching bodies with geometric means.
    pub fn combine(a: &Material, b: &Material) -> Material {
        Material {
            static_friction: (a.static_friction * b.static_friction).sqrt(),
            dynamic_friction: (a.dynamic_friction * b.dynamic_friction).sqrt(),
            restitution: (a.restitution * b.restitution).sqrt(),
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material {
            static_friction: 0.4,
            dynamic_friction: 0.2,
            restitution: 0.0,
        }
    }
}
