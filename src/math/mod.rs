pub mod mat2;
pub mod vec2;

pub use mat2::Mat2;
pub use vec2::Vec2;

/// Shared numerical tolerance for the narrow phase and the solver.
pub const EPSILON: f64 = 1e-6;
