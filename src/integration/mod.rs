pub mod integrator;

pub use integrator::{integrate_forces, integrate_velocity, wrap_angle};
