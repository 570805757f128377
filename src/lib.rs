//! Small 2D rigid-body physics core.
//!
//! Circles and convex polygons, a narrow phase built on separating axes and
//! face clipping, a sequential impulse solver with Coulomb friction, and a
//! fixed-step world that owns every body.

pub mod math;
pub mod objects;
pub mod constraints;
pub mod integration;
pub mod collision;
pub mod shapes;
pub mod world;
pub mod common;

// Re-export key types for easier use
pub use math::{Mat2, Vec2};
pub use objects::{BodyHandle, RigidBody};
pub use shapes::{Circle, Polygon, Shape, ShapeKind};
pub use collision::{Contact, Manifold};
pub use world::{FrameClock, ManualClock, MonotonicClock, PhysicsWorld, StepStats, WorldConfig};
pub use common::{Material, PhysicsError, Result};
