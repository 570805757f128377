pub mod clock;
pub mod config;
pub mod physics_world;

pub use clock::{FrameClock, ManualClock, MonotonicClock};
pub use config::WorldConfig;
pub use physics_world::{PhysicsWorld, StepStats};
