pub mod error;
pub mod material;
pub mod rng;

pub use error::{PhysicsError, Result};
pub use material::Material;
pub use rng::Pcg32;
