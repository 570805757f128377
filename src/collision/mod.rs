pub mod detection;
pub mod manifold;

pub use detection::{circle_circle, circle_polygon, collide, polygon_circle, polygon_polygon};
pub use manifold::{Contact, Manifold, MAX_CONTACTS};
