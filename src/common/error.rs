use thiserror::Error;

/// Errors surfaced by body construction, world configuration and the
/// handle/index based accessors. Nothing inside a simulation step fails.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },

    #[error("body handle does not refer to a live body")]
    StaleHandle,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),
}

pub type Result<T> = std::result::Result<T, PhysicsError>;
