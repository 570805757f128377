use crate::common::{PhysicsError, Result};
use crate::math::Vec2;
use serde::{Deserialize, Serialize};

/// Tunables for a [`PhysicsWorld`](super::PhysicsWorld).
///
/// Every field has a default, so a JSON document only needs the fields it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World gravity in units/s². Positive y points down.
    pub gravity: Vec2,
    /// Fixed step length in seconds.
    pub time_step: f64,
    /// Impulse passes over all manifolds per step.
    pub solver_iterations: usize,
    /// Penetration tolerated before positional correction kicks in.
    pub penetration_allowance: f64,
    /// Fraction of the excess penetration removed each step.
    pub penetration_correction: f64,
    /// Capacity hint. Exceeding it logs a warning, nothing more.
    pub max_bodies: usize,
    /// Capacity hint for contacts per step.
    pub max_manifolds: usize,
    /// Seed for the random facing of regular polygons.
    pub polygon_seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, 9.81),
            time_step: 1.0 / 60.0,
            solver_iterations: 100,
            penetration_allowance: 0.05,
            penetration_correction: 0.4,
            max_bodies: 64,
            max_manifolds: 4096,
            polygon_seed: 0x853c_49e6_748f_ea9b,
        }
    }
}

impl WorldConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: WorldConfig =
            serde_json::from_str(json).map_err(|e| PhysicsError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.gravity.is_finite() {
            return Err(PhysicsError::InvalidConfig("gravity must be finite".into()));
        }
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "time_step must be positive, got {}",
                self.time_step
            )));
        }
        if self.solver_iterations == 0 {
            return Err(PhysicsError::InvalidConfig(
                "solver_iterations must be at least 1".into(),
            ));
        }
        if !(self.penetration_allowance.is_finite() && self.penetration_allowance >= 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "penetration_allowance must be non-negative, got {}",
                self.penetration_allowance
            )));
        }
        if !(self.penetration_correction > 0.0 && self.penetration_correction <= 1.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "penetration_correction must be in (0, 1], got {}",
                self.penetration_correction
            )));
        }
        Ok(())
    }
}
