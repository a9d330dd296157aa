//! Vehicle telemetry sources consumed by the responder role.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::protocol::Direction;

/// Where the responder gets a vehicle's current speed and direction from.
///
/// A real deployment backs this with the vehicle-tracking side of the
/// intersection; tests and the demo use the synthetic and fixed sources
/// below.
pub trait TelemetrySource {
    /// Current (speed in cm/s, direction) sample.
    fn sample(&mut self) -> (u8, Direction);
}

/// Synthesized telemetry: speed uniform in [50,200), direction uniform over
/// the three defined codes.
pub struct SyntheticTelemetry {
    rng: StdRng,
}

impl SyntheticTelemetry {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic variant for reproducible runs.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SyntheticTelemetry {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetrySource for SyntheticTelemetry {
    fn sample(&mut self) -> (u8, Direction) {
        let speed = self.rng.gen_range(50..200);
        let direction = Direction::ALL[self.rng.gen_range(0..Direction::ALL.len())];
        (speed, direction)
    }
}

/// Always returns the same sample. Test helper.
#[derive(Debug, Clone, Copy)]
pub struct FixedTelemetry {
    pub speed: u8,
    pub direction: Direction,
}

impl TelemetrySource for FixedTelemetry {
    fn sample(&mut self) -> (u8, Direction) {
        (self.speed, self.direction)
    }
}
