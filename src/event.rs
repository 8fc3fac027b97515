use serde::{Deserialize, Serialize};

/// A single detected-particle event.
///
/// Times are in milliseconds relative to the flux input's reference point,
/// energies in MeV. The direction is a unit vector with the incoming
/// neutrino along +z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub time: f64,
    /// Particle Data Group ID of the outgoing particle (electron = 11,
    /// positron = -11).
    pub pid: i32,
    pub energy: f64,
    pub direction: [f64; 3],
}

impl Event {
    pub fn new(time: f64, pid: i32, energy: f64, direction: [f64; 3]) -> Self {
        Self {
            time,
            pid,
            energy,
            direction,
        }
    }
}
