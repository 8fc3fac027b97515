use serde::{Deserialize, Serialize};

use crate::channel::Flavor;

/// Parameters of one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Neutrino flavor at the time of production in the supernova.
    pub flavor: Flavor,
    /// Constant factor folding in oscillation probability, supernova
    /// distance and detector size. The channel's targets per molecule are
    /// multiplied in separately.
    pub scale: f64,
    /// Requested start time in ms; `None` uses the flux input's own range.
    pub starttime: Option<f64>,
    /// Requested end time in ms; `None` uses the flux input's own range.
    pub endtime: Option<f64>,
    /// Width of the time bins in ms.
    pub bin_width: f64,
    /// Detection threshold in MeV (3 MeV kinetic energy plus the electron
    /// rest mass for Hyper-Kamiokande). Sets the lowest energy slice of the
    /// expected-counts report and the threshold accounting.
    pub detection_threshold: f64,
    /// Fixed RNG seed for reproducible runs; `None` seeds from entropy.
    pub seed: Option<u64>,
    /// 0 is silent; higher values print progress more often.
    pub verbose: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            flavor: Flavor::EBar,
            scale: 1.0,
            starttime: None,
            endtime: None,
            bin_width: 1.0,
            detection_threshold: 3.511,
            seed: None,
            verbose: 0,
        }
    }
}
