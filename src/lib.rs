//! Monte Carlo event generator for supernova neutrino interactions in
//! water Cherenkov detectors.
//!
//! A [`Generator`] combines a [`FluxProvider`] (the supernova's neutrino
//! emission over time and energy) with an interaction [`Channel`] (the
//! differential cross sections of one reaction on water) and produces a
//! bank of detectable events: interaction time, outgoing particle, its
//! energy and its direction.

mod bank;
mod channel;
mod channels;
mod error;
mod event;
mod flux;
mod generator;
mod pchip;
mod quadrature;
mod rate;
mod report;
mod sampler;
mod settings;

pub use bank::{EventBank, ThresholdStats};
pub use channel::{channel_from_name, Channel, Flavor};
pub use channels::{InverseBetaDecay, OxygenElectron, OxygenPositron};
pub use error::{Error, Result};
pub use event::Event;
pub use flux::{FluxCache, FluxProvider, FIDUCIAL_DISTANCE};
pub use generator::Generator;
pub use pchip::Pchip;
pub use rate::{RateCurve, RateEngine};
pub use report::{energy_slices, write_expected_counts};
pub use sampler::{rejection_sample, sample_poisson};
pub use settings::Settings;
