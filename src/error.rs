//! Error types for event generation.

use thiserror::Error;

/// Result type alias for event generation.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal conditions encountered during a generation run.
///
/// None of these are recoverable: a negative cross section or flux means a
/// collaborator formula is broken, and retrying a deterministic computation
/// cannot help. Everything propagates to the caller.
#[derive(Error, Debug)]
pub enum Error {
    /// A cross section evaluated negative (collaborator formula bug).
    #[error("negative cross section for E_nu={enu} MeV, E_e={ee} MeV")]
    NegativeCrossSection { enu: f64, ee: f64 },

    /// A flux evaluated negative or non-finite.
    #[error("unphysical flux {value} for E_nu={enu} MeV at t={time} ms")]
    UnphysicalFlux { enu: f64, time: f64, value: f64 },

    /// An angular distribution evaluated negative or non-finite.
    #[error("unphysical angular density {value} for E_nu={enu} MeV, cos(theta)={cos_t}")]
    UnphysicalAngularDistribution { enu: f64, cos_t: f64, value: f64 },

    /// Rejection sampling exhausted its iteration budget. The density is
    /// either zero everywhere in the interval or its maximum was badly
    /// underestimated by the probe scan.
    #[error("rejection sampling accepted no candidate in [{lower}, {upper}] after {iterations} iterations")]
    SamplingFailure {
        lower: f64,
        upper: f64,
        iterations: usize,
    },

    /// The requested neutrino flavor does not interact in this channel.
    #[error("flavor '{flavor}' does not interact via channel '{channel}'")]
    UnsupportedFlavor { flavor: String, channel: String },

    /// No interaction channel registered under this name.
    #[error("unknown interaction channel '{0}'")]
    UnknownChannel(String),

    /// Unparseable neutrino flavor name.
    #[error("unknown neutrino flavor '{0}' (expected e, eb, x or xb)")]
    UnknownFlavor(String),

    /// The flux input resolved to fewer than two time samples.
    #[error("flux input provided {0} time sample(s); at least 2 are required to interpolate")]
    EmptyTimeGrid(usize),

    /// The resolved generation window is empty or inverted.
    #[error("invalid time window [{start}, {end}] ms")]
    InvalidTimeWindow { start: f64, end: f64 },

    /// Interpolation over a degenerate grid (non-increasing times).
    #[error("time samples must be strictly increasing (t[{index}] = {value})")]
    NonMonotonicGrid { index: usize, value: f64 },

    /// Writing the expected-counts report failed.
    #[error("report output error: {0}")]
    Io(#[from] std::io::Error),
}
