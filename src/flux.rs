//! Flux-provider interface and the per-run flux cache.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Fiducial supernova distance: 10 kpc / (hbar * c), in MeV^-1. Emission
/// intensities are divided by `4 pi d^2` to obtain the flux at the detector.
pub const FIDUCIAL_DISTANCE: f64 = 1.563738e33;

/// Source of the time- and energy-dependent neutrino emission.
///
/// Implementations wrap one flux input format (one file or set of files);
/// parsing those formats is outside this crate.
pub trait FluxProvider {
    /// Resolve the generation window and return the raw time samples (ms)
    /// native to the input data, restricted to the requested window. `None`
    /// start/end times resolve to the input's own range. Returned times must
    /// be strictly increasing.
    fn parse_input(
        &mut self,
        flavor: &str,
        starttime: Option<f64>,
        endtime: Option<f64>,
    ) -> Result<(f64, f64, Vec<f64>)>;

    /// Number of neutrinos emitted by the supernova per unit energy per unit
    /// time, at neutrino energy `enu` (MeV) and time `time` (ms).
    fn nu_emission(&self, enu: f64, time: f64) -> f64;

    /// Pre-computation hook called once with the bin-midpoint times before
    /// event sampling starts. May be a no-op.
    fn prepare_evt_gen(&mut self, binned_t: &[f64]) {
        let _ = binned_t;
    }
}

/// Memoized detector-side flux lookups for one generation run.
///
/// The differential flux is evaluated hundreds of times per generated event,
/// mostly with repeated arguments (quadrature nodes recur across the rate
/// integrals at a given time, and across events in the same bin). Keys are
/// the exact bit patterns of the `(enu, time)` pair: callers only ever pass
/// values derived deterministically from a small set of grid points, so
/// exact floating-point equality is the right notion of "same argument".
///
/// The map grows for the lifetime of the run and is never evicted; the key
/// working set is bounded by the integration grids.
#[derive(Debug, Default)]
pub struct FluxCache {
    map: HashMap<(u64, u64), f64>,
    lookups: usize,
}

impl FluxCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detector-side flux at `(enu, time)`, computed through `provider` on
    /// the first lookup of this key and served from the cache afterwards.
    ///
    /// A negative or non-finite emission is a fatal inconsistency in the
    /// provider, not a recoverable condition.
    pub fn get_or_compute(
        &mut self,
        provider: &dyn FluxProvider,
        enu: f64,
        time: f64,
    ) -> Result<f64> {
        self.lookups += 1;
        let key = (enu.to_bits(), time.to_bits());
        if let Some(&flux) = self.map.get(&key) {
            return Ok(flux);
        }
        let emission = provider.nu_emission(enu, time);
        if !emission.is_finite() || emission < 0.0 {
            return Err(Error::UnphysicalFlux {
                enu,
                time,
                value: emission,
            });
        }
        let flux = emission / (4.0 * std::f64::consts::PI * FIDUCIAL_DISTANCE * FIDUCIAL_DISTANCE);
        self.map.insert(key, flux);
        Ok(flux)
    }

    /// Number of distinct `(enu, time)` keys computed so far.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Total lookups served, hits and misses combined.
    pub fn lookups(&self) -> usize {
        self.lookups
    }
}
