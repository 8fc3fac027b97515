//! Event generation pipeline.
//!
//! One [`Generator`] run turns a flux input and an interaction channel into
//! a bank of events: it builds the time-dependent event-rate curve, splits
//! the generation window into fixed-width time bins, draws a Poisson event
//! count per bin and then samples time, neutrino energy, direction and
//! outgoing-particle energy for every event.

use std::f64::consts::PI;
use std::io::Write;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bank::{EventBank, ThresholdStats};
use crate::channel::Channel;
use crate::error::{Error, Result};
use crate::event::Event;
use crate::flux::{FluxCache, FluxProvider};
use crate::rate::RateEngine;
use crate::report;
use crate::sampler;
use crate::settings::Settings;

/// Probe subintervals when rejection-sampling the scattering angle.
const COS_T_PROBE_BINS: usize = 200;

/// Event generator for one (channel, flux input) pair.
pub struct Generator<'a> {
    channel: &'a dyn Channel,
    flux: &'a mut dyn FluxProvider,
    settings: Settings,
}

impl<'a> Generator<'a> {
    pub fn new(channel: &'a dyn Channel, flux: &'a mut dyn FluxProvider, settings: Settings) -> Self {
        Self {
            channel,
            flux,
            settings,
        }
    }

    /// Generate events.
    pub fn run(&mut self) -> Result<EventBank> {
        self.generate(None)
    }

    /// Generate events and write the expected-counts table to `out`.
    pub fn run_with_report(&mut self, out: &mut dyn Write) -> Result<EventBank> {
        self.generate(Some(out))
    }

    fn generate(&mut self, mut out: Option<&mut dyn Write>) -> Result<EventBank> {
        let settings = self.settings.clone();
        if !self.channel.possible_flavors().contains(&settings.flavor) {
            return Err(Error::UnsupportedFlavor {
                flavor: settings.flavor.to_string(),
                channel: self.channel.name().to_string(),
            });
        }
        let scale = settings.scale * self.channel.targets_per_molecule();

        let mut rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let (starttime, endtime, raw_times) = self.flux.parse_input(
            &settings.flavor.to_string(),
            settings.starttime,
            settings.endtime,
        )?;
        if endtime <= starttime {
            return Err(Error::InvalidTimeWindow {
                start: starttime,
                end: endtime,
            });
        }

        // A trailing partial bin is discarded.
        let n_bins = ((endtime - starttime) / settings.bin_width).floor() as usize;
        let binned_t: Vec<f64> = (0..n_bins)
            .map(|i| starttime + (i as f64 + 0.5) * settings.bin_width)
            .collect();

        let mut cache = FluxCache::new();
        let mut bank = EventBank::with_bins(n_bins);

        // Phase 1: rate curve over the raw time samples, expected and drawn
        // counts per bin.
        let mut expected_above = 0.0;
        {
            let mut engine = RateEngine::new(self.channel, &*self.flux, &mut cache);
            let curve = engine.rate_curve(&raw_times, scale)?;
            for &t in &binned_t {
                let expected = curve.rate(t) * settings.bin_width;
                let drawn = sampler::sample_poisson(expected, &mut rng);
                bank.record_bin(expected, drawn);
            }

            if let Some(out) = out.as_deref_mut() {
                self.write_report(&mut engine, out, &settings, scale, &raw_times, &binned_t, &bank)?;
            }

            if settings.verbose > 0 {
                let thr_curve = engine.sliced_rate_curve(
                    &raw_times,
                    scale,
                    settings.detection_threshold,
                    f64::INFINITY,
                    self.channel.bounds_enu(),
                )?;
                expected_above = binned_t
                    .iter()
                    .map(|&t| thr_curve.rate(t) * settings.bin_width)
                    .sum();
            }
        }

        // Phase 2: per-event sampling. The flux may precompute per-bin
        // interpolants first; the flux cache carries over.
        self.flux.prepare_evt_gen(&binned_t);
        let mut engine = RateEngine::new(self.channel, &*self.flux, &mut cache);

        let progress_interval = 10u64.pow(4u32.saturating_sub(settings.verbose.min(4))) as usize;
        let pid = self.channel.pid();
        let mut observed_above = 0u64;

        for i in 0..n_bins {
            let t0 = starttime + i as f64 * settings.bin_width;
            if settings.verbose > 0 && i % progress_interval == 0 {
                println!(
                    "{:.1} to {:.1} ms: {} events ({:.5} expected)",
                    t0,
                    t0 + settings.bin_width,
                    bank.binned_counts[i],
                    bank.expected_counts[i]
                );
            }
            for _ in 0..bank.binned_counts[i] {
                let time = t0 + rng.gen::<f64>() * settings.bin_width;
                let enu = engine.sample_enu(binned_t[i], &mut rng)?;
                let (direction, cos_t) = sample_direction(self.channel, enu, &mut rng)?;
                let ee = self.channel.outgoing_energy(enu, cos_t, &mut rng);
                if ee >= settings.detection_threshold {
                    observed_above += 1;
                }
                bank.push(Event::new(time, pid, ee, direction));
            }
        }

        if settings.verbose > 0 {
            bank.threshold = Some(ThresholdStats {
                threshold: settings.detection_threshold,
                observed_above,
                expected_above,
            });
            println!("{}", bank);
        }
        Ok(bank)
    }

    #[allow(clippy::too_many_arguments)]
    fn write_report(
        &self,
        engine: &mut RateEngine,
        out: &mut dyn Write,
        settings: &Settings,
        scale: f64,
        raw_times: &[f64],
        binned_t: &[f64],
        bank: &EventBank,
    ) -> Result<()> {
        let enu_bounds = self.channel.bounds_enu();
        let slices = report::energy_slices(settings.detection_threshold, enu_bounds.1);
        let mut sliced = Vec::with_capacity(slices.len());
        for &(e_lo, e_hi) in &slices {
            // Only neutrinos in this energy window can produce outgoing
            // particles inside the slice.
            let slice_enu_bounds = (
                enu_bounds.0.max(self.channel.enu_bounds_for_ee(e_lo).0),
                enu_bounds.1.min(self.channel.enu_bounds_for_ee(e_hi).1),
            );
            let curve =
                engine.sliced_rate_curve(raw_times, scale, e_lo, e_hi, slice_enu_bounds)?;
            sliced.push(
                binned_t
                    .iter()
                    .map(|&t| curve.rate(t) * settings.bin_width)
                    .collect(),
            );
        }
        let parameters = format!(
            "channel={} flavor={} scale={} window=[{:.3}, {:.3}] ms bin_width={} ms threshold={} MeV",
            self.channel.name(),
            settings.flavor,
            settings.scale,
            binned_t.first().map_or(0.0, |t| t - 0.5 * settings.bin_width),
            binned_t.last().map_or(0.0, |t| t + 0.5 * settings.bin_width),
            settings.bin_width,
            settings.detection_threshold,
        );
        report::write_expected_counts(
            out,
            &parameters,
            binned_t,
            &bank.expected_counts,
            &slices,
            &sliced,
        )
    }
}

/// Draw a unit direction vector for the outgoing particle. The polar angle
/// against the neutrino direction follows the channel's angular density, the
/// azimuth is uniform.
fn sample_direction<R: Rng + ?Sized>(
    channel: &dyn Channel,
    enu: f64,
    rng: &mut R,
) -> Result<([f64; 3], f64)> {
    let cos_t = sampler::rejection_sample(
        |c| {
            let p = channel.dsigma_dcos_t(enu, c);
            if !p.is_finite() || p < 0.0 {
                return Err(Error::UnphysicalAngularDistribution {
                    enu,
                    cos_t: c,
                    value: p,
                });
            }
            Ok(p)
        },
        -1.0,
        1.0,
        COS_T_PROBE_BINS,
        rng,
    )?;
    let sin_t = (1.0 - cos_t * cos_t).max(0.0).sqrt();
    let phi = 2.0 * PI * rng.gen::<f64>();
    Ok(([sin_t * phi.cos(), sin_t * phi.sin(), cos_t], cos_t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::Flavor;
    use rand::rngs::StdRng;
    use rand::{RngCore, SeedableRng};

    struct ToyChannel;

    impl Channel for ToyChannel {
        fn name(&self) -> &'static str {
            "toy"
        }
        fn targets_per_molecule(&self) -> f64 {
            1.0
        }
        fn pid(&self) -> i32 {
            11
        }
        fn possible_flavors(&self) -> &'static [Flavor] {
            &[Flavor::E]
        }
        fn bounds_enu(&self) -> (f64, f64) {
            (0.0, 10.0)
        }
        fn bounds_ee(&self, enu: f64) -> (f64, f64) {
            (0.0, enu)
        }
        fn enu_bounds_for_ee(&self, ee: f64) -> (f64, f64) {
            (ee, 10.0)
        }
        fn dsigma_de(&self, enu: f64, ee: f64) -> f64 {
            if (0.0..=enu).contains(&ee) {
                1.0
            } else {
                0.0
            }
        }
        fn dsigma_dcos_t(&self, _enu: f64, _cos_t: f64) -> f64 {
            1.0
        }
        fn outgoing_energy(&self, enu: f64, cos_t: f64, _rng: &mut dyn RngCore) -> f64 {
            0.5 * enu * (1.0 + 0.5 * cos_t)
        }
    }

    struct ZeroFlux;

    impl FluxProvider for ZeroFlux {
        fn parse_input(
            &mut self,
            _flavor: &str,
            _starttime: Option<f64>,
            _endtime: Option<f64>,
        ) -> Result<(f64, f64, Vec<f64>)> {
            Ok((0.0, 10.0, vec![0.0, 5.0, 10.0]))
        }
        fn nu_emission(&self, _enu: f64, _time: f64) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_zero_flux_yields_no_events() {
        let channel = ToyChannel;
        let mut flux = ZeroFlux;
        let settings = Settings {
            flavor: Flavor::E,
            seed: Some(1),
            ..Settings::default()
        };
        let bank = Generator::new(&channel, &mut flux, settings).run().unwrap();
        assert_eq!(bank.total(), 0);
        assert!(bank.is_empty());
        assert_eq!(bank.binned_counts.len(), 10);
        assert!(bank.expected_total() < 1e-12);
    }

    #[test]
    fn test_unsupported_flavor_rejected() {
        let channel = ToyChannel;
        let mut flux = ZeroFlux;
        let settings = Settings {
            flavor: Flavor::X,
            ..Settings::default()
        };
        let err = Generator::new(&channel, &mut flux, settings).run().unwrap_err();
        assert!(matches!(err, Error::UnsupportedFlavor { .. }));
    }

    #[test]
    fn test_sampled_directions_are_unit_vectors() {
        let channel = ToyChannel;
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            let (dir, cos_t) = sample_direction(&channel, 5.0, &mut rng).unwrap();
            let norm = (dir[0] * dir[0] + dir[1] * dir[1] + dir[2] * dir[2]).sqrt();
            assert!((norm - 1.0).abs() < 1e-12, "norm {}", norm);
            assert_eq!(dir[2], cos_t);
            assert!((-1.0..=1.0).contains(&cos_t));
        }
    }
}
