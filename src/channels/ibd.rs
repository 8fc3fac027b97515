//! Inverse beta decay: anti-nu_e + p -> n + e+.
//!
//! Cross section and positron kinematics from Strumia/Vissani (2003),
//! arXiv:astro-ph/0302055. The dominant channel in water Cherenkov
//! detectors (2 free protons per water molecule).

use std::f64::consts::PI;

use rand::RngCore;

use crate::channel::{Channel, Flavor};

const M_N: f64 = 939.56563; // neutron mass (MeV)
const M_P: f64 = 938.27231; // proton mass (MeV)
const M_E: f64 = 0.5109907; // electron mass (MeV)
const M_PI: f64 = 139.56995; // pion mass (MeV)
const DELTA: f64 = M_N - M_P;
const M_AVG: f64 = (M_P + M_N) / 2.0;
const ALPHA: f64 = 1.0 / 137.035989; // fine structure constant
const G_F: f64 = 1.16639e-11; // Fermi coupling constant (MeV^-2)

// Overall scale from eqs. (3), (11); 0.9746 is the Cabibbo angle cosine.
const SIGMA0: f64 = 2.0 * M_P * G_F * G_F * 0.9746 * 0.9746 / (8.0 * PI * M_P * M_P);

// Neutron-positron mass shift seen from the proton rest frame.
const DELTA_CM: f64 = (M_N * M_N - M_P * M_P - M_E * M_E) / (2.0 * M_P);

/// Threshold neutrino energy, ca. 1.806 MeV.
const E_THR: f64 = ((M_N + M_E) * (M_N + M_E) - M_P * M_P) / (2.0 * M_P);

/// Upper neutrino energy cutoff set by the supernova flux.
const ENU_MAX: f64 = 100.0;

const FLAVORS: [Flavor; 1] = [Flavor::EBar];

/// Inverse beta decay on free protons.
#[derive(Debug, Clone, Default)]
pub struct InverseBetaDecay;

impl InverseBetaDecay {
    pub fn new() -> Self {
        Self
    }
}

impl Channel for InverseBetaDecay {
    fn name(&self) -> &'static str {
        "ibd"
    }

    fn targets_per_molecule(&self) -> f64 {
        2.0 // free protons per water molecule
    }

    fn pid(&self) -> i32 {
        -11
    }

    fn possible_flavors(&self) -> &'static [Flavor] {
        &FLAVORS
    }

    fn bounds_enu(&self) -> (f64, f64) {
        (E_THR, ENU_MAX)
    }

    // Positron energy range at fixed eNu, from two-body kinematics in the
    // center-of-mass frame.
    fn bounds_ee(&self, enu: f64) -> (f64, f64) {
        if enu < E_THR {
            return (0.0, 0.0);
        }
        let s = 2.0 * M_P * enu + M_P * M_P;
        let sqrt_s = s.sqrt();
        let pe_cm =
            ((s - (M_N - M_E) * (M_N - M_E)) * (s - (M_N + M_E) * (M_N + M_E))).sqrt()
                / (2.0 * sqrt_s);
        let ee_cm = (s - M_N * M_N + M_E * M_E) / (2.0 * sqrt_s);

        let ee_min = enu - DELTA_CM - enu / sqrt_s * (ee_cm + pe_cm);
        let ee_max = enu - DELTA_CM - enu / sqrt_s * (ee_cm - pe_cm);
        (ee_min, ee_max)
    }

    // Eq. (19). An approximation that simplifies the restricted integrals;
    // the exact range is enforced by bounds_ee during integration.
    fn enu_bounds_for_ee(&self, ee: f64) -> (f64, f64) {
        let enu_min = ee + DELTA_CM;
        let enu_max = enu_min / (1.0 - 2.0 * enu_min / M_P);
        (enu_min, enu_max)
    }

    // Eqs. (11), (3) with the form factors of eq. (7) and the radiative
    // correction of eq. (14).
    fn dsigma_de(&self, enu: f64, ee: f64) -> f64 {
        if enu < E_THR {
            return 0.0;
        }
        let (ee_min, ee_max) = self.bounds_ee(enu);
        if ee < ee_min || ee > ee_max {
            return 0.0;
        }

        // Mandelstam combinations, above eq. (11).
        let s_minus_u = 2.0 * M_P * (enu + ee) - M_E * M_E;
        let t = M_N * M_N - M_P * M_P - 2.0 * M_P * (enu - ee);

        // Form factors, eq. (7).
        let x = t / (4.0 * M_AVG * M_AVG);
        let y = 1.0 - t / (710.0 * 710.0);
        let z = 1.0 - t / (1030.0 * 1030.0);
        let f1 = (1.0 - 4.706 * x) / ((1.0 - x) * y * y);
        let f2 = 3.706 / ((1.0 - x) * y * y);
        let g1 = -1.27 / (z * z);
        let g2 = 2.0 * g1 * M_AVG * M_AVG / (M_PI * M_PI - t);

        let m2 = M_E * M_E;
        let m_avg2 = M_AVG * M_AVG;

        let a = ((t - m2)
            * (4.0 * f1 * f1 * (4.0 * m_avg2 + t + m2)
                + 4.0 * g1 * g1 * (-4.0 * m_avg2 + t + m2)
                + f2 * f2 * (t * t / m_avg2 + 4.0 * t + 4.0 * m2)
                + 4.0 * m2 * t * g2 * g2 / m_avg2
                + 8.0 * f1 * f2 * (2.0 * t + m2)
                + 16.0 * m2 * g1 * g2)
            - DELTA
                * DELTA
                * ((4.0 * f1 * f1 + t * f2 * f2 / m_avg2) * (4.0 * m_avg2 + t - m2)
                    + 4.0 * g1 * g1 * (4.0 * m_avg2 - t + m2)
                    + 4.0 * m2 * g2 * g2 * (t - m2) / m_avg2
                    + 8.0 * f1 * f2 * (2.0 * t - m2)
                    + 16.0 * m2 * g1 * g2)
            - 32.0 * m2 * M_AVG * DELTA * g1 * (f1 + f2))
            / 16.0;

        let b = (16.0 * t * g1 * (f1 + f2)
            + 4.0 * m2 * DELTA * (f2 * f2 + f1 * f2 + 2.0 * g1 * g2) / M_AVG)
            / 16.0;

        let c = (4.0 * (f1 * f1 + g1 * g1) - t * f2 * f2 / m_avg2) / 16.0;

        // |M|^2, eq. (5).
        let abs_m_squared = a - b * s_minus_u + c * s_minus_u * s_minus_u;

        // Radiative correction, eq. (14).
        let rad_correction =
            ALPHA / PI * (6.00352 + 1.5 * (M_P / (2.0 * ee)).ln() + 1.2 * (M_E / ee).powf(1.5));

        SIGMA0 / (enu * enu) * abs_m_squared * (1.0 + rad_correction)
    }

    // Eq. (20): angular density obtained from dSigma/dE via the Jacobian
    // dE/dcos(theta).
    fn dsigma_dcos_t(&self, enu: f64, cos_t: f64) -> f64 {
        let epsilon = enu / M_P;
        let ee = positron_energy(enu, cos_t);
        let pe = (ee * ee - M_E * M_E).sqrt();
        let de_dcos_t = pe * epsilon / (1.0 + epsilon * (1.0 - cos_t * ee / pe));
        de_dcos_t * self.dsigma_de(enu, ee)
    }

    fn outgoing_energy(&self, enu: f64, cos_t: f64, _rng: &mut dyn RngCore) -> f64 {
        positron_energy(enu, cos_t)
    }
}

// Eq. (21): positron energy as a function of scattering angle.
fn positron_energy(enu: f64, cos_t: f64) -> f64 {
    let epsilon = enu / M_P;
    let kappa = (1.0 + epsilon) * (1.0 + epsilon) - (epsilon * cos_t) * (epsilon * cos_t);
    ((enu - DELTA_CM) * (1.0 + epsilon)
        + epsilon * cos_t * ((enu - DELTA_CM) * (enu - DELTA_CM) - M_E * M_E * kappa).sqrt())
        / kappa
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_threshold_energy() {
        let channel = InverseBetaDecay::new();
        let (lo, hi) = channel.bounds_enu();
        assert!((lo - 1.806).abs() < 1e-3, "threshold {} MeV", lo);
        assert_eq!(hi, 100.0);
    }

    #[test]
    fn test_cross_section_positive_in_bounds() {
        let channel = InverseBetaDecay::new();
        for enu in [3.0, 10.0, 20.0, 50.0, 90.0] {
            let (ee_min, ee_max) = channel.bounds_ee(enu);
            assert!(ee_min < ee_max, "empty bounds at eNu={}", enu);
            let ee = 0.5 * (ee_min + ee_max);
            let xs = channel.dsigma_de(enu, ee);
            assert!(xs > 0.0, "dSigma/dE = {} at eNu={}", xs, enu);
        }
    }

    #[test]
    fn test_cross_section_zero_outside_bounds() {
        let channel = InverseBetaDecay::new();
        assert_eq!(channel.dsigma_de(1.0, 0.5), 0.0); // below threshold
        let (ee_min, ee_max) = channel.bounds_ee(20.0);
        assert_eq!(channel.dsigma_de(20.0, ee_min - 1.0), 0.0);
        assert_eq!(channel.dsigma_de(20.0, ee_max + 1.0), 0.0);
    }

    #[test]
    fn test_total_sigma_grows_with_energy() {
        // IBD cross section rises roughly with eNu^2 over this range.
        let channel = InverseBetaDecay::new();
        let s10 = channel.sigma(10.0).unwrap();
        let s20 = channel.sigma(20.0).unwrap();
        let s50 = channel.sigma(50.0).unwrap();
        assert!(s10 > 0.0);
        assert!(s20 > s10, "sigma(20)={} <= sigma(10)={}", s20, s10);
        assert!(s50 > s20);
    }

    #[test]
    fn test_positron_energy_within_kinematic_bounds() {
        let channel = InverseBetaDecay::new();
        let mut rng = StdRng::seed_from_u64(1);
        for enu in [5.0, 15.0, 40.0, 80.0] {
            let (ee_min, ee_max) = channel.bounds_ee(enu);
            for i in 0..=20 {
                let cos_t = -1.0 + 0.1 * i as f64;
                let ee = channel.outgoing_energy(enu, cos_t, &mut rng);
                assert!(
                    ee >= ee_min - 1e-9 && ee <= ee_max + 1e-9,
                    "eE={} outside [{}, {}] at eNu={}, cosT={}",
                    ee,
                    ee_min,
                    ee_max,
                    enu,
                    cos_t
                );
            }
        }
    }

    #[test]
    fn test_forward_backward_energy_ordering() {
        // Forward-scattered positrons carry more energy than backscattered.
        let mut rng = StdRng::seed_from_u64(1);
        let channel = InverseBetaDecay::new();
        let forward = channel.outgoing_energy(30.0, 1.0, &mut rng);
        let backward = channel.outgoing_energy(30.0, -1.0, &mut rng);
        assert!(forward > backward);
    }

    #[test]
    fn test_angular_density_non_negative() {
        let channel = InverseBetaDecay::new();
        for enu in [5.0, 20.0, 60.0] {
            for i in 0..=40 {
                let cos_t = -1.0 + 0.05 * i as f64;
                let p = channel.dsigma_dcos_t(enu, cos_t);
                assert!(p >= 0.0, "negative angular density at eNu={}, cosT={}", enu, cos_t);
            }
        }
    }

    #[test]
    fn test_sliced_sigma_sums_to_total() {
        let channel = InverseBetaDecay::new();
        let enu = 25.0;
        let (ee_min, ee_max) = channel.bounds_ee(enu);
        let mid = 0.5 * (ee_min + ee_max);
        let total = channel.sigma(enu).unwrap();
        let lower = channel.sigma_ee_range(enu, ee_min, mid).unwrap();
        let upper = channel.sigma_ee_range(enu, mid, ee_max).unwrap();
        assert!(
            ((lower + upper - total) / total).abs() < 1e-4,
            "slices {} + {} != total {}",
            lower,
            upper,
            total
        );
    }
}
