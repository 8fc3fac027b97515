//! Expected-counts report.
//!
//! Writes the expected number of events per time bin, split into energy
//! slices of the outgoing particle, as a comment-headed CSV table. Used to
//! cross-check generated event counts against the underlying rate curves.

use std::io::Write;

use crate::error::Result;

/// Width of the regular energy slices in MeV.
pub const SLICE_WIDTH: f64 = 2.0;

/// Energy slices of the outgoing-particle spectrum, as `(lower, upper)`
/// pairs in MeV. The first slice starts at the detection threshold, the
/// regular slices cover 10 to 50 MeV and the last one runs out to `e_max`.
pub fn energy_slices(threshold: f64, e_max: f64) -> Vec<(f64, f64)> {
    let mut slices = Vec::new();
    let mut upper = 10.0;
    while upper <= 52.0 {
        let lower = if upper == 10.0 {
            threshold
        } else {
            upper - SLICE_WIDTH
        };
        let hi = if upper == 52.0 { e_max } else { upper };
        slices.push((lower, hi));
        upper += SLICE_WIDTH;
    }
    slices
}

/// Write the expected-counts table.
///
/// `totals[i]` is the expected event count in time bin `i` (midpoint
/// `binned_t[i]`) and `sliced[s][i]` the expected count restricted to
/// energy slice `s`.
pub fn write_expected_counts(
    out: &mut dyn Write,
    parameters: &str,
    binned_t: &[f64],
    totals: &[f64],
    slices: &[(f64, f64)],
    sliced: &[Vec<f64>],
) -> Result<()> {
    writeln!(out, "# Generated with the options:")?;
    writeln!(out, "#   {}", parameters)?;
    write!(out, "# time bin (ms), total expected events")?;
    for &(lo, hi) in slices {
        write!(out, ", {:.3}-{:.3} MeV", lo, hi)?;
    }
    writeln!(out)?;

    for (i, &t) in binned_t.iter().enumerate() {
        write!(out, "{:.3}, {:.6}", t, totals[i])?;
        for per_bin in sliced {
            write!(out, ", {:.6}", per_bin[i])?;
        }
        writeln!(out)?;
    }
    Ok(())
}
