//! Adaptive numerical integration.
//!
//! Small hand-rolled adaptive Simpson quadrature. The integrand is fallible
//! so that flux and cross-section evaluation errors abort the integral and
//! propagate out of the engine. Two-dimensional event-rate integrals are
//! realized by nesting: the outer neutrino-energy integrand runs an inner
//! integral over the outgoing energy.

use crate::error::Result;

/// Maximum bisection depth before the current estimate is accepted as-is.
const MAX_DEPTH: u32 = 48;

/// Integrate `f` over `[a, b]` with adaptive Simpson quadrature.
///
/// `rel_tol` is relative to the magnitude of the integral; intervals where
/// the integrand is identically zero converge immediately. A degenerate or
/// inverted interval integrates to zero (inverted bounds only arise from
/// kinematically forbidden regions, which contribute nothing).
pub fn integrate<F>(mut f: F, a: f64, b: f64, rel_tol: f64) -> Result<f64>
where
    F: FnMut(f64) -> Result<f64>,
{
    if a >= b {
        return Ok(0.0);
    }
    let m = 0.5 * (a + b);
    let fa = f(a)?;
    let fm = f(m)?;
    let fb = f(b)?;
    let whole = simpson(a, b, fa, fm, fb);
    // Absolute tolerance scaled off the first estimate; the tiny floor keeps
    // an exactly-zero integrand from recursing to full depth.
    let eps = rel_tol * whole.abs().max(1e-300);
    adaptive(&mut f, a, b, fa, fm, fb, whole, eps, MAX_DEPTH)
}

fn simpson(a: f64, b: f64, fa: f64, fm: f64, fb: f64) -> f64 {
    (b - a) / 6.0 * (fa + 4.0 * fm + fb)
}

#[allow(clippy::too_many_arguments)]
fn adaptive<F>(
    f: &mut F,
    a: f64,
    b: f64,
    fa: f64,
    fm: f64,
    fb: f64,
    whole: f64,
    eps: f64,
    depth: u32,
) -> Result<f64>
where
    F: FnMut(f64) -> Result<f64>,
{
    let m = 0.5 * (a + b);
    let lm = 0.5 * (a + m);
    let rm = 0.5 * (m + b);
    let flm = f(lm)?;
    let frm = f(rm)?;
    let left = simpson(a, m, fa, flm, fm);
    let right = simpson(m, b, fm, frm, fb);
    let delta = left + right - whole;
    if depth == 0 || delta.abs() <= 15.0 * eps {
        // Richardson extrapolation on the two half-interval estimates.
        return Ok(left + right + delta / 15.0);
    }
    let l = adaptive(f, a, m, fa, flm, fm, left, 0.5 * eps, depth - 1)?;
    let r = adaptive(f, m, b, fm, frm, fb, right, 0.5 * eps, depth - 1)?;
    Ok(l + r)
}
