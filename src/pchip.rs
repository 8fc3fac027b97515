//! Shape-preserving monotone cubic interpolation.
//!
//! Piecewise cubic Hermite interpolation with Fritsch-Carlson slopes: the
//! interpolant matches the monotonicity of neighboring sample intervals and
//! never overshoots the data. This is what turns the event rate computed at
//! the flux input's coarse native time samples into a curve that can be
//! queried at every millisecond bin.

use crate::error::{Error, Result};

/// Monotone piecewise cubic Hermite interpolant over strictly increasing
/// sample points. Immutable after construction.
#[derive(Debug, Clone)]
pub struct Pchip {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Endpoint derivative per sample point.
    m: Vec<f64>,
}

impl Pchip {
    /// Build the interpolant through `(x, y)` pairs.
    ///
    /// Requires at least two strictly increasing sample points; two points
    /// degrade to linear interpolation.
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self> {
        assert_eq!(x.len(), y.len(), "sample arrays must have equal length");
        if x.len() < 2 {
            return Err(Error::EmptyTimeGrid(x.len()));
        }
        for i in 1..x.len() {
            if x[i] <= x[i - 1] {
                return Err(Error::NonMonotonicGrid {
                    index: i,
                    value: x[i],
                });
            }
        }

        let n = x.len();
        let h: Vec<f64> = (0..n - 1).map(|i| x[i + 1] - x[i]).collect();
        let d: Vec<f64> = (0..n - 1).map(|i| (y[i + 1] - y[i]) / h[i]).collect();

        let mut m = vec![0.0; n];
        if n == 2 {
            m[0] = d[0];
            m[1] = d[0];
        } else {
            // Interior slopes: weighted harmonic mean of the neighboring
            // secants, zero at local extrema (sign change).
            for i in 1..n - 1 {
                if d[i - 1] * d[i] <= 0.0 {
                    m[i] = 0.0;
                } else {
                    let w1 = 2.0 * h[i] + h[i - 1];
                    let w2 = h[i] + 2.0 * h[i - 1];
                    m[i] = (w1 + w2) / (w1 / d[i - 1] + w2 / d[i]);
                }
            }
            m[0] = edge_slope(h[0], h[1], d[0], d[1]);
            m[n - 1] = edge_slope(h[n - 2], h[n - 3], d[n - 2], d[n - 3]);
        }

        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            m,
        })
    }

    /// Evaluate the interpolant at `x_new`.
    ///
    /// Queries outside the sampled range clamp to the boundary values; the
    /// generator only asks for times inside the resolved window, so the
    /// clamp is never exercised there.
    pub fn eval(&self, x_new: f64) -> f64 {
        let n = self.x.len();
        if x_new <= self.x[0] {
            return self.y[0];
        }
        if x_new >= self.x[n - 1] {
            return self.y[n - 1];
        }

        // Binary search for the segment with x[idx] <= x_new < x[idx+1].
        let mut low = 0usize;
        let mut high = n - 1;
        while high - low > 1 {
            let mid = (low + high) >> 1;
            if self.x[mid] <= x_new {
                low = mid;
            } else {
                high = mid;
            }
        }
        let idx = low;

        let h = self.x[idx + 1] - self.x[idx];
        let t = (x_new - self.x[idx]) / h;
        let t2 = t * t;
        let t3 = t2 * t;

        // Cubic Hermite basis.
        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * self.y[idx] + h10 * h * self.m[idx] + h01 * self.y[idx + 1] + h11 * h * self.m[idx + 1]
    }

    /// First and last sample positions.
    pub fn domain(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }
}

/// One-sided three-point slope estimate at a boundary, limited so the
/// interpolant stays monotone on the end segment. `h0`/`d0` belong to the
/// boundary segment, `h1`/`d1` to its neighbor.
fn edge_slope(h0: f64, h1: f64, d0: f64, d1: f64) -> f64 {
    let mut slope = ((2.0 * h0 + h1) * d0 - h0 * d1) / (h0 + h1);
    if slope * d0 <= 0.0 {
        slope = 0.0;
    } else if d0 * d1 < 0.0 && slope.abs() > 3.0 * d0.abs() {
        slope = 3.0 * d0;
    }
    slope
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_passes_through_samples() {
        let x = [0.0, 1.0, 2.5, 4.0, 7.0];
        let y = [1.0, 3.0, 2.0, 2.0, 8.0];
        let interp = Pchip::new(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(y.iter()) {
            assert_relative_eq!(interp.eval(*xi), *yi, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_linear_data_reproduced() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 3.0, 5.0, 7.0];
        let interp = Pchip::new(&x, &y).unwrap();
        for i in 0..=30 {
            let xi = i as f64 * 0.1;
            assert_relative_eq!(interp.eval(xi), 1.0 + 2.0 * xi, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_no_overshoot_on_monotone_data() {
        // A steep step that cubic splines overshoot; PCHIP must not.
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [0.0, 0.0, 1.0, 1.0, 1.0];
        let interp = Pchip::new(&x, &y).unwrap();
        let mut prev = interp.eval(0.0);
        for i in 1..=400 {
            let xi = i as f64 * 0.01;
            let v = interp.eval(xi);
            assert!(
                (0.0..=1.0).contains(&v),
                "overshoot: f({}) = {}",
                xi,
                v
            );
            assert!(v >= prev - 1e-12, "non-monotone at x={}", xi);
            prev = v;
        }
    }

    #[test]
    fn test_flat_at_local_extremum() {
        let x = [0.0, 1.0, 2.0];
        let y = [0.0, 1.0, 0.0];
        let interp = Pchip::new(&x, &y).unwrap();
        // Interior slope must be zero at the peak, so nearby values stay
        // below the sample maximum.
        assert!(interp.eval(0.99) <= 1.0);
        assert!(interp.eval(1.01) <= 1.0);
    }

    #[test]
    fn test_two_points_is_linear() {
        let interp = Pchip::new(&[0.0, 2.0], &[1.0, 5.0]).unwrap();
        assert_relative_eq!(interp.eval(1.0), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_degenerate_grids() {
        assert!(Pchip::new(&[1.0], &[1.0]).is_err());
        assert!(Pchip::new(&[0.0, 1.0, 1.0], &[0.0, 1.0, 2.0]).is_err());
        assert!(Pchip::new(&[0.0, 1.0, 0.5], &[0.0, 1.0, 2.0]).is_err());
    }
}
