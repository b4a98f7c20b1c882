//! Margin-of-victory model fitted to a handicap ladder.
//!
//! Each populated level contributes its lower and upper probability
//! bound as two separate observations, both weighted by the width of
//! that level's market. A normal CDF is then fitted through them by
//! weighted nonlinear least squares (Levenberg-Marquardt on the two
//! parameters).
//!
//! Handicaps are fitted on a shifted axis: half a point is taken off
//! every non-zero line so that consecutive integer margins are one unit
//! apart (-0.5 and +0.5 both land on 0 next to the moneyline).

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{DomainError, FitError};
use super::line::LineLadder;
use super::odds::odds_from_probability;

/// Fewest populated levels a fit will accept.
pub const MIN_LEVELS: usize = 2;

const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Maps a handicap onto the fitted axis.
pub fn transform(handicap: f64) -> f64 {
    if handicap > 0.0 {
        handicap - 0.5
    } else if handicap < 0.0 {
        handicap + 0.5
    } else {
        handicap
    }
}

/// Maps a point on the fitted axis back to a handicap.
///
/// Exact inverse of [`transform`] for handicaps outside (-0.5, 0.5).
pub fn inverse_transform(axis: f64) -> f64 {
    if axis > 0.0 {
        axis + 0.5
    } else if axis < 0.0 {
        axis - 0.5
    } else {
        axis
    }
}

/// Standard normal CDF (Abramowitz-Stegun 7.1.26, |error| < 1.5e-7).
pub fn normal_cdf(x: f64) -> f64 {
    let a1 = 0.254_829_592;
    let a2 = -0.284_496_736;
    let a3 = 1.421_413_741;
    let a4 = -1.453_152_027;
    let a5 = 1.061_405_429;
    let p = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let z = x.abs() / std::f64::consts::SQRT_2;

    let t = 1.0 / (1.0 + p * z);
    let y = 1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-z * z).exp();

    0.5 * (1.0 + sign * y)
}

/// Standard normal density.
pub fn normal_pdf(x: f64) -> f64 {
    FRAC_1_SQRT_2PI * (-0.5 * x * x).exp()
}

/// One weighted point for the least-squares fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Position on the transformed axis.
    pub x: f64,
    /// Observed home-cover probability.
    pub y: f64,
    /// Per-point standard deviation.
    pub sigma: f64,
}

/// Fitted normal CDF over the transformed handicap axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionModel {
    pub location: f64,
    pub scale: f64,
    /// Parameter covariance, ordered (location, scale).
    pub covariance: [[f64; 2]; 2],
}

impl DistributionModel {
    /// Home-cover probability at a raw handicap.
    pub fn probability_at(&self, handicap: f64) -> f64 {
        self.cdf(transform(handicap), self.location, self.scale)
    }

    /// Fair decimal odds for the home side at a raw handicap.
    pub fn fair_odds_at(&self, handicap: f64) -> Result<f64, DomainError> {
        odds_from_probability("model", self.probability_at(handicap))
    }

    /// Probability mass between two handicaps, in either order.
    pub fn interval_probability(&self, a: f64, b: f64) -> f64 {
        (self.probability_at(a) - self.probability_at(b)).abs()
    }

    /// Fair odds for the margin landing between two handicaps.
    pub fn fair_odds_between(&self, a: f64, b: f64) -> Result<f64, DomainError> {
        odds_from_probability("interval", self.interval_probability(a, b))
    }

    /// One-standard-deviation errors of (location, scale).
    pub fn parameter_errors(&self) -> (f64, f64) {
        (
            self.covariance[0][0].max(0.0).sqrt(),
            self.covariance[1][1].max(0.0).sqrt(),
        )
    }

    /// CDF at the handicap with both parameters shifted by `-k` and `+k`
    /// standard errors, returned low-probability first.
    pub fn confidence_band(&self, handicap: f64, std_devs: f64) -> (f64, f64) {
        let x = transform(handicap);
        let (mu_err, sigma_err) = self.parameter_errors();
        let lo = self.cdf(
            x,
            self.location - std_devs * mu_err,
            (self.scale - std_devs * sigma_err).max(f64::MIN_POSITIVE),
        );
        let hi = self.cdf(x, self.location + std_devs * mu_err, self.scale + std_devs * sigma_err);
        if lo <= hi { (lo, hi) } else { (hi, lo) }
    }

    fn cdf(&self, x: f64, location: f64, scale: f64) -> f64 {
        normal_cdf((x - location) / scale)
    }
}

/// Solver settings for [`DistributionFitter`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitterConfig {
    pub max_iterations: usize,
    /// Relative step size at which the solver stops.
    pub tolerance: f64,
    /// Largest scale accepted as a real fit.
    pub max_scale: f64,
    /// Floor applied to a level's bound width before it is used as sigma.
    pub min_uncertainty: f64,
}

impl Default for FitterConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            tolerance: 1e-10,
            max_scale: 1_000.0,
            min_uncertainty: 1e-6,
        }
    }
}

/// Weighted normal-CDF fitter for handicap ladders.
#[derive(Debug, Clone, Default)]
pub struct DistributionFitter {
    config: FitterConfig,
}

/// Normal equations at one parameter point.
struct Normal {
    jtj: [[f64; 2]; 2],
    jtr: [f64; 2],
}

impl DistributionFitter {
    pub fn new(config: FitterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FitterConfig {
        &self.config
    }

    /// Builds the doubled observation set for a ladder.
    pub fn observations(&self, ladder: &LineLadder) -> Result<Vec<Observation>, FitError> {
        let mut lower = Vec::new();
        let mut upper = Vec::new();
        for level in ladder.populated() {
            let b = level.bounds()?;
            let x = transform(level.handicap.value());
            let sigma = b.width().max(self.config.min_uncertainty);
            lower.push(Observation { x, y: b.lower, sigma });
            upper.push(Observation { x, y: b.upper, sigma });
        }
        if lower.len() < MIN_LEVELS {
            return Err(FitError::InsufficientLevels {
                required: MIN_LEVELS,
                found: lower.len(),
            });
        }
        lower.extend(upper);
        Ok(lower)
    }

    /// Fits a model to every populated level of the ladder.
    pub fn fit(&self, ladder: &LineLadder) -> Result<DistributionModel, FitError> {
        let observations = self.observations(ladder)?;
        self.fit_observations(&observations)
    }

    /// Levenberg-Marquardt from `location = 0, scale = 1`.
    pub fn fit_observations(&self, obs: &[Observation]) -> Result<DistributionModel, FitError> {
        if obs.len() < 2 * MIN_LEVELS {
            return Err(FitError::InsufficientObservations {
                required: 2 * MIN_LEVELS,
                found: obs.len(),
            });
        }
        let tol = self.config.tolerance;
        let mut params = [0.0_f64, 1.0_f64];
        let mut cost = Self::cost(obs, params);
        let mut lambda = 1e-3;

        for iteration in 0..self.config.max_iterations {
            let normal = Self::normal_equations(obs, params);
            loop {
                let Some(step) = Self::damped_step(&normal, lambda) else {
                    return Err(FitError::Degenerate("singular normal equations"));
                };
                let step_norm = step[0].hypot(step[1]);
                if step_norm <= tol * (params[0].hypot(params[1]) + tol) {
                    debug!(iteration, cost, "Distribution fit converged");
                    return self.finish(obs, params, cost);
                }

                let trial = [params[0] + step[0], params[1] + step[1]];
                if trial[1] > 0.0 {
                    let trial_cost = Self::cost(obs, trial);
                    if trial_cost < cost {
                        params = trial;
                        cost = trial_cost;
                        lambda = (lambda / 10.0).max(1e-12);
                        break;
                    }
                }
                lambda *= 10.0;
                if lambda > 1e16 {
                    return Err(FitError::NonConvergence { iterations: iteration });
                }
            }
        }

        Err(FitError::NonConvergence {
            iterations: self.config.max_iterations,
        })
    }

    fn finish(
        &self,
        obs: &[Observation],
        params: [f64; 2],
        cost: f64,
    ) -> Result<DistributionModel, FitError> {
        let [location, scale] = params;
        if !location.is_finite() {
            return Err(FitError::Degenerate("non-finite location"));
        }
        if !scale.is_finite() || scale <= 0.0 || scale > self.config.max_scale {
            return Err(FitError::InvalidScale(scale));
        }

        let normal = Self::normal_equations(obs, params);
        let inverse =
            invert(normal.jtj).ok_or(FitError::Degenerate("singular parameter covariance"))?;
        let residual_variance = cost / (obs.len() - 2) as f64;
        let covariance = [
            [inverse[0][0] * residual_variance, inverse[0][1] * residual_variance],
            [inverse[1][0] * residual_variance, inverse[1][1] * residual_variance],
        ];

        Ok(DistributionModel {
            location,
            scale,
            covariance,
        })
    }

    fn cost(obs: &[Observation], [mu, sigma]: [f64; 2]) -> f64 {
        obs.iter()
            .map(|o| {
                let r = (o.y - normal_cdf((o.x - mu) / sigma)) / o.sigma;
                r * r
            })
            .sum()
    }

    fn normal_equations(obs: &[Observation], [mu, sigma]: [f64; 2]) -> Normal {
        let mut jtj = [[0.0; 2]; 2];
        let mut jtr = [0.0; 2];
        for o in obs {
            let z = (o.x - mu) / sigma;
            let r = (o.y - normal_cdf(z)) / o.sigma;
            // d(residual)/d(mu) and d(residual)/d(sigma)
            let density = normal_pdf(z) / (sigma * o.sigma);
            let j = [density, density * z];
            for a in 0..2 {
                jtr[a] += j[a] * r;
                for b in 0..2 {
                    jtj[a][b] += j[a] * j[b];
                }
            }
        }
        Normal { jtj, jtr }
    }

    fn damped_step(normal: &Normal, lambda: f64) -> Option<[f64; 2]> {
        let mut a = normal.jtj;
        a[0][0] *= 1.0 + lambda;
        a[1][1] *= 1.0 + lambda;
        let inv = invert(a)?;
        let g = normal.jtr;
        Some([
            -(inv[0][0] * g[0] + inv[0][1] * g[1]),
            -(inv[1][0] * g[0] + inv[1][1] * g[1]),
        ])
    }
}

fn invert(m: [[f64; 2]; 2]) -> Option<[[f64; 2]; 2]> {
    let det = m[0][0] * m[1][1] - m[0][1] * m[1][0];
    if det == 0.0 || !det.is_finite() {
        return None;
    }
    Some([
        [m[1][1] / det, -m[0][1] / det],
        [-m[1][0] / det, m[0][0] / det],
    ])
}
