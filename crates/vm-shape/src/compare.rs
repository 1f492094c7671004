//! Per-degree statistics of radial profiles and their comparison.

use serde::Serialize;
use vm_core::Error;

use crate::radial::{DEGREES, RadialProfile};

/// Mean and sample standard deviation of the intersection distances of each
/// ray. Rays without intersections get 0; fewer than two give a 0 deviation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadialStats {
    pub means: Vec<f64>,
    pub std_devs: Vec<f64>,
}

impl RadialStats {
    pub fn from_profile(profile: &RadialProfile) -> Self {
        let mut means = Vec::with_capacity(DEGREES);
        let mut std_devs = Vec::with_capacity(DEGREES);

        for d in 0..DEGREES {
            let dist: Vec<f64> = profile.distances(d).collect();
            let n = dist.len();
            if n == 0 {
                means.push(0.0);
                std_devs.push(0.0);
                continue;
            }

            let mean = dist.iter().sum::<f64>() / n as f64;
            let sd = if n > 1 {
                let ss: f64 = dist.iter().map(|v| (v - mean) * (v - mean)).sum();
                (ss / (n - 1) as f64).sqrt()
            } else {
                0.0
            };
            means.push(mean);
            std_devs.push(sd);
        }

        Self { means, std_devs }
    }

    /// Both vectors rescaled to `[-1, 1]`.
    pub fn normalized(&self) -> Self {
        Self {
            means: normalize_min_max(&self.means, -1.0, 1.0),
            std_devs: normalize_min_max(&self.std_devs, -1.0, 1.0),
        }
    }
}

/// Linear rescale so the minimum maps to `lo` and the maximum to `hi`.
/// A constant input maps entirely to `lo`.
pub fn normalize_min_max(values: &[f64], lo: f64, hi: f64) -> Vec<f64> {
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), &v| {
            (a.min(v), b.max(v))
        });
    let range = max - min;
    let scale = if range > f64::EPSILON {
        (hi - lo) / range
    } else {
        0.0
    };
    values.iter().map(|&v| lo + (v - min) * scale).collect()
}

/// Mean squared error; 0 for two empty inputs.
pub fn mse(a: &[f64], b: &[f64]) -> Result<f64, Error> {
    if a.len() != b.len() {
        return Err(Error::SizeMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    if a.is_empty() {
        return Ok(0.0);
    }

    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    Ok(sum / a.len() as f64)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileDistance {
    pub means_mse: f64,
    pub std_devs_mse: f64,
}

/// Compares two profiles through their normalized per-degree statistics.
pub fn compare_profiles(a: &RadialProfile, b: &RadialProfile) -> Result<ProfileDistance, Error> {
    let sa = RadialStats::from_profile(a).normalized();
    let sb = RadialStats::from_profile(b).normalized();
    Ok(ProfileDistance {
        means_mse: mse(&sa.means, &sb.means)?,
        std_devs_mse: mse(&sa.std_devs, &sb.std_devs)?,
    })
}
