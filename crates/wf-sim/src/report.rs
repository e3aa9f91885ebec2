//! Simulation results and uniformity statistics

use serde::{Deserialize, Serialize};
use wf_core::{SpinMode, WfError, WfResult};

/// Standard normal quantile for p = 0.001 (upper tail)
const Z_999: f64 = 3.090_232;

/// Pearson χ² statistic of `histogram` against a uniform distribution
pub fn chi_square(histogram: &[u64]) -> f64 {
    let total: u64 = histogram.iter().sum();
    if histogram.is_empty() || total == 0 {
        return 0.0;
    }
    let expected = total as f64 / histogram.len() as f64;
    histogram
        .iter()
        .map(|&observed| {
            let diff = observed as f64 - expected;
            diff * diff / expected
        })
        .sum()
}

/// Approximate χ² critical value at p = 0.001 (Wilson-Hilferty)
pub fn critical_value_999(degrees_of_freedom: usize) -> f64 {
    let k = degrees_of_freedom.max(1) as f64;
    let h = 2.0 / (9.0 * k);
    k * (1.0 - h + Z_999 * h.sqrt()).powi(3)
}

/// Aggregated outcome of a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimReport {
    pub mode: SpinMode,
    pub segments: usize,
    /// Spins that settled
    pub spins: u64,
    /// Winner counts per segment
    pub histogram: Vec<u64>,
    pub chi_square: f64,
    pub mean_frames: f64,
    pub max_frames: u64,
    pub mean_ticks: f64,
    /// Spins abandoned at the frame limit (not in the histogram)
    pub hit_frame_limit: u64,
}

impl SimReport {
    /// χ² below `critical`
    pub fn is_uniform(&self, critical: f64) -> bool {
        self.chi_square < critical
    }

    /// Uniform at p = 0.001
    pub fn passes_uniformity(&self) -> bool {
        self.is_uniform(critical_value_999(self.segments.saturating_sub(1)))
    }

    /// Winner share per segment
    pub fn frequencies(&self) -> Vec<f64> {
        let total = self.spins.max(1) as f64;
        self.histogram
            .iter()
            .map(|&count| count as f64 / total)
            .collect()
    }

    pub fn to_json(&self) -> WfResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| WfError::Serialization(e.to_string()))
    }
}

impl std::fmt::Display for SimReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} spins ({}), {} segments",
            self.spins,
            self.mode.name(),
            self.segments
        )?;
        for (index, (count, share)) in self.histogram.iter().zip(self.frequencies()).enumerate() {
            writeln!(f, "  [{index:>3}] {count:>8}  {:>6.2}%", share * 100.0)?;
        }
        writeln!(
            f,
            "  chi2 = {:.3} (critical {:.3} at p=0.001)",
            self.chi_square,
            critical_value_999(self.segments.saturating_sub(1))
        )?;
        writeln!(
            f,
            "  frames: mean {:.1}, max {}; ticks/spin {:.1}",
            self.mean_frames, self.max_frames, self.mean_ticks
        )?;
        if self.hit_frame_limit > 0 {
            writeln!(f, "  {} spins hit the frame limit", self.hit_frame_limit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_chi_square() {
        assert_eq!(chi_square(&[]), 0.0);
        assert_eq!(chi_square(&[0, 0]), 0.0);
        assert_eq!(chi_square(&[10, 10, 10]), 0.0);
        // expected 10: (20-10)^2/10 + (0-10)^2/10
        assert_abs_diff_eq!(chi_square(&[20, 0]), 20.0);
    }

    #[test]
    fn test_critical_value_approximation() {
        // Table values: df 5 -> 20.515, df 15 -> 37.697
        assert!((critical_value_999(5) - 20.515).abs() < 0.5);
        assert!((critical_value_999(15) - 37.697).abs() < 0.5);
    }

    #[test]
    fn test_report_uniformity() {
        let report = SimReport {
            mode: SpinMode::Booster,
            segments: 4,
            spins: 400,
            histogram: vec![100, 98, 103, 99],
            chi_square: chi_square(&[100, 98, 103, 99]),
            mean_frames: 60.0,
            max_frames: 70,
            mean_ticks: 30.0,
            hit_frame_limit: 0,
        };
        assert!(report.passes_uniformity());
        assert!(!report.is_uniform(0.01));
        assert_abs_diff_eq!(report.frequencies()[0], 0.25);
        assert!(report.to_string().contains("400 spins (booster)"));
    }
}
