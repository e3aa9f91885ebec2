//! Easing curves for the booster tween.

use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// Easing curve mapping tween progress to rotation progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EaseCurve {
    /// Linear interpolation (constant rate)
    Linear = 0,
    /// Quadratic ease-out
    QuadOut = 1,
    /// Cubic ease-out
    CubicOut = 2,
    /// Quintic ease-out: fast launch, long coast into the stop
    #[default]
    QuintOut = 3,
    /// Sine ease-out
    SineOut = 4,
}

impl EaseCurve {
    /// Convert from u8 index
    #[inline]
    pub fn from_index(index: u8) -> Self {
        match index {
            0 => EaseCurve::Linear,
            1 => EaseCurve::QuadOut,
            2 => EaseCurve::CubicOut,
            3 => EaseCurve::QuintOut,
            4 => EaseCurve::SineOut,
            _ => EaseCurve::QuintOut,
        }
    }

    /// Get display name
    pub fn name(&self) -> &'static str {
        match self {
            EaseCurve::Linear => "Linear",
            EaseCurve::QuadOut => "QuadOut",
            EaseCurve::CubicOut => "CubicOut",
            EaseCurve::QuintOut => "QuintOut",
            EaseCurve::SineOut => "SineOut",
        }
    }

    /// Evaluate curve at position t (0.0 - 1.0)
    ///
    /// Returns value in range 0.0 - 1.0
    #[inline]
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            EaseCurve::Linear => t,
            // y = 1 - (1 - t)^2
            EaseCurve::QuadOut => 1.0 - (1.0 - t).powi(2),
            // y = 1 - (1 - t)^3
            EaseCurve::CubicOut => 1.0 - (1.0 - t).powi(3),
            // y = 1 - (1 - t)^5
            EaseCurve::QuintOut => 1.0 - (1.0 - t).powi(5),
            // y = sin(t * π/2)
            EaseCurve::SineOut => (t * FRAC_PI_2).sin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [EaseCurve; 5] = [
        EaseCurve::Linear,
        EaseCurve::QuadOut,
        EaseCurve::CubicOut,
        EaseCurve::QuintOut,
        EaseCurve::SineOut,
    ];

    #[test]
    fn test_curve_boundaries() {
        for curve in ALL {
            assert!(curve.evaluate(0.0).abs() < 1e-12, "{:?} at 0.0", curve);
            assert!((curve.evaluate(1.0) - 1.0).abs() < 1e-12, "{:?} at 1.0", curve);

            let mid = curve.evaluate(0.5);
            assert!(mid > 0.0 && mid < 1.0, "{:?} at 0.5 = {}", curve, mid);
        }
    }

    #[test]
    fn test_curve_monotonic() {
        for curve in ALL {
            let mut prev = 0.0;
            for i in 0..=100 {
                let t = i as f64 / 100.0;
                let val = curve.evaluate(t);
                assert!(val >= prev - 1e-12, "{:?}: {} < {} at t={}", curve, val, prev, t);
                prev = val;
            }
        }
    }

    #[test]
    fn test_quint_out_front_loads_travel() {
        // Half the time covers almost all of the distance.
        assert!((EaseCurve::QuintOut.evaluate(0.5) - 0.96875).abs() < 1e-12);
        assert_eq!(EaseCurve::QuintOut.evaluate(2.0), 1.0);
    }

    #[test]
    fn test_from_index() {
        assert_eq!(EaseCurve::from_index(0), EaseCurve::Linear);
        assert_eq!(EaseCurve::from_index(3), EaseCurve::QuintOut);
        assert_eq!(EaseCurve::from_index(255), EaseCurve::QuintOut);
    }
}
