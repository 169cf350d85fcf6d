//! The frame budget schedule.
//!
//! An animation does not evaluate every frame at full depth: the
//! iteration budget ramps up exponentially with the frame index, so
//! the cheap early frames sketch the set and the late frames resolve
//! it.  Julia animations are the exception: their budget is pinned to
//! a fixed threshold and the motion comes from sweeping the map's
//! parameter instead.

use num::Complex;
use std::f64::consts::PI;

// Growth factor of the per-frame budget ramp.
const RAMP_BASE: f64 = 1.15;

/// The iteration budget for a frame on the exponential ramp,
/// `round(1.15^(frame_index + 1))`.  Monotone non-decreasing in the
/// frame index; frame 0 gets a budget of 1.
pub fn ramp_budget(frame_index: usize) -> usize {
    RAMP_BASE.powi(frame_index as i32 + 1).round() as usize
}

/// The sweep angle for a frame, `2π * frame_index / frame_count`: one
/// full turn over the course of the animation.
pub fn sweep_angle(frame_index: usize, frame_count: usize) -> f64 {
    2.0 * PI * (frame_index as f64) / (frame_count as f64)
}

/// How a Julia animation derives its parameter from the sweep angle.
/// The source material used both of these across revisions, so the
/// choice is part of the configuration rather than baked into the
/// kernel.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sweep {
    /// `c = (R, R + a)`: the imaginary part climbs through a full
    /// turn's worth of offset while the real part holds at R.
    Offset,
    /// `c = (R cos a, R sin a)`: the parameter orbits a circle of
    /// radius R around the origin.
    Circle,
}

impl Sweep {
    /// The Julia parameter for radius `R` at sweep angle `a`.
    pub fn parameter(&self, radius: f64, angle: f64) -> Complex<f64> {
        match *self {
            Sweep::Offset => Complex::new(radius, radius + angle),
            Sweep::Circle => Complex::new(radius * angle.cos(), radius * angle.sin()),
        }
    }
}

/// Everything the frame evaluator needs to know about one frame.
/// Produced by [`FractalConfig::schedule`], immutable, one per frame.
///
/// [`FractalConfig::schedule`]: ../render/struct.FractalConfig.html#method.schedule
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameRequest {
    /// The 0-indexed frame this request describes.
    pub frame_index: usize,
    /// The maximum number of iterations any point may spend this
    /// frame.
    pub iteration_budget: usize,
    /// The swept Julia parameter; `None` for every other kind.
    pub parameter: Option<Complex<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_starts_at_one() {
        assert_eq!(ramp_budget(0), 1);
    }

    #[test]
    fn ramp_is_monotone() {
        for frame in 0..80 {
            assert!(ramp_budget(frame + 1) >= ramp_budget(frame));
        }
    }

    #[test]
    fn ramp_rounds_the_exponential() {
        // 1.15^5 = 2.011..., 1.15^10 = 4.045...
        assert_eq!(ramp_budget(4), 2);
        assert_eq!(ramp_budget(9), 4);
    }

    #[test]
    fn sweep_angle_covers_a_full_turn() {
        assert_eq!(sweep_angle(0, 100), 0.0);
        assert!((sweep_angle(50, 100) - PI).abs() < 1e-12);
        assert!((sweep_angle(100, 100) - 2.0 * PI).abs() < 1e-12);
    }

    #[test]
    fn offset_sweep_slides_the_imaginary_part() {
        let c = Sweep::Offset.parameter(0.7885, 0.0);
        assert_eq!(c, Complex::new(0.7885, 0.7885));
        let c = Sweep::Offset.parameter(0.7885, 1.0);
        assert!((c.im - 1.7885).abs() < 1e-12);
        assert_eq!(c.re, 0.7885);
    }

    #[test]
    fn circle_sweep_orbits_the_origin() {
        let r = 0.7885;
        let c = Sweep::Circle.parameter(r, 0.0);
        assert_eq!(c, Complex::new(r, 0.0));
        let c = Sweep::Circle.parameter(r, PI / 2.0);
        assert!(c.re.abs() < 1e-12);
        assert!((c.im - r).abs() < 1e-12);
    }
}
