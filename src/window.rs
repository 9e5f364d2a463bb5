//! The 4-term flat-top window shared by the attack table and the per-column
//! CQT kernel.
//!
//! Coefficients `0.355768, 0.487396, 0.144232, 0.012604` (a Nuttall-class
//! flat-top, suited to sidelobe suppression around each kernel's narrow
//! frequency support rather than a textbook window's general-purpose
//! tradeoff).

use libm::cos;
use std::f64::consts::PI;

const A0: f64 = 0.355768;
const A1: f64 = 0.487396;
const A2: f64 = 0.144232;
const A3: f64 = 0.012604;

/// Evaluates the flat-top window at phase `y` (radians), where `y` ranges
/// `[0, pi]` over a half-window (attack table) or `[-pi, pi]` over a
/// symmetric kernel tap span.
#[inline]
pub fn flat_top(y: f64) -> f64 {
    A0 + A1 * cos(y) + A2 * cos(2.0 * y) + A3 * cos(3.0 * y)
}

/// Fills `tbl` with the attack-window samples, phase `pi * x / (rate *
/// 0.033)`; `tbl.len()` is expected to be `ceil(rate * 0.033)` (the
/// caller's `attack_size`).
///
/// This is the fade applied to the "half-rate" lane of each staged sample
/// quadruple (see `crate::staging`), softening the seam where the analysis
/// window's three overlapping views of the input are spliced together.
/// Writes into a caller-provided slice rather than returning a `Vec` so
/// `CqtEngine::init` can fill its preallocated `attack_tbl` buffer in place.
pub fn fill_attack_table(tbl: &mut [f32], rate: u32) {
    let span = rate as f64 * 0.033;
    for (x, slot) in tbl.iter_mut().enumerate() {
        let y = PI * x as f64 / span;
        *slot = flat_top(y) as f32;
    }
}

/// Convenience wrapper over [`fill_attack_table`] for callers (tests, small
/// tools) that want an owned table rather than writing into an existing one.
pub fn attack_table(rate: u32, attack_size: usize) -> Vec<f32> {
    let mut tbl = vec![0.0f32; attack_size];
    fill_attack_table(&mut tbl, rate);
    tbl
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_top_peaks_at_one_at_zero_phase() {
        assert!((flat_top(0.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn flat_top_is_symmetric() {
        let y = 0.73;
        assert!((flat_top(y) - flat_top(-y)).abs() < 1e-12);
    }

    #[test]
    fn attack_table_has_ceil_rate_times_033_samples() {
        let rate = 44_100u32;
        let expected_len = (rate as f64 * 0.033).ceil() as usize;
        let tbl = attack_table(rate, expected_len);
        assert_eq!(tbl.len(), expected_len);
        assert!((tbl[0] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn attack_table_tapers_toward_its_last_sample() {
        let rate = 44_100u32;
        let len = (rate as f64 * 0.033).ceil() as usize;
        let tbl = attack_table(rate, len);
        assert!(tbl[len - 1] < tbl[0]);
    }
}
