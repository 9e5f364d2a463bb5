//! Packs two real channels into one complex FFT input.
//!
//! Putting `L` in the real lane and `R` in the imaginary lane lets one
//! `fft_size`-point complex transform stand in for two real transforms;
//! `crate::color` recovers each channel back out by reading symmetric bins
//! `(i, fft_size - i)` in lockstep. The write order is already the
//! bit-reversed radix-4 ordering `crate::fft` expects on input, so no
//! separate permutation pass runs before the transform.

use crate::complex::Complex;

/// Stages one frame: `left`/`right` must each be long enough to cover
/// `fft_size + fft_size/4` samples ahead of index 0 (see
/// `crate::constants::INPUT_BUFFER_SLACK`); `fft_buf` must hold exactly
/// `fft_size` complex slots; `attack_tbl` holds `attack_size` window taps;
/// `perm_tbl` holds `fft_size/4` bit-reversed group indices.
pub fn stage(
    fft_buf: &mut [Complex],
    left: &[f32],
    right: &[f32],
    fft_size: usize,
    attack_size: usize,
    attack_tbl: &[f32],
    perm_tbl: &[u16],
) {
    let half = fft_size / 2;
    let quarter = fft_size / 4;
    let shift = half - attack_size;

    for x in 0..quarter {
        let i = 4 * perm_tbl[x] as usize;

        fft_buf[i] = Complex::new(left[shift + x], right[shift + x]);

        fft_buf[i + 1] = if x < attack_size {
            let w = attack_tbl[x];
            Complex::new(w * left[half + shift + x], w * right[half + shift + x])
        } else {
            Complex::ZERO
        };

        fft_buf[i + 2] = Complex::new(left[quarter + shift + x], right[quarter + shift + x]);
        fft_buf[i + 3] = Complex::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fft::FftTables;

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|x| x as f32).collect()
    }

    #[test]
    fn every_slot_is_written_exactly_once() {
        let fft_size = 1024usize;
        let bits = fft_size.trailing_zeros() - 2;
        let tables = FftTables::new(fft_size, bits);
        let attack_size = 32;
        let attack_tbl = vec![1.0f32; attack_size];

        let needed = fft_size + fft_size / 4;
        let left = ramp(needed);
        let right = ramp(needed);

        let mut buf = vec![Complex::ZERO; fft_size];
        stage(
            &mut buf,
            &left,
            &right,
            fft_size,
            attack_size,
            &attack_tbl,
            &tables.perm_tbl,
        );

        // perm_tbl is a permutation of [0, fft_size/4), so every group of
        // four slots gets touched exactly once across the whole buffer.
        let mut touched = vec![false; fft_size];
        for p in &tables.perm_tbl {
            let i = 4 * *p as usize;
            for k in 0..4 {
                assert!(!touched[i + k]);
                touched[i + k] = true;
            }
        }
        assert!(touched.iter().all(|&t| t));
    }

    #[test]
    fn unwindowed_lane_and_zero_lanes_carry_the_right_samples() {
        let fft_size = 1024usize;
        let bits = fft_size.trailing_zeros() - 2;
        let tables = FftTables::new(fft_size, bits);
        let attack_size = 0;
        let attack_tbl: Vec<f32> = Vec::new();

        let needed = fft_size + fft_size / 4;
        let left = ramp(needed);
        let right: Vec<f32> = left.iter().map(|v| -v).collect();

        let mut buf = vec![Complex::ZERO; fft_size];
        stage(
            &mut buf,
            &left,
            &right,
            fft_size,
            attack_size,
            &attack_tbl,
            &tables.perm_tbl,
        );

        let half = fft_size / 2;
        let quarter = fft_size / 4;
        let shift = half - attack_size;
        for x in 0..quarter {
            let i = 4 * tables.perm_tbl[x] as usize;
            assert_eq!(buf[i], Complex::new(left[shift + x], right[shift + x]));
            assert_eq!(buf[i + 1], Complex::ZERO);
            assert_eq!(
                buf[i + 2],
                Complex::new(left[quarter + shift + x], right[quarter + shift + x])
            );
            assert_eq!(buf[i + 3], Complex::ZERO);
        }
    }
}
