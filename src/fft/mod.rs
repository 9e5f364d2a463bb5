//! Radix-4, decimation-in-frequency, in-place FFT specialized to
//! power-of-two sizes from 1024 to 32768.
//!
//! The reference implementation hand-unrolls one butterfly-calling function
//! per supported size via a C macro (`fft_calc_1024`, `fft_calc_2048`, ...),
//! each recursively invoking the next-smaller one. That recursion is the
//! algorithm, not an artifact of C macros, so this module expresses it
//! directly as a single recursive function parameterized by `n` at
//! runtime, numerically identical and with no per-size duplication to
//! maintain.

mod tables;
#[cfg(feature = "simd4")]
pub(crate) mod simd;

pub use tables::FftTables;

use crate::complex::Complex;

/// Transforms `v[0..n)` in place. `n` must be a power of two the caller has
/// built `tables` for (`tables.exp_tbl`/`perm_tbl` sized for this `n`).
///
/// Input must already be in the bit-reversed radix-4 order the staging step
/// (`crate::staging`) produces; this function does not permute its input.
pub fn fft_calc(v: &mut [Complex], n: usize, tables: &FftTables) {
    debug_assert!(n.is_power_of_two());
    match n {
        1 => {}
        2 => {
            let v0 = v[0];
            let v1 = v[1];
            v[0] = v0 + v1;
            v[1] = v0 - v1;
        }
        _ => {
            let q = n / 4;
            fft_calc(&mut v[0..q], q, tables);
            fft_calc(&mut v[q..2 * q], q, tables);
            fft_calc(&mut v[2 * q..3 * q], q, tables);
            fft_calc(&mut v[3 * q..4 * q], q, tables);
            butterfly(v, q, tables);
        }
    }
}

/// One radix-4 combine pass over `q` groups of four, stride `q` apart.
///
/// `x = 0` is unrolled separately because it needs no twiddle multiply
/// (`exp_tbl[k]` is always `1 + 0i` for every block `k`).
fn butterfly(v: &mut [Complex], q: usize, tables: &FftTables) {
    #[cfg(feature = "simd4")]
    if q >= 4 {
        simd::butterfly(v, q, tables);
        return;
    }

    let e2 = &tables.exp_tbl[2 * q..];
    let e3 = &tables.exp_tbl[3 * q..];
    let e1 = &tables.exp_tbl[4 * q..];

    let v0 = v[0];
    let v2 = v[q];
    let v1 = v[2 * q];
    let v3 = v[3 * q];
    let a02 = v0 + v2;
    let s02 = v0 - v2;
    let a13 = v1 + v3;
    let s13 = v1 - v3;
    v[0] = a02 + a13;
    v[q] = s02.sim(s13);
    v[2 * q] = a02 - a13;
    v[3 * q] = s02.aim(s13);

    for x in 1..q {
        let v0 = v[x];
        let v2 = e2[x] * v[q + x];
        let v1 = e1[x] * v[2 * q + x];
        let v3 = e3[x] * v[3 * q + x];
        let a02 = v0 + v2;
        let s02 = v0 - v2;
        let a13 = v1 + v3;
        let s13 = v1 - v3;
        v[x] = a02 + a13;
        v[q + x] = s02.sim(s13);
        v[2 * q + x] = a02 - a13;
        v[3 * q + x] = s02.aim(s13);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits_for(n: usize) -> u32 {
        n.trailing_zeros() - 2
    }

    /// Packs a single-channel signal into `fft_buf` the way `crate::staging`
    /// does for the real (non-supersampled) path, so this module's own
    /// tests don't need to assume anything about natural-order DFT bins
    /// (`fft_calc`'s input layout only ever makes sense through this
    /// packing).
    fn stage(
        samples: &[f32],
        fft_size: usize,
        attack_tbl: &[f32],
        tables: &FftTables,
    ) -> Vec<Complex> {
        let fft_size_h = fft_size / 2;
        let fft_size_q = fft_size / 4;
        let mut buf = vec![Complex::ZERO; fft_size];
        for x in 0..fft_size_q {
            let i = 4 * tables.perm_tbl[x] as usize;
            let w = attack_tbl.get(x).copied().unwrap_or(0.0);
            buf[i] = Complex::new(samples[x], 0.0);
            buf[i + 1] = Complex::new(w * samples[fft_size_h + x], 0.0);
            buf[i + 2] = Complex::new(samples[fft_size_q + x], 0.0);
            buf[i + 3] = Complex::ZERO;
        }
        buf
    }

    /// A pure tone staged and transformed through the real input layout
    /// must localize almost all of its energy at the bin the continuous
    /// `freq * fft_size / rate` center formula predicts (the same formula
    /// `crate::kernel` uses to place a column's kernel window).
    #[test]
    fn pure_tone_localizes_at_its_expected_bin() {
        let fft_size = 1024usize;
        let rate = 44_100.0f32;
        let freq = 2000.0f32;
        let tables = FftTables::new(fft_size, bits_for(fft_size));

        let needed = fft_size + fft_size / 4;
        let samples: Vec<f32> = (0..needed)
            .map(|t| (2.0 * std::f32::consts::PI * freq * t as f32 / rate).sin())
            .collect();

        let mut buf = stage(&samples, fft_size, &[], &tables);
        fft_calc(&mut buf, fft_size, &tables);

        let center = freq * fft_size as f32 / rate;
        let expected_bin = center.round() as usize;

        let peak_bin = (0..fft_size)
            .max_by(|&a, &b| buf[a].norm_sqr().partial_cmp(&buf[b].norm_sqr()).unwrap())
            .unwrap();

        assert!(
            peak_bin.abs_diff(expected_bin) <= 1
                || peak_bin.abs_diff(fft_size - expected_bin) <= 1,
            "peak at bin {peak_bin}, expected near {expected_bin} (center={center})"
        );
    }

    #[test]
    fn silence_produces_no_energy() {
        let fft_size = 2048usize;
        let tables = FftTables::new(fft_size, bits_for(fft_size));
        let samples = vec![0.0f32; fft_size + fft_size / 4];
        let mut buf = stage(&samples, fft_size, &[], &tables);
        fft_calc(&mut buf, fft_size, &tables);
        assert!(buf.iter().all(|c| c.norm_sqr() == 0.0));
    }

    #[test]
    fn size_one_and_two_are_trivial() {
        let tables = FftTables::new(1024, 8);
        let mut one = [Complex::new(3.0, -4.0)];
        fft_calc(&mut one, 1, &tables);
        assert_eq!(one[0], Complex::new(3.0, -4.0));

        let mut two = [Complex::new(1.0, 1.0), Complex::new(2.0, -1.0)];
        fft_calc(&mut two, 2, &tables);
        assert_eq!(two[0], Complex::new(3.0, 0.0));
        assert_eq!(two[1], Complex::new(-1.0, 2.0));
    }
}
