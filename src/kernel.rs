//! Per-column CQT kernel table: where each output column's frequency
//! window sits in the FFT spectrum, and the window coefficients to dot
//! it against.
//!
//! The frequency bounds and support-length constants below are carried at
//! full precision rather than rounded, since rounding them shifts every
//! column's exact placement in the spectrum.

use crate::errors::{EngineError, EngineResult};
use crate::window::flat_top;
use libm::{ceil, cos, floor};
use std::f64::consts::PI;

/// Lower bound of the logarithmic column-frequency sweep, in Hz.
pub const KERNEL_FREQ_MIN: f64 = crate::constants::KERNEL_FREQ_MIN;
/// Upper bound of the logarithmic column-frequency sweep, in Hz.
pub const KERNEL_FREQ_MAX: f64 = crate::constants::KERNEL_FREQ_MAX;

/// Where one column's kernel coefficients live in the flat `kernel` table.
///
/// `len == 0` marks a column at or above Nyquist: silent, no coefficients
/// stored for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KernelIndex {
    pub start: usize,
    pub len: usize,
}

/// Builds every column's `KernelIndex` and appends its coefficients to
/// `kernel`, enforcing the running `MAX_KERNEL_SIZE` budget as it goes.
///
/// `t_size` is `width * (1 + supersample as usize)` (the caller has
/// already folded the supersampling multiplier in). Writes one
/// `KernelIndex` per column into `indices`, in the same order `kernel` was
/// appended; both buffers are cleared first and reused in place (their
/// backing storage is the engine's preallocated `kernel`/`kernel_index`
/// arrays, so this never grows past the caller's initial allocation as
/// long as the `MAX_KERNEL_SIZE`/`2*MAX_WIDTH` caps hold).
pub fn build_kernels(
    t_size: usize,
    fft_size: usize,
    rate: u32,
    kernel: &mut Vec<f32>,
    indices: &mut Vec<KernelIndex>,
    max_kernel_size: usize,
    budget_slack: usize,
) -> EngineResult<()> {
    let log_base = KERNEL_FREQ_MIN.ln();
    let log_end = KERNEL_FREQ_MAX.ln();
    let rate = rate as f64;
    let fft_size = fft_size as f64;

    kernel.clear();
    indices.clear();

    for f in 0..t_size {
        let freq = (log_base + (f as f64 + 0.5) * (log_end - log_base) / t_size as f64).exp();

        if freq >= 0.5 * rate {
            indices.push(KernelIndex { start: 0, len: 0 });
            continue;
        }

        let tlen = 384.0 * 0.33 / (384.0 / 0.17 + 0.33 * freq / (1.0 - 0.17))
            + 384.0 * 0.33 / (0.33 * freq / 0.17 + 384.0 / (1.0 - 0.17));
        let flen = 8.0 * fft_size / (tlen * rate);
        let center = freq * fft_size / rate;
        let start = ceil(center - 0.5 * flen) as i64;
        let end = floor(center + 0.5 * flen) as i64;
        let len = (end - start + 1).max(0) as usize;

        if kernel.len() + len + budget_slack > max_kernel_size {
            return Err(EngineError::KernelBudgetExceeded {
                column: f,
                needed: kernel.len() + len,
            });
        }

        for x in start..start + len as i64 {
            let w = if x > end {
                0.0
            } else {
                let sign = if x & 1 != 0 { -1.0 } else { 1.0 };
                let y = 2.0 * PI * (x as f64 - center) / flen;
                flat_top(y) * sign * (1.0 / fft_size)
            };
            kernel.push(w as f32);
        }

        indices.push(KernelIndex {
            start: start.max(0) as usize,
            len,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_frequency_columns_get_nonzero_kernels() {
        let mut kernel = Vec::new();
        let mut indices = Vec::new();
        build_kernels(256, 4096, 44_100, &mut kernel, &mut indices, 6 * 256 * 1024, 1000).unwrap();
        assert!(indices[0].len > 0);
    }

    #[test]
    fn columns_at_or_above_nyquist_are_silent() {
        let mut kernel = Vec::new();
        let mut indices = Vec::new();
        build_kernels(256, 1024, 8_000, &mut kernel, &mut indices, 6 * 256 * 1024, 1000).unwrap();
        assert!(indices.iter().any(|k| k.len == 0));
    }

    #[test]
    fn budget_exceeded_is_reported_with_the_offending_column() {
        let mut kernel = Vec::new();
        let mut indices = Vec::new();
        let result = build_kernels(7680 * 2, 32768, 100_000, &mut kernel, &mut indices, 1024, 1000);
        assert!(matches!(
            result,
            Err(EngineError::KernelBudgetExceeded { .. })
        ));
    }

    #[test]
    fn kernel_table_length_matches_sum_of_index_lengths() {
        let mut kernel = Vec::new();
        let mut indices = Vec::new();
        build_kernels(512, 4096, 44_100, &mut kernel, &mut indices, 6 * 256 * 1024, 1000).unwrap();
        let total: usize = indices.iter().map(|k| k.len).sum();
        assert_eq!(kernel.len(), total);
    }
}
