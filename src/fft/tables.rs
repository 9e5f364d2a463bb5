//! Bit-reversal permutation and twiddle-factor tables, built once by `init`
//! and read-only for the lifetime of the engine afterwards.

use crate::complex::Complex;
use crate::constants::MAX_FFT_SIZE;
use libm::{cos, sin};
use std::f64::consts::PI;

/// Reverses the low `bits` bits of `x`.
///
/// Used to build the radix-4 input permutation: the staging step writes
/// each group of four time-domain samples at `4 * perm_tbl[x]`, which is
/// exactly the bit-reversed position a decimation-in-frequency FFT expects
/// for its in-place output layout.
fn reverse_bits(x: u32, bits: u32) -> u32 {
    x.reverse_bits() >> (32 - bits)
}

/// Twiddle-factor and bit-reversal tables for one `fft_size`.
pub struct FftTables {
    /// Layout: for each power-of-two subtransform size `k` (2 <= k < n),
    /// `[k, k+k/2)` holds `exp(-i*2*pi*x/k)` and `[k+k/2, 2k)` holds
    /// `exp(-i*3*pi*x/k)`; a final block `[n, n+n/4)` holds
    /// `exp(-i*2*pi*x/n)`. Entries `[0, 2)` are unused in scalar mode.
    pub exp_tbl: Vec<Complex>,
    /// Bit-reversal permutation over `log2(n/4)` bits, one entry per
    /// radix-4 input group.
    pub perm_tbl: Vec<u16>,
}

impl FftTables {
    /// Builds fresh tables for an `fft_size`-point transform.
    ///
    /// `perm_bits` is `log2(fft_size) - 2`, i.e. the bit width of the
    /// radix-4 group index space (`fft_size / 4` groups).
    pub fn new(fft_size: usize, perm_bits: u32) -> Self {
        let mut tables = Self {
            exp_tbl: vec![Complex::ZERO; fft_size + fft_size / 4],
            perm_tbl: vec![0u16; fft_size / 4],
        };
        tables.fill(fft_size, perm_bits);
        tables
    }

    /// Allocates at `MAX_FFT_SIZE`-sized capacity without computing any
    /// entries; [`CqtEngine::init`](crate::engine::CqtEngine::init) calls
    /// [`fill`](Self::fill) into this allocation on every reconfiguration,
    /// so the backing `Vec`s never grow past this first allocation.
    pub fn new_uninit() -> Self {
        Self {
            exp_tbl: vec![Complex::ZERO; MAX_FFT_SIZE + MAX_FFT_SIZE / 4],
            perm_tbl: vec![0u16; MAX_FFT_SIZE / 4],
        }
    }

    /// Recomputes both tables for an `fft_size`-point transform in place.
    pub fn fill(&mut self, fft_size: usize, perm_bits: u32) {
        self.fill_perm_tbl(perm_bits);
        self.fill_exp_tbl(fft_size);
    }

    fn fill_perm_tbl(&mut self, bits: u32) {
        let count = 1usize << bits;
        for (x, slot) in self.perm_tbl[..count].iter_mut().enumerate() {
            *slot = reverse_bits(x as u32, bits) as u16;
        }
    }

    fn fill_exp_tbl(&mut self, n: usize) {
        let mut k = 2;
        while k < n {
            let mul = 2.0 * PI / k as f64;
            for x in 0..k / 2 {
                self.exp_tbl[k + x] = twiddle(mul, x);
            }
            let mul = 3.0 * PI / k as f64;
            for x in 0..k / 2 {
                self.exp_tbl[k + k / 2 + x] = twiddle(mul, x);
            }
            k *= 2;
        }
        let mul = 2.0 * PI / n as f64;
        for x in 0..n / 4 {
            self.exp_tbl[n + x] = twiddle(mul, x);
        }
    }

}

fn twiddle(mul: f64, x: usize) -> Complex {
    let angle = mul * x as f64;
    Complex::new(cos(angle) as f32, -sin(angle) as f32)
}
