//! CQT evaluator and pixel pipeline: turns the post-FFT spectrum into
//! per-column colors, then those colors into packed RGBA scanlines.

use crate::complex::Complex;
use crate::kernel::KernelIndex;

/// One output column's color and bar height.
///
/// Before [`prerender`] runs, `r`/`g`/`b` are linear intensities in
/// `[0, 1]` and `h` is a normalized bar height in `[0, inf)`. After
/// `prerender`, `r`/`g`/`b` hold the scaled `[0, 255.5]` values that
/// [`render_line_alpha`] packs directly into pixels (`prerender`
/// overwrites the buffer in place rather than writing to a second one, so
/// a column's pre-scaled energies are gone once a scanline has been drawn
/// from it). A fresh `calc()` repopulates them from scratch each frame.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ColorF {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub h: f32,
}

/// Dot-products one column's kernel against the two symmetric FFT bin
/// slices and returns `(r0, r1)`, the squared magnitudes of the decoded
/// left/right spectral components. `kernel_offset` is the running sum of
/// every earlier column's `len` (the coefficient array is packed
/// contiguously in column order; `KernelIndex::start` is an FFT bin
/// offset, not a `kernel` array offset, so this running total is tracked
/// by the caller instead of stored per column).
fn cqt_calc(
    fft_buf: &[Complex],
    kernel: &[f32],
    kernel_offset: usize,
    start: usize,
    len: usize,
    fft_size: usize,
) -> (f32, f32) {
    let mut a = Complex::ZERO;
    let mut b = Complex::ZERO;

    for m in 0..len {
        let u = kernel[kernel_offset + m];
        let i = start + m;
        let j = fft_size - start - m;
        a = a + Complex::new(u * fft_buf[i].re, u * fft_buf[i].im);
        b = b + Complex::new(u * fft_buf[j].re, u * fft_buf[j].im);
    }

    let v0 = Complex::new(a.re + b.re, a.im - b.im);
    let v1 = Complex::new(b.im + a.im, b.re - a.re);
    (v0.norm_sqr(), v1.norm_sqr())
}

/// Evaluates every column in `kernel_index` against the post-FFT
/// `fft_buf`, writing `color_buf[0..kernel_index.len())`. Sets no flags;
/// the caller (`CqtEngine::calc`) owns the `prerender` flag.
pub fn evaluate_columns(
    fft_buf: &[Complex],
    kernel_index: &[KernelIndex],
    kernel: &[f32],
    fft_size: usize,
    sono_v: f32,
    bar_v: f32,
    color_buf: &mut [ColorF],
) {
    let mut offset = 0usize;
    for (x, idx) in kernel_index.iter().enumerate() {
        if idx.len == 0 {
            color_buf[x] = ColorF::default();
            continue;
        }

        let (r0, r1) = cqt_calc(fft_buf, kernel, offset, idx.start, idx.len, fft_size);
        let mid = 0.5 * (r0 + r1);

        color_buf[x] = ColorF {
            r: libm::sqrtf(sono_v * libm::sqrtf(r0)),
            g: libm::sqrtf(sono_v * libm::sqrtf(mid)),
            b: libm::sqrtf(sono_v * libm::sqrtf(r1)),
            h: bar_v * libm::sqrtf(mid),
        };

        offset += idx.len;
    }
}

/// Averages adjacent column pairs from `color_buf[0..2*width)` into
/// `color_buf[0..width)`, for the supersampled (`t_size == 2*width`) path.
/// Safe to call in place: iteration `x` only ever reads indices `>= x`.
pub fn downsample_pairs(color_buf: &mut [ColorF], width: usize) {
    for x in 0..width {
        let a = color_buf[2 * x];
        let b = color_buf[2 * x + 1];
        color_buf[x] = ColorF {
            r: 0.5 * (a.r + b.r),
            g: 0.5 * (a.g + b.g),
            b: 0.5 * (a.b + b.b),
            h: 0.5 * (a.h + b.h),
        };
    }
}

/// Clamps/scales `color_buf[0..width)` from linear `[0, 1]` energies to
/// `[0, 255.5]` display values, clamps `h` to be non-negative, zeroes the
/// `[width, aligned_width)` padding, and fills `rcp_h_buf[0..aligned_width)`
/// with `1 / (h + 1e-4)` for the per-scanline bar-fade division in
/// [`render_line_alpha`]. This mutates `color_buf` in place (see the
/// destructive-overwrite note on [`ColorF`]).
pub fn prerender(color_buf: &mut [ColorF], rcp_h_buf: &mut [f32], width: usize, aligned_width: usize) {
    for c in color_buf[..width].iter_mut() {
        c.r = 255.5 * c.r.clamp(0.0, 1.0);
        c.g = 255.5 * c.g.clamp(0.0, 1.0);
        c.b = 255.5 * c.b.clamp(0.0, 1.0);
        c.h = c.h.max(0.0);
    }

    for c in color_buf[width..aligned_width].iter_mut() {
        *c = ColorF::default();
    }

    for (c, rcp) in color_buf[..aligned_width]
        .iter()
        .zip(rcp_h_buf[..aligned_width].iter_mut())
    {
        *rcp = 1.0 / (c.h + 1e-4);
    }
}

/// Packs one already-prerendered column into `0xAABBGGRR` given a
/// `[0, 1]` bar-fade multiplier `mul` and the alpha byte shifted into
/// position; truncates toward zero the same way the original's `int`
/// casts do.
#[inline]
fn pack(mul: f32, c: ColorF, alpha_bits: u32) -> u32 {
    let r = (mul * c.r) as u32;
    let g = (mul * c.g) as u32;
    let b = (mul * c.b) as u32;
    r | (g << 8) | (b << 16) | alpha_bits
}

/// Fills `output[0..width)` with the `y`-th scanline of the bar-graph
/// image at the given alpha. `y` outside `[0, height)` draws the plain
/// sonogram strip (every column at full color, no bars). Idempotent:
/// repeated calls with the same arguments reread the same prerendered
/// `color_buf`/`rcp_h_buf` and write the same bytes.
pub fn render_line_alpha(
    output: &mut [u32],
    color_buf: &[ColorF],
    rcp_h_buf: &[f32],
    width: usize,
    height: u32,
    y: i32,
    alpha: u8,
) {
    let alpha_bits = (alpha as u32) << 24;

    if y < 0 || y >= height as i32 {
        for x in 0..width {
            output[x] = pack(1.0, color_buf[x], alpha_bits);
        }
        return;
    }

    let ht = (height as f32 - y as f32) / height as f32;
    for x in 0..width {
        let c = color_buf[x];
        if c.h <= ht {
            output[x] = alpha_bits;
        } else {
            let mul = (c.h - ht) * rcp_h_buf[x];
            output[x] = pack(mul, c, alpha_bits);
        }
    }
}
