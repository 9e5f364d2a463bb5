//! The engine: owns every preallocated buffer and exposes the flat
//! `init`/`calc`/`render_line_*` surface.
//!
//! Every `Vec` field is sized to its maximum at [`CqtEngine::new`] and
//! never grows afterwards; [`CqtEngine::init`] reconfigures the *logical*
//! lengths (`fft_size`, `t_size`, `width`, ...) and refills the tables in
//! place. One `CqtEngine` is one independent instance, with no
//! process-wide global state, constructible as many times as a host needs.

use crate::color::{self, ColorF};
use crate::complex::Complex;
use crate::constants::{
    INPUT_BUFFER_SLACK, KERNEL_BUDGET_SLACK, MAX_FFT_SIZE, MAX_HEIGHT, MAX_KERNEL_SIZE, MAX_RATE,
    MAX_VOL, MAX_WIDTH, MIN_RATE, MIN_VOL,
};
use crate::errors::{EngineError, EngineResult};
use crate::fft::{fft_calc, FftTables};
use crate::kernel::{self, KernelIndex};
use crate::staging;
use crate::window;

/// How many `calc()` calls between throttled debug-log lines reporting the
/// current frame's peak bar height.
const CALC_LOG_INTERVAL: u64 = 512;

/// The computational core of the visualizer: FFT engine, CQT kernel table,
/// and pixel pipeline over a fixed set of preallocated buffers.
pub struct CqtEngine {
    input: [Vec<f32>; 2],
    output: Vec<u32>,
    tables: FftTables,
    attack_tbl: Vec<f32>,
    fft_buf: Vec<Complex>,
    color_buf: Vec<ColorF>,
    rcp_h_buf: Vec<f32>,
    kernel_index: Vec<KernelIndex>,
    kernel: Vec<f32>,

    rate: u32,
    width: usize,
    height: u32,
    aligned_width: usize,
    fft_size: usize,
    t_size: usize,
    attack_size: usize,
    supersample: bool,
    sono_v: f32,
    bar_v: f32,
    prerender_needed: bool,
    calc_count: u64,
}

impl Default for CqtEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl CqtEngine {
    /// Allocates every buffer at its maximum static size. The engine is
    /// unusable until [`init`](Self::init) succeeds (`calc`/`render_line_*`
    /// on an uninitialized engine operate over a zero-length row).
    pub fn new() -> Self {
        Self {
            input: [
                vec![0.0f32; MAX_FFT_SIZE + INPUT_BUFFER_SLACK],
                vec![0.0f32; MAX_FFT_SIZE + INPUT_BUFFER_SLACK],
            ],
            output: vec![0u32; MAX_WIDTH],
            tables: FftTables::new_uninit(),
            attack_tbl: vec![0.0f32; MAX_FFT_SIZE / 8],
            fft_buf: vec![Complex::ZERO; MAX_FFT_SIZE],
            color_buf: vec![ColorF::default(); 2 * MAX_WIDTH],
            rcp_h_buf: vec![0.0f32; MAX_WIDTH],
            kernel_index: Vec::with_capacity(2 * MAX_WIDTH),
            kernel: Vec::with_capacity(MAX_KERNEL_SIZE),
            rate: 0,
            width: 0,
            height: 0,
            aligned_width: 0,
            fft_size: 0,
            t_size: 0,
            attack_size: 0,
            supersample: false,
            sono_v: MIN_VOL,
            bar_v: MIN_VOL,
            prerender_needed: false,
            calc_count: 0,
        }
    }

    /// Address (as a mutable slice) of the left (`channel == 0`) or right
    /// (`channel != 0`) input buffer, `fft_size` samples long, for the
    /// host to fill between frames.
    pub fn input_mut(&mut self, channel: usize) -> &mut [f32] {
        let fft_size = self.fft_size;
        &mut self.input[usize::from(channel != 0)][..fft_size]
    }

    /// The packed-RGBA output row, `width` entries long.
    pub fn output(&self) -> &[u32] {
        &self.output[..self.width]
    }

    /// The per-column color/height table, for diagnostics. Reflects
    /// whichever state `color_buf` is currently in (linear `[0, 1]`
    /// energies right after `calc()`, or prerendered `[0, 255.5]` display
    /// values once a `render_line_*` call has consumed it).
    pub fn color_buf(&self) -> &[ColorF] {
        &self.color_buf[..self.width]
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Configures the engine for a given sample rate / output geometry.
    /// Returns the chosen `fft_size` on success, `0` on rejection (bad
    /// dimensions, sample rate out of range, derived FFT size out of
    /// range, or the CQT kernel table would overflow its budget; see
    /// `EngineError` for which check failed). The reason is logged at
    /// `warn` level before folding into the flat `0`.
    #[allow(clippy::too_many_arguments)]
    pub fn init(
        &mut self,
        rate: u32,
        width: u32,
        height: u32,
        bar_v: f32,
        sono_v: f32,
        supersample: bool,
    ) -> u32 {
        match self.try_init(rate, width, height, bar_v, sono_v, supersample) {
            Ok(fft_size) => fft_size as u32,
            Err(err) => {
                log::warn!("cqt engine init rejected: {err}");
                0
            }
        }
    }

    fn try_init(
        &mut self,
        rate: u32,
        width: u32,
        height: u32,
        bar_v: f32,
        sono_v: f32,
        supersample: bool,
    ) -> EngineResult<usize> {
        if width == 0 || width as usize > MAX_WIDTH || height == 0 || height > MAX_HEIGHT as u32 {
            return Err(EngineError::InvalidDimensions { width, height });
        }
        if rate < MIN_RATE || rate > MAX_RATE {
            return Err(EngineError::InvalidSampleRate { rate });
        }

        let bits = libm::ceil(libm::log2(rate as f64 * 0.33)) as i32;
        if !(10..=20).contains(&bits) {
            return Err(EngineError::FftSizeOutOfRange { bits });
        }
        let fft_size = 1usize << bits;
        if fft_size > MAX_FFT_SIZE {
            return Err(EngineError::FftSizeOutOfRange { bits });
        }

        let width = width as usize;
        let aligned_width = Self::aligned_width_for(width);
        let t_size = width * (1 + supersample as usize);
        let attack_size = libm::ceil(rate as f64 * 0.033) as usize;

        kernel::build_kernels(
            t_size,
            fft_size,
            rate,
            &mut self.kernel,
            &mut self.kernel_index,
            MAX_KERNEL_SIZE,
            KERNEL_BUDGET_SLACK,
        )?;

        self.tables.fill(fft_size, bits as u32 - 2);
        window::fill_attack_table(&mut self.attack_tbl[..attack_size], rate);

        self.rate = rate;
        self.width = width;
        self.height = height;
        self.aligned_width = aligned_width;
        self.fft_size = fft_size;
        self.t_size = t_size;
        self.attack_size = attack_size;
        self.supersample = supersample;
        self.bar_v = bar_v.clamp(MIN_VOL, MAX_VOL);
        self.sono_v = sono_v.clamp(MIN_VOL, MAX_VOL);
        self.prerender_needed = false;
        self.calc_count = 0;

        Ok(fft_size)
    }

    #[cfg(feature = "simd4")]
    fn aligned_width_for(width: usize) -> usize {
        4 * width.div_ceil(4)
    }

    #[cfg(not(feature = "simd4"))]
    fn aligned_width_for(width: usize) -> usize {
        width
    }

    /// Runs one frame: stages the two input channels into the FFT buffer,
    /// transforms, evaluates every column's CQT kernel, downsamples if
    /// supersampling, and marks the engine as needing a prerender before
    /// the next `render_line_*` call.
    pub fn calc(&mut self) {
        staging::stage(
            &mut self.fft_buf[..self.fft_size],
            &self.input[0],
            &self.input[1],
            self.fft_size,
            self.attack_size,
            &self.attack_tbl[..self.attack_size],
            &self.tables.perm_tbl,
        );

        fft_calc(&mut self.fft_buf[..self.fft_size], self.fft_size, &self.tables);

        color::evaluate_columns(
            &self.fft_buf,
            &self.kernel_index[..self.t_size],
            &self.kernel,
            self.fft_size,
            self.sono_v,
            self.bar_v,
            &mut self.color_buf[..self.t_size],
        );

        if self.t_size != self.width {
            color::downsample_pairs(&mut self.color_buf, self.width);
        }

        self.prerender_needed = true;

        self.calc_count += 1;
        if self.calc_count % CALC_LOG_INTERVAL == 0 {
            let peak = self.color_buf[..self.width]
                .iter()
                .fold(0.0f32, |acc, c| acc.max(c.h));
            log::debug!(
                "cqt engine calc #{}: peak bar height {:.3}",
                self.calc_count,
                peak
            );
        }
    }

    fn prerender_if_needed(&mut self) {
        if self.prerender_needed {
            color::prerender(
                &mut self.color_buf,
                &mut self.rcp_h_buf,
                self.width,
                self.aligned_width,
            );
            self.prerender_needed = false;
        }
    }

    /// Fills `output[0..width)` with the `y`-th scanline at the given
    /// alpha, triggering the pending prerender on the first call after a
    /// `calc()`.
    pub fn render_line_alpha(&mut self, y: i32, alpha: u8) -> &[u32] {
        self.prerender_if_needed();
        color::render_line_alpha(
            &mut self.output,
            &self.color_buf,
            &self.rcp_h_buf,
            self.width,
            self.height,
            y,
            alpha,
        );
        &self.output[..self.width]
    }

    /// `render_line_alpha(y, 255)`.
    pub fn render_line_opaque(&mut self, y: i32) -> &[u32] {
        self.render_line_alpha(y, 255)
    }

    /// Clamps and applies new bar/sonogram volume multipliers.
    pub fn set_volume(&mut self, bar_v: f32, sono_v: f32) {
        self.bar_v = bar_v.clamp(MIN_VOL, MAX_VOL);
        self.sono_v = sono_v.clamp(MIN_VOL, MAX_VOL);
    }

    pub fn bar_v(&self) -> f32 {
        self.bar_v
    }

    pub fn sono_v(&self) -> f32 {
        self.sono_v
    }

    /// Clamps and applies a new output row height.
    pub fn set_height(&mut self, height: i32) {
        self.height = height.clamp(1, MAX_HEIGHT as i32) as u32;
    }

    /// `true` iff every sample pair across `[0, fft_size)` has energy
    /// `L^2 + R^2 <= threshold` (used by the host to skip silent frames).
    pub fn detect_silence(&self, threshold: f32) -> bool {
        self.input[0][..self.fft_size]
            .iter()
            .zip(self.input[1][..self.fft_size].iter())
            .all(|(&l, &r)| l * l + r * r <= threshold)
    }
}
