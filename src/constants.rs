//! Hard caps and tunables shared by every module.
//!
//! Every buffer in [`crate::engine::CqtEngine`] is allocated once, at these
//! maximums, and never resized afterwards.

/// Largest FFT size the engine will ever plan for.
pub const MAX_FFT_SIZE: usize = 32768;
/// Largest supported output row width, in columns.
pub const MAX_WIDTH: usize = 7680;
/// Largest supported output row height, in scanlines.
pub const MAX_HEIGHT: usize = 4320;
/// Total budget, in coefficients, for the CQT kernel table.
pub const MAX_KERNEL_SIZE: usize = 6 * 256 * 1024;

/// Lower clamp for both volume controls.
pub const MIN_VOL: f32 = 1.0;
/// Upper clamp for both volume controls.
pub const MAX_VOL: f32 = 100.0;

/// Lowest accepted sample rate, in Hz.
pub const MIN_RATE: u32 = 8000;
/// Highest accepted sample rate, in Hz.
pub const MAX_RATE: u32 = 100_000;

/// Safety margin subtracted from the kernel budget at every running check.
///
/// Not a tight bound, just slack so a column's kernel can never land
/// exactly on the last usable coefficient. See `kernel::build_kernels`.
pub const KERNEL_BUDGET_SLACK: usize = 1000;

/// Lower bound of the logarithmic column-frequency sweep, in Hz.
pub const KERNEL_FREQ_MIN: f64 = 20.01523126408007475;
/// Upper bound of the logarithmic column-frequency sweep, in Hz.
pub const KERNEL_FREQ_MAX: f64 = 20495.59681441799654;

/// Extra slack appended to `MAX_FFT_SIZE` for the two input channel
/// buffers, matching the reference `input[2][MAX_FFT_SIZE+64]` layout.
///
/// Every index `crate::staging::stage` reads into these buffers
/// (`shift+x`, `fft_size/2+shift+x` only for `x < attack_size`,
/// `fft_size/4+shift+x`) stays below `fft_size` given
/// `shift = fft_size/2 - attack_size`, so this is headroom rather than a
/// load-bearing bound.
pub const INPUT_BUFFER_SLACK: usize = 64;
