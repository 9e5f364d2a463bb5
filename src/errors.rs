//! Error surface for the engine.
//!
//! Deliberately small and hand-written rather than `thiserror`-derived: the
//! only place this crate can fail is table initialization (see
//! [`crate::engine::CqtEngine::init`]), and every other operation is total
//! over its input domain.

use std::fmt;

/// Why `init` rejected a configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineError {
    /// `width` or `height` was zero or exceeded its cap.
    InvalidDimensions { width: u32, height: u32 },
    /// `rate` fell outside `[MIN_RATE, MAX_RATE]`.
    InvalidSampleRate { rate: u32 },
    /// `ceil(log2(rate * 0.33))` fell outside `[10, 20]`, or the resulting
    /// `fft_size` exceeded `MAX_FFT_SIZE`.
    FftSizeOutOfRange { bits: i32 },
    /// The running kernel coefficient count would have exceeded
    /// `MAX_KERNEL_SIZE` (minus slack) while building column `column`.
    KernelBudgetExceeded { column: usize, needed: usize },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => write!(
                f,
                "width ({width}) or height ({height}) is zero or exceeds the configured cap"
            ),
            Self::InvalidSampleRate { rate } => {
                write!(f, "sample rate {rate} Hz is outside [8000, 100000]")
            }
            Self::FftSizeOutOfRange { bits } => write!(
                f,
                "derived fft size 2^{bits} is outside the supported [1024, 32768] range"
            ),
            Self::KernelBudgetExceeded { column, needed } => write!(
                f,
                "kernel table would need {needed} coefficients by column {column}, exceeding the budget"
            ),
        }
    }
}

impl std::error::Error for EngineError {}

/// Result alias used internally by the fallible half of the init path.
pub type EngineResult<T> = Result<T, EngineError>;
