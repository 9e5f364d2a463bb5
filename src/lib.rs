//! Computational core of a real-time logarithmic-frequency (CQT) audio
//! spectrum visualizer.
//!
//! Given two channels of time-domain PCM, [`CqtEngine`] produces a
//! horizontal row of per-column colors (a radix-4 FFT feeding a
//! Constant-Q kernel evaluator), then rasterizes any requested scanline
//! of the resulting bar-graph image into packed `0xAABBGGRR` pixels.
//!
//! ```
//! use cqt_visualizer_core::CqtEngine;
//!
//! let mut engine = CqtEngine::new();
//! let fft_size = engine.init(48_000, 640, 320, 17.0, 17.0, false);
//! assert!(fft_size > 0);
//!
//! // Host fills both channels between frames; left as silence here.
//! engine.calc();
//! let row = engine.render_line_opaque(0);
//! assert_eq!(row.len(), 640);
//! ```

pub mod color;
pub mod complex;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod fft;
pub mod kernel;
pub mod staging;
pub mod window;

pub use color::ColorF;
pub use complex::Complex;
pub use engine::CqtEngine;
pub use errors::{EngineError, EngineResult};
pub use kernel::KernelIndex;
