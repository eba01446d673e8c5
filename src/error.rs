//! Error types for label recovery and raster encoding.
//!
//! Stage one (label recovery) only fails on malformed input or degenerate
//! geometry; a page without content is not an error. Stage two (encoding)
//! surfaces every problem since there is no safe default raster to emit.

use thiserror::Error;

/// Main error type for the conversion pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Crop rectangle is empty or inverted after clamping to the page.
    ///
    /// Raised before anything reaches the raster encoder.
    #[error("Degenerate crop rectangle ({left}, {top}, {right}, {bottom})")]
    DegenerateCrop {
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
    },

    /// Bitmap or page with zero width or zero height.
    #[error("Bitmap has no pixels: {width}x{height}")]
    EmptyBitmap { width: u32, height: u32 },

    #[error("Invalid resolution: {0} dpi")]
    InvalidDpi(u32),

    #[error("Pixel buffer holds {actual} samples, expected {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// Invalid print job parameter.
    ///
    /// This error occurs when speed, darkness, quantity or placement
    /// values are out of the range accepted by the printer.
    #[error("Invalid configuration parameter: {0}")]
    InvalidConfig(String),

    /// Failure while decoding a page image.
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// Malformed hex text in a raster body.
    #[error(transparent)]
    Hex(#[from] hex::FromHexError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
