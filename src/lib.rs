//! ZPL Label Converter
//!
//! This crate turns a rendered shipping label page into a print job for
//! Zebra thermal printers speaking ZPL.
//!
//! Conversion runs in two independent stages:
//!
//! 1. Label recovery: a page that is already label sized is used as is. A
//!    letter page carrying a label print is searched for ink, cropped to the
//!    physical label size and turned upright.
//! 2. Raster encoding: the label is thresholded to 1 bit, packed into bytes
//!    and written as a `^GFA` graphic field inside a complete job.
//!
//! # Example
//!
//! ```rust,no_run
//! use zpl_label::{recover_label, Config, DetectionConfig, ImageFile, Job, Media, Rasterizer};
//!
//! let page = ImageFile::new("label.png").rasterize(203).unwrap();
//! let label = recover_label(page, &DetectionConfig::default()).unwrap();
//! let config = Config::new(Media::Label4x6).darkness(25);
//! let job = Job::new(config, label.image()).unwrap();
//! job.write_to(std::io::stdout()).unwrap();
//! ```

mod detect;
mod error;
mod label;
mod media;
mod page;
mod printer;
mod raster;

pub use crate::{
    detect::{
        detect_content, refine_by_column_density, resolve_mask, BinaryMask, BoundingBox,
        DetectionConfig, Resolution,
    },
    error::Error,
    label::{
        needs_rotation, recover_label, resolve_crop, LabelClass, LabelGeometry, Outcome,
        RecoveredLabel,
    },
    media::Media,
    page::{is_letter_like, ImageFile, PageBuffer, Rasterizer},
    printer::{Config, Job},
    raster::{bytes_per_row, decode_hex, MonochromeBitmap, RasterBlock},
};

/// Type alias for packed 1-bit raster data.
///
/// Each inner `Vec<u8>` represents a single row of pixels, with 8 pixels
/// packed into each byte, most significant bit first. The outer Vec
/// represents multiple rows.
pub type Matrix = Vec<Vec<u8>>;

/// Native resolution of 203 dpi Zebra desktop printers (GX420d and friends).
///
/// Label stock sizes are expressed in dots at this resolution, and pages
/// are rendered at it by default.
pub const PRINTER_DPI: u32 = 203;
