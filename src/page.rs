//! Rendered pages and the letter-size classifier.

use image::{DynamicImage, GrayImage, RgbImage};
use log::debug;
use std::path::{Path, PathBuf};

use crate::error::Error;

/// A rendered page at a known resolution.
///
/// Samples are either 8-bit grayscale or 24-bit RGB, row-major with a
/// top-left origin. The physical size is always derived from the pixel
/// size and the resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PageBuffer {
    image: DynamicImage,
    dpi: u32,
}

impl PageBuffer {
    pub fn new(image: DynamicImage, dpi: u32) -> Result<Self, Error> {
        if dpi == 0 {
            return Err(Error::InvalidDpi(dpi));
        }
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::EmptyBitmap {
                width: image.width(),
                height: image.height(),
            });
        }
        Ok(PageBuffer { image, dpi })
    }

    /// Wrap a raw 8-bit grayscale buffer.
    pub fn from_gray(width: u32, height: u32, samples: Vec<u8>, dpi: u32) -> Result<Self, Error> {
        let expected = width as usize * height as usize;
        let actual = samples.len();
        match GrayImage::from_raw(width, height, samples) {
            Some(img) => Self::new(DynamicImage::ImageLuma8(img), dpi),
            None => Err(Error::BufferSizeMismatch { expected, actual }),
        }
    }

    /// Wrap a raw 24-bit RGB buffer.
    pub fn from_rgb(width: u32, height: u32, samples: Vec<u8>, dpi: u32) -> Result<Self, Error> {
        let expected = width as usize * height as usize * 3;
        let actual = samples.len();
        match RgbImage::from_raw(width, height, samples) {
            Some(img) => Self::new(DynamicImage::ImageRgb8(img), dpi),
            None => Err(Error::BufferSizeMismatch { expected, actual }),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }

    /// Physical (width, height) in inches.
    pub fn size_in_inches(&self) -> (f64, f64) {
        (
            self.width() as f64 / self.dpi as f64,
            self.height() as f64 / self.dpi as f64,
        )
    }

    /// Whether this page looks like a letter sheet hosting a label print.
    pub fn is_letter_like(&self) -> bool {
        let (w, h) = self.size_in_inches();
        let letter = is_letter_like(w, h);
        debug!("Page size: {:.2} x {:.2} inches, letter size: {}", w, h, letter);
        letter
    }
}

/// Classify a page from its physical size alone.
///
/// Letter-like means 7.5-9.5in by 10-12in in either orientation, bounds
/// exclusive.
pub fn is_letter_like(width_in: f64, height_in: f64) -> bool {
    let short = |v: f64| 7.5 < v && v < 9.5;
    let long = |v: f64| 10.0 < v && v < 12.0;
    (short(width_in) && long(height_in)) || (long(width_in) && short(height_in))
}

/// Source of a rendered first page.
///
/// Document rendering (PDF and friends) lives outside this crate; anything
/// that can produce a page at a requested resolution plugs in here.
pub trait Rasterizer {
    fn rasterize(&self, dpi: u32) -> Result<PageBuffer, Error>;
}

/// A raster image file taken as already rendered at the requested resolution.
#[derive(Debug, Clone)]
pub struct ImageFile {
    path: PathBuf,
}

impl ImageFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        ImageFile {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Rasterizer for ImageFile {
    fn rasterize(&self, dpi: u32) -> Result<PageBuffer, Error> {
        let image = image::open(&self.path)?;
        debug!(
            "Loaded {}: {}x{} px",
            self.path.display(),
            image.width(),
            image.height()
        );
        PageBuffer::new(image, dpi)
    }
}
