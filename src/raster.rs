//! 1-bit bitmaps and their `^GFA` raster encoding.

use image::{DynamicImage, GrayImage};
use log::debug;

use crate::{error::Error, Matrix};

/// A width x height grid of ink / background cells.
#[derive(Debug, Clone, PartialEq)]
pub struct MonochromeBitmap {
    width: u32,
    height: u32,
    ink: Vec<bool>,
}

impl MonochromeBitmap {
    pub fn new(width: u32, height: u32, ink: Vec<bool>) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyBitmap { width, height });
        }
        let expected = width as usize * height as usize;
        if ink.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: ink.len(),
            });
        }
        Ok(MonochromeBitmap { width, height, ink })
    }

    /// Threshold a grayscale image for printing.
    ///
    /// Samples at or above `threshold` become background, darker ones
    /// become ink.
    pub fn from_luma(img: &GrayImage, threshold: u8) -> Result<Self, Error> {
        let (width, height) = img.dimensions();
        let ink = img.pixels().map(|p| p.0[0] < threshold).collect();
        Self::new(width, height, ink)
    }

    /// Convert to grayscale, then threshold.
    pub fn from_image(img: &DynamicImage, threshold: u8) -> Result<Self, Error> {
        Self::from_luma(&img.to_luma8(), threshold)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_ink(&self, x: u32, y: u32) -> bool {
        self.ink[(y * self.width + x) as usize]
    }

    fn row(&self, y: u32) -> &[bool] {
        let start = (y * self.width) as usize;
        &self.ink[start..start + self.width as usize]
    }
}

/// Bytes needed for one row of `width` pixels.
pub fn bytes_per_row(width: u32) -> u32 {
    (width + 7) / 8
}

/// Pack one row MSB first; unused low bits of the last byte stay 0.
fn pack_row(row: &[bool]) -> Vec<u8> {
    row.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |byte, (i, &ink)| if ink { byte | (0x80u8 >> i) } else { byte })
        })
        .collect()
}

/// Packed bitmap ready for a `^GF` graphic field.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterBlock {
    width: u32,
    bytes_per_row: u32,
    rows: Matrix,
}

impl RasterBlock {
    pub fn encode(bitmap: &MonochromeBitmap) -> Self {
        let bytes_per_row = bytes_per_row(bitmap.width());
        let rows: Matrix = (0..bitmap.height())
            .map(|y| pack_row(bitmap.row(y)))
            .collect();

        debug!(
            "Encoded {}x{} bitmap: {} bytes per row, {} bytes total",
            bitmap.width(),
            bitmap.height(),
            bytes_per_row,
            bytes_per_row * bitmap.height()
        );

        RasterBlock {
            width: bitmap.width(),
            bytes_per_row,
            rows,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.rows.len() as u32
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.bytes_per_row
    }

    pub fn total_bytes(&self) -> u32 {
        self.bytes_per_row * self.height()
    }

    pub fn rows(&self) -> &Matrix {
        &self.rows
    }

    /// Uppercase hex, one line per row.
    pub fn hex(&self) -> String {
        self.rows
            .iter()
            .map(hex::encode_upper)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// `^GFA` header; the field size and the graphic size are the same
    /// since each job carries a single graphic.
    pub fn header(&self) -> String {
        format!(
            "^GFA,{},{},{},",
            self.total_bytes(),
            self.total_bytes(),
            self.bytes_per_row
        )
    }
}

/// Rebuild a bitmap from the hex body of a raster block.
///
/// Padding bits past `width` are dropped, so the result has exactly the
/// original pixels.
pub fn decode_hex(hex_rows: &str, width: u32) -> Result<MonochromeBitmap, Error> {
    let expected = bytes_per_row(width) as usize;
    let mut ink = Vec::new();
    let mut height = 0;

    for line in hex_rows.lines() {
        let bytes = hex::decode(line)?;
        if bytes.len() != expected {
            return Err(Error::BufferSizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        ink.extend((0..width).map(|x| bytes[(x / 8) as usize] & (0x80u8 >> (x % 8)) != 0));
        height += 1;
    }

    MonochromeBitmap::new(width, height, ink)
}
