use image::DynamicImage;
use log::{debug, info};
use std::io::Write;

use crate::{
    error::Error,
    media::Media,
    raster::{MonochromeBitmap, RasterBlock},
};

const MAX_SPEED: u8 = 14;
const MAX_DARKNESS: u8 = 30;
const MAX_QUANTITY: u32 = 99;
const MAX_ORIGIN: u32 = 800;

/// Print job parameters.
///
/// Values are passed through to the job text verbatim once validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    media: Media,
    speed: u8,
    darkness: u8,
    quantity: u32,
    origin: (u32, u32),
    threshold: u8,
}

impl Config {
    /// Initialize configuration data with default values.
    ///
    /// Speed 2, darkness 25, one copy, field origin (0, 10) and a
    /// black/white threshold of 128.
    ///
    /// # Example
    ///
    /// ```
    /// use zpl_label::{Config, Media};
    ///
    /// let config = Config::new(Media::Label4x6).darkness(20).quantity(2);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(media: Media) -> Config {
        Config {
            media,
            speed: 2,
            darkness: 25,
            quantity: 1,
            origin: (0, 10),
            threshold: 128,
        }
    }

    /// Print speed, 0-14.
    pub fn speed(self, speed: u8) -> Self {
        Config { speed, ..self }
    }

    /// Print darkness, 0-30.
    pub fn darkness(self, darkness: u8) -> Self {
        Config { darkness, ..self }
    }

    /// Number of copies, 1-99.
    pub fn quantity(self, quantity: u32) -> Self {
        Config { quantity, ..self }
    }

    /// Field origin in dots, 0-800 on each axis.
    pub fn origin(self, x: u32, y: u32) -> Self {
        Config {
            origin: (x, y),
            ..self
        }
    }

    /// Luminance at or above which a pixel prints white.
    pub fn threshold(self, threshold: u8) -> Self {
        Config { threshold, ..self }
    }

    pub fn media(&self) -> Media {
        self.media
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.speed > MAX_SPEED {
            return Err(Error::InvalidConfig(format!(
                "speed {} out of range 0-{}",
                self.speed, MAX_SPEED
            )));
        }
        if self.darkness > MAX_DARKNESS {
            return Err(Error::InvalidConfig(format!(
                "darkness {} out of range 0-{}",
                self.darkness, MAX_DARKNESS
            )));
        }
        if self.quantity < 1 || self.quantity > MAX_QUANTITY {
            return Err(Error::InvalidConfig(format!(
                "quantity {} out of range 1-{}",
                self.quantity, MAX_QUANTITY
            )));
        }
        let (x, y) = self.origin;
        if x > MAX_ORIGIN || y > MAX_ORIGIN {
            return Err(Error::InvalidConfig(format!(
                "field origin ({}, {}) out of range 0-{}",
                x, y, MAX_ORIGIN
            )));
        }
        if self.media.width_dots() == 0 || self.media.length_dots() == 0 {
            return Err(Error::InvalidConfig(format!(
                "label size {:?} has no printable area",
                self.media
            )));
        }
        Ok(())
    }

    /// Job preamble up to and including the field origin.
    fn build(&self) -> Result<String, Error> {
        self.validate()?;

        let (x, y) = self.origin;
        let mut buf = String::from("^XA\n");
        buf.push_str(&format!(
            "^PW{}\n^LL{}\n",
            self.media.width_dots(),
            self.media.length_dots()
        ));
        buf.push_str(&format!("^PR{},0,0\n", self.speed));
        buf.push_str(&format!("^MD{}\n", self.darkness));
        buf.push_str(&format!("^PQ{}\n", self.quantity));
        buf.push_str(&format!("^FO{},{}\n", x, y));
        Ok(buf)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(Media::default())
    }
}

/// A complete single-graphic print job.
#[derive(Debug, Clone)]
pub struct Job {
    preamble: String,
    config: Config,
    raster: RasterBlock,
}

impl Job {
    /// Threshold `image` with the configured threshold and encode it.
    pub fn new(config: Config, image: &DynamicImage) -> Result<Self, Error> {
        let bitmap = MonochromeBitmap::from_image(image, config.threshold)?;
        Self::from_bitmap(config, &bitmap)
    }

    pub fn from_bitmap(config: Config, bitmap: &MonochromeBitmap) -> Result<Self, Error> {
        let preamble = config.build()?;
        debug!("{:?}", config);
        let raster = RasterBlock::encode(bitmap);
        Ok(Job {
            preamble,
            config,
            raster,
        })
    }

    pub fn raster(&self) -> &RasterBlock {
        &self.raster
    }

    /// Full job text, ready for a raw print queue.
    pub fn to_zpl(&self) -> String {
        let mut zpl = self.preamble.clone();
        zpl.push_str(&self.raster.header());
        zpl.push('\n');
        zpl.push_str(&self.raster.hex());
        zpl.push_str("\n^FS\n^XZ");
        zpl
    }

    pub fn write_to<W: Write>(&self, mut out: W) -> Result<(), Error> {
        out.write_all(self.to_zpl().as_bytes())?;
        out.flush()?;
        info!("{}", self.summary());
        Ok(())
    }

    /// Human readable job details.
    pub fn summary(&self) -> String {
        let (width_in, length_in) = self.config.media.size_in_inches();
        format!(
            "Label: {:.1} x {:.1} in, image size: {}x{}, bytes per row: {}, total bytes: {}, \
             print speed: {}, darkness: {}, quantity: {}",
            width_in,
            length_in,
            self.raster.width(),
            self.raster.height(),
            self.raster.bytes_per_row(),
            self.raster.total_bytes(),
            self.config.speed,
            self.config.darkness,
            self.config.quantity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn checker(width: u32, height: u32) -> DynamicImage {
        let img = GrayImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Luma([0])
            } else {
                Luma([255])
            }
        });
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn exact_job_text() {
        let job = Job::new(Config::default(), &checker(10, 2)).unwrap();
        assert_eq!(
            job.to_zpl(),
            "^XA\n^PW812\n^LL1218\n^PR2,0,0\n^MD25\n^PQ1\n^FO0,10\n\
             ^GFA,4,4,2,\nAA80\n5540\n^FS\n^XZ"
        );
    }

    #[test]
    fn parameters_are_passed_through() {
        let config = Config::new(Media::Label4x2)
            .speed(6)
            .darkness(12)
            .quantity(3)
            .origin(40, 0);
        let zpl = Job::new(config, &checker(8, 1)).unwrap().to_zpl();
        assert!(zpl.starts_with("^XA\n^PW812\n^LL406\n^PR6,0,0\n^MD12\n^PQ3\n^FO40,0\n"));
    }

    #[test]
    fn out_of_range_parameters_are_rejected() {
        let base = Config::default();
        for config in [
            base.speed(15),
            base.darkness(31),
            base.quantity(0),
            base.quantity(100),
            base.origin(801, 0),
            base.origin(0, 801),
        ] {
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
            assert!(Job::new(config, &checker(8, 1)).is_err());
        }
    }

    #[test]
    fn threshold_controls_ink() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 1, Luma([100])));
        let dark = Job::new(Config::default().threshold(101), &img).unwrap();
        let light = Job::new(Config::default().threshold(100), &img).unwrap();
        assert_eq!(dark.raster().hex(), "FF");
        assert_eq!(light.raster().hex(), "00");
    }

    #[test]
    fn summary_reports_stock_and_raster() {
        let job = Job::new(Config::new(Media::Label4x2).quantity(2), &checker(10, 2)).unwrap();
        assert_eq!(
            job.summary(),
            "Label: 4.0 x 2.0 in, image size: 10x2, bytes per row: 2, total bytes: 4, \
             print speed: 2, darkness: 25, quantity: 2"
        );
    }

    #[test]
    fn write_to_emits_job_text() {
        let job = Job::new(Config::default(), &checker(8, 1)).unwrap();
        let mut out = Vec::new();
        job.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), job.to_zpl());
    }
}
