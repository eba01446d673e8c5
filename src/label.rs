//! Cutting the label out of a letter page and turning it upright.

use image::DynamicImage;
use log::{debug, info};

use crate::{
    detect::{detect_content, BoundingBox, DetectionConfig, Resolution},
    error::Error,
    media::Media,
    page::PageBuffer,
    PRINTER_DPI,
};

/// Nominal label size inferred from the content extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LabelClass {
    /// 4 x 6 inch shipping label
    FourBySix,
    /// 4 x 2 inch label
    FourByTwo,
    /// Anything smaller: measured content plus a margin
    Custom { long_in: f64, short_in: f64 },
}

impl LabelClass {
    /// Pick a label size from the content size in inches.
    pub fn classify(width_in: f64, height_in: f64, config: &DetectionConfig) -> Self {
        let max = width_in.max(height_in);
        let min = width_in.min(height_in);

        if max > config.large_label_cutoff {
            Self::FourBySix
        } else if max > config.medium_label_cutoff {
            Self::FourByTwo
        } else {
            Self::Custom {
                long_in: max + config.small_label_margin,
                short_in: min + config.small_label_margin,
            }
        }
    }

    /// (long edge, short edge) in inches.
    pub fn edges_in_inches(&self) -> (f64, f64) {
        match *self {
            Self::FourBySix => (6.0, 4.0),
            Self::FourByTwo => (4.0, 2.0),
            Self::Custom { long_in, short_in } => (long_in, short_in),
        }
    }

    /// Matching label stock for the print job.
    pub fn media(&self) -> Media {
        match *self {
            Self::FourBySix => Media::Label4x6,
            Self::FourByTwo => Media::Label4x2,
            Self::Custom { long_in, short_in } => Media::Custom {
                width_dots: (short_in * PRINTER_DPI as f64).round() as u32,
                length_dots: (long_in * PRINTER_DPI as f64).round() as u32,
            },
        }
    }
}

/// Where and how to cut the label out of its page.
///
/// Decided once per page. The rotation flag describes the crop taken from
/// the page, so applying the geometry never re-evaluates it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelGeometry {
    pub crop: BoundingBox,
    pub rotate: bool,
    pub class: LabelClass,
}

impl LabelGeometry {
    /// Size, place and orient the label around a trusted content box.
    pub fn resolve(
        content: &BoundingBox,
        page_width: u32,
        page_height: u32,
        dpi: u32,
        config: &DetectionConfig,
    ) -> Result<Self, Error> {
        let width_in = content.width() as f64 / dpi as f64;
        let height_in = content.height() as f64 / dpi as f64;
        debug!("Content size in inches: {:.2} x {:.2}", width_in, height_in);

        let class = LabelClass::classify(width_in, height_in, config);
        let (long, short) = class.edges_in_inches();
        debug!("Detected label size: {} x {} inches", short, long);

        let crop = resolve_crop(content, page_width, page_height, dpi, &class)?;
        debug!(
            "Crop region for full label: {:?}, {} x {} pixels",
            crop,
            crop.width(),
            crop.height()
        );

        let rotate = needs_rotation(&crop, content, page_height, config.span_ratio);

        Ok(LabelGeometry {
            crop,
            rotate,
            class,
        })
    }

    /// Cut the label out of `page`, rotating 90° counter-clockwise if
    /// needed. The page is left untouched.
    pub fn apply(&self, page: &PageBuffer) -> Result<DynamicImage, Error> {
        let crop = &self.crop;
        if crop.is_degenerate() || crop.right > page.width() || crop.bottom > page.height() {
            return Err(Error::DegenerateCrop {
                left: crop.left,
                top: crop.top,
                right: crop.right,
                bottom: crop.bottom,
            });
        }

        let cropped = page
            .image()
            .crop_imm(crop.left, crop.top, crop.width(), crop.height());

        if self.rotate {
            debug!("Rotating 90 degrees counter-clockwise");
            Ok(cropped.rotate270())
        } else {
            Ok(cropped)
        }
    }
}

/// Centre a label-sized rectangle on the content and clamp it to the page.
///
/// The long edge is laid horizontally, matching a label printed sideways
/// on a letter sheet.
pub fn resolve_crop(
    content: &BoundingBox,
    page_width: u32,
    page_height: u32,
    dpi: u32,
    class: &LabelClass,
) -> Result<BoundingBox, Error> {
    let (long, short) = class.edges_in_inches();
    let (center_x, center_y) = content.center();
    let half_width = long * dpi as f64 / 2.0;
    let half_height = short * dpi as f64 / 2.0;

    let left = (center_x - half_width).max(0.0) as u32;
    let right = (center_x + half_width).min(page_width as f64) as u32;
    let top = (center_y - half_height).max(0.0) as u32;
    let bottom = (center_y + half_height).min(page_height as f64) as u32;

    BoundingBox::new(left, top, right, bottom)
}

/// Whether a crop has to be turned to read upright.
///
/// Landscape crops always rotate. Narrower crops rotate when their content
/// runs down most of the page, the mark of a 4x6 label printed sideways.
/// A label that is already upright on a letter page still gets rotated,
/// since its crop is laid out landscape.
pub fn needs_rotation(
    crop: &BoundingBox,
    content: &BoundingBox,
    page_height: u32,
    span_ratio: f64,
) -> bool {
    let aspect_ratio = crop.width() as f64 / crop.height() as f64;
    let spans_page_height = content.height() as f64 > page_height as f64 * span_ratio;
    debug!(
        "Aspect ratio: {:.2}, content spans {:.0}% of page height",
        aspect_ratio,
        content.height() as f64 / page_height as f64 * 100.0
    );

    if aspect_ratio > 1.0 {
        debug!("Landscape orientation detected");
        true
    } else if spans_page_height && aspect_ratio > 0.5 {
        debug!("Tall content spanning page height - likely rotated label");
        true
    } else {
        false
    }
}

/// What label recovery did with a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    /// Page is not letter sized and is taken as the label itself.
    NotLetterSize,
    /// Letter page without any ink, returned as is.
    NoContent,
    /// Label cut out of a letter page.
    Extracted {
        resolution: Resolution,
        geometry: LabelGeometry,
    },
}

impl Outcome {
    /// One-line status for the user.
    pub fn status(&self) -> String {
        match self {
            Self::NotLetterSize => "page is not letter size, using it as is".to_string(),
            Self::NoContent => "no content bounding box found".to_string(),
            Self::Extracted { geometry, .. } => {
                let (long, short) = geometry.class.edges_in_inches();
                format!(
                    "label extracted: {:.1} x {:.1} in{}",
                    short,
                    long,
                    if geometry.rotate { ", rotated" } else { "" }
                )
            }
        }
    }
}

/// Result of label recovery: the label image and how it was obtained.
#[derive(Debug, Clone)]
pub struct RecoveredLabel {
    image: DynamicImage,
    dpi: u32,
    outcome: Outcome,
}

impl RecoveredLabel {
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Whether the page went through unchanged.
    pub fn is_pass_through(&self) -> bool {
        !matches!(self.outcome, Outcome::Extracted { .. })
    }
}

/// Turn a rendered page into an upright label image.
///
/// Pages that are not letter sized, and letter pages without ink, come back
/// unchanged. Fails only if the resolved crop turns out degenerate.
pub fn recover_label(page: PageBuffer, config: &DetectionConfig) -> Result<RecoveredLabel, Error> {
    let dpi = page.dpi();

    if !page.is_letter_like() {
        return Ok(RecoveredLabel {
            image: page.into_image(),
            dpi,
            outcome: Outcome::NotLetterSize,
        });
    }

    let resolution = detect_content(&page, config);
    let content = match resolution.content() {
        Some(content) => content,
        None => {
            info!("No content bounding box found, returning original");
            return Ok(RecoveredLabel {
                image: page.into_image(),
                dpi,
                outcome: Outcome::NoContent,
            });
        }
    };
    debug!("Final content bbox: {:?}", content);

    let geometry = LabelGeometry::resolve(&content, page.width(), page.height(), dpi, config)?;
    let image = geometry.apply(&page)?;
    info!("Label extracted: {}x{} px", image.width(), image.height());

    Ok(RecoveredLabel {
        image,
        dpi,
        outcome: Outcome::Extracted {
            resolution,
            geometry,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    const LETTER_W: u32 = 1726;
    const LETTER_H: u32 = 2234;

    fn bbox(left: u32, top: u32, right: u32, bottom: u32) -> BoundingBox {
        BoundingBox::new(left, top, right, bottom).unwrap()
    }

    #[test]
    fn classify_by_longest_content_edge() {
        let config = DetectionConfig::default();
        assert_eq!(LabelClass::classify(6.06, 4.04, &config), LabelClass::FourBySix);
        assert_eq!(LabelClass::classify(3.9, 5.5, &config), LabelClass::FourBySix);
        assert_eq!(LabelClass::classify(3.5, 1.8, &config), LabelClass::FourByTwo);
        assert_eq!(LabelClass::classify(5.0, 1.0, &config), LabelClass::FourByTwo);

        match LabelClass::classify(2.0, 1.5, &config) {
            LabelClass::Custom { long_in, short_in } => {
                assert!((long_in - 2.2).abs() < 1e-9);
                assert!((short_in - 1.7).abs() < 1e-9);
            }
            other => panic!("expected custom label, got {:?}", other),
        }
    }

    #[test]
    fn class_maps_to_stock() {
        assert_eq!(LabelClass::FourBySix.media(), Media::Label4x6);
        assert_eq!(LabelClass::FourByTwo.media(), Media::Label4x2);
        assert_eq!(
            LabelClass::Custom {
                long_in: 3.0,
                short_in: 2.0
            }
            .media(),
            Media::Custom {
                width_dots: 406,
                length_dots: 609
            }
        );
    }

    #[test]
    fn crop_is_centred_on_content() {
        let content = bbox(200, 400, 1430, 1220);
        let crop = resolve_crop(&content, LETTER_W, LETTER_H, 203, &LabelClass::FourBySix).unwrap();
        assert_eq!(crop, bbox(206, 404, 1424, 1216));
        assert_eq!((crop.width(), crop.height()), (1218, 812));
    }

    #[test]
    fn crop_is_clamped_to_page() {
        let content = bbox(0, 0, 100, 100);
        let crop = resolve_crop(&content, LETTER_W, LETTER_H, 203, &LabelClass::FourBySix).unwrap();
        assert_eq!(crop, bbox(0, 0, 659, 456));
    }

    #[test]
    fn landscape_crop_rotates() {
        let crop = bbox(0, 0, 1218, 812);
        let content = bbox(10, 10, 1200, 800);
        assert!(needs_rotation(&crop, &content, LETTER_H, 0.7));
    }

    #[test]
    fn tall_crop_spanning_page_rotates() {
        let crop = bbox(0, 0, 1000, 1800);
        let content = bbox(0, 0, 1000, 1700);
        assert!(needs_rotation(&crop, &content, LETTER_H, 0.7));
    }

    #[test]
    fn tall_crop_below_span_stays() {
        let crop = bbox(0, 0, 1000, 1800);
        let content = bbox(0, 0, 1000, 1500);
        assert!(!needs_rotation(&crop, &content, LETTER_H, 0.7));
    }

    #[test]
    fn very_narrow_crop_stays_even_when_spanning() {
        let crop = bbox(0, 0, 800, 2000);
        let content = bbox(0, 0, 800, 2000);
        assert!(!needs_rotation(&crop, &content, LETTER_H, 0.7));
    }

    #[test]
    fn rotated_4x6_scenario() {
        let content = bbox(200, 400, 1430, 1220);
        let geometry =
            LabelGeometry::resolve(&content, LETTER_W, LETTER_H, 203, &DetectionConfig::default())
                .unwrap();
        assert_eq!(geometry.class, LabelClass::FourBySix);
        assert!(geometry.rotate);
    }

    #[test]
    fn upright_label_on_letter_page_is_still_rotated() {
        // Known limitation: an upright 4x6 that does not span 70% of the page
        // gets a landscape crop and is turned anyway.
        let content = bbox(400, 300, 1212, 1518);
        let geometry =
            LabelGeometry::resolve(&content, LETTER_W, LETTER_H, 203, &DetectionConfig::default())
                .unwrap();
        assert!(geometry.rotate);
    }

    #[test]
    fn apply_rotates_counter_clockwise() {
        let mut img = GrayImage::from_pixel(6, 4, Luma([128]));
        img.put_pixel(0, 0, Luma([10]));
        img.put_pixel(5, 0, Luma([20]));
        let page = PageBuffer::new(DynamicImage::ImageLuma8(img), 203).unwrap();
        let geometry = LabelGeometry {
            crop: bbox(0, 0, 6, 4),
            rotate: true,
            class: LabelClass::FourByTwo,
        };

        let out = geometry.apply(&page).unwrap().to_luma8();
        assert_eq!(out.dimensions(), (4, 6));
        // top-left goes to bottom-left, top-right to top-left
        assert_eq!(out.get_pixel(0, 5).0[0], 10);
        assert_eq!(out.get_pixel(0, 0).0[0], 20);
    }

    #[test]
    fn apply_rejects_crop_outside_page() {
        let page = PageBuffer::from_gray(10, 10, vec![255; 100], 203).unwrap();
        let geometry = LabelGeometry {
            crop: bbox(0, 0, 20, 10),
            rotate: false,
            class: LabelClass::FourByTwo,
        };
        assert!(matches!(
            geometry.apply(&page),
            Err(Error::DegenerateCrop { right: 20, .. })
        ));
    }

    #[test]
    fn apply_rejects_inverted_crop() {
        let page = PageBuffer::from_gray(10, 10, vec![255; 100], 203).unwrap();
        for crop in [
            BoundingBox {
                left: 8,
                top: 0,
                right: 4,
                bottom: 10,
            },
            BoundingBox {
                left: 0,
                top: 6,
                right: 10,
                bottom: 6,
            },
        ] {
            let geometry = LabelGeometry {
                crop,
                rotate: true,
                class: LabelClass::FourByTwo,
            };
            match geometry.apply(&page) {
                Err(Error::DegenerateCrop {
                    left,
                    top,
                    right,
                    bottom,
                }) => assert_eq!(
                    (left, top, right, bottom),
                    (crop.left, crop.top, crop.right, crop.bottom)
                ),
                other => panic!(
                    "expected degenerate crop error, got {:?}",
                    other.map(|img| (img.width(), img.height()))
                ),
            }
        }
    }

    #[test]
    fn label_sized_page_passes_through() {
        let page = PageBuffer::from_gray(812, 1218, vec![0; 812 * 1218], 203).unwrap();
        let original = page.clone();
        let label = recover_label(page, &DetectionConfig::default()).unwrap();
        assert_eq!(*label.outcome(), Outcome::NotLetterSize);
        assert_eq!(label.image(), original.image());
    }

    #[test]
    fn blank_letter_page_passes_through() {
        let page = PageBuffer::from_gray(850, 1100, vec![255; 850 * 1100], 100).unwrap();
        let label = recover_label(page, &DetectionConfig::default()).unwrap();
        assert_eq!(*label.outcome(), Outcome::NoContent);
        assert_eq!(label.outcome().status(), "no content bounding box found");
        assert_eq!(label.image().width(), 850);
        assert_eq!(label.image().height(), 1100);
    }
}
