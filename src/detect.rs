//! Locating the ink-bearing region of a page.
//!
//! A plain bounding box over all ink pixels is tried first. When it spans
//! the whole page, which happens with PDFs carrying invisible full-bleed
//! elements, the page is cut into vertical strips and only the dense ones
//! are kept.

use image::GrayImage;
use log::debug;

use crate::{error::Error, page::PageBuffer};

/// Tunables for content detection and label sizing.
///
/// Defaults are the values the heuristics were tuned with on 203 dpi
/// renders of carrier PDFs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionConfig {
    pub(crate) ink_threshold: u8,
    pub(crate) strip_count: u32,
    pub(crate) strip_density: f64,
    pub(crate) page_margin: f64,
    pub(crate) span_ratio: f64,
    pub(crate) small_label_margin: f64,
    pub(crate) large_label_cutoff: f64,
    pub(crate) medium_label_cutoff: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            ink_threshold: 240,
            strip_count: 20,
            strip_density: 0.02,
            page_margin: 0.05,
            span_ratio: 0.70,
            small_label_margin: 0.2,
            large_label_cutoff: 5.0,
            medium_label_cutoff: 3.0,
        }
    }
}

impl DetectionConfig {
    /// Luminance below which a pixel counts as ink. Default 240.
    pub fn ink_threshold(self, ink_threshold: u8) -> Self {
        DetectionConfig {
            ink_threshold,
            ..self
        }
    }

    /// Number of vertical strips for density refinement. Default 20.
    pub fn strip_count(self, strip_count: u32) -> Self {
        DetectionConfig {
            strip_count,
            ..self
        }
    }

    /// Ink fraction a strip must exceed to count as label. Default 0.02.
    pub fn strip_density(self, strip_density: f64) -> Self {
        DetectionConfig {
            strip_density,
            ..self
        }
    }

    /// Fraction of the page width and height within which every bbox edge
    /// must sit for the bbox to be distrusted. Default 0.05.
    pub fn page_margin(self, page_margin: f64) -> Self {
        DetectionConfig {
            page_margin,
            ..self
        }
    }

    /// Fraction of the page height above which content is taken as a
    /// label printed sideways. Default 0.70.
    pub fn span_ratio(self, span_ratio: f64) -> Self {
        DetectionConfig { span_ratio, ..self }
    }

    /// Margin in inches added to both axes of small custom labels. Default 0.2.
    pub fn small_label_margin(self, small_label_margin: f64) -> Self {
        DetectionConfig {
            small_label_margin,
            ..self
        }
    }

    /// Content extents (inches) above which a 4x6 or 4x2 label is assumed.
    /// Defaults 5.0 and 3.0.
    pub fn label_cutoffs(self, large_label_cutoff: f64, medium_label_cutoff: f64) -> Self {
        DetectionConfig {
            large_label_cutoff,
            medium_label_cutoff,
            ..self
        }
    }
}

/// Axis-aligned pixel rectangle, right and bottom exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BoundingBox {
    /// Build a non-empty rectangle, rejecting empty or inverted ones.
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Result<Self, Error> {
        if right <= left || bottom <= top {
            return Err(Error::DegenerateCrop {
                left,
                top,
                right,
                bottom,
            });
        }
        Ok(BoundingBox {
            left,
            top,
            right,
            bottom,
        })
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Empty or inverted, as can happen with hand-built boxes.
    pub fn is_degenerate(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.left + self.right) as f64 / 2.0,
            (self.top + self.bottom) as f64 / 2.0,
        )
    }

    /// True when every edge sits strictly within `margin` (a fraction of
    /// the page size) of the matching page border.
    pub fn covers_page(&self, page_width: u32, page_height: u32, margin: f64) -> bool {
        let w = page_width as f64;
        let h = page_height as f64;
        let far = 1.0 - margin;
        (self.left as f64) < w * margin
            && (self.top as f64) < h * margin
            && (self.right as f64) > w * far
            && (self.bottom as f64) > h * far
    }
}

/// Page reduced to ink / no ink.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    ink: Vec<bool>,
}

impl BinaryMask {
    /// Pixels with a luminance strictly below `threshold` are ink.
    pub fn from_luma(img: &GrayImage, threshold: u8) -> Self {
        let (width, height) = img.dimensions();
        let ink = img.pixels().map(|p| p.0[0] < threshold).collect();
        BinaryMask { width, height, ink }
    }

    pub fn from_page(page: &PageBuffer, threshold: u8) -> Self {
        Self::from_luma(&page.image().to_luma8(), threshold)
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

    /// Tightest box around all ink, or `None` for a blank mask.
    pub fn bbox(&self) -> Option<BoundingBox> {
        self.bbox_in_columns(0, self.width)
    }

    /// Tightest box around the ink found in columns `left..right`.
    pub fn bbox_in_columns(&self, left: u32, right: u32) -> Option<BoundingBox> {
        let right = right.min(self.width);
        let mut found: Option<(u32, u32, u32, u32)> = None;

        for y in 0..self.height {
            for x in left..right {
                if !self.is_ink(x, y) {
                    continue;
                }
                found = Some(match found {
                    None => (x, y, x + 1, y + 1),
                    Some((l, t, r, b)) => (l.min(x), t.min(y), r.max(x + 1), b.max(y + 1)),
                });
            }
        }

        found.map(|(left, top, right, bottom)| BoundingBox {
            left,
            top,
            right,
            bottom,
        })
    }

    /// Ink pixel count of every column.
    fn column_counts(&self) -> Vec<u32> {
        let mut counts = vec![0u32; self.width as usize];
        for row in self.ink.chunks(self.width as usize) {
            for (count, &ink) in counts.iter_mut().zip(row) {
                if ink {
                    *count += 1;
                }
            }
        }
        counts
    }

    /// Ink density of each of `strip_count` equal vertical strips.
    ///
    /// Strip width is `width / strip_count` rounded down; leftover columns
    /// on the right are not sampled. Empty when the page is narrower than
    /// the strip count.
    pub fn strip_densities(&self, strip_count: u32) -> Vec<f64> {
        if strip_count == 0 {
            return Vec::new();
        }
        let strip_width = self.width / strip_count;
        if strip_width == 0 || self.height == 0 {
            return Vec::new();
        }
        let area = (strip_width * self.height) as f64;
        let counts = self.column_counts();

        counts
            .chunks(strip_width as usize)
            .take(strip_count as usize)
            .map(|strip| strip.iter().map(|&c| c as u64).sum::<u64>() as f64 / area)
            .collect()
    }
}

/// How the content box of a page was settled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// No ink anywhere; the page goes through untouched.
    NoContent,
    /// The plain ink bbox, trusted as is or kept after refinement found
    /// nothing better.
    DirectBbox(BoundingBox),
    /// A whole-page bbox replaced by column density refinement.
    RefinedBbox {
        initial: BoundingBox,
        refined: BoundingBox,
    },
}

impl Resolution {
    /// The content box to size the label from, if any.
    pub fn content(&self) -> Option<BoundingBox> {
        match *self {
            Self::NoContent => None,
            Self::DirectBbox(bbox) => Some(bbox),
            Self::RefinedBbox { refined, .. } => Some(refined),
        }
    }
}

/// Find the content box of a page.
pub fn detect_content(page: &PageBuffer, config: &DetectionConfig) -> Resolution {
    let mask = BinaryMask::from_page(page, config.ink_threshold);
    resolve_mask(&mask, config)
}

/// Content box resolution on an already binarized page.
pub fn resolve_mask(mask: &BinaryMask, config: &DetectionConfig) -> Resolution {
    let initial = match mask.bbox() {
        Some(bbox) => bbox,
        None => {
            debug!("No content bounding box found");
            return Resolution::NoContent;
        }
    };
    debug!("Initial content bbox: {:?}", initial);

    if !initial.covers_page(mask.width(), mask.height(), config.page_margin) {
        return Resolution::DirectBbox(initial);
    }

    debug!("Bbox covers whole page - using column density analysis");
    match refine_by_column_density(mask, config) {
        Some(refined) => {
            debug!("Refined bbox from density analysis: {:?}", refined);
            Resolution::RefinedBbox { initial, refined }
        }
        None => {
            debug!("Density analysis found no label strips, keeping initial bbox");
            Resolution::DirectBbox(initial)
        }
    }
}

/// Recover a content box from the dense vertical strips of a page.
///
/// Strips are selected by the min and max index of those above the
/// density threshold; gaps between them are not checked. The horizontal
/// bounds are the strip bounds grown by one strip width, the vertical
/// bounds are the ink extent inside them grown by the same margin.
pub fn refine_by_column_density(
    mask: &BinaryMask,
    config: &DetectionConfig,
) -> Option<BoundingBox> {
    let densities = mask.strip_densities(config.strip_count);
    if densities.is_empty() {
        return None;
    }
    debug!(
        "Strip densities: {:?}",
        densities
            .iter()
            .map(|d| format!("{:.3}", d))
            .collect::<Vec<_>>()
    );

    let mut dense = densities
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d > config.strip_density)
        .map(|(i, _)| i as u32);
    let first = dense.next()?;
    let (left_strip, right_strip) = dense.fold((first, first), |(l, r), i| (l.min(i), r.max(i)));

    let strip_width = mask.width() / config.strip_count;
    let margin = strip_width;
    let left = (left_strip * strip_width).saturating_sub(margin);
    let right = ((right_strip + 1) * strip_width + margin).min(mask.width());

    let region = mask.bbox_in_columns(left, right)?;
    let top = region.top.saturating_sub(margin);
    let bottom = (region.bottom + margin).min(mask.height());

    Some(BoundingBox {
        left,
        top,
        right,
        bottom,
    })
}
