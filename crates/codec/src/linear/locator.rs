//! Finds the horizontal bands of an image most likely to contain a linear
//! code, so the scanline decoder only has to look at a handful of rows.

use image::GrayImage;
use std::borrow::Cow;

/// Minimum luma step between neighbouring pixels that counts as an edge.
const EDGE_THRESHOLD: i16 = 64;
/// How many times more horizontal than vertical edges a patch needs.
const DOMINANCE: u32 = 3;

/// Edge length of the square patches the locator scores.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize), serde(rename_all = "kebab-case"))]
pub enum PatchSize {
    XSmall,
    Small,
    Medium,
    Large,
    #[default]
    XLarge,
}

impl PatchSize {
    /// Patch edge in pixels of the (possibly half-sampled) search image.
    pub fn pixels(&self) -> u32 {
        match self {
            Self::XSmall => 8,
            Self::Small => 16,
            Self::Medium => 24,
            Self::Large => 32,
            Self::XLarge => 48,
        }
    }
}

/// Tuning for linear code localisation.
///
/// The defaults mirror how the catalog has always scanned barcodes: search
/// a half-resolution copy of the picture in extra-large patches, after
/// capping the input at 1600 pixels on its longest side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize), serde(default))]
pub struct Locator {
    pub half_sample: bool,
    pub patch_size: PatchSize,
    pub max_dimension: u32,
}

impl Default for Locator {
    fn default() -> Self {
        Self { half_sample: true, patch_size: PatchSize::XLarge, max_dimension: 1600 }
    }
}

/// A run of full-resolution rows worth scanning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Band {
    pub top: u32,
    pub bottom: u32,
}

impl Band {
    /// `count` evenly spaced rows strictly inside the band.
    pub fn scanlines(&self, count: u32) -> impl Iterator<Item = u32> {
        let (top, height) = (self.top, self.bottom.saturating_sub(self.top));
        (1..=count).map(move |k| top + height * k / (count + 1)).filter(move |row| *row < top + height.max(1))
    }
}

impl Locator {
    /// Bands ordered from most to least promising. Bands without a single
    /// bar-like patch are left out.
    pub(crate) fn locate(&self, image: &GrayImage) -> Vec<Band> {
        let (search, scale): (Cow<'_, GrayImage>, u32) =
            if self.half_sample { (Cow::Owned(half_sample(image)), 2) } else { (Cow::Borrowed(image), 1) };
        let (width, height) = search.dimensions();
        if width < 2 || height < 2 {
            return Vec::new();
        }
        let patch = self.patch_size.pixels();
        let mut scored = Vec::new();
        for top in (0..height).step_by(patch as usize) {
            let bottom = (top + patch).min(height);
            let score = (0..width)
                .step_by(patch as usize)
                .filter(|&left| is_barred(&search, left, top, (left + patch).min(width), bottom))
                .count();
            if score > 0 {
                let band = Band { top: top * scale, bottom: (bottom * scale).min(image.height()) };
                scored.push((score, band));
            }
        }
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.into_iter().map(|(_, band)| band).collect()
    }
}

fn is_barred(image: &GrayImage, left: u32, top: u32, right: u32, bottom: u32) -> bool {
    let luma = |x: u32, y: u32| i16::from(image.get_pixel(x, y).0[0]);
    let (mut horizontal, mut vertical) = (0u32, 0u32);
    for y in top..bottom {
        for x in left..right {
            let here = luma(x, y);
            if x + 1 < right && (luma(x + 1, y) - here).abs() > EDGE_THRESHOLD {
                horizontal += 1;
            }
            if y + 1 < bottom && (luma(x, y + 1) - here).abs() > EDGE_THRESHOLD {
                vertical += 1;
            }
        }
    }
    horizontal >= bottom - top && horizontal > vertical * DOMINANCE
}

fn half_sample(image: &GrayImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let (max_x, max_y) = (width.saturating_sub(1), height.saturating_sub(1));
    GrayImage::from_fn((width / 2).max(1), (height / 2).max(1), |x, y| {
        let (x0, y0) = ((2 * x).min(max_x), (2 * y).min(max_y));
        let (x1, y1) = ((x0 + 1).min(max_x), (y0 + 1).min(max_y));
        let sum: u16 = [(x0, y0), (x1, y0), (x0, y1), (x1, y1)]
            .iter()
            .map(|&(px, py)| u16::from(image.get_pixel(px, py).0[0]))
            .sum();
        image::Luma([(sum / 4) as u8])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{self, BLACK, WHITE};

    fn striped(width: u32, height: u32, top: u32, bottom: u32) -> GrayImage {
        let mut image = GrayImage::from_pixel(width, height, WHITE);
        for x in (0..width).step_by(4) {
            raster::fill(&mut image, x, top, 2, bottom - top, BLACK);
        }
        image
    }

    #[test]
    fn test_locates_striped_band() {
        let image = striped(192, 384, 200, 290);
        let bands = Locator::default().locate(&image);
        assert!(!bands.is_empty());
        let best = bands[0];
        assert!(best.top <= 200 && best.bottom > 200, "{best:?}");
    }

    #[test]
    fn test_blank_image_has_no_bands() {
        let image = GrayImage::from_pixel(200, 200, WHITE);
        assert!(Locator::default().locate(&image).is_empty());
    }

    #[test]
    fn test_full_resolution_search() {
        let image = striped(64, 64, 0, 64);
        let locator = Locator { half_sample: false, patch_size: PatchSize::Small, ..Locator::default() };
        assert_eq!(locator.locate(&image).len(), 4);
    }

    #[test]
    fn test_scanlines_stay_inside_band() {
        let band = Band { top: 10, bottom: 90 };
        let rows: Vec<_> = band.scanlines(7).collect();
        assert_eq!(rows, vec![20, 30, 40, 50, 60, 70, 80]);
    }

    #[test]
    fn test_patch_pixels() {
        assert_eq!(PatchSize::XSmall.pixels(), 8);
        assert_eq!(PatchSize::XLarge.pixels(), 48);
    }
}
