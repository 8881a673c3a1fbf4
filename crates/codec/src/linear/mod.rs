//! Code 128 linear codes.
//!
//! Encoding goes through `barcoders` (always code set B) and adds the
//! payload as human-readable text centred under the bars. Decoding locates
//! bar-like bands first, then reads a few scanlines per band in both
//! directions.

mod font;
mod locator;
mod patterns;
mod scanline;

pub use self::locator::{Locator, PatchSize};

use crate::error::{ErrorKind, Result};
use crate::raster::{self, BLACK, WHITE};
use crate::{CodeFamily, Symbology};
use barcoders::sym::code128::Code128;
use image::GrayImage;

/// Longest payload accepted for a linear code.
pub const MAX_PAYLOAD_LEN: usize = 48;
const SCANLINES_PER_BAND: u32 = 7;
/// `barcoders` selects the starting code set with a leading marker
/// character; U+0181 is set B.
const SET_B: char = '\u{0181}';

#[derive(Clone, Copy, Debug)]
struct Style {
    module_px: u32,
    bar_height: u32,
    padding: u32,
    text_gap: u32,
    text_scale: u32,
}

impl Default for Style {
    fn default() -> Self {
        Self { module_px: 2, bar_height: 80, padding: 20, text_gap: 6, text_scale: 2 }
    }
}

/// Code 128 symbology.
#[derive(Clone, Copy, Debug, Default)]
pub struct Linear {
    locator: Locator,
    style: Style,
}

impl Linear {
    pub fn new(locator: Locator) -> Self {
        Self { locator, style: Style::default() }
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    fn validate(payload: &str) -> Result<()> {
        if payload.chars().count() > MAX_PAYLOAD_LEN {
            exn::bail!(ErrorKind::Encoding(format!("longer than {MAX_PAYLOAD_LEN} characters")));
        }
        if let Some(c) = payload.chars().find(|c| !(' '..='~').contains(c)) {
            exn::bail!(ErrorKind::Encoding(format!("character {c:?} is not printable ASCII")));
        }
        Ok(())
    }
}

impl Symbology for Linear {
    fn family(&self) -> CodeFamily {
        CodeFamily::Linear
    }

    fn encode(&self, payload: &str) -> Result<GrayImage> {
        Self::validate(payload)?;
        let modules = Code128::new(format!("{SET_B}{payload}"))
            .map_err(|e| exn::Exn::from(ErrorKind::Encoding(e.to_string())))?
            .encode();

        let Style { module_px, bar_height, padding, text_gap, text_scale } = self.style;
        let bars_width = modules.len() as u32 * module_px;
        let text_width = font::text_width(payload, text_scale);
        let content_width = bars_width.max(text_width);
        let width = content_width + 2 * padding;
        let height = padding + bar_height + text_gap + font::text_height(text_scale) + padding;

        let mut image = GrayImage::from_pixel(width, height, WHITE);
        let bars_left = padding + (content_width - bars_width) / 2;
        for (index, module) in modules.iter().enumerate() {
            if *module == 1 {
                raster::fill(&mut image, bars_left + index as u32 * module_px, padding, module_px, bar_height, BLACK);
            }
        }
        let text_left = padding + (content_width - text_width) / 2;
        font::draw(&mut image, payload, text_left, padding + bar_height + text_gap, text_scale);
        Ok(image)
    }

    fn decode(&self, image: &GrayImage) -> Result<String> {
        let bands = self.locator.locate(image);
        tracing::debug!(bands = bands.len(), "linear bands located");
        let width = image.width() as usize;
        let pixels = image.as_raw();
        for band in bands {
            for y in band.scanlines(SCANLINES_PER_BAND) {
                let start = y as usize * width;
                let Some(row) = pixels.get(start..start + width) else { continue };
                if let Some(text) = scanline::decode(row) {
                    return Ok(text);
                }
                let reversed: Vec<u8> = row.iter().rev().copied().collect();
                if let Some(text) = scanline::decode(&reversed) {
                    return Ok(text);
                }
            }
        }
        exn::bail!(ErrorKind::NoCodeDetected)
    }
}
