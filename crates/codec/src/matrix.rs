use crate::error::{ErrorKind, Result};
use crate::raster::{self, BLACK, WHITE};
use crate::{CodeFamily, Symbology};
use image::GrayImage;
use qrcode::{Color, EcLevel, QrCode};

/// QR code symbology.
#[derive(Clone, Copy, Debug)]
pub struct Matrix {
    module_px: u32,
    quiet_zone: u32,
}

impl Default for Matrix {
    fn default() -> Self {
        Self { module_px: 4, quiet_zone: 4 }
    }
}

impl Symbology for Matrix {
    fn family(&self) -> CodeFamily {
        CodeFamily::Matrix
    }

    fn encode(&self, payload: &str) -> Result<GrayImage> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::M)
            .map_err(|e| exn::Exn::from(ErrorKind::Encoding(e.to_string())))?;
        let width = code.width() as u32;
        let side = (width + 2 * self.quiet_zone) * self.module_px;
        let mut image = GrayImage::from_pixel(side, side, WHITE);
        for (index, color) in code.to_colors().into_iter().enumerate() {
            if color != Color::Dark {
                continue;
            }
            let (column, row) = (index as u32 % width, index as u32 / width);
            raster::fill(
                &mut image,
                (column + self.quiet_zone) * self.module_px,
                (row + self.quiet_zone) * self.module_px,
                self.module_px,
                self.module_px,
                BLACK,
            );
        }
        Ok(image)
    }

    fn decode(&self, image: &GrayImage) -> Result<String> {
        let mut prepared =
            rqrr::PreparedImage::prepare_from_greyscale(image.width() as usize, image.height() as usize, |x, y| {
                image.get_pixel(x as u32, y as u32).0[0]
            });
        let grids = prepared.detect_grids();
        tracing::debug!(grids = grids.len(), "matrix grids located");
        for grid in grids {
            match grid.decode() {
                Ok((_, content)) => return Ok(content),
                Err(e) => tracing::debug!(error = %e, "matrix grid could not be decoded"),
            }
        }
        exn::bail!(ErrorKind::NoCodeDetected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_has_quiet_zone() {
        let image = Matrix::default().encode("17").unwrap();
        assert_eq!(image.width(), image.height());
        // Version 1 symbol: 21 modules plus 4 quiet modules either side.
        assert_eq!(image.width(), (21 + 8) * 4);
        for x in 0..16 {
            assert_eq!(image.get_pixel(x, x).0[0], 255);
        }
        // Top-left finder pattern starts right after the quiet zone.
        assert_eq!(image.get_pixel(16, 16).0[0], BLACK);
    }

    #[test]
    fn test_decode_blank_image() {
        let image = GrayImage::from_pixel(120, 120, WHITE);
        let err = Matrix::default().decode(&image).unwrap_err();
        assert_eq!(*err, ErrorKind::NoCodeDetected);
    }
}
