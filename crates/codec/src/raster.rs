use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use image::imageops::FilterType;
use image::{GrayImage, ImageFormat, Luma};
use std::io::Cursor;

pub(crate) const WHITE: Luma<u8> = Luma([255]);
pub(crate) const BLACK: u8 = 0;

/// Opens arbitrary image bytes as an 8-bit greyscale raster, shrinking it
/// so that neither side exceeds `max_dimension`.
pub(crate) fn load(bytes: &[u8], max_dimension: u32) -> Result<GrayImage> {
    let format = image::guess_format(bytes).or_raise(|| ErrorKind::ImageRead)?;
    let image = image::load_from_memory_with_format(bytes, format).or_raise(|| ErrorKind::ImageRead)?;
    if image.width() == 0 || image.height() == 0 {
        exn::bail!(ErrorKind::ImageRead);
    }
    let image = if max_dimension > 0 && image.width().max(image.height()) > max_dimension {
        tracing::debug!(
            width = image.width(),
            height = image.height(),
            max_dimension,
            "downscaling input image"
        );
        image.resize(max_dimension, max_dimension, FilterType::Triangle)
    } else {
        image
    };
    Ok(image.to_luma8())
}

pub(crate) fn to_png(image: &GrayImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).or_raise(|| ErrorKind::ImageWrite)?;
    Ok(buffer.into_inner())
}

/// Paints a solid rectangle, clipped to the image bounds.
pub(crate) fn fill(image: &mut GrayImage, x: u32, y: u32, width: u32, height: u32, value: u8) {
    let right = (x + width).min(image.width());
    let bottom = (y + height).min(image.height());
    for py in y..bottom {
        for px in x..right {
            image.put_pixel(px, py, Luma([value]));
        }
    }
}
