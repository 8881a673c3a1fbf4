//! Visual codes for catalog identifiers.
//!
//! Two code families are supported: QR codes ([`Matrix`]) and Code 128
//! barcodes ([`Linear`]). Both are exposed through the [`Symbology`] trait,
//! and [`Codec`] wraps them with PNG encoding and image loading so callers
//! only ever deal in bytes.

pub mod error;
mod family;
mod linear;
mod matrix;
mod raster;

pub use crate::family::CodeFamily;
pub use crate::linear::{Linear, Locator, MAX_PAYLOAD_LEN, PatchSize};
pub use crate::matrix::Matrix;

use crate::error::{ErrorKind, Result};
use image::GrayImage;
use tracing::instrument;

/// A code family's raster encoder and decoder.
pub trait Symbology: Send + Sync {
    fn family(&self) -> CodeFamily;

    /// Renders `payload` to a greyscale raster.
    fn encode(&self, payload: &str) -> Result<GrayImage>;

    /// Extracts the payload from a raster.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::NoCodeDetected`] when nothing decodable is present.
    fn decode(&self, image: &GrayImage) -> Result<String>;
}

/// Encodes identifiers to PNG and decodes them back from arbitrary images.
#[derive(Clone, Debug, Default)]
pub struct Codec {
    matrix: Matrix,
    linear: Linear,
}

impl Codec {
    pub fn new(locator: Locator) -> Self {
        Self { matrix: Matrix::default(), linear: Linear::new(locator) }
    }

    pub fn symbology(&self, family: CodeFamily) -> &dyn Symbology {
        match family {
            CodeFamily::Matrix => &self.matrix,
            CodeFamily::Linear => &self.linear,
        }
    }

    /// Renders `payload` as a PNG image.
    #[instrument(skip(self, family), fields(family = %family))]
    pub fn encode(&self, payload: &str, family: CodeFamily) -> Result<Vec<u8>> {
        if payload.is_empty() {
            exn::bail!(ErrorKind::Encoding("empty payload".to_string()));
        }
        let image = self.symbology(family).encode(payload)?;
        raster::to_png(&image)
    }

    /// Reads the payload out of encoded image bytes (PNG, JPEG).
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::ImageRead`] if `bytes` is not an image.
    /// - [`ErrorKind::NoCodeDetected`] if it is, but holds no readable code.
    #[instrument(skip(self, bytes, family), fields(family = %family, bytes = bytes.len()))]
    pub fn decode(&self, bytes: &[u8], family: CodeFamily) -> Result<String> {
        let image = raster::load(bytes, self.linear.locator().max_dimension)?;
        let payload = self.symbology(family).decode(&image)?;
        tracing::debug!(payload = %payload, "code decoded");
        Ok(payload)
    }
}
