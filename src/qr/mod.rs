//! QR rendering and decoding
//!
//! Links are rendered onto a fixed square canvas with a quiet-zone margin and
//! can be serialized to PNG. The decoder reads codes back from images, which is
//! how exported files are checked against the link they were made from.

mod decoder;
mod encoder;

pub use decoder::QrDecoder;
pub use encoder::QrEncoder;

use crate::error::{Error, Result};
use crate::link::PaymentLink;
use image::{DynamicImage, GrayImage, ImageEncoder};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Error correction level of the rendered symbol
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EccLevel {
    /// ~7% recovery
    #[default]
    L,
    /// ~15% recovery
    M,
    /// ~25% recovery
    Q,
    /// ~30% recovery
    H,
}

impl From<EccLevel> for qrcode::EcLevel {
    fn from(level: EccLevel) -> Self {
        match level {
            EccLevel::L => qrcode::EcLevel::L,
            EccLevel::M => qrcode::EcLevel::M,
            EccLevel::Q => qrcode::EcLevel::Q,
            EccLevel::H => qrcode::EcLevel::H,
        }
    }
}

impl FromStr for EccLevel {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_uppercase().as_str() {
            "L" => Ok(Self::L),
            "M" => Ok(Self::M),
            "Q" => Ok(Self::Q),
            "H" => Ok(Self::H),
            other => Err(format!(
                "Unknown error correction level '{other}', expected L, M, Q or H"
            )),
        }
    }
}

/// Rendering settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QrOptions {
    /// Canvas edge length in pixels
    pub size: u32,
    /// Quiet zone width in modules
    pub margin: u32,
    /// Error correction level
    pub ecc: EccLevel,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            size: 300,
            margin: 2,
            ecc: EccLevel::L,
        }
    }
}

/// A rendered QR image together with the link it encodes
#[derive(Debug, Clone)]
pub struct RenderedQr {
    source: PaymentLink,
    image: GrayImage,
    modules: u32,
}

impl RenderedQr {
    pub(crate) fn new(source: PaymentLink, image: GrayImage, modules: u32) -> Self {
        Self {
            source,
            image,
            modules,
        }
    }

    /// The link this image encodes
    pub fn source(&self) -> &PaymentLink {
        &self.source
    }

    /// Whether this image encodes exactly `link`
    pub fn matches(&self, link: &PaymentLink) -> bool {
        &self.source == link
    }

    /// Grayscale raster
    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    /// Raster as a `DynamicImage`
    pub fn to_dynamic(&self) -> DynamicImage {
        DynamicImage::ImageLuma8(self.image.clone())
    }

    /// Canvas edge length in pixels
    pub fn size(&self) -> u32 {
        self.image.width()
    }

    /// Symbol width in modules, excluding the quiet zone
    pub fn modules(&self) -> u32 {
        self.modules
    }

    /// Serialize the raster as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut png = Vec::new();
        image::codecs::png::PngEncoder::new(&mut png)
            .write_image(
                self.image.as_raw(),
                self.image.width(),
                self.image.height(),
                image::ExtendedColorType::L8,
            )
            .map_err(|e| Error::Image(format!("Failed to encode PNG: {e}")))?;
        Ok(png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = QrOptions::default();
        assert_eq!(options.size, 300);
        assert_eq!(options.margin, 2);
        assert_eq!(options.ecc, EccLevel::L);
    }

    #[test]
    fn test_ecc_from_str() {
        assert_eq!("h".parse::<EccLevel>(), Ok(EccLevel::H));
        assert!("X".parse::<EccLevel>().is_err());
    }

    #[test]
    fn test_png_signature() {
        let link = crate::link::build(&crate::PaymentRequest::new("a@b")).unwrap();
        let rendered = QrEncoder::new().render(&link).unwrap();
        let png = rendered.to_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
