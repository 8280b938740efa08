//! QR code encoder

use crate::error::{Error, Result};
use crate::link::PaymentLink;
use crate::qr::{QrOptions, RenderedQr};
use image::{GrayImage, ImageBuffer, Luma};
use qrcode::render::unicode;
use qrcode::{Color, QrCode};

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Below this many pixels per module, decoders stop reading the nearest-neighbour raster reliably.
pub const MIN_PIXELS_PER_MODULE: u32 = 2;

/// Renders payment links as QR images
#[derive(Debug, Clone, Default)]
pub struct QrEncoder {
    options: QrOptions,
}

impl QrEncoder {
    /// Create an encoder with the default 300px canvas, 2-module margin, level L
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder with explicit options
    pub fn with_options(options: QrOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    pub fn options(&self) -> &QrOptions {
        &self.options
    }

    /// Render `link` onto a `size` x `size` canvas.
    ///
    /// Each pixel samples the module under it, so the output is always exactly
    /// the configured size even when it is not a multiple of the module count.
    pub fn render(&self, link: &PaymentLink) -> Result<RenderedQr> {
        if link.as_str().is_empty() {
            return Err(Error::QrEncode("cannot encode an empty link".to_string()));
        }

        let code = self.symbol(link)?;
        let modules = code.width() as u32;
        let colors = code.to_colors();
        let margin = self.options.margin;
        let size = self.options.size;
        let cells = margin
            .checked_mul(2)
            .and_then(|m| m.checked_add(modules))
            .ok_or_else(|| Error::QrEncode(format!("quiet zone of {margin} modules is too wide")))?;

        if size / cells < MIN_PIXELS_PER_MODULE {
            return Err(Error::QrEncode(format!(
                "{} characters need {cells} modules, which a {size}px canvas cannot draw at \
                 {MIN_PIXELS_PER_MODULE}px per module; shorten the link or enlarge the canvas",
                link.as_str().len()
            )));
        }

        let image: GrayImage = ImageBuffer::from_fn(size, size, |px, py| {
            let cx = (u64::from(px) * u64::from(cells) / u64::from(size)) as u32;
            let cy = (u64::from(py) * u64::from(cells) / u64::from(size)) as u32;
            if cx < margin || cy < margin || cx >= margin + modules || cy >= margin + modules {
                return LIGHT;
            }
            let index = ((cy - margin) * modules + (cx - margin)) as usize;
            match colors[index] {
                Color::Dark => DARK,
                Color::Light => LIGHT,
            }
        });

        tracing::debug!(
            modules,
            size,
            ecc = ?self.options.ecc,
            "Rendered QR code"
        );

        Ok(RenderedQr::new(link.clone(), image, modules))
    }

    /// Render `link` as block characters for display in a terminal.
    pub fn render_terminal(&self, link: &PaymentLink) -> Result<String> {
        let code = self.symbol(link)?;
        Ok(code
            .render::<unicode::Dense1x2>()
            .dark_color(unicode::Dense1x2::Light)
            .light_color(unicode::Dense1x2::Dark)
            .quiet_zone(true)
            .build())
    }

    fn symbol(&self, link: &PaymentLink) -> Result<QrCode> {
        QrCode::with_error_correction_level(link.as_str(), self.options.ecc.into())
            .map_err(|e| Error::QrEncode(format!("Failed to create QR code: {}", e)))
    }
}
