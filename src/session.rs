//! Single-screen payment session
//!
//! A [`Session`] owns the form values and, once submitted, the generated link
//! and its rendered code. The link and the image live in one [`Generated`]
//! value that is replaced wholesale on every submit and dropped on reset, so an
//! image can never outlive or lag behind the link it was rendered from.

use crate::config::UpiqrConfig;
use crate::error::{Error, Result};
use crate::export::{self, ClipboardWriter, ExportOptions};
use crate::link::{LinkBuilder, PaymentLink, PaymentRequest};
use crate::qr::{QrEncoder, RenderedQr};
use std::path::{Path, PathBuf};

/// A link and the image rendered from it
#[derive(Debug, Clone)]
pub struct Generated {
    link: PaymentLink,
    qr: RenderedQr,
}

impl Generated {
    /// The payment link
    pub fn link(&self) -> &PaymentLink {
        &self.link
    }

    /// The QR image encoding [`Generated::link`]
    pub fn qr(&self) -> &RenderedQr {
        &self.qr
    }
}

/// Form state plus derived link and image
#[derive(Debug, Clone, Default)]
pub struct Session {
    builder: LinkBuilder,
    encoder: QrEncoder,
    export: ExportOptions,
    form: PaymentRequest,
    generated: Option<Generated>,
}

impl Session {
    /// Session with default link, QR and export options
    pub fn new() -> Self {
        Self::default()
    }

    /// Session with explicit components
    pub fn with_parts(builder: LinkBuilder, encoder: QrEncoder, export: ExportOptions) -> Self {
        Self {
            builder,
            encoder,
            export,
            form: PaymentRequest::default(),
            generated: None,
        }
    }

    /// Session wired from a loaded configuration
    pub fn from_config(config: &UpiqrConfig) -> Self {
        Self::with_parts(
            LinkBuilder::with_options(config.link.clone()),
            QrEncoder::with_options(config.qr.clone()),
            config.export.clone(),
        )
    }

    /// Current form values
    pub fn form(&self) -> &PaymentRequest {
        &self.form
    }

    /// Set the payee address; stored lowercase
    pub fn set_payee_address(&mut self, value: impl AsRef<str>) {
        self.form.set_payee_address(value);
    }

    /// Set the display name
    pub fn set_payee_name(&mut self, value: impl Into<String>) {
        self.form.payee_name = value.into();
    }

    /// Set the payment message
    pub fn set_note(&mut self, value: impl Into<String>) {
        self.form.note = value.into();
    }

    /// Set the amount text
    pub fn set_amount(&mut self, value: impl Into<String>) {
        self.form.amount = value.into();
    }

    /// Build a link from the whole form and render its code.
    ///
    /// On failure nothing changes; a previously generated link stays in place.
    pub fn submit(&mut self) -> Result<&Generated> {
        let link = self.builder.build(&self.form)?;
        let qr = self.encoder.render(&link)?;
        tracing::info!(link = %link, "Created payment link");
        Ok(&*self.generated.insert(Generated { link, qr }))
    }

    /// Clear the form and the generated link together.
    pub fn reset(&mut self) {
        self.form = PaymentRequest::default();
        self.generated = None;
        tracing::debug!("Session reset");
    }

    /// Generated link and image, if any
    pub fn generated(&self) -> Option<&Generated> {
        self.generated.as_ref()
    }

    /// Current link, if any
    pub fn link(&self) -> Option<&PaymentLink> {
        self.generated.as_ref().map(Generated::link)
    }

    /// Current image, if any
    pub fn qr(&self) -> Option<&RenderedQr> {
        self.generated.as_ref().map(Generated::qr)
    }

    /// Copy the current link to `clipboard`.
    pub async fn copy_link(&self, clipboard: &dyn ClipboardWriter) -> Result<()> {
        let generated = self.generated.as_ref().ok_or(Error::NothingGenerated)?;
        export::copy_to_clipboard(clipboard, &generated.link).await
    }

    /// PNG bytes of the current image.
    pub fn qr_png(&self) -> Result<Vec<u8>> {
        let generated = self.generated.as_ref().ok_or(Error::NothingGenerated)?;
        export::export_image(&generated.qr)
    }

    /// Save the current image as PNG into `dir` (or the configured directory).
    pub fn download_qr(&self, dir: Option<&Path>) -> Result<PathBuf> {
        let generated = self.generated.as_ref().ok_or(Error::NothingGenerated)?;
        debug_assert!(generated.qr.matches(&generated.link));
        export::save_image(&generated.qr, &self.export.target_path(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::MemoryClipboard;
    use crate::qr::QrDecoder;

    fn filled() -> Session {
        let mut session = Session::new();
        session.set_payee_address("Someone@OKAXIS");
        session.set_payee_name("Jane");
        session.set_amount("399");
        session
    }

    #[test]
    fn test_submit_produces_link_and_image() {
        let mut session = filled();
        assert!(session.link().is_none());
        assert!(session.qr().is_none());

        let generated = session.submit().unwrap();
        assert_eq!(
            generated.link().as_str(),
            "upi://pay?pa=someone@okaxis&pn=Jane&mc=&tid=&tr=&tn=&am=399&cu=INR"
        );
        assert!(generated.qr().matches(generated.link()));
    }

    #[test]
    fn test_resubmit_replaces_image() {
        let mut session = filled();
        session.submit().unwrap();
        session.set_amount("500");
        session.submit().unwrap();

        let link = session.link().unwrap().clone();
        assert!(link.as_str().contains("am=500"));
        assert!(session.qr().unwrap().matches(&link));

        let decoded = QrDecoder::new().decode_png(&session.qr_png().unwrap()).unwrap();
        assert_eq!(decoded, link.as_str());
    }

    #[test]
    fn test_failed_submit_keeps_previous_link() {
        let mut session = filled();
        session.submit().unwrap();
        let before = session.link().unwrap().clone();

        session.set_payee_address("");
        let err = session.submit().unwrap_err();
        assert!(err.is_validation());
        assert_eq!(session.link(), Some(&before));
    }

    #[test]
    fn test_submit_empty_form_produces_nothing() {
        let mut session = Session::new();
        assert!(session.submit().is_err());
        assert!(session.generated().is_none());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = filled();
        session.submit().unwrap();
        session.reset();
        assert!(session.link().is_none());
        assert!(session.qr().is_none());
        assert_eq!(session.form(), &PaymentRequest::default());
    }

    #[test]
    fn test_exports_need_a_link() {
        let session = Session::new();
        assert!(matches!(session.qr_png(), Err(Error::NothingGenerated)));
        assert!(matches!(
            session.download_qr(None),
            Err(Error::NothingGenerated)
        ));
    }

    #[tokio::test]
    async fn test_copy_without_link() {
        let session = Session::new();
        let clipboard = MemoryClipboard::new();
        assert!(matches!(
            session.copy_link(&clipboard).await,
            Err(Error::NothingGenerated)
        ));
    }
}
