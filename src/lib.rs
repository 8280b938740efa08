//! UPIQR - UPI payment links with scannable QR export
//!
//! This library turns a small payment form into a `upi://pay` deep link and
//! renders that link as a QR code that payment apps can scan.
//!
//! # Features
//!
//! - **Link Builder**: validation, address normalisation, percent-encoded values
//! - **QR Rendering**: fixed-size canvas with a quiet-zone margin, PNG export
//! - **Session**: form, link and image kept in lockstep
//! - **Clipboard**: async copy through the desktop clipboard (`clipboard` feature)
//!
//! # Example
//!
//! ```no_run
//! use upiqr::{MemoryClipboard, Session};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut session = Session::new();
//!     session.set_payee_address("Someone@OKAXIS");
//!     session.set_payee_name("Jane");
//!     session.set_amount("399");
//!
//!     let generated = session.submit()?;
//!     println!("{}", generated.link());
//!
//!     session.copy_link(&MemoryClipboard::new()).await?;
//!     session.download_qr(None)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2024_compatibility)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod error;
pub mod export;
pub mod link;
pub mod logging;
pub mod output;
pub mod qr;
pub mod session;

// Re-exports for convenience
pub use error::{Error, Result};

#[cfg(feature = "clipboard")]
pub use export::SystemClipboard;

pub use config::{LogRotation, LoggingOptions, UpiqrConfig};
pub use export::{ClipboardWriter, ExportOptions, MemoryClipboard, copy_to_clipboard, export_image};
pub use link::{LinkBuilder, LinkOptions, PaymentLink, PaymentRequest, ValueEncoding, build};
pub use qr::{EccLevel, QrDecoder, QrEncoder, QrOptions, RenderedQr};
pub use session::{Generated, Session};
