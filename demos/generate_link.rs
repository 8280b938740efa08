//! Build a payment link and save its QR code to a file
//!
//! Usage: cargo run --example generate_link

use std::path::Path;
use upiqr::{PaymentRequest, QrDecoder, QrEncoder, build};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let request = PaymentRequest::new("someone@okaxis")
        .with_name("Jane")
        .with_amount("399");
    let link = build(&request)?;

    let rendered = QrEncoder::new().render(&link)?;
    rendered.image().save("payment-qr.png")?;

    println!("✓ {link}");
    println!("✓ QR code saved to payment-qr.png");

    let scanned = QrDecoder::new().decode_file(Path::new("payment-qr.png"))?;
    println!("  Scanned back: {scanned}");

    Ok(())
}
