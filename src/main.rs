//! upiqr command-line entrypoint

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};
use upiqr::output::{RenderedOutput, render_decoded, render_generated};
use upiqr::{
    ClipboardWriter, Error, PaymentLink, QrDecoder, QrEncoder, Result, Session, UpiqrConfig,
    ValueEncoding, logging,
};

#[derive(Parser, Debug)]
#[command(
    name = "upiqr",
    version,
    about = "Create UPI payment links and scannable QR codes"
)]
struct Cli {
    /// Optional configuration file (toml/yaml). Defaults to upiqr.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// UPI ID to be paid (e.g. someone@okaxis); stored lowercase
    #[arg(long, visible_alias = "pa", value_name = "ID")]
    upi_id: Option<String>,

    /// Name the paying app should display
    #[arg(long, visible_alias = "pn", value_name = "NAME")]
    name: Option<String>,

    /// What the payment is for
    #[arg(long, value_name = "TEXT")]
    message: Option<String>,

    /// Amount in INR
    #[arg(long, visible_alias = "am", value_name = "AMOUNT", allow_hyphen_values = true)]
    amount: Option<String>,

    /// Save the QR image as PNG, optionally into DIR
    #[arg(long, value_name = "DIR")]
    download: Option<Option<PathBuf>>,

    /// Copy the link to the system clipboard
    #[arg(long)]
    copy: bool,

    /// Draw the QR code in the terminal
    #[arg(long)]
    show: bool,

    /// Output results as formatted JSON instead of human-readable text
    #[arg(long)]
    json: bool,

    /// Interpolate values without percent-encoding (legacy link format)
    #[arg(long)]
    verbatim: bool,

    /// Put the message in the link's transaction note slot
    #[arg(long)]
    include_note: bool,

    /// Reject amounts that are not non-negative numbers
    #[arg(long)]
    strict_amount: bool,

    /// Read a QR image and print the payment fields it encodes
    #[arg(long, value_name = "PATH", conflicts_with = "upi_id")]
    decode: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", error_message(&err));
            ExitCode::FAILURE
        }
    }
}

fn error_message(err: &Error) -> String {
    match err {
        Error::Validation { .. } | Error::AmountFormat(_) => {
            format!("error: {err} (nothing was created)")
        }
        Error::Clipboard(_) => format!("error: could not copy the link: {err}"),
        _ => format!("error: {err}"),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = UpiqrConfig::load(cli.config.as_deref())?;

    if cli.verbatim {
        config.link.encoding = ValueEncoding::Verbatim;
    }
    if cli.include_note {
        config.link.include_note = true;
    }
    if cli.strict_amount {
        config.link.strict_amount = true;
    }

    logging::init(&config.logging)?;

    if let Some(ref path) = cli.decode {
        return handle_decode(path, cli.json);
    }

    handle_create(&cli, &config).await
}

async fn handle_create(cli: &Cli, config: &UpiqrConfig) -> Result<()> {
    let mut session = Session::from_config(config);
    session.set_payee_address(cli.upi_id.as_deref().unwrap_or_default());
    session.set_payee_name(cli.name.clone().unwrap_or_default());
    session.set_note(cli.message.clone().unwrap_or_default());
    session.set_amount(cli.amount.clone().unwrap_or_default());

    let generated = session.submit()?.clone();
    let link = generated.link();
    info!(link = %link, "Payment link ready");

    let saved = match &cli.download {
        Some(dir) => Some(session.download_qr(dir.as_deref())?),
        None => None,
    };

    let mut copy_error = None;
    if cli.copy {
        match copy_with_system_clipboard(&session).await {
            Ok(()) => {}
            Err(err) => {
                warn!(error = %err, "Copy failed");
                copy_error = Some(err);
            }
        }
    }

    let rendered = render_generated(
        link,
        generated.qr(),
        saved.as_deref(),
        cli.copy && copy_error.is_none(),
    );
    emit(&rendered, cli.json)?;

    if cli.show && !cli.json {
        println!();
        println!("{}", QrEncoder::with_options(config.qr.clone()).render_terminal(link)?);
    }

    match copy_error {
        Some(err) => Err(err),
        None if cli.copy => hold_clipboard(link).await,
        None => Ok(()),
    }
}

/// Keep serving the copied link when the platform drops it on exit.
#[cfg(feature = "clipboard")]
async fn hold_clipboard(link: &PaymentLink) -> Result<()> {
    if !upiqr::SystemClipboard::loses_text_on_exit() {
        return Ok(());
    }
    eprintln!("Keeping the link on the clipboard until something else is copied (Ctrl-C to quit)");
    upiqr::SystemClipboard
        .hold_until_replaced(link.as_str())
        .await
}

#[cfg(not(feature = "clipboard"))]
async fn hold_clipboard(_link: &PaymentLink) -> Result<()> {
    Ok(())
}

async fn copy_with_system_clipboard(session: &Session) -> Result<()> {
    let clipboard = system_clipboard()?;
    session.copy_link(clipboard.as_ref()).await
}

#[cfg(feature = "clipboard")]
fn system_clipboard() -> Result<Box<dyn ClipboardWriter>> {
    Ok(Box::new(upiqr::SystemClipboard))
}

#[cfg(not(feature = "clipboard"))]
fn system_clipboard() -> Result<Box<dyn ClipboardWriter>> {
    Err(Error::Clipboard(
        "upiqr was built without the `clipboard` feature".to_string(),
    ))
}

fn handle_decode(path: &Path, json: bool) -> Result<()> {
    let text = QrDecoder::new().decode_file(path)?;
    let request = match PaymentLink::parse(&text) {
        Ok(request) => Some(request),
        Err(Error::InvalidLink(reason)) => {
            info!(%reason, "Decoded QR is not a UPI link");
            None
        }
        Err(err) => return Err(err),
    };

    emit(&render_decoded(&text, request.as_ref()), json)
}

fn emit(rendered: &RenderedOutput, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&rendered.json)?);
    } else {
        for line in &rendered.human {
            println!("{line}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_read_as_sentences() {
        let err = Error::Validation {
            field: "payeeAddress",
            message: "enter the UPI ID to be paid".to_string(),
        };
        assert_eq!(
            error_message(&err),
            "error: payeeAddress is required: enter the UPI ID to be paid (nothing was created)"
        );
        assert!(!error_message(&err).contains("Validation {"));
    }

    #[test]
    fn test_clipboard_errors_mention_copy() {
        let err = Error::Clipboard("permission denied".to_string());
        assert_eq!(
            error_message(&err),
            "error: could not copy the link: Clipboard error: permission denied"
        );
    }

    #[test]
    fn test_missing_upi_id_fails_validation() {
        let cli = Cli::try_parse_from(["upiqr", "--name", "Jane"]).unwrap();
        let mut session = Session::new();
        session.set_payee_address(cli.upi_id.as_deref().unwrap_or_default());
        let err = session.submit().unwrap_err();
        assert!(error_message(&err).starts_with("error: payeeAddress is required"));
    }
}
