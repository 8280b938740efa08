use std::fs;

use upiqr::{
    Error, ExportOptions, LinkBuilder, LinkOptions, MemoryClipboard, PaymentLink, QrDecoder,
    QrEncoder, QrOptions, Session, UpiqrConfig, ValueEncoding,
};

fn decode_saved(path: &std::path::Path) -> String {
    let bytes = fs::read(path).expect("read png");
    QrDecoder::new().decode_png(&bytes).expect("decode png")
}

#[tokio::test]
async fn create_copy_download_and_scan() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = Session::new();
    session.set_payee_address("someone@okaxis");
    session.set_payee_name("Jane");
    session.set_note("dinner");
    session.set_amount("399");

    let link = session.submit().expect("submit").link().clone();
    assert_eq!(
        link.as_str(),
        "upi://pay?pa=someone@okaxis&pn=Jane&mc=&tid=&tr=&tn=&am=399&cu=INR"
    );

    let clipboard = MemoryClipboard::new();
    session.copy_link(&clipboard).await.expect("copy");
    assert_eq!(clipboard.contents().as_deref(), Some(link.as_str()));

    let path = session.download_qr(Some(dir.path())).expect("download");
    assert_eq!(path.file_name().unwrap(), "payment-qr.png");
    assert_eq!(image::open(&path).expect("open png").width(), 300);
    assert_eq!(decode_saved(&path), link.as_str());

    let scanned = PaymentLink::parse(&decode_saved(&path)).expect("parse");
    assert_eq!(scanned.payee_address, "someone@okaxis");
    assert_eq!(scanned.amount, "399");
}

#[tokio::test]
async fn download_never_returns_superseded_link() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = Session::new();
    session.set_payee_address("first@bank");
    session.submit().expect("first submit");
    session.download_qr(Some(dir.path())).expect("first download");

    session.set_payee_address("second@bank");
    session.set_amount("10");
    let current = session.submit().expect("second submit").link().clone();

    let path = session.download_qr(Some(dir.path())).expect("second download");
    let decoded = decode_saved(&path);
    assert_eq!(decoded, current.as_str());
    assert!(decoded.contains("pa=second@bank"));
}

#[tokio::test]
async fn clipboard_rejection_leaves_state_alone() {
    let mut session = Session::new();
    session.set_payee_address("a@b");
    let link = session.submit().expect("submit").link().clone();

    let clipboard = MemoryClipboard::rejecting("permission denied");
    let err = session.copy_link(&clipboard).await.unwrap_err();
    assert!(matches!(err, Error::Clipboard(_)));
    assert_eq!(session.link(), Some(&link));
    assert!(session.qr().expect("qr").matches(&link));
}

#[test]
fn reset_after_build_clears_link_and_image() {
    let mut session = Session::new();
    session.set_payee_address("X@Y");
    session.submit().expect("submit");
    assert_eq!(
        session.link().unwrap().as_str(),
        "upi://pay?pa=x@y&pn=&mc=&tid=&tr=&tn=&am=&cu=INR"
    );

    session.reset();
    assert!(session.link().is_none() && session.qr().is_none());
    assert!(matches!(
        session.download_qr(None),
        Err(Error::NothingGenerated)
    ));
}

#[test]
fn configured_session_uses_options() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = UpiqrConfig {
        link: LinkOptions {
            encoding: ValueEncoding::Percent,
            include_note: true,
            strict_amount: true,
        },
        qr: QrOptions {
            size: 420,
            ..Default::default()
        },
        export: ExportOptions {
            directory: Some(dir.path().to_path_buf()),
            file_name: "shop.png".to_string(),
        },
        ..Default::default()
    };

    let mut session = Session::from_config(&config);
    session.set_payee_address("shop@upi");
    session.set_note("order 42");
    session.set_amount("abc");
    assert!(matches!(session.submit(), Err(Error::AmountFormat(_))));

    session.set_amount("42.00");
    let link = session.submit().expect("submit").link().clone();
    assert!(link.as_str().contains("&tn=order%2042&"));

    let path = session.download_qr(None).expect("download");
    assert_eq!(path, dir.path().join("shop.png"));
    assert_eq!(image::open(&path).expect("open").width(), 420);
    assert_eq!(decode_saved(&path), link.as_str());
}

#[test]
fn long_free_text_still_scans() {
    let builder = LinkBuilder::new();
    let request = upiqr::PaymentRequest::new("merchant.store@icici")
        .with_name("Sharma General Store & Sons, Sector 15 Market")
        .with_amount("12500.75");
    let link = builder.build(&request).expect("build");
    let rendered = QrEncoder::new().render(&link).expect("render");
    let decoded = QrDecoder::new()
        .decode(&rendered.to_dynamic())
        .expect("decode");
    assert_eq!(decoded, link.as_str());
}
