//! Helpers for rendering command output

use crate::link::{PaymentLink, PaymentRequest};
use crate::qr::RenderedQr;
use serde_json::{Map, Value, json};
use std::path::Path;

/// Combined structured and human-readable representation of a generated link
#[derive(Debug, Clone)]
pub struct RenderedOutput {
    /// Structured JSON representation suitable for scripting
    pub json: Value,
    /// Human-readable lines for terminal presentation
    pub human: Vec<String>,
}

/// Render a generated link, its code and (optionally) the saved file path.
pub fn render_generated(
    link: &PaymentLink,
    qr: &RenderedQr,
    saved: Option<&Path>,
    copied: bool,
) -> RenderedOutput {
    let mut root = Map::new();
    root.insert("link".to_string(), Value::String(link.to_string()));
    root.insert(
        "qr".to_string(),
        json!({
            "size": qr.size(),
            "modules": qr.modules(),
        }),
    );
    root.insert(
        "saved_to".to_string(),
        saved
            .map(|p| Value::String(p.display().to_string()))
            .unwrap_or(Value::Null),
    );
    root.insert("copied".to_string(), Value::Bool(copied));

    let mut human = vec![link.to_string()];
    if let Some(path) = saved {
        human.push(format!("QR saved to {}", path.display()));
    }
    if copied {
        human.push("Link copied!".to_string());
    }

    RenderedOutput {
        json: Value::Object(root),
        human,
    }
}

/// Render fields recovered from a scanned code.
pub fn render_decoded(text: &str, request: Option<&PaymentRequest>) -> RenderedOutput {
    let json = json!({
        "text": text,
        "payment": request,
    });

    let mut human = vec![format!("QR text: {text}")];
    match request {
        Some(request) => {
            human.push(format!("  Payee address: {}", request.payee_address));
            human.push(format!("  Payee name: {}", or_dash(&request.payee_name)));
            human.push(format!("  Note: {}", or_dash(&request.note)));
            human.push(format!("  Amount: {}", or_dash(&request.amount)));
        }
        None => human.push("Not a UPI payment link".to_string()),
    }

    RenderedOutput { json, human }
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() { "-" } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::build;
    use crate::qr::QrEncoder;

    #[test]
    fn test_generated_json_shape() {
        let link = build(&PaymentRequest::new("a@b")).unwrap();
        let qr = QrEncoder::new().render(&link).unwrap();
        let out = render_generated(&link, &qr, Some(Path::new("payment-qr.png")), false);

        assert_eq!(out.json["link"], link.as_str());
        assert_eq!(out.json["qr"]["size"], 300);
        assert_eq!(out.json["saved_to"], "payment-qr.png");
        assert_eq!(out.json["copied"], false);
        assert_eq!(out.human[0], link.as_str());
    }

    #[test]
    fn test_decoded_non_upi() {
        let out = render_decoded("https://example.com", None);
        assert!(out.json["payment"].is_null());
        assert_eq!(out.human.last().unwrap(), "Not a UPI payment link");
    }

    #[test]
    fn test_decoded_fields() {
        let request = PaymentRequest::new("a@b").with_amount("5");
        let out = render_decoded("upi://pay?pa=a@b", Some(&request));
        assert_eq!(out.json["payment"]["payeeAddress"], "a@b");
        assert!(out.human.contains(&"  Payee name: -".to_string()));
    }
}
