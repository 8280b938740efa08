//! UPI deep-link construction
//!
//! A [`PaymentRequest`] is serialized into the fixed-shape URI consumed by
//! UPI payment apps:
//!
//! ```text
//! upi://pay?pa=<address>&pn=<name>&mc=&tid=&tr=&tn=&am=<amount>&cu=INR
//! ```
//!
//! The key set and ordering never change. `mc`, `tid` and `tr` are always
//! empty; `tn` carries the note only when [`LinkOptions::include_note`] is set.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Scheme and path prefix of every generated link
pub const UPI_PREFIX: &str = "upi://pay?";

/// Currency code emitted in the `cu` slot
pub const CURRENCY: &str = "INR";

/// Field name reported when the payee address is missing
pub const PAYEE_ADDRESS_FIELD: &str = "payeeAddress";

/// User-supplied payment parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaymentRequest {
    /// UPI virtual payment address of the recipient (`name@bank`)
    pub payee_address: String,
    /// Display name shown by the paying app
    pub payee_name: String,
    /// Payment message
    pub note: String,
    /// Amount as numeric text
    pub amount: String,
}

impl PaymentRequest {
    /// Create a request for the given payee, lowercasing the address.
    pub fn new(payee_address: impl AsRef<str>) -> Self {
        let mut request = Self::default();
        request.set_payee_address(payee_address);
        request
    }

    /// Set the payee address. The value is stored lowercase.
    pub fn set_payee_address(&mut self, value: impl AsRef<str>) {
        self.payee_address = value.as_ref().to_lowercase();
    }

    /// Builder-style payee name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.payee_name = name.into();
        self
    }

    /// Builder-style note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Builder-style amount
    pub fn with_amount(mut self, amount: impl Into<String>) -> Self {
        self.amount = amount.into();
        self
    }
}

/// A built UPI link. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PaymentLink(String);

impl PaymentLink {
    /// The link text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the link, returning the owned text
    pub fn into_string(self) -> String {
        self.0
    }

    /// Parse a `upi://pay` link back into its request fields.
    ///
    /// Values are percent-decoded; values that do not decode to UTF-8 are kept as-is.
    pub fn parse(text: &str) -> Result<PaymentRequest> {
        let query = strip_prefix_ignore_case(text.trim(), UPI_PREFIX)
            .ok_or_else(|| Error::InvalidLink(format!("expected '{UPI_PREFIX}' prefix")))?;

        let mut request = PaymentRequest::default();
        let mut saw_address = false;

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
            let value = urlencoding::decode(raw)
                .map(Cow::into_owned)
                .unwrap_or_else(|_| raw.to_string());
            match key {
                "pa" => {
                    request.set_payee_address(&value);
                    saw_address = true;
                }
                "pn" => request.payee_name = value,
                "tn" => request.note = value,
                "am" => request.amount = value,
                _ => {}
            }
        }

        if !saw_address || request.payee_address.is_empty() {
            return Err(Error::InvalidLink("missing payee address (pa)".to_string()));
        }

        Ok(request)
    }
}

impl fmt::Display for PaymentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PaymentLink {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

/// How field values are written into the query string
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueEncoding {
    /// Percent-encode each value; `@` in the payee address stays literal
    #[default]
    Percent,
    /// Interpolate values unchanged (legacy output, breaks on `&`, `=`, spaces)
    Verbatim,
}

impl FromStr for ValueEncoding {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "percent" => Ok(Self::Percent),
            "verbatim" | "raw" => Ok(Self::Verbatim),
            other => Err(format!(
                "Unsupported value encoding '{other}', expected 'percent' or 'verbatim'"
            )),
        }
    }
}

/// Link construction settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkOptions {
    /// Value encoding strategy
    pub encoding: ValueEncoding,
    /// Emit the note in the `tn` slot instead of leaving it empty
    pub include_note: bool,
    /// Reject amounts that are not non-negative decimal numbers
    pub strict_amount: bool,
}

/// Serializes payment requests into UPI links
#[derive(Debug, Clone, Default)]
pub struct LinkBuilder {
    options: LinkOptions,
}

impl LinkBuilder {
    /// Create a builder with default options (percent encoding, note omitted)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with explicit options
    pub fn with_options(options: LinkOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    pub fn options(&self) -> &LinkOptions {
        &self.options
    }

    /// Validate the request and serialize it into a link.
    pub fn build(&self, request: &PaymentRequest) -> Result<PaymentLink> {
        if request.payee_address.is_empty() {
            return Err(Error::Validation {
                field: PAYEE_ADDRESS_FIELD,
                message: "enter the UPI ID to be paid".to_string(),
            });
        }

        if self.options.strict_amount && !is_valid_amount(&request.amount) {
            return Err(Error::AmountFormat(request.amount.clone()));
        }

        let address = request.payee_address.to_lowercase();
        let note = if self.options.include_note {
            request.note.as_str()
        } else {
            ""
        };

        let link = format!(
            "{UPI_PREFIX}pa={}&pn={}&mc=&tid=&tr=&tn={}&am={}&cu={CURRENCY}",
            self.encode_address(&address),
            self.encode(&request.payee_name),
            self.encode(note),
            self.encode(&request.amount),
        );

        tracing::debug!(
            encoding = ?self.options.encoding,
            length = link.len(),
            "Built UPI link"
        );

        Ok(PaymentLink(link))
    }

    fn encode<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match self.options.encoding {
            ValueEncoding::Percent => urlencoding::encode(value),
            ValueEncoding::Verbatim => Cow::Borrowed(value),
        }
    }

    fn encode_address<'a>(&self, address: &'a str) -> Cow<'a, str> {
        match self.options.encoding {
            ValueEncoding::Percent => {
                let parts: Vec<_> = address.split('@').map(urlencoding::encode).collect();
                Cow::Owned(parts.join("@"))
            }
            ValueEncoding::Verbatim => Cow::Borrowed(address),
        }
    }
}

/// Build a link with default options
pub fn build(request: &PaymentRequest) -> Result<PaymentLink> {
    LinkBuilder::new().build(request)
}

/// Empty is accepted: the amount is optional.
fn is_valid_amount(amount: &str) -> bool {
    if amount.is_empty() {
        return true;
    }
    let mut digits = 0;
    let mut dots = 0;
    for ch in amount.chars() {
        match ch {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}
