//! Fields of the legacy `faxout.asp` multipart form.

use crate::legacy::render::Format;
use crate::legacy::ringout::Credentials;
use bytes::Bytes;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;
use time::format_description::well_known::Rfc3339;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

/// Cover page templates known to the platform, in index order.
const COVER_PAGES: [&str; 14] = [
    "None",
    "Ancient",
    "Birthday",
    "Blank",
    "Clasmod",
    "Classic",
    "Confidential",
    "Contempo",
    "Elegant",
    "Express",
    "Formal",
    "Jazzy",
    "Modern",
    "Urgent",
];

lazy_static! {
    // GMT, dd:mm:yy hh:mm
    static ref LEGACY_SEND_TIME: Regex =
        Regex::new(r"^([0-9]{2}):([0-9]{2}):([0-9]{2}) ([0-9]{2}):([0-9]{2})$").unwrap();
}

/// A file part of a multipart form, passed through to the platform untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Decoded multipart form: text values and file parts, by field name, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    values: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<Attachment>>,
}

impl FormFields {
    pub fn push_value(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .entry(name.into())
            .or_default()
            .push(value.into());
    }

    pub fn push_file(&mut self, name: impl Into<String>, file: Attachment) {
        self.files.entry(name.into()).or_default().push(file);
    }

    #[must_use]
    pub fn values(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn files(&self, name: &str) -> &[Attachment] {
        self.files.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    fn first(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    High,
    Low,
}

impl Resolution {
    /// Case-insensitive `high` / `low`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Resolution::High),
            "low" => Some(Resolution::Low),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::High => "High",
            Resolution::Low => "Low",
        }
    }
}

/// A fax submission for the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaxRequest {
    pub recipients: Vec<String>,
    /// `None` leaves the platform's default cover page.
    pub cover_index: Option<u8>,
    pub cover_page_text: String,
    pub resolution: Option<Resolution>,
    /// `None` sends immediately.
    pub send_time: Option<OffsetDateTime>,
    pub attachments: Vec<Attachment>,
}

/// Look up a cover page index by template name, ignoring case.
#[must_use]
pub fn cover_page_index(name: &str) -> Option<u8> {
    let name = name.trim();
    COVER_PAGES
        .iter()
        .position(|page| page.eq_ignore_ascii_case(name))
        .and_then(|idx| u8::try_from(idx).ok())
}

/// Parse a legacy send time, trying `dd:mm:yy hh:mm` (GMT) first and RFC 3339 second.
#[must_use]
pub fn parse_send_time(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    parse_legacy_send_time(raw).or_else(|| OffsetDateTime::parse(raw, &Rfc3339).ok())
}

fn parse_legacy_send_time(raw: &str) -> Option<OffsetDateTime> {
    let caps = LEGACY_SEND_TIME.captures(raw)?;
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u8>().ok());
    let date = Date::from_calendar_date(
        2000 + i32::from(num(3)?),
        Month::try_from(num(2)?).ok()?,
        num(1)?,
    )
    .ok()?;
    let time = Time::from_hms(num(4)?, num(5)?, 0).ok()?;
    Some(PrimitiveDateTime::new(date, time).assume_utc())
}

/// Reads credentials, the response format, and a [`FaxRequest`] from a legacy fax form.
///
/// Unrecognized cover pages, resolutions, and send times are skipped without error, leaving the
/// request's default in place.
pub struct FaxForm<'a> {
    fields: &'a FormFields,
}

impl<'a> FaxForm<'a> {
    #[must_use]
    pub fn new(fields: &'a FormFields) -> Self {
        FaxForm { fields }
    }

    #[must_use]
    pub fn credentials(&self) -> Credentials {
        let field = |name: &str| self.fields.first(name).map_or("", str::trim);
        Credentials::new(field("Username"), field("Extension"), field("Password"))
    }

    /// `Format` or `format`, whichever is present first.
    #[must_use]
    pub fn format(&self) -> Format {
        self.fields
            .first("Format")
            .or_else(|| self.fields.first("format"))
            .map_or(Format::PlainText, Format::parse)
    }

    #[must_use]
    pub fn fax_request(&self) -> FaxRequest {
        let mut fax = FaxRequest {
            recipients: self
                .fields
                .values("Recipient")
                .iter()
                .map(|val| recipient_number(val).to_string())
                .collect(),
            attachments: self.fields.files("Attachment").to_vec(),
            ..FaxRequest::default()
        };

        for val in self.fields.values("Coverpage") {
            if let Some(idx) = cover_page_index(val) {
                fax.cover_index = Some(idx);
            }
        }
        for val in self.fields.values("Coverpagetext") {
            if !val.is_empty() {
                fax.cover_page_text = val.clone();
            }
        }
        for val in self.fields.values("Resolution") {
            if let Some(res) = Resolution::parse(val) {
                fax.resolution = Some(res);
            }
        }
        for val in self.fields.values("Sendtime") {
            if let Some(at) = parse_send_time(val) {
                fax.send_time = Some(at);
            }
        }
        fax
    }
}

/// Recipients may carry a `|` separated name after the number.
fn recipient_number(raw: &str) -> &str {
    raw.trim().split('|').next().unwrap_or_default().trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn form(pairs: &[(&str, &str)]) -> FormFields {
        let mut fields = FormFields::default();
        for (name, value) in pairs {
            fields.push_value(*name, *value);
        }
        fields
    }

    #[test]
    fn recipients_keep_order_and_drop_metadata() {
        let fields = form(&[
            ("Recipient", "+15551234567|John Doe"),
            ("Recipient", " +15557654321 "),
            ("Recipient", "+15551234567|Again"),
        ]);
        let fax = FaxForm::new(&fields).fax_request();
        assert_eq!(
            fax.recipients,
            vec!["+15551234567", "+15557654321", "+15551234567"]
        );
    }

    #[test]
    fn cover_page_lookup() {
        assert_eq!(cover_page_index("None"), Some(0));
        assert_eq!(cover_page_index("confidential"), Some(6));
        assert_eq!(cover_page_index("URGENT"), Some(13));
        assert_eq!(cover_page_index("Fancy"), None);

        let fields = form(&[("Coverpage", "Modern"), ("Coverpage", "Fancy")]);
        assert_eq!(FaxForm::new(&fields).fax_request().cover_index, Some(12));

        let fields = form(&[("Coverpage", "Fancy")]);
        assert_eq!(FaxForm::new(&fields).fax_request().cover_index, None);
    }

    #[test]
    fn resolution_is_case_insensitive() {
        let fields = form(&[("Resolution", "HIGH")]);
        assert_eq!(
            FaxForm::new(&fields).fax_request().resolution,
            Some(Resolution::High)
        );
        let fields = form(&[("Resolution", "low"), ("Resolution", "medium")]);
        assert_eq!(
            FaxForm::new(&fields).fax_request().resolution,
            Some(Resolution::Low)
        );
        let fields = form(&[("Resolution", "medium")]);
        assert_eq!(FaxForm::new(&fields).fax_request().resolution, None);
    }

    #[test]
    fn send_time_formats() {
        assert_eq!(
            parse_send_time("25:12:23 14:30"),
            Some(datetime!(2023-12-25 14:30 UTC))
        );
        assert_eq!(
            parse_send_time("2023-12-25T14:30:00-08:00"),
            Some(datetime!(2023-12-25 14:30 -8))
        );
        assert_eq!(parse_send_time("32:12:23 14:30"), None);
        assert_eq!(parse_send_time("tomorrow"), None);
    }

    // Unparsable send times are dropped, so the fax goes out immediately. This can hide a
    // client mistake.
    #[test]
    fn bad_send_time_sends_now() {
        let fields = form(&[("Sendtime", "next tuesday")]);
        assert_eq!(FaxForm::new(&fields).fax_request().send_time, None);
    }

    #[test]
    fn credentials_and_format() {
        let fields = form(&[
            ("Username", " 16505551212 "),
            ("Extension", "101"),
            ("Password", "secret"),
            ("format", " JSON "),
        ]);
        let parsed = FaxForm::new(&fields);
        let creds = parsed.credentials();
        assert_eq!(creds.username, "16505551212");
        assert_eq!(creds.extension, "101");
        assert_eq!(creds.password, "secret");
        assert_eq!(parsed.format(), Format::Json);

        assert_eq!(FaxForm::new(&FormFields::default()).format(), Format::PlainText);
    }

    #[test]
    fn cover_text_and_attachments() {
        let mut fields = form(&[("Coverpagetext", "Hello"), ("Coverpagetext", "")]);
        fields.push_file(
            "Attachment",
            Attachment {
                file_name: Some("doc.pdf".into()),
                content_type: Some("application/pdf".into()),
                data: Bytes::from_static(b"%PDF-1.4"),
            },
        );
        let fax = FaxForm::new(&fields).fax_request();
        assert_eq!(fax.cover_page_text, "Hello");
        assert_eq!(fax.attachments.len(), 1);
        assert_eq!(fax.attachments[0].data, Bytes::from_static(b"%PDF-1.4"));
    }
}
