//! Rendering platform outcomes as legacy responses.
//!
//! Platform statuses are collapsed before they reach a legacy client: 2xx passes through, 4xx
//! becomes 400, and everything else (5xx, redirects, transport failures) becomes 500.
//!
//! With `format=json` a successful payload is passed through as JSON and failures are written as
//! a [`ResponseInfo`] envelope. Otherwise `ringout.asp` answers with an `OK ...` text line (or an
//! empty body on failure) and `faxout.asp` with a single [`FaxResponseCode`] digit.

use crate::error::Error;
use crate::platform::{CallInfo, ForwardingNumberInfo, ForwardingNumbers, Reply};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=us-ascii";
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

lazy_static! {
    static ref NANP_E164: Regex = Regex::new(r"^\+1[0-9]{10}$").unwrap();
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    PlainText,
    Json,
}

impl Format {
    /// `json` in any case selects [`Format::Json`], anything else is plain text.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            Format::Json
        } else {
            Format::PlainText
        }
    }
}

/// The JSON error envelope.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseInfo {
    pub status_code: u16,
    pub message: String,
}

impl ResponseInfo {
    /// Platform failures report the platform's status, everything else the local one.
    #[must_use]
    pub fn from_error(err: &Error) -> Self {
        let status_code = match err {
            Error::DownstreamClientError(status) | Error::DownstreamServerError(status) => *status,
            _ => err.status_code().as_u16(),
        };
        ResponseInfo {
            status_code,
            message: err.to_string(),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// A rendered legacy response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl LegacyResponse {
    #[must_use]
    pub fn text(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        LegacyResponse {
            status,
            content_type: CONTENT_TYPE_TEXT,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn json(status: StatusCode, body: Vec<u8>) -> Self {
        LegacyResponse {
            status,
            content_type: CONTENT_TYPE_JSON,
            body,
        }
    }

    fn failure(err: &Error, format: Format) -> Self {
        let status = err.status_code();
        match format {
            Format::Json => Self::json(status, ResponseInfo::from_error(err).to_json()),
            Format::PlainText => Self::text(status, Vec::new()),
        }
    }
}

impl IntoResponse for LegacyResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, self.content_type)],
            self.body,
        )
            .into_response()
    }
}

/// Collapse a platform status into the status a legacy client sees.
#[must_use]
pub fn bucket_status(status: u16) -> StatusCode {
    match status {
        200..=299 => StatusCode::from_u16(status).unwrap_or(StatusCode::OK),
        400..=499 => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `+1` followed by exactly ten digits loses the `+1`. Any other number is returned unchanged.
#[must_use]
pub fn legacy_number(number: &str) -> &str {
    if NANP_E164.is_match(number) {
        &number[2..]
    } else {
        number
    }
}

/// `OK <number>;<label>;<number>;<label>...` in record order.
#[must_use]
pub fn list_body(records: &[ForwardingNumberInfo]) -> String {
    let parts: Vec<&str> = records
        .iter()
        .flat_map(|rec| [legacy_number(&rec.phone_number), rec.label.as_str()])
        .collect();
    format!("OK {}", parts.join(";"))
}

#[must_use]
pub fn call_body(info: &CallInfo) -> String {
    format!("OK {}", info.id)
}

fn render<T: Serialize>(
    outcome: Result<Reply<T>, Error>,
    format: Format,
    legacy: impl FnOnce(&T) -> String,
) -> LegacyResponse {
    let reply = match outcome {
        Ok(reply) => reply,
        Err(err) => return LegacyResponse::failure(&err, format),
    };
    let status = bucket_status(reply.status);
    match format {
        Format::Json => match serde_json::to_vec(&reply.payload) {
            Ok(body) => LegacyResponse::json(status, body),
            Err(err) => LegacyResponse::failure(&Error::Serialization(err), format),
        },
        Format::PlainText => LegacyResponse::text(status, legacy(&reply.payload)),
    }
}

/// Render the outcome of a `cmd=call` ring-out.
#[must_use]
pub fn render_call(outcome: Result<Reply<CallInfo>, Error>, format: Format) -> LegacyResponse {
    render(outcome, format, call_body)
}

/// Render the outcome of a `cmd=list` forwarding number lookup.
#[must_use]
pub fn render_list(
    outcome: Result<Reply<ForwardingNumbers>, Error>,
    format: Format,
) -> LegacyResponse {
    render(outcome, format, |numbers| list_body(&numbers.records))
}

/// Render the outcome of a fax submission, including a rejected password grant.
#[must_use]
pub fn render_fax(outcome: Result<Reply<Value>, Error>, format: Format) -> LegacyResponse {
    let code = FaxResponseCode::from_outcome(&outcome);
    match format {
        Format::Json => render(outcome, format, |_| String::new()),
        Format::PlainText => {
            let status = match &outcome {
                Ok(reply) => bucket_status(reply.status),
                Err(err) => err.status_code(),
            };
            LegacyResponse::text(status, code.code().to_string())
        }
    }
}

/// Legacy `faxout.asp` result codes.
///
/// Only `Successful`, `AuthorizationFailed`, and `GenericError` are produced from platform
/// outcomes. The others are part of the legacy contract but nothing maps to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FaxResponseCode {
    Successful = 0,
    AuthorizationFailed = 1,
    FaxingProhibited = 2,
    NoFaxRecipients = 3,
    NoFaxData = 4,
    GenericError = 5,
}

const FAX_RESPONSE_CODE_NAMES: [&str; 6] = [
    "Successful",
    "AuthorizationFailed",
    "FaxingProhibited",
    "NoFaxRecipients",
    "NoFaxData",
    "GenericError",
];

impl FaxResponseCode {
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn names() -> &'static [&'static str] {
        &FAX_RESPONSE_CODE_NAMES
    }

    #[must_use]
    pub fn from_outcome<T>(outcome: &Result<Reply<T>, Error>) -> Self {
        match outcome {
            Ok(_) => FaxResponseCode::Successful,
            Err(Error::AuthorizationFailed(_) | Error::DownstreamClientError(401)) => {
                FaxResponseCode::AuthorizationFailed
            }
            Err(_) => FaxResponseCode::GenericError,
        }
    }

    /// The status and description a code stands for.
    #[must_use]
    pub fn response_info(self) -> ResponseInfo {
        let (status, message) = match self {
            FaxResponseCode::Successful => (StatusCode::OK, "Successful"),
            FaxResponseCode::AuthorizationFailed => {
                (StatusCode::UNAUTHORIZED, "Authorization failed")
            }
            FaxResponseCode::FaxingProhibited => {
                (StatusCode::FORBIDDEN, "Faxing is prohibited for the account")
            }
            FaxResponseCode::NoFaxRecipients => (StatusCode::BAD_REQUEST, "No recipients specified"),
            FaxResponseCode::NoFaxData => (StatusCode::BAD_REQUEST, "No fax data specified"),
            FaxResponseCode::GenericError => (StatusCode::BAD_REQUEST, "Generic error"),
        };
        ResponseInfo {
            status_code: status.as_u16(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for FaxResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(FAX_RESPONSE_CODE_NAMES[self.code() as usize])
    }
}
