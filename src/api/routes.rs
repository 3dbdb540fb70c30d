use crate::api::api_error::APIError;
use crate::api::server::AppState;
use crate::error::Error;
use crate::legacy::fax::{Attachment, FaxForm, FormFields};
use crate::legacy::render::{render_call, render_fax, render_list, LegacyResponse};
use crate::legacy::ringout::{Command, RingOutParams};
use axum::extract::{DefaultBodyLimit, Multipart, RawQuery, State};
use axum::http::{header, HeaderMap};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use bytes::Bytes;
use serde_json::json;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use url::form_urlencoded;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

pub(super) fn new(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(health_check))
        .route("/ringout.asp", get(ringout).post(ringout))
        .route("/ringout.asp/", get(ringout).post(ringout))
        .route("/faxout.asp", post(faxout))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.api_timeout))
        .with_state(state)
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

async fn ringout(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> LegacyResponse {
    let params = match ringout_params(query.as_deref(), &headers, &body) {
        Ok(params) => params,
        Err(err) => return rejected(&err),
    };
    let command = match params.command() {
        Ok(command) => command,
        Err(err) => return rejected(&err),
    };
    let format = params.format();

    let token = match state.platform.authorize(&params.credentials()).await {
        Ok(token) => token,
        Err(err) => {
            tracing::debug!("rejected credentials for {}*{}", params.username, params.ext);
            return rejected(&err);
        }
    };

    tracing::debug!("ringout {command:?} for {}*{}", params.username, params.ext);
    let res = match command {
        Command::Call => render_call(
            state
                .platform
                .ring_out(&token, &params.outbound_call())
                .await,
            format,
        ),
        Command::List => render_list(state.platform.list_forwarding_numbers(&token).await, format),
        Command::Status | Command::Cancel => {
            return rejected(&Error::InvalidCommand(params.cmd.clone()))
        }
    };
    if !res.status.is_success() {
        tracing::warn!("ringout {command:?} failed with {}", res.status);
    }
    res
}

/// Requests refused before reaching the platform get a bare status, whatever the format.
fn rejected(err: &Error) -> LegacyResponse {
    tracing::debug!("rejected ringout request: {err}");
    LegacyResponse::text(err.status_code(), Vec::new())
}

/// Merge the url-encoded body and the query string, body pairs first. A later value for the
/// same name replaces an earlier one, so the query string wins.
fn ringout_params(
    query: Option<&str>,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<RingOutParams, Error> {
    let query = query.unwrap_or_default().as_bytes();
    let body: &[u8] = if is_form_urlencoded(headers) {
        check_escapes(body)?;
        body
    } else {
        &[]
    };
    check_escapes(query)?;
    Ok(RingOutParams::from_pairs(
        form_urlencoded::parse(body).chain(form_urlencoded::parse(query)),
    ))
}

/// `form_urlencoded::parse` keeps a bad `%` escape as literal text. Reject it instead.
fn check_escapes(raw: &[u8]) -> Result<(), Error> {
    let mut bytes = raw.iter().enumerate();
    while let Some((idx, &b)) = bytes.next() {
        if b != b'%' {
            continue;
        }
        let valid = raw
            .get(idx + 1..idx + 3)
            .map_or(false, |hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            return Err(Error::MalformedRequest(format!(
                "invalid escape at offset {idx}"
            )));
        }
        bytes.nth(1);
    }
    Ok(())
}

fn is_form_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .map_or(false, |ct| {
            ct.trim().to_ascii_lowercase().starts_with(FORM_URLENCODED)
        })
}

async fn faxout(
    State(state): State<AppState>,
    WithRejection(multipart, _): WithRejection<Multipart, APIError>,
) -> Result<LegacyResponse, APIError> {
    let fields = read_multipart(multipart).await?;
    let form = FaxForm::new(&fields);
    let format = form.format();

    let token = match state.platform.authorize(&form.credentials()).await {
        Ok(token) => token,
        Err(err) => {
            tracing::debug!("rejected fax credentials: {err}");
            return Ok(render_fax(Err(err), format));
        }
    };

    let fax = form.fax_request();
    tracing::debug!(
        "sending fax to {} recipient(s) with {} attachment(s)",
        fax.recipients.len(),
        fax.attachments.len()
    );
    let res = render_fax(state.platform.send_fax(&token, fax).await, format);
    if !res.status.is_success() {
        tracing::warn!("faxout failed with {}", res.status);
    }
    Ok(res)
}

/// Parts with a file name are collected as attachments, everything else as text values.
async fn read_multipart(mut multipart: Multipart) -> Result<FormFields, Error> {
    let mut fields = FormFields::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };
        if field.file_name().is_some() {
            let attachment = Attachment {
                file_name: field.file_name().map(ToOwned::to_owned),
                content_type: field.content_type().map(ToOwned::to_owned),
                data: field.bytes().await?,
            };
            fields.push_file(name, attachment);
        } else {
            fields.push_value(name, field.text().await?);
        }
    }
    Ok(fields)
}
