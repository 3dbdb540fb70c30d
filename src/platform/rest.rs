//! A [`reqwest`] backed implementation of the [`Platform`][super::Platform] trait.
use crate::config::Config;
use crate::error::Error;
use crate::legacy::fax::{Attachment, FaxRequest, Resolution};
use crate::legacy::ringout::{Credentials, OutboundCallRequest};
use crate::platform::{AccessToken, CallInfo, ForwardingNumbers, Platform, Reply};
use base64::engine::general_purpose;
use base64::Engine;
use bytes::Bytes;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{redirect, Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;
use url::Url;

const TOKEN_PATH: &str = "restapi/oauth/token";
const RING_OUT_PATH: &str = "restapi/v1.0/account/~/extension/~/ring-out";
const FORWARDING_NUMBER_PATH: &str = "restapi/v1.0/account/~/extension/~/forwarding-number";
const FAX_PATH: &str = "restapi/v1.0/account/~/extension/~/fax";

/// Talks to the platform's REST API over HTTPS. Cheap to share: the inner [`Client`] pools
/// connections across requests.
#[derive(Clone)]
pub struct RestPlatform {
    client: Client,
    server_url: Url,
    basic_auth: String,
}

impl RestPlatform {
    /// Build a platform client from the app credentials and server URL in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `server_url` isn't an absolute URL, or
    /// [`Error::Transport`] if the HTTP client can't be initialized.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let mut server_url = Url::parse(&config.server_url).map_err(|err| {
            Error::InvalidConfig(format!("invalid server URL {}: {err}", config.server_url))
        })?;
        // Url::join treats the last path segment as a file unless it ends with '/'.
        if !server_url.path().ends_with('/') {
            let path = format!("{}/", server_url.path());
            server_url.set_path(&path);
        }

        let client = Client::builder()
            .timeout(config.platform_timeout)
            .redirect(redirect::Policy::none())
            .build()?;

        let app_creds = format!("{}:{}", config.client_id, config.client_secret);
        Ok(RestPlatform {
            client,
            server_url,
            basic_auth: format!("Basic {}", general_purpose::STANDARD.encode(app_creds)),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        self.server_url
            .join(path)
            .map_err(|err| Error::InvalidConfig(format!("invalid endpoint {path}: {err}")))
    }
}

async fn reply<T: DeserializeOwned>(resp: Response) -> Result<Reply<T>, Error> {
    let status = resp.status();
    if !status.is_success() {
        return Err(Error::from_downstream_status(status.as_u16()));
    }
    Ok(Reply {
        status: status.as_u16(),
        payload: resp.json().await?,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PhoneNumber<'a> {
    phone_number: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RingOutBody<'a> {
    from: PhoneNumber<'a>,
    to: PhoneNumber<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    caller_id: Option<PhoneNumber<'a>>,
    play_prompt: bool,
}

impl<'a> From<&'a OutboundCallRequest> for RingOutBody<'a> {
    fn from(req: &'a OutboundCallRequest) -> Self {
        RingOutBody {
            from: PhoneNumber {
                phone_number: &req.from,
            },
            to: PhoneNumber {
                phone_number: &req.to,
            },
            caller_id: (!req.caller_id.is_empty()).then_some(PhoneNumber {
                phone_number: &req.caller_id,
            }),
            play_prompt: req.play_prompt,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FaxBody<'a> {
    to: Vec<PhoneNumber<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fax_resolution: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cover_index: Option<u8>,
    #[serde(skip_serializing_if = "str::is_empty")]
    cover_page_text: &'a str,
    #[serde(
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    send_time: Option<OffsetDateTime>,
}

impl<'a> From<&'a FaxRequest> for FaxBody<'a> {
    fn from(req: &'a FaxRequest) -> Self {
        FaxBody {
            to: req
                .recipients
                .iter()
                .map(|number| PhoneNumber {
                    phone_number: number,
                })
                .collect(),
            fax_resolution: req.resolution.map(Resolution::as_str),
            cover_index: req.cover_index,
            cover_page_text: &req.cover_page_text,
            send_time: req.send_time,
        }
    }
}

/// Parts share the attachment's buffer. An unparsable content type leaves the part untyped.
fn attachment_part(attachment: Attachment) -> Part {
    let len = attachment.data.len() as u64;
    let stream = |data: Bytes| Part::stream_with_length(data, len);
    let mut part = match &attachment.content_type {
        Some(mime) => stream(attachment.data.clone())
            .mime_str(mime)
            .unwrap_or_else(|_| stream(attachment.data)),
        None => stream(attachment.data),
    };
    if let Some(name) = attachment.file_name {
        part = part.file_name(name);
    }
    part
}

#[async_trait::async_trait]
impl Platform for RestPlatform {
    async fn authorize(&self, credentials: &Credentials) -> Result<AccessToken, Error> {
        let mut form = vec![
            ("grant_type", "password".to_string()),
            ("username", credentials.username.clone()),
            ("extension", credentials.extension.clone()),
            ("password", credentials.password.clone()),
        ];
        if let Some(ttl) = credentials.refresh_token_ttl {
            form.push(("refresh_token_ttl", ttl.to_string()));
        }

        let resp = self
            .client
            .post(self.endpoint(TOKEN_PATH)?)
            .header(AUTHORIZATION, &self.basic_auth)
            .form(&form)
            .send()
            .await
            .map_err(|err| Error::AuthorizationFailed(err.to_string()))?;
        if !resp.status().is_success() {
            return Err(Error::AuthorizationFailed(format!(
                "token endpoint returned {}",
                resp.status().as_u16()
            )));
        }
        resp.json()
            .await
            .map_err(|err| Error::AuthorizationFailed(err.to_string()))
    }

    async fn ring_out(
        &self,
        token: &AccessToken,
        request: &OutboundCallRequest,
    ) -> Result<Reply<CallInfo>, Error> {
        let resp = self
            .client
            .post(self.endpoint(RING_OUT_PATH)?)
            .bearer_auth(&token.access_token)
            .json(&RingOutBody::from(request))
            .send()
            .await?;
        reply(resp).await
    }

    async fn list_forwarding_numbers(
        &self,
        token: &AccessToken,
    ) -> Result<Reply<ForwardingNumbers>, Error> {
        let resp = self
            .client
            .get(self.endpoint(FORWARDING_NUMBER_PATH)?)
            .bearer_auth(&token.access_token)
            .send()
            .await?;
        reply(resp).await
    }

    async fn send_fax(
        &self,
        token: &AccessToken,
        request: FaxRequest,
    ) -> Result<Reply<Value>, Error> {
        let body = serde_json::to_vec(&FaxBody::from(&request)).map_err(Error::Serialization)?;
        let mut form = Form::new().part("request", Part::bytes(body).mime_str("application/json")?);
        for attachment in request.attachments {
            form = form.part("attachment", attachment_part(attachment));
        }

        let resp = self
            .client
            .post(self.endpoint(FAX_PATH)?)
            .bearer_auth(&token.access_token)
            .multipart(form)
            .send()
            .await?;
        reply(resp).await
    }
}
