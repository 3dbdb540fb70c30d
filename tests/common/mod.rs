#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ringproxy::error::Error;
use ringproxy::legacy::{Credentials, FaxRequest, OutboundCallRequest};
use ringproxy::platform::{
    AccessToken, CallInfo, ForwardingNumberInfo, ForwardingNumbers, Platform, Reply,
};
use ringproxy::{Config, DynPlatform};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

pub const PASSWORD: &str = "p";
pub const TOKEN: &str = "token-1";

/// A platform that accepts [`PASSWORD`] and answers every API call with `status`.
pub struct FakePlatform {
    pub status: u16,
    pub call_id: String,
    pub numbers: Vec<ForwardingNumberInfo>,
    pub authorizations: Mutex<Vec<Credentials>>,
    pub calls: Mutex<Vec<OutboundCallRequest>>,
    pub faxes: Mutex<Vec<FaxRequest>>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        FakePlatform {
            status: 200,
            call_id: "abc123".into(),
            numbers: vec![ForwardingNumberInfo::new("Main", "+15551234567")],
            authorizations: Mutex::default(),
            calls: Mutex::default(),
            faxes: Mutex::default(),
        }
    }
}

impl FakePlatform {
    pub fn with_status(status: u16) -> Self {
        FakePlatform {
            status,
            ..FakePlatform::default()
        }
    }

    fn reply<T>(&self, payload: T) -> Result<Reply<T>, Error> {
        match self.status {
            200..=299 => Ok(Reply {
                status: self.status,
                payload,
            }),
            status => Err(Error::from_downstream_status(status)),
        }
    }

    fn check_token(token: &AccessToken) {
        assert_eq!(token.access_token, TOKEN);
    }
}

#[async_trait::async_trait]
impl Platform for FakePlatform {
    async fn authorize(&self, credentials: &Credentials) -> Result<AccessToken, Error> {
        self.authorizations.lock().unwrap().push(credentials.clone());
        if credentials.password == PASSWORD {
            Ok(AccessToken::bearer(TOKEN))
        } else {
            Err(Error::AuthorizationFailed("invalid_grant".into()))
        }
    }

    async fn ring_out(
        &self,
        token: &AccessToken,
        request: &OutboundCallRequest,
    ) -> Result<Reply<CallInfo>, Error> {
        Self::check_token(token);
        self.calls.lock().unwrap().push(request.clone());
        let mut info = CallInfo {
            id: self.call_id.clone(),
            ..CallInfo::default()
        };
        info.extra
            .insert("status".into(), json!({"callStatus": "InProgress"}));
        self.reply(info)
    }

    async fn list_forwarding_numbers(
        &self,
        token: &AccessToken,
    ) -> Result<Reply<ForwardingNumbers>, Error> {
        Self::check_token(token);
        self.reply(ForwardingNumbers {
            records: self.numbers.clone(),
            ..ForwardingNumbers::default()
        })
    }

    async fn send_fax(
        &self,
        token: &AccessToken,
        request: FaxRequest,
    ) -> Result<Reply<Value>, Error> {
        Self::check_token(token);
        self.faxes.lock().unwrap().push(request);
        self.reply(json!({"id": "fax-1", "messageStatus": "Queued"}))
    }
}

pub fn config() -> Config {
    Config {
        server_url: "https://platform.example.com".into(),
        client_id: "id".into(),
        client_secret: "secret".into(),
        api_bind_addr: "127.0.0.1:0".parse().unwrap(),
        api_timeout: Duration::from_secs(5),
        platform_timeout: Duration::from_secs(5),
        max_upload_bytes: 1024 * 1024,
    }
}

pub fn app(platform: &Arc<FakePlatform>) -> Router {
    let platform: DynPlatform = platform.clone();
    ringproxy::api::router(Arc::new(config()), platform)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub async fn send(app: Router, req: Request<Body>) -> TestResponse {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let content_type = res
        .headers()
        .get("content-type")
        .map(|ct| ct.to_str().unwrap().to_string());
    let body = hyper::body::to_bytes(res.into_body()).await.unwrap();
    TestResponse {
        status,
        content_type,
        body: String::from_utf8(body.to_vec()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> TestResponse {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}
