//! The downstream REST telephony platform.
//!
//! Each legacy request exchanges its credentials for an [`AccessToken`] with
//! [`Platform::authorize`], then makes exactly one API call with it. Nothing is cached between
//! requests and nothing is retried.
//!
//! [`rest::RestPlatform`] is the implementation used by the server. Payload types keep any
//! fields they don't name so that `format=json` responses pass the platform's JSON through
//! without loss.

use crate::error::Error;
use crate::legacy::fax::FaxRequest;
use crate::legacy::ringout::{Credentials, OutboundCallRequest};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

pub mod rest;

pub use rest::RestPlatform;

/// `DynPlatform` is a type alias for a [`Platform`] shared by every request handler.
pub type DynPlatform = Arc<dyn Platform + Send + Sync>;

/// A successful (2xx) platform response.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    pub status: u16,
    pub payload: T,
}

#[derive(Deserialize, Clone, Default)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

impl AccessToken {
    #[must_use]
    pub fn bearer(access_token: &str) -> Self {
        AccessToken {
            access_token: access_token.to_string(),
            token_type: "bearer".to_string(),
            expires_in: None,
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Result of placing a ring-out call.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CallInfo {
    #[serde(default)]
    pub id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ForwardingNumbers {
    #[serde(default)]
    pub records: Vec<ForwardingNumberInfo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForwardingNumberInfo {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ForwardingNumberInfo {
    pub fn new(label: &str, phone_number: &str) -> Self {
        ForwardingNumberInfo {
            label: label.to_string(),
            phone_number: phone_number.to_string(),
            extra: Map::new(),
        }
    }
}

/// An async trait describing the platform operations the legacy API needs.
#[async_trait::async_trait]
pub trait Platform {
    /// Exchange legacy credentials for an access token with a password grant.
    ///
    /// Fails with [`Error::AuthorizationFailed`] when the grant is rejected or can't be made.
    async fn authorize(&self, credentials: &Credentials) -> Result<AccessToken, Error>;

    /// Place a ring-out call for the authorized extension.
    async fn ring_out(
        &self,
        token: &AccessToken,
        request: &OutboundCallRequest,
    ) -> Result<Reply<CallInfo>, Error>;

    /// List the authorized extension's forwarding numbers.
    async fn list_forwarding_numbers(
        &self,
        token: &AccessToken,
    ) -> Result<Reply<ForwardingNumbers>, Error>;

    /// Submit a fax. The platform's response body is returned as-is.
    async fn send_fax(&self, token: &AccessToken, request: FaxRequest)
        -> Result<Reply<Value>, Error>;
}
