//! RingProxy
//!
//! Serves the legacy form-based telephony API (`ringout.asp`, `faxout.asp`) on top of the
//! RingCentral REST platform, so old integrations keep working unchanged.
//!
//! Every request is independent: the legacy credentials are exchanged for an access token with a
//! password grant, one platform call is made, and its outcome is rendered in the legacy response
//! format. Nothing is stored between requests.
//!
#![warn(clippy::pedantic)]

pub mod api;
pub mod config;
pub mod error;
pub mod legacy;
pub mod platform;

pub use api::new as new_http;
pub use config::{Config, SharedConfig};
pub use platform::{DynPlatform, Platform, RestPlatform};
