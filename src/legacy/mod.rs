//! Translation between the legacy form-based API and the REST platform.
//!
//! [`ringout`] and [`fax`] turn loosely typed legacy fields into typed platform requests.
//! [`render`] turns platform outcomes back into what legacy clients expect.

pub mod fax;
pub mod render;
pub mod ringout;

pub use fax::{FaxForm, FaxRequest, FormFields};
pub use render::{FaxResponseCode, Format, LegacyResponse};
pub use ringout::{Command, Credentials, OutboundCallRequest, RingOutParams};
