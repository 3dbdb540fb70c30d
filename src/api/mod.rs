//! HTTP front door for the legacy API.
//!
//! # API Endpoints
//!
//! ## `/healthcheck` (GET)
//!
//!   Returns HTTP 200 (OK) and the JSON body `{"ok":"healthy"}` when the service is operational.
//!
//! ## `/ringout.asp` (GET, POST)
//!
//!   Also served at `/ringout.asp/`. Parameters are read from the query string and, for
//!   `application/x-www-form-urlencoded` bodies, from the form: `cmd`, `username`, `ext`,
//!   `password`, `to`, `from`, `clid`, `prompt`, `sessionid` and `format`. When both carry a
//!   parameter the query string wins.
//!
//!   - `cmd=call` places a ring-out call from `from` to `to`, showing `clid` as the caller ID and
//!     playing a prompt when `prompt=1`. Answers `OK <call id>`.
//!   - `cmd=list` answers with the extension's forwarding numbers as
//!     `OK <number>;<label>;<number>;<label>...`. North American numbers in `+1XXXXXXXXXX` form
//!     are shortened to their ten digits.
//!
//!   With `format=json` the platform's JSON payload is returned instead of the text line.
//!
//!   Any other `cmd` (including the legacy `status` and `cancel`) or a bad `%` escape returns
//!   HTTP 400. Credentials the platform rejects return HTTP 401. Both come with an empty body.
//!
//! ## `/faxout.asp` (POST)
//!
//!   Expects a `multipart/form-data` body with the fields `Username`, `Extension`, `Password`,
//!   any number of `Recipient` (`<number>` or `<number>|<name>`), `Coverpage`, `Coverpagetext`,
//!   `Resolution` (`High` or `Low`), `Sendtime` (`dd:mm:yy hh:mm` GMT, or RFC 3339), `Format`,
//!   and `Attachment` files.
//!
//!   Answers with a single [`FaxResponseCode`][crate::legacy::FaxResponseCode] digit, or with
//!   `Format=json` the platform's JSON payload.
//!
//! Platform 4xx responses are reported as HTTP 400, and 5xx responses, redirects, or an
//! unreachable platform as HTTP 500.

mod api_error;
mod routes;
pub mod server;

pub use server::{new, router};
