//! Parameters of the legacy `ringout.asp` API.

use crate::error::Error;
use crate::legacy::render::Format;
use std::fmt;

/// A `ringout.asp` command. All four are known to legacy clients, only `call` and `list` are
/// served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Call,
    List,
    Status,
    Cancel,
}

impl Command {
    /// Match a raw `cmd` value, ignoring ASCII case.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "call" => Some(Command::Call),
            "list" => Some(Command::List),
            "status" => Some(Command::Status),
            "cancel" => Some(Command::Cancel),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_supported(self) -> bool {
        matches!(self, Command::Call | Command::List)
    }
}

/// The full list of parameters a `ringout.asp` request can carry. Names are lower-case and
/// missing parameters are empty.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RingOutParams {
    pub cmd: String,
    pub username: String,
    pub ext: String,
    pub password: String,
    pub to: String,
    pub from: String,
    pub clid: String,
    pub prompt: String,
    pub sessionid: String,
    pub format: String,
}

impl RingOutParams {
    /// Build params from decoded name/value pairs. The last value seen for a name wins and
    /// unknown names are ignored.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = RingOutParams::default();
        for (name, value) in pairs {
            let slot = match name.as_ref() {
                "cmd" => &mut params.cmd,
                "username" => &mut params.username,
                "ext" => &mut params.ext,
                "password" => &mut params.password,
                "to" => &mut params.to,
                "from" => &mut params.from,
                "clid" => &mut params.clid,
                "prompt" => &mut params.prompt,
                "sessionid" => &mut params.sessionid,
                "format" => &mut params.format,
                _ => continue,
            };
            *slot = value.into();
        }
        params
    }

    /// True iff `cmd` names a served command.
    #[must_use]
    pub fn has_valid_command(&self) -> bool {
        Command::parse(&self.cmd).map_or(false, Command::is_supported)
    }

    /// The served command for this request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCommand`] for `status`, `cancel`, and anything unrecognized.
    pub fn command(&self) -> Result<Command, Error> {
        match Command::parse(&self.cmd) {
            Some(cmd) if cmd.is_supported() => Ok(cmd),
            _ => Err(Error::InvalidCommand(self.cmd.clone())),
        }
    }

    /// Only the literal `1` turns the prompt on.
    #[must_use]
    pub fn play_prompt(&self) -> bool {
        self.prompt == "1"
    }

    #[must_use]
    pub fn format(&self) -> Format {
        Format::parse(&self.format)
    }

    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.ext, &self.password)
    }

    #[must_use]
    pub fn outbound_call(&self) -> OutboundCallRequest {
        OutboundCallRequest {
            to: self.to.clone(),
            from: self.from.clone(),
            caller_id: self.clid.clone(),
            play_prompt: self.play_prompt(),
        }
    }
}

impl fmt::Debug for RingOutParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingOutParams")
            .field("cmd", &self.cmd)
            .field("username", &self.username)
            .field("ext", &self.ext)
            .field("password", &"<redacted>")
            .field("to", &self.to)
            .field("from", &self.from)
            .field("clid", &self.clid)
            .field("prompt", &self.prompt)
            .field("sessionid", &self.sessionid)
            .field("format", &self.format)
            .finish()
    }
}

/// Password grant credentials for a single legacy request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub extension: String,
    pub password: String,
    /// Lifetime requested for the refresh token. `None` leaves it to the platform.
    pub refresh_token_ttl: Option<u64>,
}

impl Credentials {
    pub fn new(username: &str, extension: &str, password: &str) -> Self {
        Credentials {
            username: username.to_string(),
            extension: extension.to_string(),
            password: password.to_string(),
            refresh_token_ttl: None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("extension", &self.extension)
            .field("password", &"<redacted>")
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundCallRequest {
    pub to: String,
    pub from: String,
    pub caller_id: String,
    pub play_prompt: bool,
}
