use std::collections::HashMap;

use thiserror::Error;

pub type XAuthResult<T> = std::result::Result<T, XAuthError>;
pub type SignResult<T> = std::result::Result<T, SignError>;
pub type TokenReadResult<T> = std::result::Result<T, TokenReadError>;

/// Internal fault raised while assembling or sending a request.
///
/// These never escape the entry points; they are flattened into the
/// `(code, message)` shape of the caller's error callback.
#[derive(Error, Debug)]
pub enum XAuthError {
    #[error("OAuth sign failed : {0}")]
    Sign(#[from] SignError),
    #[error("invalid target URL : {0}")]
    Url(#[from] url::ParseError),
    #[error("payload could not be form-encoded : {0}")]
    Encode(#[from] serde_urlencoded::ser::Error),
    #[error("request failed : {0}")]
    Reqwest(#[from] reqwest::Error),
}

#[derive(Error, Debug, Clone)]
pub enum SignError {
    #[error("message lacks required parameter : {0}")]
    MissingParameter(&'static str),
    #[error("invalid oauth_timestamp, must be u64, but {0} is not compatible.")]
    InvalidTimestamp(String),
    #[error("invalid oauth_version, must be 1.0 or just empty, but specified {0}.")]
    InvalidVersion(String),
    #[error("signature method did not yield an oauth_signature")]
    SignatureNotProduced,
}

#[derive(Error, Debug, Clone)]
pub enum TokenReadError {
    #[error("response has malformed format: not found {0} in {1}")]
    TokenKeyNotFound(&'static str, String),
}

/// Symbolic name of the "consumer key/secret missing or rejected" error.
pub const INVALID_CONSUMER_INFO: &str = "invalidConsumerInfo";
/// Symbolic name of the "token exchange returned no usable token" error.
pub const INVALID_AUTH_ERROR: &str = "invalidAuthError";
/// Symbolic name of the "username/password rejected" error.
pub const AUTHORIZE_ERROR: &str = "authorizeError";
/// Symbolic name of the catch-all error.
pub const UNKNOWN_ERROR: &str = "unknown";
/// Symbolic name raised by `signed_call` on an unauthorized session.
///
/// Deliberately absent from the static table, so it always resolves to the
/// `unknown` code (900). Only its message can be customized via
/// [`ErrorMessages`].
pub const NOT_AUTHORIZED: &str = "notAuthorized";

pub(crate) const INVALID_CONSUMER_INFO_ENTRY: (u16, &str) = (401, "Consumer key missing");
pub(crate) const INVALID_AUTH_ERROR_ENTRY: (u16, &str) = (401, "Invalid OAuth Request");
pub(crate) const AUTHORIZE_ERROR_ENTRY: (u16, &str) = (403, "Invalid Username or Password");
pub(crate) const UNKNOWN_ENTRY: (u16, &str) = (900, "Unknown error");

/// Fixed symbolic error table. Codes are never overridable.
static ERROR_TABLE: &[(&str, (u16, &str))] = &[
    (INVALID_CONSUMER_INFO, INVALID_CONSUMER_INFO_ENTRY),
    (INVALID_AUTH_ERROR, INVALID_AUTH_ERROR_ENTRY),
    (AUTHORIZE_ERROR, AUTHORIZE_ERROR_ENTRY),
    (UNKNOWN_ERROR, UNKNOWN_ENTRY),
];

/// Caller-supplied replacement messages, keyed by symbolic error name.
///
/// Only the message text can be replaced; the numeric code attached to a
/// symbol is fixed. Symbols without a table entry (such as
/// [`NOT_AUTHORIZED`]) keep the `unknown` code but still honor a
/// replacement message registered under their own name.
#[derive(Debug, Clone, Default)]
pub struct ErrorMessages(HashMap<String, String>);

impl ErrorMessages {
    pub fn new() -> Self {
        Default::default()
    }

    /// Register a replacement message for the given symbolic name.
    pub fn set<K, V>(mut self, symbol: K, message: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.insert(symbol.into(), message.into());
        self
    }

    pub fn get(&self, symbol: &str) -> Option<&str> {
        self.0.get(symbol).map(|message| message.as_str())
    }
}

/// Resolve a symbolic error into the `(code, message)` pair reported to the
/// caller's error callback.
pub(crate) fn resolve(symbol: &str, overrides: &ErrorMessages) -> (u16, String) {
    let (code, default_message) = ERROR_TABLE
        .iter()
        .find(|(name, _)| *name == symbol)
        .map(|(_, entry)| *entry)
        .unwrap_or(UNKNOWN_ENTRY);
    let message = overrides.get(symbol).unwrap_or(default_message);
    (code, message.to_string())
}
