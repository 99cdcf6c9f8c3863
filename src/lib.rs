/*!
reqwest-xauth: xAuth over reqwest ♡ oauth1-request.

# Overview

This library drives the OAuth 1.0a xAuth flow: it exchanges a username and
password for a request token, upgrades that into an access token pair, and
runs ad-hoc HMAC-SHA1-signed API calls, all on top of
[reqwest](https://crates.io/crates/reqwest) with signatures from
[oauth1-request](https://crates.io/crates/oauth1-request).

Results are delivered through callbacks; exactly one of `on_success` /
`on_error` fires per operation, exactly once. Errors arrive as a
`(code, message)` pair where the message text can be replaced through
[`ErrorMessages`] while the code stays fixed.

# How to use

## Basic usecase 1 - acquiring the access token

```no_run
use reqwest_xauth::{AccessTokenRequest, TokenRequest, XAuthClient};

# async fn run() {
let consumer_key = "[CONSUMER_KEY]";
let consumer_secret = "[CONSUMER_SECRET]";

let client = XAuthClient::new();

// step 1: exchange username/password for a request token
let request = TokenRequest::new(
    consumer_key,
    consumer_secret,
    "https://api.example.com/oauth/request_token",
    "[USER_NAME]",
    "[PASSWORD]",
)
.on_success(|token, secret| println!("request token: {} / {}", token, secret))
.on_error(|code, message| eprintln!("failed with {} : {}", code, message));
client.fetch_request_token(request).await;

// step 2: upgrade the request token into the access token pair
let request = AccessTokenRequest::new(
    consumer_key,
    consumer_secret,
    "https://api.example.com/oauth/access_token",
    "[USER_NAME]",
    "[PASSWORD]",
    "[REQUEST_TOKEN]",
    "[REQUEST_TOKEN_SECRET]",
)
.on_success(|token, secret| println!("access token: {} / {}", token, secret))
.on_error(|code, message| eprintln!("failed with {} : {}", code, message));
client.fetch_access_token(request).await;
# }
```

## Basic usecase 2 - sending a signed API call

```no_run
use http::Method;
use reqwest_xauth::{Session, SignedCall, XAuthClient};

# async fn run() {
let session = Session::new(
    "https://api.example.com/oauth/request_token",
    "https://api.example.com/oauth/access_token",
)
.consumer("[CONSUMER_KEY]", "[CONSUMER_SECRET]")
.token("[ACCESS_TOKEN]", "[TOKEN_SECRET]");

let call = SignedCall::new(Method::POST, "https://api.example.com/1/statuses/update.json")
    .payload("status=Hello%2C%20world")
    .on_success(|| println!("posted"))
    .on_error(|code, message| eprintln!("failed with {} : {}", code, message));
session.signed_call(&XAuthClient::new(), call).await;
# }
```
*/
mod client;
mod error;
mod request;
mod response;
mod secrets;
mod session;
mod signer;
mod transport;

// exposed to external program
pub use client::XAuthClient;
pub use error::{
    ErrorMessages, SignError, SignResult, TokenReadError, TokenReadResult, XAuthError,
    XAuthResult, AUTHORIZE_ERROR, INVALID_AUTH_ERROR, INVALID_CONSUMER_INFO, NOT_AUTHORIZED,
    UNKNOWN_ERROR,
};
pub use request::{
    AccessTokenRequest, AckCallback, ErrorCallback, Payload, SignedCall, TokenCallback,
    TokenRequest,
};
pub use response::TokenResponse;
pub use secrets::{Credentials, SecretAccessor, TokenPair};
pub use session::Session;
pub use signer::{HmacSha1Signer, OAuthSign, SignedMessage};
pub use transport::Exchange;

// exposed constant variables
/// Represents `oauth_consumer_key`.
pub const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
/// Represents `oauth_nonce`.
pub const OAUTH_NONCE_KEY: &str = "oauth_nonce";
/// Represents `oauth_signature`.
pub const OAUTH_SIGNATURE_KEY: &str = "oauth_signature";
/// Represents `oauth_signature_method`.
pub const OAUTH_SIGNATURE_METHOD_KEY: &str = "oauth_signature_method";
/// Represents `oauth_timestamp`.
pub const OAUTH_TIMESTAMP_KEY: &str = "oauth_timestamp";
/// Represents `oauth_token`.
pub const OAUTH_TOKEN_KEY: &str = "oauth_token";
/// Represents `oauth_token_secret`.
pub const OAUTH_TOKEN_SECRET_KEY: &str = "oauth_token_secret";
/// Represents `oauth_version`.
pub const OAUTH_VERSION_KEY: &str = "oauth_version";
/// Represents `realm`.
pub const REALM_KEY: &str = "realm";
/// Represents `x_auth_username`.
pub const X_AUTH_USERNAME_KEY: &str = "x_auth_username";
/// Represents `x_auth_password`.
pub const X_AUTH_PASSWORD_KEY: &str = "x_auth_password";
/// Represents `x_auth_mode`.
pub const X_AUTH_MODE_KEY: &str = "x_auth_mode";

/// The only `oauth_version` value the signer accepts.
pub const OAUTH_VERSION: &str = "1.0";
/// The signature method this crate produces.
pub const OAUTH_SIGNATURE_METHOD: &str = "HMAC-SHA1";
/// The fixed `x_auth_mode` value of both token exchanges.
pub const X_AUTH_MODE: &str = "client_auth";

// crate-private constant variables
pub(crate) const OAUTH_KEY_PREFIX: &str = "oauth_";
