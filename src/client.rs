use reqwest::Client as ReqwestClient;
use tracing::debug;

use crate::error::{
    resolve, ErrorMessages, INVALID_AUTH_ERROR_ENTRY, INVALID_CONSUMER_INFO, UNKNOWN_ENTRY,
};
use crate::request::{
    self, AccessTokenRequest, ErrorCallback, TokenCallback, TokenRequest, TransportRequest,
};
use crate::response::{self, Outcome};
use crate::signer::{HmacSha1Signer, OAuthSign};
use crate::transport;

/// Entry point for the two xAuth token exchanges.
///
/// Holds the `reqwest::Client` every exchange goes through and the signer
/// that produces `oauth_signature` values. The default signer is
/// [`HmacSha1Signer`]; tests substitute their own via [`with_signer`].
///
/// [`with_signer`]: XAuthClient::with_signer
#[derive(Debug, Clone, Default)]
pub struct XAuthClient<TSigner = HmacSha1Signer> {
    http: ReqwestClient,
    signer: TSigner,
}

impl XAuthClient {
    /// Constructs a client with a fresh `reqwest::Client` and the
    /// HMAC-SHA1 signer.
    pub fn new() -> Self {
        Self::new_with_client(ReqwestClient::new())
    }

    /// Constructs a client around an already configured `reqwest::Client`.
    ///
    /// Timeouts, proxies and redirect policy are whatever `client` carries.
    pub fn new_with_client(client: ReqwestClient) -> Self {
        XAuthClient {
            http: client,
            signer: HmacSha1Signer,
        }
    }
}

impl<TSigner> XAuthClient<TSigner>
where
    TSigner: OAuthSign,
{
    pub fn with_signer(client: ReqwestClient, signer: TSigner) -> Self {
        XAuthClient {
            http: client,
            signer,
        }
    }

    pub(crate) fn http(&self) -> &ReqwestClient {
        &self.http
    }

    pub(crate) fn signer(&self) -> &TSigner {
        &self.signer
    }

    /// Exchange a username/password pair for a request token.
    ///
    /// Exactly one of the request's callbacks fires, exactly once. An empty
    /// consumer key or secret is reported synchronously without touching the
    /// signer or the network.
    pub async fn fetch_request_token(&self, mut config: TokenRequest) {
        let success = config.success.take();
        let error = config
            .error
            .take()
            .unwrap_or_else(|| Box::new(|_: u16, _: String| {}));
        if config.consumer_key.is_empty() || config.consumer_secret.is_empty() {
            let (code, message) = resolve(INVALID_CONSUMER_INFO, &ErrorMessages::new());
            error(code, message);
            return;
        }
        debug!(url = %config.url, "fetching request token");
        match request::request_token(&config, &self.signer) {
            Ok(request) => self.exchange_tokens(request, success, error).await,
            Err(err) => error(UNKNOWN_ENTRY.0, err.to_string()),
        }
    }

    /// Exchange a request token for the access token pair.
    ///
    /// Same callback contract as [`fetch_request_token`]; the request token
    /// obtained there rides along in both the signature and the
    /// `Authorization` header.
    ///
    /// [`fetch_request_token`]: XAuthClient::fetch_request_token
    pub async fn fetch_access_token(&self, mut config: AccessTokenRequest) {
        let success = config.success.take();
        let error = config
            .error
            .take()
            .unwrap_or_else(|| Box::new(|_: u16, _: String| {}));
        if config.consumer_key.is_empty() || config.consumer_secret.is_empty() {
            let (code, message) = resolve(INVALID_CONSUMER_INFO, &ErrorMessages::new());
            error(code, message);
            return;
        }
        debug!(url = %config.url, "fetching access token");
        match request::access_token(&config, &self.signer) {
            Ok(request) => self.exchange_tokens(request, success, error).await,
            Err(err) => error(UNKNOWN_ENTRY.0, err.to_string()),
        }
    }

    async fn exchange_tokens(
        &self,
        request: TransportRequest,
        success: Option<TokenCallback>,
        error: ErrorCallback,
    ) {
        match transport::send(&self.http, request).await {
            Ok(exchange) => match response::interpret(&exchange, true) {
                Outcome::Token(tokens) => {
                    if let Some(success) = success {
                        success(tokens.oauth_token, tokens.oauth_token_secret);
                    }
                }
                // interpret never yields Ack when tokens are expected, but
                // the dispatch stays total either way
                Outcome::Ack => {
                    let (code, message) = INVALID_AUTH_ERROR_ENTRY;
                    error(code, message.to_string());
                }
                Outcome::Error(code, message) => error(code, message),
            },
            Err(err) => error(UNKNOWN_ENTRY.0, err.to_string()),
        }
    }
}
