use std::collections::BTreeMap;

use http::header::AUTHORIZATION;
use http::Method;
use serde::Serialize;
use url::Url;

use crate::error::{ErrorMessages, SignError, SignResult, XAuthResult};
use crate::secrets::{Credentials, TokenPair};
use crate::signer::{oauth_encode, OAuthSign, SignedMessage};
use crate::{
    OAUTH_CONSUMER_KEY, OAUTH_NONCE_KEY, OAUTH_SIGNATURE_KEY, OAUTH_SIGNATURE_METHOD,
    OAUTH_SIGNATURE_METHOD_KEY, OAUTH_TIMESTAMP_KEY, OAUTH_TOKEN_KEY, OAUTH_VERSION,
    OAUTH_VERSION_KEY, X_AUTH_MODE, X_AUTH_MODE_KEY, X_AUTH_PASSWORD_KEY, X_AUTH_USERNAME_KEY,
};

/// Callback receiving the exchanged token and token secret.
pub type TokenCallback = Box<dyn FnOnce(String, String) + Send>;
/// Callback receiving nothing but the fact of success.
pub type AckCallback = Box<dyn FnOnce() + Send>;
/// Callback receiving an error code and message.
pub type ErrorCallback = Box<dyn FnOnce(u16, String) + Send>;

/// Configuration of the request-token exchange (xAuth step 1).
pub struct TokenRequest {
    pub(crate) consumer_key: String,
    pub(crate) consumer_secret: String,
    pub(crate) url: String,
    pub(crate) user_name: String,
    pub(crate) password: String,
    pub(crate) success: Option<TokenCallback>,
    pub(crate) error: Option<ErrorCallback>,
}

impl TokenRequest {
    pub fn new<TKey, TSecret, TUrl, TUser, TPassword>(
        consumer_key: TKey,
        consumer_secret: TSecret,
        url: TUrl,
        user_name: TUser,
        password: TPassword,
    ) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
        TUrl: Into<String>,
        TUser: Into<String>,
        TPassword: Into<String>,
    {
        TokenRequest {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            url: url.into(),
            user_name: user_name.into(),
            password: password.into(),
            success: None,
            error: None,
        }
    }

    /// Called with `(token, token_secret)` when the exchange succeeds.
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(String, String) + Send + 'static,
    {
        self.success = Some(Box::new(callback));
        self
    }

    /// Called with `(code, message)` when anything goes wrong.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(u16, String) + Send + 'static,
    {
        self.error = Some(Box::new(callback));
        self
    }
}

/// Configuration of the access-token exchange (xAuth step 2).
pub struct AccessTokenRequest {
    pub(crate) consumer_key: String,
    pub(crate) consumer_secret: String,
    pub(crate) url: String,
    pub(crate) user_name: String,
    pub(crate) password: String,
    pub(crate) request_token: String,
    pub(crate) request_secret: String,
    pub(crate) success: Option<TokenCallback>,
    pub(crate) error: Option<ErrorCallback>,
}

impl AccessTokenRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new<TKey, TSecret, TUrl, TUser, TPassword, TToken, TTokenSecret>(
        consumer_key: TKey,
        consumer_secret: TSecret,
        url: TUrl,
        user_name: TUser,
        password: TPassword,
        request_token: TToken,
        request_secret: TTokenSecret,
    ) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
        TUrl: Into<String>,
        TUser: Into<String>,
        TPassword: Into<String>,
        TToken: Into<String>,
        TTokenSecret: Into<String>,
    {
        AccessTokenRequest {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            url: url.into(),
            user_name: user_name.into(),
            password: password.into(),
            request_token: request_token.into(),
            request_secret: request_secret.into(),
            success: None,
            error: None,
        }
    }

    /// Called with `(token, token_secret)` when the exchange succeeds.
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(String, String) + Send + 'static,
    {
        self.success = Some(Box::new(callback));
        self
    }

    /// Called with `(code, message)` when anything goes wrong.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(u16, String) + Send + 'static,
    {
        self.error = Some(Box::new(callback));
        self
    }
}

/// A form-encoded request payload.
///
/// Either hand a pre-encoded string over or encode any `Serialize` map
/// or struct through [`Payload::form`].
#[derive(Debug, Clone)]
pub struct Payload(pub(crate) String);

impl Payload {
    /// Encode a `Serialize` value as `application/x-www-form-urlencoded`.
    pub fn form<T>(form: &T) -> XAuthResult<Payload>
    where
        T: Serialize + ?Sized,
    {
        Ok(Payload(serde_urlencoded::to_string(form)?))
    }
}

impl From<String> for Payload {
    fn from(encoded: String) -> Self {
        Payload(encoded)
    }
}

impl From<&str> for Payload {
    fn from(encoded: &str) -> Self {
        Payload(encoded.to_string())
    }
}

/// Configuration of an ad-hoc signed API call.
pub struct SignedCall {
    pub(crate) method: Method,
    pub(crate) action: String,
    pub(crate) payload: Option<Payload>,
    pub(crate) additional_headers: Vec<(String, String)>,
    pub(crate) error_messages: Option<ErrorMessages>,
    pub(crate) success: Option<AckCallback>,
    pub(crate) error: Option<ErrorCallback>,
}

impl SignedCall {
    pub fn new<T>(method: Method, action: T) -> Self
    where
        T: Into<String>,
    {
        SignedCall {
            method,
            action: action.into(),
            payload: None,
            additional_headers: Vec::new(),
            error_messages: None,
            success: None,
            error: None,
        }
    }

    /// Attach a payload; its entries participate in the signature.
    pub fn payload<P>(mut self, payload: P) -> Self
    where
        P: Into<Payload>,
    {
        self.payload = Some(payload.into());
        self
    }

    /// Add a header; replaces the default header of the same name.
    pub fn header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.additional_headers.push((key.into(), value.into()));
        self
    }

    /// Replace the session's error message overrides for this call only.
    pub fn error_messages(mut self, messages: ErrorMessages) -> Self {
        self.error_messages = Some(messages);
        self
    }

    /// Called when the remote acknowledges the request.
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.success = Some(Box::new(callback));
        self
    }

    /// Called with `(code, message)` when anything goes wrong.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(u16, String) + Send + 'static,
    {
        self.error = Some(Box::new(callback));
        self
    }
}

/// A fully assembled request, ready for the transport. Used exactly once.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Option<String>,
    pub(crate) expects_token_in_body: bool,
}

/// Build the request-token exchange request (xAuth step 1).
///
/// The body is the verbatim concatenation of the three `x_auth_*` pairs;
/// the remote expects them unencoded here, unlike step 2.
pub(crate) fn request_token<TSigner>(
    config: &TokenRequest,
    signer: &TSigner,
) -> XAuthResult<TransportRequest>
where
    TSigner: OAuthSign,
{
    let action = Url::parse(&config.url)?;
    let credentials =
        Credentials::new(config.consumer_key.as_str(), config.consumer_secret.as_str());

    let mut message = SignedMessage::new(Method::POST, action.clone())
        .parameter(OAUTH_CONSUMER_KEY, config.consumer_key.as_str())
        .parameter(OAUTH_SIGNATURE_METHOD_KEY, OAUTH_SIGNATURE_METHOD)
        .parameter(OAUTH_VERSION_KEY, OAUTH_VERSION)
        .parameter(X_AUTH_USERNAME_KEY, config.user_name.as_str())
        .parameter(X_AUTH_PASSWORD_KEY, config.password.as_str())
        .parameter(X_AUTH_MODE_KEY, X_AUTH_MODE);
    signer.set_timestamp_and_nonce(&mut message);
    signer.sign(&mut message, credentials.as_accessor())?;

    let body = format!(
        "{}={}&{}={}&{}={}",
        X_AUTH_USERNAME_KEY,
        config.user_name,
        X_AUTH_PASSWORD_KEY,
        config.password,
        X_AUTH_MODE_KEY,
        X_AUTH_MODE
    );
    let authorization = token_authorization(&message, None)?;

    Ok(TransportRequest {
        method: Method::POST,
        url: action,
        headers: vec![(AUTHORIZATION.as_str().to_string(), authorization)],
        body: Some(body),
        expects_token_in_body: true,
    })
}

/// Build the access-token exchange request (xAuth step 2).
pub(crate) fn access_token<TSigner>(
    config: &AccessTokenRequest,
    signer: &TSigner,
) -> XAuthResult<TransportRequest>
where
    TSigner: OAuthSign,
{
    let action = Url::parse(&config.url)?;
    let credentials =
        Credentials::new(config.consumer_key.as_str(), config.consumer_secret.as_str());
    let token = TokenPair::new(config.request_token.as_str(), config.request_secret.as_str());

    let mut message = SignedMessage::new(Method::POST, action.clone())
        .parameter(OAUTH_CONSUMER_KEY, config.consumer_key.as_str())
        .parameter(OAUTH_SIGNATURE_METHOD_KEY, OAUTH_SIGNATURE_METHOD)
        .parameter(OAUTH_VERSION_KEY, OAUTH_VERSION)
        .parameter(OAUTH_TOKEN_KEY, config.request_token.as_str())
        .parameter(X_AUTH_USERNAME_KEY, config.user_name.as_str())
        .parameter(X_AUTH_PASSWORD_KEY, config.password.as_str())
        .parameter(X_AUTH_MODE_KEY, X_AUTH_MODE);
    signer.complete_request(&mut message, credentials.accessor_with(&token))?;

    let mut fields = BTreeMap::new();
    fields.insert(X_AUTH_USERNAME_KEY.to_string(), config.user_name.clone());
    fields.insert(X_AUTH_PASSWORD_KEY.to_string(), config.password.clone());
    fields.insert(X_AUTH_MODE_KEY.to_string(), X_AUTH_MODE.to_string());
    let body = signer.normalize_parameters(&fields);
    let authorization = token_authorization(&message, Some(config.request_token.as_str()))?;

    Ok(TransportRequest {
        method: Method::POST,
        url: action,
        headers: vec![(AUTHORIZATION.as_str().to_string(), authorization)],
        body: Some(body),
        expects_token_in_body: true,
    })
}

/// Build an ad-hoc signed API request (no Authorization header; the OAuth
/// parameters travel in the URL query or form body instead).
pub(crate) fn signed_request<TSigner>(
    call: &SignedCall,
    consumer_key: &str,
    consumer_secret: &str,
    access_token: &str,
    access_token_secret: &str,
    signer: &TSigner,
) -> XAuthResult<TransportRequest>
where
    TSigner: OAuthSign,
{
    let mut action = Url::parse(&call.action)?;
    // an existing query participates in the signature like any parameter
    let query: Vec<(String, String)> = action.query_pairs().into_owned().collect();
    action.set_query(None);

    let credentials = Credentials::new(consumer_key, consumer_secret);
    let token = TokenPair::new(access_token, access_token_secret);

    let mut message = SignedMessage::new(call.method.clone(), action.clone())
        .merge(query)
        .parameter(OAUTH_CONSUMER_KEY, consumer_key)
        .parameter(OAUTH_SIGNATURE_METHOD_KEY, OAUTH_SIGNATURE_METHOD)
        .parameter(OAUTH_VERSION_KEY, OAUTH_VERSION)
        .parameter(OAUTH_TOKEN_KEY, access_token);
    if let Some(ref payload) = call.payload {
        message = message.merge(signer.parameter_map(&payload.0));
    }
    signer.complete_request(&mut message, credentials.accessor_with(&token))?;

    let (url, body) = if call.method == Method::GET {
        (
            signer.add_to_url(message.action(), message.parameters()),
            None,
        )
    } else if call.method == Method::POST {
        (
            action,
            Some(signer.normalize_parameters(message.parameters())),
        )
    } else {
        (action, None)
    };

    Ok(TransportRequest {
        method: call.method.clone(),
        url,
        headers: call.additional_headers.clone(),
        body,
        expects_token_in_body: false,
    })
}

/// Assemble the Authorization header of the token exchanges.
///
/// Field order is fixed: nonce, signature method, timestamp, consumer key,
/// signature, [token,] version. Signature and token are percent-encoded.
fn token_authorization(message: &SignedMessage, token: Option<&str>) -> XAuthResult<String> {
    let mut fields = vec![
        (OAUTH_NONCE_KEY, require(message, OAUTH_NONCE_KEY)?.to_string()),
        (
            OAUTH_SIGNATURE_METHOD_KEY,
            require(message, OAUTH_SIGNATURE_METHOD_KEY)?.to_string(),
        ),
        (
            OAUTH_TIMESTAMP_KEY,
            require(message, OAUTH_TIMESTAMP_KEY)?.to_string(),
        ),
        (
            OAUTH_CONSUMER_KEY,
            require(message, OAUTH_CONSUMER_KEY)?.to_string(),
        ),
        (
            OAUTH_SIGNATURE_KEY,
            oauth_encode(require(message, OAUTH_SIGNATURE_KEY)?),
        ),
    ];
    if let Some(token) = token {
        fields.push((OAUTH_TOKEN_KEY, oauth_encode(token)));
    }
    fields.push((
        OAUTH_VERSION_KEY,
        require(message, OAUTH_VERSION_KEY)?.to_string(),
    ));

    let rendered = fields
        .iter()
        .map(|(key, value)| format!("{}=\"{}\"", key, value))
        .collect::<Vec<String>>()
        .join(", ");
    Ok(format!("OAuth {}", rendered))
}

fn require<'a>(message: &'a SignedMessage, key: &'static str) -> SignResult<&'a str> {
    message.get(key).ok_or(SignError::MissingParameter(key))
}
