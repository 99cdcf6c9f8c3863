use crate::client::XAuthClient;
use crate::error::{
    resolve, ErrorMessages, INVALID_CONSUMER_INFO, NOT_AUTHORIZED, UNKNOWN_ENTRY,
};
use crate::request::{self, ErrorCallback, SignedCall};
use crate::response::{self, Outcome};
use crate::signer::OAuthSign;
use crate::transport;

/// Caller-owned state of an xAuth session.
///
/// The crate reads it and never writes it back; persisting the tokens
/// obtained from the exchanges into a session is the caller's business.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub xauth_request_token_url: String,
    pub xauth_access_token_url: String,
    pub consumer_key: Option<String>,
    pub consumer_secret: Option<String>,
    pub access_token: Option<String>,
    pub access_token_secret: Option<String>,
    pub error_messages: ErrorMessages,
}

impl Session {
    pub fn new<TRequest, TAccess>(
        xauth_request_token_url: TRequest,
        xauth_access_token_url: TAccess,
    ) -> Self
    where
        TRequest: Into<String>,
        TAccess: Into<String>,
    {
        Session {
            xauth_request_token_url: xauth_request_token_url.into(),
            xauth_access_token_url: xauth_access_token_url.into(),
            ..Default::default()
        }
    }

    pub fn consumer<TKey, TSecret>(self, consumer_key: TKey, consumer_secret: TSecret) -> Self
    where
        TKey: Into<String>,
        TSecret: Into<String>,
    {
        Session {
            consumer_key: Some(consumer_key.into()),
            consumer_secret: Some(consumer_secret.into()),
            ..self
        }
    }

    pub fn token<TToken, TSecret>(self, access_token: TToken, access_token_secret: TSecret) -> Self
    where
        TToken: Into<String>,
        TSecret: Into<String>,
    {
        Session {
            access_token: Some(access_token.into()),
            access_token_secret: Some(access_token_secret.into()),
            ..self
        }
    }

    /// Session-wide error message replacements, see [`ErrorMessages`].
    pub fn error_messages(self, error_messages: ErrorMessages) -> Self {
        Session {
            error_messages,
            ..self
        }
    }

    /// Whether this session carries a usable access token pair.
    pub fn is_authorized(&self) -> bool {
        matches!(
            (&self.access_token, &self.access_token_secret),
            (Some(token), Some(secret)) if !token.is_empty() && !secret.is_empty()
        )
    }

    /// Run an ad-hoc signed API call against this session.
    ///
    /// Exactly one of the call's callbacks fires, exactly once. A call-level
    /// [`ErrorMessages`] replaces the session's for this call only.
    pub async fn signed_call<TSigner>(&self, client: &XAuthClient<TSigner>, mut call: SignedCall)
    where
        TSigner: OAuthSign,
    {
        let overrides = call
            .error_messages
            .take()
            .unwrap_or_else(|| self.error_messages.clone());
        let success = call.success.take();
        let report: ErrorCallback = call
            .error
            .take()
            .unwrap_or_else(|| Box::new(|_: u16, _: String| {}));

        let consumer_key = self.consumer_key.clone().unwrap_or_default();
        let consumer_secret = self.consumer_secret.clone().unwrap_or_default();
        if consumer_key.is_empty() || consumer_secret.is_empty() {
            let (code, message) = resolve(INVALID_CONSUMER_INFO, &overrides);
            report(code, message);
            return;
        }
        if !self.is_authorized() {
            let (code, message) = resolve(NOT_AUTHORIZED, &overrides);
            report(code, message);
            return;
        }
        let access_token = self.access_token.clone().unwrap_or_default();
        let access_token_secret = self.access_token_secret.clone().unwrap_or_default();

        let request = match request::signed_request(
            &call,
            &consumer_key,
            &consumer_secret,
            &access_token,
            &access_token_secret,
            client.signer(),
        ) {
            Ok(request) => request,
            Err(err) => {
                report(UNKNOWN_ENTRY.0, err.to_string());
                return;
            }
        };

        match transport::send(client.http(), request).await {
            Ok(exchange) => match response::interpret(&exchange, false) {
                Outcome::Token(_) | Outcome::Ack => {
                    if let Some(success) = success {
                        success();
                    }
                }
                Outcome::Error(code, message) => report(code, message),
            },
            Err(err) => report(UNKNOWN_ENTRY.0, err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use http::Method;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::SignResult;
    use crate::secrets::SecretAccessor;
    use crate::signer::SignedMessage;

    /// Proves the preconditions short-circuit before any signing happens.
    struct PanicSigner;

    impl OAuthSign for PanicSigner {
        fn sign(
            &self,
            _message: &mut SignedMessage,
            _secrets: SecretAccessor<'_>,
        ) -> SignResult<String> {
            panic!("signer must not be touched");
        }

        fn set_timestamp_and_nonce(&self, _message: &mut SignedMessage) {
            panic!("signer must not be touched");
        }
    }

    fn panic_client() -> XAuthClient<PanicSigner> {
        XAuthClient::with_signer(reqwest::Client::new(), PanicSigner)
    }

    fn capture_error() -> (
        Arc<Mutex<Option<(u16, String)>>>,
        impl FnOnce(u16, String) + Send,
    ) {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        (seen, move |code, message| {
            *sink.lock().unwrap() = Some((code, message));
        })
    }

    #[test]
    fn is_authorized_requires_both_tokens_non_empty() {
        let base = Session::new("https://example.com/r", "https://example.com/a");
        assert!(!base.clone().is_authorized());
        assert!(!base.clone().token("", "").is_authorized());
        assert!(!base.clone().token("t", "").is_authorized());
        assert!(!base.clone().token("", "s").is_authorized());
        assert!(base.clone().token("t", "s").is_authorized());
    }

    #[tokio::test]
    async fn missing_consumer_reports_invalid_consumer_info() {
        let session =
            Session::new("https://example.com/r", "https://example.com/a").token("t", "s");
        let (seen, capture) = capture_error();
        let call = SignedCall::new(Method::GET, "https://example.com/api").on_error(capture);
        session.signed_call(&panic_client(), call).await;
        assert_eq!(
            *seen.lock().unwrap(),
            Some((401, "Consumer key missing".to_string()))
        );
    }

    #[tokio::test]
    async fn empty_consumer_counts_as_missing() {
        let session = Session::new("https://example.com/r", "https://example.com/a")
            .consumer("", "cs")
            .token("t", "s");
        let (seen, capture) = capture_error();
        let call = SignedCall::new(Method::GET, "https://example.com/api").on_error(capture);
        session.signed_call(&panic_client(), call).await;
        assert_eq!(
            *seen.lock().unwrap(),
            Some((401, "Consumer key missing".to_string()))
        );
    }

    #[tokio::test]
    async fn unauthorized_session_reports_unknown_code() {
        let session =
            Session::new("https://example.com/r", "https://example.com/a").consumer("ck", "cs");
        let (seen, capture) = capture_error();
        let call = SignedCall::new(Method::GET, "https://example.com/api").on_error(capture);
        session.signed_call(&panic_client(), call).await;
        assert_eq!(*seen.lock().unwrap(), Some((900, "Unknown error".to_string())));
    }

    #[tokio::test]
    async fn not_authorized_message_is_overridable_code_is_not() {
        let session = Session::new("https://example.com/r", "https://example.com/a")
            .consumer("ck", "cs")
            .error_messages(ErrorMessages::new().set(NOT_AUTHORIZED, "sign in first"));
        let (seen, capture) = capture_error();
        let call = SignedCall::new(Method::GET, "https://example.com/api").on_error(capture);
        session.signed_call(&panic_client(), call).await;
        assert_eq!(*seen.lock().unwrap(), Some((900, "sign in first".to_string())));
    }

    #[tokio::test]
    async fn call_level_messages_take_precedence() {
        let session = Session::new("https://example.com/r", "https://example.com/a")
            .consumer("ck", "cs")
            .error_messages(ErrorMessages::new().set(NOT_AUTHORIZED, "from session"));
        let (seen, capture) = capture_error();
        let call = SignedCall::new(Method::GET, "https://example.com/api")
            .error_messages(ErrorMessages::new().set(NOT_AUTHORIZED, "from call"))
            .on_error(capture);
        session.signed_call(&panic_client(), call).await;
        assert_eq!(*seen.lock().unwrap(), Some((900, "from call".to_string())));
    }

    #[tokio::test]
    async fn authorized_get_fires_success_exactly_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/items"))
            .respond_with(ResponseTemplate::new(200).set_body_string("fine"))
            .mount(&server)
            .await;

        let session = Session::new("https://example.com/r", "https://example.com/a")
            .consumer("ck", "cs")
            .token("at", "ats");
        let client = XAuthClient::new();

        let fired = Arc::new(Mutex::new(0u32));
        let counter = Arc::clone(&fired);
        let call = SignedCall::new(Method::GET, format!("{}/api/items", server.uri()))
            .on_success(move || {
                *counter.lock().unwrap() += 1;
            })
            .on_error(|code, message| panic!("unexpected error {} {}", code, message));
        session.signed_call(&client, call).await;
        assert_eq!(*fired.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn forbidden_call_reports_authorize_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/post"))
            .respond_with(ResponseTemplate::new(403).set_body_string("denied in detail"))
            .mount(&server)
            .await;

        let session = Session::new("https://example.com/r", "https://example.com/a")
            .consumer("ck", "cs")
            .token("at", "ats");
        let client = XAuthClient::new();

        let (seen, capture) = capture_error();
        let call =
            SignedCall::new(Method::POST, format!("{}/api/post", server.uri())).on_error(capture);
        session.signed_call(&client, call).await;
        assert_eq!(
            *seen.lock().unwrap(),
            Some((403, "Invalid Username or Password".to_string()))
        );
    }

    #[tokio::test]
    async fn unreachable_host_reports_unknown_code_with_transport_text() {
        let session = Session::new("https://example.com/r", "https://example.com/a")
            .consumer("ck", "cs")
            .token("at", "ats");
        let client = XAuthClient::new();

        let (seen, capture) = capture_error();
        // reserved TEST-NET-1 address, nothing listens there
        let call = SignedCall::new(Method::GET, "http://192.0.2.1:9/api").on_error(capture);
        session.signed_call(&client, call).await;
        let reported = seen.lock().unwrap().clone();
        let (code, message) = reported.expect("error callback did not fire");
        assert_eq!(code, 900);
        assert!(!message.is_empty());
    }
}
