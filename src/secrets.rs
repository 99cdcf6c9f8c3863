use std::borrow::Cow;

/// Consumer key/secret identifying the calling application.
#[derive(Debug, Clone)]
pub struct Credentials<'a> {
    consumer_key: Cow<'a, str>,
    consumer_secret: Cow<'a, str>,
}

impl<'a> Credentials<'a> {
    pub fn new<TKey, TSecret>(consumer_key: TKey, consumer_secret: TSecret) -> Self
    where
        TKey: Into<Cow<'a, str>>,
        TSecret: Into<Cow<'a, str>>,
    {
        Credentials {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }

    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }

    pub fn consumer_secret(&self) -> &str {
        &self.consumer_secret
    }

    /// Accessor for signing before any token exists (xAuth step 1).
    pub fn as_accessor(&self) -> SecretAccessor<'_> {
        SecretAccessor {
            consumer_secret: &self.consumer_secret,
            token_secret: "",
        }
    }

    /// Accessor for signing with a request or access token.
    pub fn accessor_with<'b>(&'b self, token: &'b TokenPair<'_>) -> SecretAccessor<'b> {
        SecretAccessor {
            consumer_secret: &self.consumer_secret,
            token_secret: token.secret(),
        }
    }
}

/// An opaque token/secret pair issued by the remote service.
///
/// Holds either the short-lived request token from xAuth step 1 or the
/// long-lived access token from step 2; this crate treats both the same.
#[derive(Debug, Clone)]
pub struct TokenPair<'a> {
    token: Cow<'a, str>,
    secret: Cow<'a, str>,
}

impl<'a> TokenPair<'a> {
    pub fn new<TToken, TSecret>(token: TToken, secret: TSecret) -> Self
    where
        TToken: Into<Cow<'a, str>>,
        TSecret: Into<Cow<'a, str>>,
    {
        TokenPair {
            token: token.into(),
            secret: secret.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }
}

/// The secret pair consumed by the signer.
///
/// Never carries the public identifiers; those travel inside the message's
/// parameter set. An empty `token_secret` means "no token yet".
#[derive(Debug, Clone, Copy)]
pub struct SecretAccessor<'a> {
    pub consumer_secret: &'a str,
    pub token_secret: &'a str,
}
