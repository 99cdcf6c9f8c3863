use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::time::{SystemTime, UNIX_EPOCH};

use http::Method;
use oauth1_request::signer::Signer as OAuthSigner;
use oauth1_request::{HmacSha1, Options};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use url::Url;

use crate::error::{SignError, SignResult};
use crate::secrets::SecretAccessor;
use crate::{
    OAUTH_CONSUMER_KEY, OAUTH_KEY_PREFIX, OAUTH_NONCE_KEY, OAUTH_SIGNATURE_KEY,
    OAUTH_TIMESTAMP_KEY, OAUTH_TOKEN_KEY, OAUTH_VERSION, OAUTH_VERSION_KEY, REALM_KEY,
};

/// Unreserved characters of RFC 3986, everything else percent-encoded.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const NONCE_LENGTH: usize = 16;

pub(crate) fn oauth_encode(input: &str) -> String {
    utf8_percent_encode(input, OAUTH_ENCODE_SET).to_string()
}

/// A single request in preparation: verb, target URL and the flat
/// parameter set the signature is computed over.
///
/// Keys are unique; a later insert under the same key replaces the
/// earlier value. The URL must not carry a query of its own, callers
/// fold any query pairs into the parameter set first.
#[derive(Debug, Clone)]
pub struct SignedMessage {
    method: Method,
    action: Url,
    parameters: BTreeMap<String, String>,
}

impl SignedMessage {
    pub fn new(method: Method, action: Url) -> Self {
        SignedMessage {
            method,
            action,
            parameters: BTreeMap::new(),
        }
    }

    /// Set a single parameter.
    pub fn parameter<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Merge a batch of parameters; colliding keys are replaced.
    pub fn merge<I>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.parameters.extend(entries);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn action(&self) -> &Url {
        &self.action
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).map(|value| value.as_str())
    }
}

/// Signing capability consumed by the request builders.
///
/// [`HmacSha1Signer`] is the provided implementation; substitute your own
/// to change the signature method or the nonce/timestamp source.
pub trait OAuthSign {
    /// Compute the signature over the message's current parameter set,
    /// store it under `oauth_signature` and return it.
    ///
    /// Expects `oauth_nonce` and `oauth_timestamp` to be present already,
    /// use [`set_timestamp_and_nonce`](OAuthSign::set_timestamp_and_nonce)
    /// or [`complete_request`](OAuthSign::complete_request).
    fn sign(&self, message: &mut SignedMessage, secrets: SecretAccessor<'_>)
        -> SignResult<String>;

    /// Stamp the message with a fresh `oauth_timestamp` and `oauth_nonce`.
    fn set_timestamp_and_nonce(&self, message: &mut SignedMessage);

    /// Stamp, then sign.
    fn complete_request(
        &self,
        message: &mut SignedMessage,
        secrets: SecretAccessor<'_>,
    ) -> SignResult<String> {
        self.set_timestamp_and_nonce(message);
        self.sign(message, secrets)
    }

    /// RFC 5849 parameter normalization: percent-encode keys and values,
    /// sort by (key, value), join as `k=v` pairs with `&`.
    ///
    /// `oauth_signature` and `realm` never participate.
    fn normalize_parameters(&self, parameters: &BTreeMap<String, String>) -> String {
        let mut encoded: Vec<(String, String)> = parameters
            .iter()
            .filter(|(key, _)| key.as_str() != OAUTH_SIGNATURE_KEY && key.as_str() != REALM_KEY)
            .map(|(key, value)| (oauth_encode(key), oauth_encode(value)))
            .collect();
        encoded.sort();
        encoded
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<String>>()
            .join("&")
    }

    /// Append every parameter, `oauth_signature` included, to the URL query.
    fn add_to_url(&self, action: &Url, parameters: &BTreeMap<String, String>) -> Url {
        let mut url = action.clone();
        let appended = parameters
            .iter()
            .map(|(key, value)| format!("{}={}", oauth_encode(key), oauth_encode(value)))
            .collect::<Vec<String>>()
            .join("&");
        let query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{}&{}", existing, appended),
            _ => appended,
        };
        if query.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&query));
        }
        url
    }

    /// Decode a form/URL-encoded string into a parameter map.
    fn parameter_map(&self, encoded: &str) -> HashMap<String, String> {
        url::form_urlencoded::parse(encoded.as_bytes())
            .into_owned()
            .collect()
    }
}

/// The default signer: HMAC-SHA1 through `oauth1-request`, UNIX-second
/// timestamps and 16-character alphanumeric nonces.
#[derive(Debug, Clone, Copy, Default)]
pub struct HmacSha1Signer;

impl HmacSha1Signer {
    fn compute_signature(
        message: &SignedMessage,
        secrets: SecretAccessor<'_>,
    ) -> SignResult<String> {
        let parameters = &message.parameters;
        let consumer_key = parameters
            .get(OAUTH_CONSUMER_KEY)
            .ok_or(SignError::MissingParameter(OAUTH_CONSUMER_KEY))?;
        let nonce = parameters
            .get(OAUTH_NONCE_KEY)
            .ok_or(SignError::MissingParameter(OAUTH_NONCE_KEY))?;
        let timestamp_text = parameters
            .get(OAUTH_TIMESTAMP_KEY)
            .ok_or(SignError::MissingParameter(OAUTH_TIMESTAMP_KEY))?;
        let timestamp = timestamp_text
            .parse::<u64>()
            .map_err(|_| SignError::InvalidTimestamp(timestamp_text.clone()))?;
        let token = parameters.get(OAUTH_TOKEN_KEY).map(|token| token.as_str());
        let version = match parameters.get(OAUTH_VERSION_KEY).map(|v| v.as_str()) {
            None | Some("") => false,
            Some(v) if v == OAUTH_VERSION => true,
            Some(v) => return Err(SignError::InvalidVersion(v.to_string())),
        };

        // NOTE: items must be added by alphabetical order
        let mut options = Options::new();
        options.nonce(nonce.as_str());
        options.timestamp(timestamp);
        if let Some(token) = token {
            options.token(token);
        }
        options.version(version);

        let token_secret = match secrets.token_secret {
            "" => None,
            secret => Some(secret),
        };

        // GET carries parameters in the URL query, everything else in a
        // form body; the signer must hash the matching base string.
        let mut signer = if message.method == Method::GET {
            OAuthSigner::with_signature_method(
                HmacSha1,
                message.method.as_str(),
                message.action.clone(),
                secrets.consumer_secret,
                token_secret,
            )
        } else {
            OAuthSigner::form_with_signature_method(
                HmacSha1,
                message.method.as_str(),
                message.action.clone(),
                secrets.consumer_secret,
                token_secret,
            )
        };

        // feed keys [a ~ oauth_), then the oauth_* block, then (oauth_ ~ z]
        for (key, value) in parameters.range::<str, _>((Bound::Unbounded, Bound::Excluded(OAUTH_KEY_PREFIX))) {
            signer.parameter(key, value);
        }
        let mut signer = signer.oauth_parameters(consumer_key, &options);
        for (key, value) in parameters.range::<str, _>((Bound::Included(OAUTH_KEY_PREFIX), Bound::Unbounded)) {
            if !key.starts_with(OAUTH_KEY_PREFIX) {
                signer.parameter(key, value);
            }
        }

        extract_signature(&signer.finish().authorization)
    }
}

impl OAuthSign for HmacSha1Signer {
    fn sign(
        &self,
        message: &mut SignedMessage,
        secrets: SecretAccessor<'_>,
    ) -> SignResult<String> {
        let signature = HmacSha1Signer::compute_signature(message, secrets)?;
        message
            .parameters
            .insert(OAUTH_SIGNATURE_KEY.to_string(), signature.clone());
        Ok(signature)
    }

    fn set_timestamp_and_nonce(&self, message: &mut SignedMessage) {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let nonce: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(NONCE_LENGTH)
            .map(char::from)
            .collect();
        message
            .parameters
            .insert(OAUTH_TIMESTAMP_KEY.to_string(), timestamp.to_string());
        message
            .parameters
            .insert(OAUTH_NONCE_KEY.to_string(), nonce);
    }
}

/// Pull `oauth_signature` back out of a generated Authorization value.
fn extract_signature(authorization: &str) -> SignResult<String> {
    authorization
        .trim_start_matches("OAuth ")
        .split(',')
        .filter_map(|pair| {
            let mut entry = pair.splitn(2, '=');
            match (entry.next(), entry.next()) {
                (Some(key), Some(value)) if key == OAUTH_SIGNATURE_KEY => {
                    Some(value.trim_matches('"'))
                }
                _ => None,
            }
        })
        .next()
        .map(|encoded| {
            percent_decode_str(encoded)
                .decode_utf8_lossy()
                .into_owned()
        })
        .ok_or(SignError::SignatureNotProduced)
}
