use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{
    TokenReadError, TokenReadResult, AUTHORIZE_ERROR_ENTRY, INVALID_AUTH_ERROR_ENTRY,
    INVALID_CONSUMER_INFO_ENTRY,
};
use crate::transport::Exchange;
use crate::{OAUTH_TOKEN_KEY, OAUTH_TOKEN_SECRET_KEY};

/// Represents response of token acquisition.
#[derive(Deserialize, Debug)]
pub struct TokenResponse {
    /// OAuth Token
    pub oauth_token: String,
    /// OAuth Token Secret
    pub oauth_token_secret: String,
    /// Other contents
    #[serde(flatten)]
    pub remain: HashMap<String, String>,
}

/// Classification of a completed exchange.
#[derive(Debug)]
pub(crate) enum Outcome {
    /// 200 with a usable token pair in the body.
    Token(TokenResponse),
    /// 200 on a call that does not return tokens.
    Ack,
    /// Anything else, flattened to the caller's `(code, message)` shape.
    Error(u16, String),
}

/// Sort a terminal exchange into the outcome reported to the caller.
///
/// 403 and "Consumer key missing" 401s map onto fixed table entries, the
/// body notwithstanding; any other non-200 passes through untouched.
pub(crate) fn interpret(exchange: &Exchange, expects_token_in_body: bool) -> Outcome {
    match exchange.status {
        200 if expects_token_in_body => match read_oauth_token(exchange.body.clone()) {
            Ok(tokens) => Outcome::Token(tokens),
            Err(_) => {
                let (code, message) = INVALID_AUTH_ERROR_ENTRY;
                Outcome::Error(code, message.to_string())
            }
        },
        200 => Outcome::Ack,
        403 => {
            let (code, message) = AUTHORIZE_ERROR_ENTRY;
            Outcome::Error(code, message.to_string())
        }
        401 if exchange.body.contains(INVALID_CONSUMER_INFO_ENTRY.1) => {
            let (code, message) = INVALID_CONSUMER_INFO_ENTRY;
            Outcome::Error(code, message.to_string())
        }
        status => Outcome::Error(status, exchange.body.clone()),
    }
}

pub(crate) fn read_oauth_token(text: String) -> TokenReadResult<TokenResponse> {
    let mut destructured = text
        .split('&')
        .map(|e| e.splitn(2, '='))
        .map(|v| {
            let mut iter = v.into_iter();
            (
                iter.next().unwrap_or_default().to_string(),
                iter.next().unwrap_or_default().to_string(),
            )
        })
        .collect::<HashMap<String, String>>();
    let oauth_token = destructured.remove(OAUTH_TOKEN_KEY);
    let oauth_token_secret = destructured.remove(OAUTH_TOKEN_SECRET_KEY);
    match (oauth_token, oauth_token_secret) {
        (Some(t), Some(s)) => Ok(TokenResponse {
            oauth_token: t,
            oauth_token_secret: s,
            remain: destructured,
        }),
        (None, _) => Err(TokenReadError::TokenKeyNotFound(OAUTH_TOKEN_KEY, text)),
        (_, _) => Err(TokenReadError::TokenKeyNotFound(
            OAUTH_TOKEN_SECRET_KEY,
            text,
        )),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_response_typical() {
        let resp_str_sample = "oauth_token=Z6eEdO8MOmk394WozF5oKyuAv855l4Mlqo7hhlSLik&oauth_token_secret=Kd75W4OQfb2oJTV0vzGzeXftVAwgMnEK9MumzYcM&oauth_callback_confirmed=true";
        for parsed in &[
            read_oauth_token(resp_str_sample.to_string()).unwrap(),
            serde_urlencoded::from_str::<TokenResponse>(resp_str_sample).unwrap(),
        ] {
            assert_eq!(
                parsed.oauth_token,
                "Z6eEdO8MOmk394WozF5oKyuAv855l4Mlqo7hhlSLik"
            );
            assert_eq!(
                parsed.oauth_token_secret,
                "Kd75W4OQfb2oJTV0vzGzeXftVAwgMnEK9MumzYcM"
            );
            assert_eq!(parsed.remain.len(), 1);
            let oauth_callback_confirmed = parsed.remain.get("oauth_callback_confirmed").unwrap();
            assert_eq!(oauth_callback_confirmed, "true");
        }
    }

    #[test]
    fn parse_response_edge() {
        let resp_str_sample = "oauth_token==&oauth_token_secret=&keyonly=&keyonly2&=&&";
        let parsed = read_oauth_token(resp_str_sample.to_string()).unwrap();
        assert_eq!(parsed.oauth_token, "=");
        assert_eq!(parsed.oauth_token_secret, "");
        assert_eq!(parsed.remain.len(), 3);
        let keyonly = parsed.remain.get("keyonly").unwrap();
        assert_eq!(keyonly, "");
        let keyonly2 = parsed.remain.get("keyonly2").unwrap();
        assert_eq!(keyonly2, "");
        let empty = parsed.remain.get("").unwrap();
        assert_eq!(empty, "");
    }

    #[test]
    fn parse_minimal() {
        let resp_str_sample = "oauth_token&oauth_token_secret";
        let parsed = read_oauth_token(resp_str_sample.to_string()).unwrap();
        assert_eq!(parsed.oauth_token, "");
        assert_eq!(parsed.oauth_token_secret, "");
        assert_eq!(parsed.remain.len(), 0);
    }

    #[test]
    fn parse_token_notfound() {
        let resp_str_sample = "oauth_token_secret=";
        let parsed = read_oauth_token(resp_str_sample.to_string());
        assert!(parsed.is_err());
        if let Err(TokenReadError::TokenKeyNotFound(key, resp_str)) = parsed {
            assert_eq!(key, OAUTH_TOKEN_KEY);
            assert_eq!(resp_str, resp_str_sample)
        } else {
            assert!(false)
        }
    }

    #[test]
    fn parse_token_secret_notfound() {
        let resp_str_sample = "oauth_token=";
        let parsed = read_oauth_token(resp_str_sample.to_string());
        assert!(parsed.is_err());
        if let Err(TokenReadError::TokenKeyNotFound(key, resp_str)) = parsed {
            assert_eq!(key, OAUTH_TOKEN_SECRET_KEY);
            assert_eq!(resp_str, resp_str_sample)
        } else {
            assert!(false)
        }
    }

    fn exchange(status: u16, body: &str) -> Exchange {
        Exchange {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn ok_with_tokens_expected_yields_token_outcome() {
        let outcome = interpret(&exchange(200, "oauth_token=t&oauth_token_secret=s"), true);
        match outcome {
            Outcome::Token(tokens) => {
                assert_eq!(tokens.oauth_token, "t");
                assert_eq!(tokens.oauth_token_secret, "s");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn ok_with_empty_token_values_still_succeeds() {
        let outcome = interpret(&exchange(200, "oauth_token=&oauth_token_secret="), true);
        assert!(matches!(outcome, Outcome::Token(_)));
    }

    #[test]
    fn ok_without_tokens_when_expected_is_invalid_auth() {
        let outcome = interpret(&exchange(200, "nothing=useful"), true);
        match outcome {
            Outcome::Error(code, message) => {
                assert_eq!(code, 401);
                assert_eq!(message, "Invalid OAuth Request");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn ok_without_token_expectation_is_ack() {
        let outcome = interpret(&exchange(200, "whatever"), false);
        assert!(matches!(outcome, Outcome::Ack));
    }

    #[test]
    fn forbidden_is_forced_to_authorize_error() {
        let outcome = interpret(&exchange(403, "some detailed body"), false);
        match outcome {
            Outcome::Error(code, message) => {
                assert_eq!(code, 403);
                assert_eq!(message, "Invalid Username or Password");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn unauthorized_with_consumer_marker_is_forced() {
        let outcome = interpret(
            &exchange(401, "<error>Consumer key missing or invalid</error>"),
            false,
        );
        match outcome {
            Outcome::Error(code, message) => {
                assert_eq!(code, 401);
                assert_eq!(message, "Consumer key missing");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn unauthorized_without_marker_passes_through() {
        let outcome = interpret(&exchange(401, "token expired"), false);
        match outcome {
            Outcome::Error(code, message) => {
                assert_eq!(code, 401);
                assert_eq!(message, "token expired");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn other_statuses_pass_through_untouched() {
        let outcome = interpret(&exchange(500, "boom"), false);
        match outcome {
            Outcome::Error(code, message) => {
                assert_eq!(code, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
