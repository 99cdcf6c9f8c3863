use http::header::CONTENT_TYPE;
use http::Method;
use tracing::debug;

use crate::error::XAuthResult;
use crate::request::TransportRequest;

/// Headers attached to every request unless the request replaces them.
pub(crate) static DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("Accept-Encoding", "none"),
    ("Accept-Language", "en"),
    ("Accept-Charset", "UTF-8"),
    ("Cookie", ""),
];

pub(crate) const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// The terminal state of one HTTP exchange.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub status: u16,
    pub body: String,
}

/// Merge the default headers under the request's own.
///
/// The request wins on a name collision (case-insensitive); POST forces
/// the form content type over whatever the request carries.
pub(crate) fn merge_headers(request: &TransportRequest) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = DEFAULT_HEADERS
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    for (key, value) in &request.headers {
        replace_or_push(&mut merged, key, value);
    }
    if request.method == Method::POST {
        replace_or_push(&mut merged, CONTENT_TYPE.as_str(), FORM_CONTENT_TYPE);
    }
    merged
}

fn replace_or_push(headers: &mut Vec<(String, String)>, key: &str, value: &str) {
    match headers
        .iter_mut()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
    {
        Some(entry) => entry.1 = value.to_string(),
        None => headers.push((key.to_string(), value.to_string())),
    }
}

/// Send the request and wait for its terminal state.
///
/// One completion per request; retries, timeouts and redirect policy are
/// whatever the supplied `reqwest::Client` is configured with.
pub(crate) async fn send(
    client: &reqwest::Client,
    request: TransportRequest,
) -> XAuthResult<Exchange> {
    let headers = merge_headers(&request);
    debug!(method = %request.method, url = %request.url, "dispatching request");

    let mut builder = client.request(request.method.clone(), request.url.clone());
    for (key, value) in &headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    if let Some(body) = request.body {
        builder = builder.body(body);
    }

    let response = builder.send().await?;
    let status = response.status().as_u16();
    let body = response.text().await?;
    debug!(status, "exchange completed");
    Ok(Exchange { status, body })
}
