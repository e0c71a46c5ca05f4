use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde_json::Value;

use crate::{HttpSettings, ServiceError};

/// Longest slice of an error body kept in an error message.
const ERROR_BODY_CHARS: usize = 300;

pub(crate) fn build_client(
    service: &'static str,
    settings: &HttpSettings,
) -> Result<reqwest::Client, ServiceError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
        .user_agent(settings.user_agent.clone())
        .build()
        .map_err(|err| ServiceError::Network {
            service,
            message: err.to_string(),
        })
}

pub(crate) fn map_reqwest_error(service: &'static str, err: reqwest::Error) -> ServiceError {
    if err.is_timeout() {
        return ServiceError::Timeout { service };
    }
    if err.is_decode() {
        return ServiceError::Decode {
            service,
            message: err.to_string(),
        };
    }
    ServiceError::Network {
        service,
        message: err.to_string(),
    }
}

/// Passes successful responses through; turns the rest into errors,
/// with 401/403 reported as rejected credentials.
pub(crate) async fn check_status(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, &body);
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ServiceError::Unauthorized { service, message });
    }
    Err(ServiceError::HttpStatus {
        service,
        status: status.as_u16(),
        message,
    })
}

/// Best human-readable message from an error body: a JSON `message`,
/// `detail`, `error.message`, or `error` field, else the raw text.
fn error_message(status: StatusCode, body: &str) -> String {
    let from_json = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        json.get("detail")
            .or_else(|| json.get("message"))
            .or_else(|| json.pointer("/error/message"))
            .or_else(|| json.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    let text = from_json.unwrap_or_else(|| body.trim().chars().take(ERROR_BODY_CHARS).collect());
    if text.is_empty() {
        status.to_string()
    } else {
        text
    }
}

pub(crate) fn content_type(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

/// Reads the whole body, failing once it grows past `max_bytes`.
pub(crate) async fn read_limited(
    service: &'static str,
    response: reqwest::Response,
    max_bytes: u64,
) -> Result<Vec<u8>, ServiceError> {
    if response.content_length().is_some_and(|len| len > max_bytes) {
        return Err(ServiceError::TooLarge { service, max_bytes });
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| map_reqwest_error(service, err))?;
        if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
            return Err(ServiceError::TooLarge { service, max_bytes });
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
