use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

/// Error envelope returned by the partner API on non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default)]
    pub retry_after_seconds: Option<Value>,
}

impl ApiErrorBody {
    /// `message` wins over `error`; empty or falsy values are skipped.
    pub fn reason(&self) -> Option<String> {
        self.message
            .as_ref()
            .and_then(display_value)
            .or_else(|| self.error.as_ref().and_then(display_value))
    }

    pub fn retry_after(&self) -> Option<String> {
        self.retry_after_seconds.as_ref().and_then(display_value)
    }
}

/// Render the human-readable message for a failed partner API call.
///
/// Falls back to the raw body when it is not JSON (or is JSON `null`, which has no fields
/// to read), and to a generic status line when the body carries nothing usable.
pub fn describe_status_failure(status: StatusCode, body: &str) -> String {
    let fallback = format!("API request failed with status {}", status.as_u16());

    let parsed = match serde_json::from_str::<Value>(body) {
        Ok(Value::Null) => return body.to_string(),
        Ok(value) => value,
        Err(_) => {
            return if body.is_empty() {
                fallback
            } else {
                body.to_string()
            };
        }
    };

    let envelope = match parsed {
        Value::Object(_) => serde_json::from_value::<ApiErrorBody>(parsed).unwrap_or_default(),
        _ => ApiErrorBody::default(),
    };

    let message = envelope.reason().unwrap_or(fallback);

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = envelope
            .retry_after()
            .unwrap_or_else(|| "unknown".to_string());
        return format!("Rate limit exceeded. {message}. Retry after {retry_after} seconds.");
    }

    message
}

fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_message_over_error_field() {
        let text = describe_status_failure(
            StatusCode::BAD_REQUEST,
            r#"{"message":"bad identifier","error":"ignored"}"#,
        );
        assert_eq!(text, "bad identifier");

        let text = describe_status_failure(StatusCode::FORBIDDEN, r#"{"error":"invalid token"}"#);
        assert_eq!(text, "invalid token");
    }

    #[test]
    fn empty_fields_fall_back_to_status_line() {
        let text = describe_status_failure(StatusCode::BAD_GATEWAY, r#"{"message":""}"#);
        assert_eq!(text, "API request failed with status 502");

        let text = describe_status_failure(StatusCode::BAD_GATEWAY, "");
        assert_eq!(text, "API request failed with status 502");
    }

    #[test]
    fn non_json_body_is_returned_verbatim() {
        let text = describe_status_failure(StatusCode::INTERNAL_SERVER_ERROR, "oops");
        assert_eq!(text, "oops");
    }

    #[test]
    fn null_body_is_returned_verbatim() {
        let text = describe_status_failure(StatusCode::BAD_REQUEST, "null");
        assert_eq!(text, "null");

        let text = describe_status_failure(StatusCode::TOO_MANY_REQUESTS, "null");
        assert_eq!(text, "null");
    }

    #[test]
    fn rate_limit_includes_retry_hint() {
        let text = describe_status_failure(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"message":"slow down","retry_after_seconds":30}"#,
        );
        assert_eq!(
            text,
            "Rate limit exceeded. slow down. Retry after 30 seconds."
        );
    }

    #[test]
    fn rate_limit_without_retry_hint_says_unknown() {
        let text = describe_status_failure(StatusCode::TOO_MANY_REQUESTS, "{}");
        assert_eq!(
            text,
            "Rate limit exceeded. API request failed with status 429. Retry after unknown seconds."
        );
    }
}
