//! Structured errors returned by the hosted backend.

use serde_json::Value;

/// PostgREST code for "the singular response contained no rows".
pub const NO_ROWS_CODE: &str = "PGRST116";

/// Errors produced by backend calls.
///
/// The UI branches on these (the "no rows" case is a valid empty result, an
/// expired session sends the user back to sign-in), so they are typed rather
/// than carried as `anyhow` strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// No backend URL or key configured.
    #[error("backend not configured: {0}")]
    NotConfigured(String),

    /// The HTTP request itself failed (DNS, TLS, timeout, connection reset).
    #[error("request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("backend error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The response body did not match the expected shape.
    #[error("response parse failed: {0}")]
    Decode(String),

    /// An operation needing a signed-in user was attempted without one.
    #[error("not signed in")]
    Unauthorized,
}

impl BackendError {
    /// Build an error from a failed response's status and body.
    ///
    /// Understands PostgREST bodies (`code`, `message`, `details`) and GoTrue
    /// bodies (`error_code`/`error`, `msg`/`error_description`). Anything else
    /// keeps the raw body as the message.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: Option<Value> = serde_json::from_str(body).ok();
        let field = |keys: &[&str]| -> Option<String> {
            let value = parsed.as_ref()?;
            keys.iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str))
                .map(str::to_string)
        };

        let code = field(&["code", "error_code", "error"]);
        let message = field(&["message", "msg", "error_description"])
            .or_else(|| {
                let trimmed = body.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| format!("HTTP {status}"));

        BackendError::Api {
            status,
            code,
            message,
        }
    }

    /// Whether this is the expected "no rows" outcome of a single-row select.
    pub fn is_no_rows(&self) -> bool {
        matches!(self, BackendError::Api { code: Some(code), .. } if code == NO_ROWS_CODE)
    }

    /// Whether the backend rejected our credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            BackendError::Unauthorized | BackendError::Api { status: 401, .. }
        )
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Request(err.to_string())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        BackendError::Decode(err.to_string())
    }
}
