use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the groupware client.
#[derive(Debug, Error)]
pub enum Error {
    /// The backend answered with a non-success status.
    #[error("{}", .detail.as_deref().unwrap_or("server returned an error"))]
    Server { status: u16, detail: Option<String> },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("session storage: {0}")]
    Storage(#[from] std::io::Error),
}

impl Error {
    /// The human-readable `detail` the server attached to its error
    /// response, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Error::Server { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Build a server error from a raw response body. FastAPI puts a string
    /// under `detail` for handled errors and a list for validation errors;
    /// only the string form is shown to users.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        let detail = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string));
        Error::Server { status, detail }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_from_fastapi_body() {
        let err = Error::from_response_body(400, r#"{"detail":"Only draft can be submitted"}"#);
        assert_eq!(err.detail(), Some("Only draft can be submitted"));
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "Only draft can be submitted");
    }

    #[test]
    fn test_validation_detail_is_not_shown() {
        let err = Error::from_response_body(422, r#"{"detail":[{"loc":["body"],"msg":"x"}]}"#);
        assert_eq!(err.detail(), None);
        assert_eq!(err.to_string(), "server returned an error");
    }

    #[test]
    fn test_non_json_body() {
        let err = Error::from_response_body(502, "Bad Gateway");
        assert_eq!(err.detail(), None);
        assert_eq!(err.status(), Some(502));
    }
}
