use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{0}")]
    Transport(String),
    #[error("HTTP error! status: {0}")]
    Status(u16),
    #[error("{0}")]
    Parse(#[from] serde_json::Error),
}

impl FetchError {
    pub fn display_text(&self) -> String {
        format!("Error: {self}")
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_renders_status_code() {
        assert_eq!(
            FetchError::Status(503).display_text(),
            "Error: HTTP error! status: 503"
        );
    }

    #[test]
    fn transport_error_renders_transport_text_verbatim() {
        assert_eq!(
            FetchError::Transport("Failed to fetch".into()).display_text(),
            "Error: Failed to fetch"
        );
    }
}
