use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenizeError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("cannot tokenize {0}")]
    Unsupported(String),
    #[error("malformed token list: {0}")]
    Wire(String),
}

impl From<serde_json::Error> for TokenizeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Wire(err.to_string())
    }
}
