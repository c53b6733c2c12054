pub type CaptionResult<T> = Result<T, CaptionError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptionError {
    #[error("invalid layout input: {0}")]
    InvalidLayoutInput(String),
}

impl CaptionError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidLayoutInput(msg.into())
    }
}
