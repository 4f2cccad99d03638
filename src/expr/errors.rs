use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    #[error("version expression can't be empty")]
    Empty,

    #[error("malformed version term '{input}': {message}")]
    MalformedTerm { input: String, message: String },
}

impl ExpressionError {
    pub(crate) fn malformed(input: &str, message: impl Into<String>) -> Self {
        ExpressionError::MalformedTerm {
            input: input.to_string(),
            message: message.into(),
        }
    }
}
