use thiserror::Error;

/// Errors raised while reading class descriptors into models.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("invalid type `{input}`: {message}")]
    TypeSyntax { input: String, message: String },

    #[error("class `{0}` is described more than once")]
    DuplicateClass(String),

    #[error("malformed descriptor: {0}")]
    Format(String),
}
