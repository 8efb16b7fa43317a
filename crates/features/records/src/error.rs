use scholar_storage::StorageError;
use std::borrow::Cow;

/// Error types of the records feature.
#[scholar_derive::scholar_error]
pub enum RecordsError {
    /// A request was rejected before any state changed.
    #[error("Validation failed{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// An entity could not be encoded, e.g. no codec rule is registered for its tag.
    #[error("Serialization failed{}: {message}", format_context(.context))]
    Serialization { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Malformed JSON or a known entity with missing or mistyped fields.
    #[error("Malformed records data{}: {source}", format_context(.context))]
    Decode { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Storage error{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    #[error("Internal records error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl RecordsError {
    pub(crate) fn invalid(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }
}
