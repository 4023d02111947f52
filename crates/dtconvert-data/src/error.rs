//! Codec errors.

use dtconvert_core::ConvertError;

/// A codec rejected its input. No partial table is ever returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("CSV header row is empty")]
    EmptyHeader,

    #[error("{format} parse error at line {line}: {message}")]
    Syntax {
        format: &'static str,
        line: usize,
        message: String,
    },

    #[error("invalid SQL identifier: {0}")]
    InvalidIdentifier(String),

    #[error("line {line}: INSERT column list differs from the first INSERT (mixed column sets are not supported)")]
    MixedColumns { line: usize },

    #[error("no INSERT statements found")]
    NoInserts,
}

impl CodecError {
    pub(crate) fn syntax(format: &'static str, line: usize, message: impl Into<String>) -> Self {
        CodecError::Syntax {
            format,
            line,
            message: message.into(),
        }
    }
}

impl From<CodecError> for ConvertError {
    fn from(err: CodecError) -> Self {
        ConvertError::InvalidInput(err.to_string())
    }
}
