use thiserror::Error;

/// A field body that did not match the grammar of its kind.
///
/// Produced by the structured collaborators. The dispatcher never lets one
/// escape a textual construction: it is recorded on the fallback field instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{element}: {value:?}: {reason}")]
pub struct ParseError {
    pub element: String,
    pub value: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(
        element: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            element: element.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// A pre-built structured value that is not acceptable as given.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {element}: {reason}")]
pub struct SyntaxError {
    pub element: String,
    pub reason: String,
}

impl SyntaxError {
    pub fn new(element: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("Continuation line at beginning of header")]
    ContinuationAtBeginning,
    #[error("Malformed header line: {0}")]
    MalformedHeader(String),
}
