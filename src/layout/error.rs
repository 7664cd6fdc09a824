use thiserror::Error;

/// Caller contract violations detected before layering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("edge {from} -> {to} references unknown node `{missing}`")]
    UnknownEndpoint {
        from: String,
        to: String,
        missing: String,
    },
    #[error("node `{0}` appears more than once in the layering input")]
    DuplicateNode(String),
}
