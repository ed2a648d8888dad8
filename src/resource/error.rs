// Resource Errors
// Configuration errors raised synchronously by the resource manager

/// Errors returned when the manager is called with a malformed request.
///
/// Load and dispose failures never show up here: those are reported to the
/// [`ResourceLogger`](super::logger::ResourceLogger) and recovered locally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("Resource type {0} is already registered")]
    DuplicateType(String),

    #[error("Unknown resource type {0}, make sure to register it first")]
    UnknownType(String),
}

pub type Result<T> = std::result::Result<T, ResourceError>;
