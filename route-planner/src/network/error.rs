//! Network and traffic error types.

/// Errors from a road network backend.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    /// The backing service could not be reached
    #[error("road network unavailable: {0}")]
    Unavailable(String),

    /// Reading a graph file failed
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    /// Graph data could not be parsed
    #[error("failed to parse road network: {0}")]
    Parse(String),

    /// Graph data is internally inconsistent
    #[error("invalid road network: {0}")]
    InvalidData(String),
}

/// Errors from a traffic provider.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrafficError {
    /// The traffic feed could not be reached
    #[error("traffic feed unavailable: {0}")]
    Unavailable(String),

    /// Reading a snapshot file failed
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    /// Snapshot data could not be parsed
    #[error("failed to parse traffic snapshot: {0}")]
    Parse(String),
}
