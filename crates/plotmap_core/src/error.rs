/// A required input slot is empty; raised before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please upload both a plot file and a sample file (plot file missing).")]
    MissingPlotFiles,
    #[error("Please upload both a plot file and a sample file (sample file missing).")]
    MissingSampleFile,
}

/// Failures surfaced to the user as transient notifications.
///
/// Each is terminal to the operation that raised it and leaves the last
/// good result in place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No response reached the client.
    #[error("{0}")]
    Transport(String),
    /// The service answered with an error payload or an unusable body.
    #[error("{0}")]
    Service(String),
    /// Overlay bytes could not be retrieved or materialized.
    #[error("failed to load overlay: {0}")]
    ResourceFetch(String),
    #[error("download failed: {0}")]
    Download(String),
}
