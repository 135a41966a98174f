#[derive(Debug, thiserror::Error)]
pub enum ReporterError {
    /// The `1..N` plan line may appear only once per run.
    #[error("TAP plan line can only be written once per run")]
    PlanAlreadyWritten,
    #[error("Failed to write reporter output")]
    Io(#[from] std::io::Error),
}
