//! Output sink port for the resolved manifest.

/// Receives the serialized resolved manifest at the end of a run.
pub trait OutputSink: Send + Sync {
    /// Publishes the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be written.
    fn publish(&self, document: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
