//! Service context bundling all port trait objects.

use std::path::Path;

use crate::adapters::live::filesystem::LiveFileSystem;
use crate::adapters::live::renderer::ErbRenderer;
use crate::adapters::live::sink::{FileSink, StdoutSink};
use crate::ports::filesystem::FileSystem;
use crate::ports::renderer::TemplateRenderer;
use crate::ports::sink::OutputSink;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Tests build the
/// context directly with in-memory implementations.
pub struct ServiceContext {
    /// Filesystem supplying manifest, job spec and template bytes.
    pub fs: Box<dyn FileSystem>,
    /// Renderer for process spec templates.
    pub renderer: Box<dyn TemplateRenderer>,
    /// Destination of the resolved manifest.
    pub sink: Box<dyn OutputSink>,
}

impl ServiceContext {
    /// Creates a live context reading from disk with the built-in renderer.
    ///
    /// The resolved manifest goes to `output` when given, otherwise to
    /// standard output.
    #[must_use]
    pub fn live(output: Option<&Path>) -> Self {
        let sink: Box<dyn OutputSink> = match output {
            Some(path) => Box::new(FileSink::new(path)),
            None => Box::new(StdoutSink),
        };
        Self { fs: Box::new(LiveFileSystem), renderer: Box::new(ErbRenderer), sink }
    }
}
