//! Error types for manifest gathering.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for gather operations.
pub type Result<T> = std::result::Result<T, GatherError>;

/// Errors that abort a gather run.
///
/// None of these are retried; the first one encountered is returned and no
/// resolved manifest is published.
#[derive(Debug, Error)]
pub enum GatherError {
    /// A manifest, job spec or template could not be read.
    #[error("failed to read {}: {message}", .path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },

    /// A document did not parse or did not match its schema.
    #[error("failed to parse {what}: {message}")]
    Parse {
        /// Which document failed.
        what: String,
        /// Underlying error message.
        message: String,
    },

    /// Two jobs provide a link with the same type and name.
    #[error("multiple providers for link: name={name} type={link_type}")]
    DuplicateProvider {
        /// Externally visible link name.
        name: String,
        /// Link type.
        link_type: String,
    },

    /// The manifest leaves out a mandatory consumer in a job's `consumes` block.
    #[error("mandatory link of consumer {consumer} in job {job} is explicitly set to nil")]
    MandatoryLinkNulled {
        /// Consuming job.
        job: String,
        /// Declared consumer name.
        consumer: String,
    },

    /// No provider matches a mandatory consumer.
    #[error(
        "cannot resolve non-optional link for consumer {consumer} in job {job}: \
         no provider name={lookup} type={link_type}"
    )]
    UnresolvedLink {
        /// Consuming job.
        job: String,
        /// Declared consumer name.
        consumer: String,
        /// Provider name that was looked up.
        lookup: String,
        /// Link type.
        link_type: String,
    },

    /// An override value has the wrong shape.
    #[error("unexpected type detected for {context}: {found}, should have been a {expected}")]
    TypeMismatch {
        /// Where the value was found.
        context: String,
        /// Actual shape of the value.
        found: &'static str,
        /// Shape that was required.
        expected: &'static str,
    },

    /// The job has no process spec template.
    #[error("template not found: {}", .path.display())]
    TemplateNotFound {
        /// Expected template location.
        path: PathBuf,
    },

    /// Rendering or parsing a process spec failed.
    #[error("failed to render process spec for instance {instance}: {message}")]
    Render {
        /// Instance id being rendered.
        instance: String,
        /// Underlying error message.
        message: String,
    },

    /// The resolved manifest could not be serialized or published.
    #[error("failed to publish resolved manifest: {message}")]
    Output {
        /// Underlying error message.
        message: String,
    },
}
