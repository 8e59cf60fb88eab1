//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the gather engine and something
//! it does not own: the filesystem that supplies manifest, spec and template
//! bytes, the template engine, and the destination of the resolved manifest.
//! Implementations live in `src/adapters/`.

pub mod filesystem;
pub mod renderer;
pub mod sink;

pub use filesystem::FileSystem;
pub use renderer::{InstanceInfo, RenderRequest, TemplateRenderer};
pub use sink::OutputSink;
