//! Data model for pixelbot: geometry primitives, task definitions, the
//! validated task registry, and runtime options.
//!
//! Everything in this crate is immutable after construction. Task graphs are
//! validated once when the registry is built and are safe to share by
//! reference across the engine for the lifetime of a run.

#![deny(clippy::all)]

pub mod error;
pub mod geometry;
pub mod options;
pub mod registry;
pub mod task;

pub use error::ConfigError;
pub use error::UnknownTask;
pub use geometry::Point;
pub use geometry::Rect;
pub use options::RuntimeOptions;
pub use registry::STOP_TASK;
pub use registry::TaskRegistry;
pub use task::ClickStyle;
pub use task::MatchAlgorithm;
pub use task::TaskDefinition;
pub use task::TaskKind;
