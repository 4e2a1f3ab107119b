pub mod artifact;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod invocation;
pub mod location;
pub mod map_name;
pub mod reference;
pub mod selection;

// Re-export common types for convenience
pub use artifact::{Artifact, ArtifactKind};
pub use cleanup::{reconcile, CleanupReport, OutputPaths};
pub use config::LocationConfig;
pub use error::{Error, ErrorCode, Result};
pub use invocation::{Fragment, Invocation, KwargValue, ShellArg};
pub use location::GrassLocation;
pub use map_name::{input_to_map, output_to_map, path_to_map, MapNameExpr, PlaceholderIndex};
pub use reference::MapRef;
pub use selection::{Resolved, Selection};
