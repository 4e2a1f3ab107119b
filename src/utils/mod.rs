//! Generic utility primitives with zero domain knowledge.
//!
//! - `base_path` - Path resolution for paths that may not exist
//! - `io` - File I/O with consistent error handling
//! - `shell` - Shell escaping and quoting
//! - `template` - Placeholder rendering and pattern expansion
//! - `validation` - Input validation helpers

pub mod base_path;
pub mod io;
pub mod shell;
pub mod template;
pub mod validation;
