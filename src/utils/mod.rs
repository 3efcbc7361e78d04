//! Generic utility primitives with zero domain knowledge.
//!
//! - `base_path` - Remote path joining utilities
//! - `shell` - Shell escaping and quoting
//! - `template` - String template rendering
//! - `validation` - Input validation helpers

pub mod base_path;
pub mod shell;
pub(crate) mod template;
pub mod validation;
