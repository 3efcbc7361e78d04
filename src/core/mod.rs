// Public modules
pub mod command;
pub mod db;
pub mod environment;
pub mod error;
pub mod pipeline;
pub mod session;
pub mod ssh;
pub mod tasks;
pub mod transport;

// Internal modules - not part of public API
pub(crate) mod paths;

#[cfg(test)]
pub(crate) mod test_support;

// Public modules for CLI access
pub mod defaults;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
