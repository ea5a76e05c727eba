#[cfg(feature = "logger")]
/// This module provides a logger item writer, useful for debugging purposes.
pub mod logger;

/// This module provides a newline-delimited text item writer.
pub mod text;
