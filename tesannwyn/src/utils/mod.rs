//! Shared utilities for the tesannwyn CLI

pub mod progress;
pub mod table;

pub use progress::*;
pub use table::*;
