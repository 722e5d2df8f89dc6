//! Utility functions for pipelint.

mod file_discovery;

pub use file_discovery::FileDiscovery;
