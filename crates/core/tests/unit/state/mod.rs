//! Extension-state store tests.

/// Concurrent store access from several decoding threads.
pub mod concurrency;

/// Blob encoding and restore.
pub mod persistence;

/// Carrying overrides forward instruction by instruction.
pub mod propagation;

/// Point setters, queries and range overrides.
pub mod store;
