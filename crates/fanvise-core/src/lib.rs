// Shared data model, slot vocabulary, and configuration for the streaming
// advisor. Every type here is plain data; nothing performs I/O except config
// loading.

pub mod config;
pub mod moves;
pub mod player;
pub mod schedule;
pub mod slot;
pub mod snapshot;
pub mod window;
