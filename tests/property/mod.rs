//! Property-based tests for diff and snapshot guarantees

mod determinism;
mod snapshots;
mod strategies;
