//! Assistant dispatch cycle orchestration.

pub mod coordinator;

pub use coordinator::{Assistant, CycleOutcome};
