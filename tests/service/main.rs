//! Service orchestrator integration tests
//!
//! End-to-end runs of the create/update/batch pipelines over the in-memory
//! table, with a manual clock and keys starting at 7.

#[path = "../common/mod.rs"]
mod common;

mod batch;
mod resolution;
mod scenarios;
mod soft_delete;
mod wire;
