//! Core types and traits for recordkit
//!
//! This crate defines the foundational types shared by every layer:
//! - AuditFields: version lock, soft-delete flag and audit timestamps
//! - Identifiable / VersionedRecord: the persisted record contract
//! - Lifecycle: pre-create and pre-update hooks over audit fields
//! - Clock: injectable UTC time source
//! - TransferMetadata: wire-facing copy of the audit fields
//! - ResolutionMap: type-checked bag of auxiliary records used during assembly
//! - Error: the PersistError taxonomy and ErrorReport
//! - Traits: storage and transaction collaborator contracts

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod contract;
pub mod error;
pub mod lifecycle;
pub mod report;
pub mod resolution;
pub mod traits;
pub mod transfer;

pub use contract::{
    ActorId, AuditFields, Clock, Identifiable, ManualClock, SystemClock, VersionedRecord,
    INITIAL_VERSION, SYSTEM_ACTOR,
};
pub use error::{ErrorKind, PersistError, Result};
pub use report::ErrorReport;
pub use resolution::{BatchResolution, ResolutionError, ResolutionMap};
pub use traits::{Repository, TransactionManager};
pub use transfer::{apply_metadata, metadata_from, TransferMetadata, TransferObject};
