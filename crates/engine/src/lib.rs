//! Orchestration engine for recordkit
//!
//! This crate ties the lower layers together:
//! - Assembler / MinifiedAssembler: record ⇄ transfer-object contracts
//! - Projection and `project_fields!`: explicit minified projections
//! - ServiceHooks: batch validation and dependency resolution
//! - EntityService: transactional create/update/batch pipeline with OCC
//! - CrudService / MinifiedCrudService: the caller-facing operations
//! - RecordkitConfig: `recordkit.toml` loading

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assembler;
pub mod config;
pub mod hooks;
pub mod projection;
pub mod service;

pub use assembler::{Assembler, MinifiedAssembler};
pub use config::{RecordkitConfig, ServiceConfig, CONFIG_FILE_NAME};
pub use hooks::{require_absent_ids, require_present_ids, DefaultHooks, ServiceHooks};
pub use projection::{project_all, Projection};
pub use service::{CrudService, EntityService, MinifiedCrudService, RecordKey};

// Used by `project_fields!` expansions
pub use recordkit_core::{PersistError, Result};
