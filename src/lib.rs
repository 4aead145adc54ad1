//! recordkit - versioned-record persistence orchestration
//!
//! recordkit turns transfer objects into persisted records and back, under
//! optimistic concurrency control:
//!
//! 1. validate the incoming batch
//! 2. resolve the auxiliary records each item needs
//! 3. assemble records, apply the lifecycle hooks
//! 4. write them in one transaction, version-checked
//! 5. answer with full or minified transfer objects
//!
//! # Quick Start
//!
//! ```ignore
//! use recordkit::prelude::*;
//! use recordkit::{DefaultHooks, EntityService, SequentialKeys, ServiceConfig, VersionedTable};
//! use std::sync::Arc;
//!
//! let table = Arc::new(VersionedTable::new(SequentialKeys::new()));
//! let widgets = EntityService::in_memory(
//!     WidgetAssembler,
//!     DefaultHooks,
//!     table,
//!     &ServiceConfig::with_descriptor("Widget"),
//! );
//!
//! let created = widgets.save(&dto)?;
//! let reread = widgets.find_by_id(&created.id.unwrap())?;
//! ```
//!
//! # Architecture
//!
//! - `recordkit-core`: record contract, lifecycle hooks, resolution map, errors
//! - `recordkit-storage`: in-memory version-checked table
//! - `recordkit-concurrency`: OCC transactions over the table
//! - `recordkit-engine`: assemblers, projections and the service orchestrator

pub use recordkit_core::lifecycle;
pub use recordkit_core::{
    apply_metadata, metadata_from, ActorId, AuditFields, BatchResolution, Clock, ErrorKind,
    ErrorReport, Identifiable, ManualClock, PersistError, Repository, ResolutionError,
    ResolutionMap, Result, SystemClock, TransactionManager, TransferMetadata, TransferObject,
    VersionedRecord, INITIAL_VERSION, SYSTEM_ACTOR,
};

pub use recordkit_storage::{
    DeletePolicy, KeyGenerator, SequentialKeys, StoreConfig, UuidKeys, VersionedTable,
};

pub use recordkit_concurrency::{
    TableTransactionManager, TransactionContext, TransactionStats, TransactionStatus,
};

pub use recordkit_engine::{
    project_all, project_fields, require_absent_ids, require_present_ids, Assembler,
    CrudService, DefaultHooks, EntityService, MinifiedAssembler, MinifiedCrudService, Projection,
    RecordKey, RecordkitConfig, ServiceConfig, ServiceHooks, CONFIG_FILE_NAME,
};

/// Traits needed to implement and call an entity service
pub mod prelude {
    pub use crate::{
        Assembler, CrudService, Identifiable, MinifiedAssembler, MinifiedCrudService, Projection,
        Repository, ServiceHooks, TransactionManager, TransferObject, VersionedRecord,
    };
}
