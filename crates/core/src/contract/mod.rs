//! Contract types for persisted records
//!
//! Every record handled by recordkit expresses the same contract:
//!
//! 1. **Addressable**: a record has a key once it has been persisted
//! 2. **Versioned**: every successful write produces a strictly larger version
//! 3. **Audited**: creation and modification instants plus the last actor
//! 4. **Soft-deletable**: records carry an `active` flag instead of vanishing
//!
//! ## Module Structure
//!
//! - `audit`: the audit block embedded in every record
//! - `record`: `Identifiable` and `VersionedRecord` traits
//! - `clock`: UTC time source used by the lifecycle hooks

pub mod audit;
pub mod clock;
pub mod record;

// Re-exports
pub use audit::{ActorId, AuditFields, INITIAL_VERSION, SYSTEM_ACTOR};
pub use clock::{Clock, ManualClock, SystemClock};
pub use record::{Identifiable, VersionedRecord};
