//! Assembler contracts
//!
//! An assembler converts between a persisted record and its transfer object.
//! `build_record` may need auxiliary records (a parent, a lookup row) that the
//! service resolves up front and hands over in a [`ResolutionMap`];
//! `build_dto` is pure and total.
//!
//! Assemblers are usually stateless unit structs, one per entity type. The
//! audit block is moved with [`apply_metadata`](recordkit_core::apply_metadata)
//! and [`metadata_from`](recordkit_core::metadata_from).

use crate::projection::Projection;
use recordkit_core::lifecycle;
use recordkit_core::{ResolutionMap, Result, TransferObject, VersionedRecord};

/// Record ⇄ transfer-object conversion for one entity type
pub trait Assembler: Send + Sync {
    /// Persisted record type
    type Record: VersionedRecord;

    /// Transfer object type
    type Dto: TransferObject;

    /// Build a record from a transfer object and its resolved dependencies
    ///
    /// # Errors
    ///
    /// - [`PersistError::Resolution`](recordkit_core::PersistError::Resolution)
    ///   when a dependency is missing from `deps` or has the wrong type
    /// - [`PersistError::Assembly`](recordkit_core::PersistError::Assembly)
    ///   for any other construction fault
    fn build_record(&self, dto: &Self::Dto, deps: &ResolutionMap) -> Result<Self::Record>;

    /// Build the transfer object of a record
    fn build_dto(&self, record: &Self::Record) -> Self::Dto;

    /// Carry the server-owned audit fields of `previous` over to `incoming`
    ///
    /// Overwrites `active`, `created_at` and `modified_at`. Override to carry
    /// more fields the client must not change.
    fn copy_common_fields(&self, previous: &Self::Record, incoming: &mut Self::Record) {
        lifecycle::copy_common_fields(previous.audit(), incoming.audit_mut());
    }

    /// [`build_dto`](Assembler::build_dto) for each record, in order
    fn build_dtos(&self, records: &[Self::Record]) -> Vec<Self::Dto> {
        records.iter().map(|record| self.build_dto(record)).collect()
    }
}

/// Assembler that also produces a truncated projection of the transfer object
pub trait MinifiedAssembler: Assembler {
    /// Minified shape
    type Minified: Projection<Self::Dto>;

    /// Project a transfer object
    ///
    /// # Errors
    ///
    /// [`PersistError::Projection`](recordkit_core::PersistError::Projection)
    /// when the projection fails.
    fn build_projection(&self, dto: &Self::Dto) -> Result<Self::Minified> {
        <Self::Minified as Projection<Self::Dto>>::project(dto)
    }

    /// Project the transfer object of a record
    ///
    /// # Errors
    ///
    /// Same as [`build_projection`](MinifiedAssembler::build_projection).
    fn build_projection_from_record(&self, record: &Self::Record) -> Result<Self::Minified> {
        self.build_projection(&self.build_dto(record))
    }

    /// [`build_projection_from_record`](MinifiedAssembler::build_projection_from_record)
    /// for each record, stopping at the first failure
    ///
    /// # Errors
    ///
    /// The first projection error.
    fn build_projections(&self, records: &[Self::Record]) -> Result<Vec<Self::Minified>> {
        records
            .iter()
            .map(|record| self.build_projection_from_record(record))
            .collect()
    }
}
