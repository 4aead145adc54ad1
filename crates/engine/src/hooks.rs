//! Service hooks
//!
//! Per-entity customization points of the orchestration pipeline. Validation
//! runs over the whole batch before any transaction is opened; dependency
//! resolution runs inside the transaction and may read through the same
//! repository the writes will go to.

use recordkit_core::{
    BatchResolution, PersistError, Repository, Result, TransferObject, VersionedRecord,
};

/// Validation and dependency resolution for one entity type
///
/// Every method has a default, so `impl ServiceHooks<Dto, Record> for MyHooks {}`
/// is a complete implementation.
pub trait ServiceHooks<D: TransferObject, R: VersionedRecord>: Send + Sync {
    /// Check a batch about to be created
    ///
    /// Defaults to [`require_absent_ids`].
    ///
    /// # Errors
    ///
    /// [`PersistError::Validation`] listing every violation in the batch.
    fn validate_create(&self, entity: &str, dtos: &[D]) -> Result<()> {
        require_absent_ids(entity, dtos)
    }

    /// Check a batch about to be updated
    ///
    /// Defaults to [`require_present_ids`].
    ///
    /// # Errors
    ///
    /// [`PersistError::Validation`] listing every violation in the batch.
    fn validate_update(&self, entity: &str, dtos: &[D]) -> Result<()> {
        require_present_ids(entity, dtos)
    }

    /// Resolve the auxiliary records each item needs for assembly
    ///
    /// Return one map per batch position. `None` means the entity has no
    /// dependencies; items without a map get an empty one.
    ///
    /// # Errors
    ///
    /// Any error aborts the enclosing transaction.
    fn resolve_dependencies(
        &self,
        repository: &mut dyn Repository<R>,
        dtos: &[D],
    ) -> Result<Option<BatchResolution>> {
        let _ = (repository, dtos);
        Ok(None)
    }
}

/// Hooks with every default
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultHooks;

impl<D: TransferObject, R: VersionedRecord> ServiceHooks<D, R> for DefaultHooks {}

/// Every item must come without an identifier
///
/// # Errors
///
/// [`PersistError::Validation`] with one violation per offending item.
pub fn require_absent_ids<D: TransferObject>(entity: &str, dtos: &[D]) -> Result<()> {
    check_ids(entity, dtos, |dto| dto.transfer_id().is_none(), "must be null")
}

/// Every item must carry an identifier
///
/// # Errors
///
/// [`PersistError::Validation`] with one violation per offending item.
pub fn require_present_ids<D: TransferObject>(entity: &str, dtos: &[D]) -> Result<()> {
    check_ids(entity, dtos, |dto| dto.transfer_id().is_some(), "must not be null")
}

fn check_ids<D, F>(entity: &str, dtos: &[D], valid: F, rule: &str) -> Result<()>
where
    F: Fn(&D) -> bool,
{
    let violations: Vec<String> = dtos
        .iter()
        .enumerate()
        .filter(|(_, dto)| !valid(*dto))
        .map(|(index, _)| {
            format!(
                "item {}: the identifier of the {} entity {}",
                index, entity, rule
            )
        })
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(PersistError::validation(entity, violations))
    }
}
