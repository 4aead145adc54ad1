//! Service orchestrator
//!
//! `EntityService` runs the create and update pipelines for one entity type:
//!
//! ```text
//! create: validate ─▶ execute { resolve ─▶ assemble ─▶ prepare_create ─▶ save
//!                               ─▶ respond } ─▶ commit
//! update: validate ─▶ execute { resolve ─▶ assemble ─▶ load previous
//!                               ─▶ copy_common_fields ─▶ prepare_update
//!                               ─▶ save_and_flush ─▶ respond } ─▶ commit
//! ```
//!
//! # Design Notes
//!
//! - **Validation outside the transaction**: a rejected batch never opens one
//! - **One transaction per call**: batch operations are all or nothing
//! - **Responses are built before commit**: a commit conflict discards them
//!   together with the writes
//! - **No retries**: conflicts reach the caller unchanged, relabelled with the
//!   service descriptor

use std::fmt;
use std::sync::Arc;

use recordkit_concurrency::TableTransactionManager;
use recordkit_core::lifecycle::{prepare_create, prepare_update};
use recordkit_core::{
    Clock, Identifiable, PersistError, Repository, Result, SystemClock, TransactionManager,
    VersionedRecord,
};
use recordkit_storage::{KeyGenerator, VersionedTable};
use tracing::{debug, warn};

use crate::assembler::{Assembler, MinifiedAssembler};
use crate::config::{RecordkitConfig, ServiceConfig};
use crate::hooks::ServiceHooks;

/// Key type of the records an assembler builds
pub type RecordKey<A> = <<A as Assembler>::Record as Identifiable>::Key;

/// Caller-facing operations on full transfer objects
pub trait CrudService<D, K> {
    /// Every stored record, in key order
    ///
    /// # Errors
    ///
    /// Storage or transaction errors.
    fn find_all(&self) -> Result<Vec<D>>;

    /// The record stored under `id`
    ///
    /// # Errors
    ///
    /// [`PersistError::NotFound`] when nothing is stored under `id`.
    fn find_by_id(&self, id: &K) -> Result<D>;

    /// Create one record
    ///
    /// # Errors
    ///
    /// Validation, resolution, assembly or storage errors. Nothing is written
    /// on failure.
    fn save(&self, dto: &D) -> Result<D>;

    /// Update one record
    ///
    /// # Errors
    ///
    /// As [`save`](CrudService::save), plus [`PersistError::NotFound`] and
    /// [`PersistError::ConcurrencyConflict`].
    fn update(&self, dto: &D) -> Result<D>;

    /// Create a batch of records atomically
    ///
    /// # Errors
    ///
    /// As [`save`](CrudService::save); one failing item fails the batch.
    fn save_all(&self, dtos: &[D]) -> Result<Vec<D>>;

    /// Update a batch of records atomically
    ///
    /// # Errors
    ///
    /// As [`update`](CrudService::update); one failing item fails the batch.
    fn update_all(&self, dtos: &[D]) -> Result<Vec<D>>;

    /// Delete the record under `id`; a missing key is ignored
    ///
    /// # Errors
    ///
    /// Storage or transaction errors.
    fn delete_by_id(&self, id: &K) -> Result<()>;

    /// Delete every listed record in one transaction
    ///
    /// # Errors
    ///
    /// Storage or transaction errors.
    fn delete_by_ids(&self, ids: &[K]) -> Result<()>;
}

/// Caller-facing operations answering with minified projections
pub trait MinifiedCrudService<D, K, M> {
    /// Every stored record, projected
    ///
    /// # Errors
    ///
    /// Storage errors or the first projection error.
    fn find_all_minified(&self) -> Result<Vec<M>>;

    /// The record stored under `id`, projected
    ///
    /// # Errors
    ///
    /// [`PersistError::NotFound`] when nothing is stored under `id`.
    fn find_by_id_minified(&self, id: &K) -> Result<M>;

    /// [`CrudService::save`] answering with a projection
    ///
    /// # Errors
    ///
    /// As [`CrudService::save`], plus [`PersistError::Projection`].
    fn save_minified(&self, dto: &D) -> Result<M>;

    /// [`CrudService::update`] answering with a projection
    ///
    /// # Errors
    ///
    /// As [`CrudService::update`], plus [`PersistError::Projection`].
    fn update_minified(&self, dto: &D) -> Result<M>;

    /// [`CrudService::save_all`] answering with projections
    ///
    /// # Errors
    ///
    /// As [`CrudService::save_all`], plus [`PersistError::Projection`].
    fn save_all_minified(&self, dtos: &[D]) -> Result<Vec<M>>;

    /// [`CrudService::update_all`] answering with projections
    ///
    /// # Errors
    ///
    /// As [`CrudService::update_all`], plus [`PersistError::Projection`].
    fn update_all_minified(&self, dtos: &[D]) -> Result<Vec<M>>;
}

/// Orchestrator for one entity type
pub struct EntityService<A, H, T> {
    assembler: A,
    hooks: H,
    transactions: T,
    descriptor: String,
    clock: Arc<dyn Clock>,
}

impl<A, H, T> EntityService<A, H, T>
where
    A: Assembler,
    H: ServiceHooks<A::Dto, A::Record>,
    T: TransactionManager<A::Record>,
{
    /// Service over `transactions`
    ///
    /// Without a configured descriptor the record type name is used and a
    /// warning is logged.
    pub fn new(assembler: A, hooks: H, transactions: T, config: &ServiceConfig) -> Self {
        Self {
            assembler,
            hooks,
            transactions,
            descriptor: resolve_descriptor::<A::Record>(config),
            clock: Arc::new(SystemClock),
        }
    }

    /// Set the clock used by the lifecycle hooks
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Entity name used in error messages
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// The assembler
    pub fn assembler(&self) -> &A {
        &self.assembler
    }

    /// The hooks
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// The transaction manager
    pub fn transactions(&self) -> &T {
        &self.transactions
    }

    fn relabel(&self, error: PersistError) -> PersistError {
        error.with_entity(&self.descriptor)
    }

    /// Resolve dependencies for the batch and build one record per item
    fn assemble(&self, txn: &mut T::Context, dtos: &[A::Dto]) -> Result<Vec<A::Record>> {
        let mut resolved = self
            .hooks
            .resolve_dependencies(&mut *txn, dtos)?
            .unwrap_or_default();

        dtos.iter()
            .enumerate()
            .map(|(index, dto)| self.assembler.build_record(dto, &resolved.take(index)))
            .collect()
    }

    fn run_create<Out, F>(&self, dtos: &[A::Dto], batch: bool, respond: F) -> Result<Vec<Out>>
    where
        F: Fn(&A, &A::Record) -> Result<Out>,
    {
        let entity = self.descriptor.as_str();
        self.hooks
            .validate_create(entity, dtos)
            .map_err(|e| self.relabel(e))?;

        debug!(target: "recordkit::service", entity, count = dtos.len(), "Creating records");

        self.transactions
            .execute(|txn| {
                let mut records = self.assemble(txn, dtos)?;
                let now = self.clock.now();
                for record in &mut records {
                    if let Some(id) = record.id() {
                        if txn.find_by_id(id)?.is_some() {
                            return Err(PersistError::already_exists(entity, id));
                        }
                    }
                    prepare_create(record.audit_mut(), now);
                }

                let saved = if batch {
                    txn.save_all(records)?
                } else {
                    records
                        .into_iter()
                        .map(|record| txn.save(record))
                        .collect::<Result<Vec<_>>>()?
                };

                saved
                    .iter()
                    .map(|record| respond(&self.assembler, record))
                    .collect()
            })
            .map_err(|e| self.relabel(e))
    }

    fn run_update<Out, F>(&self, dtos: &[A::Dto], batch: bool, respond: F) -> Result<Vec<Out>>
    where
        F: Fn(&A, &A::Record) -> Result<Out>,
    {
        let entity = self.descriptor.as_str();
        self.hooks
            .validate_update(entity, dtos)
            .map_err(|e| self.relabel(e))?;

        debug!(target: "recordkit::service", entity, count = dtos.len(), "Updating records");

        self.transactions
            .execute(|txn| {
                let incoming = self.assemble(txn, dtos)?;
                let now = self.clock.now();
                let mut records = Vec::with_capacity(incoming.len());
                for mut record in incoming {
                    let id = record.id().cloned().ok_or_else(|| {
                        PersistError::assembly_field(
                            entity,
                            "id",
                            "the assembled record has no identifier to update",
                        )
                    })?;
                    let previous = txn
                        .find_by_id(&id)?
                        .ok_or_else(|| PersistError::not_found(entity, &id))?;

                    self.assembler.copy_common_fields(&previous, &mut record);
                    prepare_update(record.audit_mut(), now);
                    records.push(record);
                }

                let saved = if batch {
                    txn.save_all_and_flush(records)?
                } else {
                    records
                        .into_iter()
                        .map(|record| txn.save_and_flush(record))
                        .collect::<Result<Vec<_>>>()?
                };

                saved
                    .iter()
                    .map(|record| respond(&self.assembler, record))
                    .collect()
            })
            .map_err(|e| self.relabel(e))
    }

    fn load(&self, id: &RecordKey<A>) -> Result<A::Record> {
        self.transactions
            .execute(|txn| txn.find_by_id(id))
            .and_then(|found| found.ok_or_else(|| PersistError::not_found(&self.descriptor, id)))
            .map_err(|e| self.relabel(e))
    }

    fn load_all(&self) -> Result<Vec<A::Record>> {
        self.transactions
            .execute(|txn| txn.find_all())
            .map_err(|e| self.relabel(e))
    }

    fn single<Out>(&self, mut results: Vec<Out>) -> Result<Out> {
        results
            .pop()
            .ok_or_else(|| PersistError::assembly(&self.descriptor, "no record was written"))
    }
}

impl<A, H> EntityService<A, H, TableTransactionManager<A::Record>>
where
    A: Assembler,
    H: ServiceHooks<A::Dto, A::Record>,
{
    /// Service over an in-memory table
    pub fn in_memory(
        assembler: A,
        hooks: H,
        table: Arc<VersionedTable<A::Record>>,
        config: &ServiceConfig,
    ) -> Self {
        Self::new(assembler, hooks, TableTransactionManager::new(table), config)
    }

    /// Service over a fresh in-memory table configured from `recordkit.toml`
    pub fn from_config(
        assembler: A,
        hooks: H,
        config: &RecordkitConfig,
        keys: impl KeyGenerator<RecordKey<A>> + 'static,
    ) -> Self {
        let table = Arc::new(VersionedTable::from_config(&config.store, keys));
        Self::in_memory(assembler, hooks, table, &config.service)
    }

    /// The in-memory table
    pub fn table(&self) -> &Arc<VersionedTable<A::Record>> {
        self.transactions.table()
    }
}

impl<A, H, T> CrudService<A::Dto, RecordKey<A>> for EntityService<A, H, T>
where
    A: Assembler,
    H: ServiceHooks<A::Dto, A::Record>,
    T: TransactionManager<A::Record>,
{
    fn find_all(&self) -> Result<Vec<A::Dto>> {
        let records = self.load_all()?;
        Ok(self.assembler.build_dtos(&records))
    }

    fn find_by_id(&self, id: &RecordKey<A>) -> Result<A::Dto> {
        let record = self.load(id)?;
        Ok(self.assembler.build_dto(&record))
    }

    fn save(&self, dto: &A::Dto) -> Result<A::Dto> {
        let saved = self.run_create(std::slice::from_ref(dto), false, |assembler, record| {
            Ok(assembler.build_dto(record))
        })?;
        self.single(saved)
    }

    fn update(&self, dto: &A::Dto) -> Result<A::Dto> {
        let updated = self.run_update(std::slice::from_ref(dto), false, |assembler, record| {
            Ok(assembler.build_dto(record))
        })?;
        self.single(updated)
    }

    fn save_all(&self, dtos: &[A::Dto]) -> Result<Vec<A::Dto>> {
        self.run_create(dtos, true, |assembler, record| Ok(assembler.build_dto(record)))
    }

    fn update_all(&self, dtos: &[A::Dto]) -> Result<Vec<A::Dto>> {
        self.run_update(dtos, true, |assembler, record| Ok(assembler.build_dto(record)))
    }

    fn delete_by_id(&self, id: &RecordKey<A>) -> Result<()> {
        debug!(target: "recordkit::service", entity = %self.descriptor, key = ?id, "Deleting record");
        self.transactions
            .execute(|txn| txn.delete_by_id(id))
            .map_err(|e| self.relabel(e))
    }

    fn delete_by_ids(&self, ids: &[RecordKey<A>]) -> Result<()> {
        debug!(target: "recordkit::service", entity = %self.descriptor, count = ids.len(), "Deleting records");
        self.transactions
            .execute(|txn| txn.delete_all_by_id(ids))
            .map_err(|e| self.relabel(e))
    }
}

impl<A, H, T> MinifiedCrudService<A::Dto, RecordKey<A>, A::Minified> for EntityService<A, H, T>
where
    A: MinifiedAssembler,
    H: ServiceHooks<A::Dto, A::Record>,
    T: TransactionManager<A::Record>,
{
    fn find_all_minified(&self) -> Result<Vec<A::Minified>> {
        let records = self.load_all()?;
        self.assembler.build_projections(&records)
    }

    fn find_by_id_minified(&self, id: &RecordKey<A>) -> Result<A::Minified> {
        let record = self.load(id)?;
        self.assembler.build_projection_from_record(&record)
    }

    fn save_minified(&self, dto: &A::Dto) -> Result<A::Minified> {
        let saved = self.run_create(std::slice::from_ref(dto), false, |assembler, record| {
            assembler.build_projection_from_record(record)
        })?;
        self.single(saved)
    }

    fn update_minified(&self, dto: &A::Dto) -> Result<A::Minified> {
        let updated = self.run_update(std::slice::from_ref(dto), false, |assembler, record| {
            assembler.build_projection_from_record(record)
        })?;
        self.single(updated)
    }

    fn save_all_minified(&self, dtos: &[A::Dto]) -> Result<Vec<A::Minified>> {
        self.run_create(dtos, true, |assembler, record| {
            assembler.build_projection_from_record(record)
        })
    }

    fn update_all_minified(&self, dtos: &[A::Dto]) -> Result<Vec<A::Minified>> {
        self.run_update(dtos, true, |assembler, record| {
            assembler.build_projection_from_record(record)
        })
    }
}

impl<A, H, T: fmt::Debug> fmt::Debug for EntityService<A, H, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityService")
            .field("descriptor", &self.descriptor)
            .field("transactions", &self.transactions)
            .finish()
    }
}

fn resolve_descriptor<R>(config: &ServiceConfig) -> String {
    match config.descriptor.as_deref().map(str::trim) {
        Some(descriptor) if !descriptor.is_empty() => descriptor.to_string(),
        _ => {
            let full = std::any::type_name::<R>();
            let base = full.split('<').next().unwrap_or(full);
            let fallback = base.rsplit("::").next().unwrap_or(base).to_string();
            warn!(
                target: "recordkit::service",
                record_type = full,
                descriptor = %fallback,
                "No entity descriptor configured, using the record type name"
            );
            fallback
        }
    }
}
