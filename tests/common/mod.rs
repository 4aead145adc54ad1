//! Shared fixtures for the integration test suites.
//!
//! Import via `mod common;` from any test's main.rs.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use recordkit::prelude::*;
use recordkit::{
    apply_metadata, metadata_from, project_fields, require_absent_ids, require_present_ids,
    AuditFields, BatchResolution, EntityService, ManualClock, PersistError, ResolutionMap,
    Result, SequentialKeys, ServiceConfig, TableTransactionManager, TransferMetadata,
    VersionedTable,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Widget entity
// ============================================================================

/// Persisted widget
#[derive(Debug, Clone, PartialEq)]
pub struct Widget {
    pub id: Option<u64>,
    pub name: String,
    pub color: String,
    pub parent_id: Option<u64>,
    pub parent_name: Option<String>,
    pub audit: AuditFields,
}

impl Identifiable for Widget {
    type Key = u64;
    fn id(&self) -> Option<&u64> {
        self.id.as_ref()
    }
    fn set_id(&mut self, id: u64) {
        self.id = Some(id);
    }
}

impl VersionedRecord for Widget {
    fn audit(&self) -> &AuditFields {
        &self.audit
    }
    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

/// Wire shape of a widget
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetDto {
    pub id: Option<u64>,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
    #[serde(flatten)]
    pub metadata: TransferMetadata,
}

impl TransferObject for WidgetDto {
    type Key = u64;
    fn transfer_id(&self) -> Option<&u64> {
        self.id.as_ref()
    }
}

/// Minified widget
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WidgetSummary {
    pub id: Option<u64>,
    pub name: String,
    pub rank: u32,
}

project_fields!(WidgetDto => WidgetSummary { id, name });

pub struct WidgetAssembler;

impl Assembler for WidgetAssembler {
    type Record = Widget;
    type Dto = WidgetDto;

    fn build_record(&self, dto: &WidgetDto, deps: &ResolutionMap) -> Result<Widget> {
        let parent_name = match dto.parent_id {
            Some(_) => Some(deps.get::<Widget>("parent")?.name.clone()),
            None => None,
        };
        let mut audit = AuditFields::default();
        apply_metadata(&dto.metadata, &mut audit)?;
        Ok(Widget {
            id: dto.id,
            name: dto.name.clone(),
            color: dto.color.clone(),
            parent_id: dto.parent_id,
            parent_name,
            audit,
        })
    }

    fn build_dto(&self, record: &Widget) -> WidgetDto {
        WidgetDto {
            id: record.id,
            name: record.name.clone(),
            color: record.color.clone(),
            parent_id: record.parent_id,
            parent_name: record.parent_name.clone(),
            metadata: metadata_from(&record.audit),
        }
    }
}

impl MinifiedAssembler for WidgetAssembler {
    type Minified = WidgetSummary;
}

/// Hooks with a name rule and parent resolution through the same transaction
pub struct WidgetHooks;

impl WidgetHooks {
    fn blank_names(dtos: &[WidgetDto]) -> Vec<String> {
        dtos.iter()
            .enumerate()
            .filter(|(_, dto)| dto.name.trim().is_empty())
            .map(|(index, _)| format!("item {}: name must not be blank", index))
            .collect()
    }

    fn merge(entity: &str, ids: Result<()>, names: Vec<String>) -> Result<()> {
        let mut violations = match ids {
            Ok(()) => Vec::new(),
            Err(PersistError::Validation { violations, .. }) => violations,
            Err(other) => return Err(other),
        };
        violations.extend(names);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(PersistError::validation(entity, violations))
        }
    }
}

impl ServiceHooks<WidgetDto, Widget> for WidgetHooks {
    fn validate_create(&self, entity: &str, dtos: &[WidgetDto]) -> Result<()> {
        Self::merge(entity, require_absent_ids(entity, dtos), Self::blank_names(dtos))
    }

    fn validate_update(&self, entity: &str, dtos: &[WidgetDto]) -> Result<()> {
        Self::merge(entity, require_present_ids(entity, dtos), Self::blank_names(dtos))
    }

    fn resolve_dependencies(
        &self,
        repository: &mut dyn Repository<Widget>,
        dtos: &[WidgetDto],
    ) -> Result<Option<BatchResolution>> {
        let mut resolved = BatchResolution::new();
        for (index, dto) in dtos.iter().enumerate() {
            if let Some(parent_id) = dto.parent_id {
                if let Some(parent) = repository.find_by_id(&parent_id)? {
                    resolved.insert(index, ResolutionMap::from_entry("parent", parent));
                }
            }
        }
        Ok(Some(resolved))
    }
}

// ============================================================================
// Service harness
// ============================================================================

pub type WidgetService<H> = EntityService<WidgetAssembler, H, TableTransactionManager<Widget>>;

/// First key handed out by the harness table
pub const FIRST_KEY: u64 = 7;

/// Instant the harness clock starts at
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
}

/// Widget service over a fresh table, keys from [`FIRST_KEY`], clock frozen at [`t0`]
pub fn widget_service<H: ServiceHooks<WidgetDto, Widget>>(
    hooks: H,
) -> (WidgetService<H>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let table = VersionedTable::named("widgets", SequentialKeys::starting_at(FIRST_KEY))
        .with_clock(clock.clone());
    let service = EntityService::in_memory(
        WidgetAssembler,
        hooks,
        Arc::new(table),
        &ServiceConfig::with_descriptor("Widget"),
    )
    .with_clock(clock.clone());
    (service, clock)
}

pub fn advance(clock: &ManualClock, seconds: i64) {
    clock.advance(Duration::seconds(seconds));
}

/// New widget payload
pub fn widget(name: &str) -> WidgetDto {
    WidgetDto {
        name: name.to_string(),
        ..WidgetDto::default()
    }
}

/// New widget payload pointing at a parent
pub fn child(name: &str, parent_id: u64) -> WidgetDto {
    WidgetDto {
        parent_id: Some(parent_id),
        ..widget(name)
    }
}

/// RFC 3339 rendering used on the wire
pub fn wire(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
}
