//! Soft-delete policy and the no-resurrection rule

use std::sync::Arc;

use crate::common::*;
use recordkit::prelude::*;
use recordkit::{
    DeletePolicy, EntityService, ManualClock, RecordkitConfig, SequentialKeys, ServiceConfig,
    VersionedTable,
};

fn soft_service() -> (WidgetService<WidgetHooks>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let table = VersionedTable::named("widgets", SequentialKeys::starting_at(FIRST_KEY))
        .with_delete_policy(DeletePolicy::Soft)
        .with_clock(clock.clone());
    let service = EntityService::in_memory(
        WidgetAssembler,
        WidgetHooks,
        Arc::new(table),
        &ServiceConfig::with_descriptor("Widget"),
    )
    .with_clock(clock.clone());
    (service, clock)
}

#[test]
fn delete_marks_inactive_and_bumps_version() {
    let (service, clock) = soft_service();
    service.save(&widget("a")).unwrap();
    advance(&clock, 30);

    service.delete_by_id(&FIRST_KEY).unwrap();

    let dto = service.find_by_id(&FIRST_KEY).unwrap();
    assert!(!dto.metadata.active);
    assert_eq!(dto.metadata.version_lock, Some(2));
    assert_eq!(
        dto.metadata.modified_at,
        Some(wire(t0() + chrono::Duration::seconds(30)))
    );
    assert_eq!(dto.metadata.created_at, Some(wire(t0())));
}

#[test]
fn update_never_resurrects() {
    let (service, clock) = soft_service();
    service.save(&widget("a")).unwrap();
    service.delete_by_id(&FIRST_KEY).unwrap();
    advance(&clock, 5);

    let mut payload = service.find_by_id(&FIRST_KEY).unwrap();
    payload.name = "revived".to_string();
    payload.metadata.active = true;
    payload.metadata.created_at = Some("1999-01-01T00:00:00Z".to_string());

    let updated = service.update(&payload).unwrap();

    assert!(!updated.metadata.active);
    assert_eq!(updated.name, "revived");
    assert_eq!(updated.metadata.created_at, Some(wire(t0())));
    assert!(!service.table().get(&FIRST_KEY).unwrap().is_active());
}

#[test]
fn repeated_soft_delete_is_idempotent() {
    let (service, _clock) = soft_service();
    service.save(&widget("a")).unwrap();

    service.delete_by_id(&FIRST_KEY).unwrap();
    service.delete_by_ids(&[FIRST_KEY, FIRST_KEY]).unwrap();

    assert_eq!(service.table().version_of(&FIRST_KEY), Some(2));
    assert_eq!(service.find_all().unwrap().len(), 1);
}

#[test]
fn soft_policy_from_config() {
    let config = RecordkitConfig::from_toml_str(
        r#"
[service]
descriptor = "Gizmo"

[store]
name = "gizmos"
delete_policy = "soft"
"#,
    )
    .unwrap();
    let service = EntityService::from_config(
        WidgetAssembler,
        WidgetHooks,
        &config,
        SequentialKeys::new(),
    );

    let saved = service.save(&widget("g")).unwrap();
    service.delete_by_id(&saved.id.unwrap()).unwrap();

    assert_eq!(service.table().delete_policy(), DeletePolicy::Soft);
    assert!(!service.find_by_id(&1).unwrap().metadata.active);
    assert_eq!(
        service.find_by_id(&2).unwrap_err().to_string(),
        "Gizmo entity was not found"
    );
}
