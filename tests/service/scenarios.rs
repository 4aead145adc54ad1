//! Reference scenarios
//!
//! 1. create assigns key, version 1, active, created == modified
//! 2. update at a later instant advances version and modification only
//! 3. update with a stale version conflicts and leaves the record alone
//! 4. lookup of a missing key names the entity
//! 5. a missing dependency fails assembly and writes nothing
//! 6. one invalid item fails the whole batch before any transaction

use crate::common::*;
use recordkit::prelude::*;
use recordkit::{DefaultHooks, ErrorKind, PersistError};

#[test]
fn scenario_1_create_assigns_identity_and_initial_metadata() {
    let (service, _clock) = widget_service(WidgetHooks);

    let created = service.save(&widget("A")).unwrap();

    assert_eq!(created.id, Some(FIRST_KEY));
    assert_eq!(created.name, "A");
    assert_eq!(created.metadata.version_lock, Some(1));
    assert!(created.metadata.active);
    assert_eq!(created.metadata.created_at, Some(wire(t0())));
    assert_eq!(created.metadata.modified_at, Some(wire(t0())));

    let stored = service.table().get(&FIRST_KEY).unwrap();
    assert_eq!(stored.audit.created_at, Some(t0()));
    assert_eq!(stored.audit.modified_at, stored.audit.created_at);
    assert_eq!(stored.audit.modified_by, Some(recordkit::SYSTEM_ACTOR));
}

#[test]
fn scenario_2_update_advances_version_and_modification() {
    let (service, clock) = widget_service(WidgetHooks);
    service.save(&widget("A")).unwrap();
    advance(&clock, 60);
    let t1 = t0() + chrono::Duration::seconds(60);

    let mut payload = widget("B");
    payload.id = Some(FIRST_KEY);
    payload.metadata.version_lock = Some(1);
    let updated = service.update(&payload).unwrap();

    assert_eq!(updated.name, "B");
    assert!(updated.metadata.version_lock.unwrap() > 1);
    assert!(updated.metadata.active);
    assert_eq!(updated.metadata.created_at, Some(wire(t0())));
    assert_eq!(updated.metadata.modified_at, Some(wire(t1)));

    let stored = service.table().get(&FIRST_KEY).unwrap();
    assert_eq!(stored.audit.modified_at, Some(t1));
    assert_eq!(stored.audit.created_at, Some(t0()));
}

#[test]
fn scenario_3_stale_version_conflicts() {
    let (service, clock) = widget_service(WidgetHooks);
    service.save(&widget("A")).unwrap();
    advance(&clock, 60);

    let mut first = widget("B");
    first.id = Some(FIRST_KEY);
    first.metadata.version_lock = Some(1);
    service.update(&first).unwrap();
    let after_first = service.table().get(&FIRST_KEY).unwrap();

    advance(&clock, 60);
    let mut second = widget("C");
    second.id = Some(FIRST_KEY);
    second.metadata.version_lock = Some(1);
    let err = service.update(&second).unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(err.entity(), Some("Widget"));
    assert_eq!(service.table().get(&FIRST_KEY).unwrap(), after_first);
    assert_eq!(after_first.name, "B");
}

#[test]
fn scenario_4_missing_record_names_the_entity() {
    let (service, _clock) = widget_service(WidgetHooks);

    let err = service.find_by_id(&999).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.to_string(), "Widget entity was not found");
    match err {
        PersistError::NotFound { entity, key } => {
            assert_eq!(entity, "Widget");
            assert_eq!(key, "999");
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn scenario_5_missing_dependency_writes_nothing() {
    // DefaultHooks never resolves the parent the assembler asks for
    let (service, _clock) = widget_service(DefaultHooks);
    let parent = service.save(&widget("parent")).unwrap();

    let err = service.save(&child("orphan", parent.id.unwrap())).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Resolution);
    assert!(err.to_string().contains("parent"));
    assert_eq!(service.table().len(), 1);
    assert_eq!(service.transactions().stats().aborted(), 1);
}

#[test]
fn scenario_6_invalid_batch_item_persists_nothing() {
    let (service, _clock) = widget_service(WidgetHooks);
    let batch = vec![widget("a"), widget("b"), widget("   "), widget("d")];

    let err = service.save_all(&batch).unwrap_err();

    match err {
        PersistError::Validation { entity, violations } => {
            assert_eq!(entity, "Widget");
            assert_eq!(violations, vec!["item 2: name must not be blank".to_string()]);
        }
        other => panic!("expected Validation, got {:?}", other),
    }
    assert!(service.table().is_empty());
    assert_eq!(service.transactions().stats().started(), 0);
}
