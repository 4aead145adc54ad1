//! Batch create and update

use crate::common::*;
use recordkit::prelude::*;
use recordkit::ErrorKind;

#[test]
fn save_all_persists_every_item_in_order() {
    let (service, _clock) = widget_service(WidgetHooks);

    let saved = service
        .save_all(&[widget("a"), widget("b"), widget("c")])
        .unwrap();

    let ids: Vec<_> = saved.iter().map(|dto| dto.id.unwrap()).collect();
    assert_eq!(ids, vec![FIRST_KEY, FIRST_KEY + 1, FIRST_KEY + 2]);
    assert!(saved.iter().all(|dto| dto.metadata.version_lock == Some(1)));
    assert_eq!(service.table().len(), 3);
    assert_eq!(service.transactions().stats().committed(), 1);
}

#[test]
fn save_all_of_empty_batch_is_a_noop() {
    let (service, _clock) = widget_service(WidgetHooks);
    assert!(service.save_all(&[]).unwrap().is_empty());
    assert!(service.table().is_empty());
}

#[test]
fn validation_reports_every_offending_item() {
    let (service, _clock) = widget_service(WidgetHooks);
    let mut with_id = widget("x");
    with_id.id = Some(3);

    let err = service
        .save_all(&[widget(""), with_id, widget("ok")])
        .unwrap_err();

    assert!(err.is_validation());
    let message = err.to_string();
    assert!(message.contains("item 1: the identifier of the Widget entity must be null"));
    assert!(message.contains("item 0: name must not be blank"));
}

#[test]
fn update_all_is_atomic() {
    let (service, clock) = widget_service(WidgetHooks);
    let mut saved = service.save_all(&[widget("a"), widget("b")]).unwrap();
    advance(&clock, 5);

    // Second item carries a stale version; the first must not be written either
    saved[0].name = "a2".to_string();
    saved[1].name = "b2".to_string();
    saved[1].metadata.version_lock = Some(9);

    let err = service.update_all(&saved).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConcurrencyConflict);

    let names: Vec<_> = service
        .find_all()
        .unwrap()
        .into_iter()
        .map(|dto| dto.name)
        .collect();
    assert_eq!(names, vec!["a", "b"]);
    assert!(service
        .table()
        .all()
        .iter()
        .all(|record| record.version_lock() == Some(1)));
}

#[test]
fn update_all_advances_each_record() {
    let (service, clock) = widget_service(WidgetHooks);
    let mut saved = service.save_all(&[widget("a"), widget("b")]).unwrap();
    advance(&clock, 5);

    for dto in &mut saved {
        dto.color = "blue".to_string();
    }
    let updated = service.update_all(&saved).unwrap();

    assert!(updated
        .iter()
        .all(|dto| dto.color == "blue" && dto.metadata.version_lock == Some(2)));
    assert_eq!(updated[0].metadata.created_at, saved[0].metadata.created_at);
}

#[test]
fn update_all_rejects_missing_identifiers() {
    let (service, _clock) = widget_service(WidgetHooks);
    let err = service.update_all(&[widget("new")]).unwrap_err();

    assert!(err.is_validation());
    assert!(err
        .to_string()
        .contains("the identifier of the Widget entity must not be null"));
    assert_eq!(service.transactions().stats().started(), 0);
}

#[test]
fn update_of_missing_record_is_not_found() {
    let (service, _clock) = widget_service(WidgetHooks);
    service.save(&widget("a")).unwrap();

    let mut ghost = widget("ghost");
    ghost.id = Some(500);
    ghost.metadata.version_lock = Some(1);

    let err = service.update_all(&[ghost]).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.entity(), Some("Widget"));
}

#[test]
fn delete_by_ids_removes_in_one_transaction() {
    let (service, _clock) = widget_service(WidgetHooks);
    service
        .save_all(&[widget("a"), widget("b"), widget("c")])
        .unwrap();
    let before = service.transactions().stats().committed();

    service
        .delete_by_ids(&[FIRST_KEY, FIRST_KEY + 2, 1_000])
        .unwrap();

    assert_eq!(service.transactions().stats().committed(), before + 1);
    let remaining: Vec<_> = service
        .find_all()
        .unwrap()
        .into_iter()
        .map(|dto| dto.name)
        .collect();
    assert_eq!(remaining, vec!["b"]);
}
