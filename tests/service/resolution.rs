//! Dependency resolution inside the service transaction

use crate::common::*;
use recordkit::prelude::*;
use recordkit::ErrorKind;

#[test]
fn parent_is_resolved_and_assembled() {
    let (service, _clock) = widget_service(WidgetHooks);
    let parent = service.save(&widget("frame")).unwrap();

    let created = service.save(&child("wheel", parent.id.unwrap())).unwrap();

    assert_eq!(created.parent_id, parent.id);
    assert_eq!(created.parent_name.as_deref(), Some("frame"));
}

#[test]
fn batch_resolution_is_positional() {
    let (service, _clock) = widget_service(WidgetHooks);
    let parent = service.save(&widget("frame")).unwrap();
    let parent_id = parent.id.unwrap();

    let batch = vec![widget("loose"), child("left", parent_id), child("right", parent_id)];
    let saved = service.save_all(&batch).unwrap();

    assert_eq!(saved[0].parent_name, None);
    assert_eq!(saved[1].parent_name.as_deref(), Some("frame"));
    assert_eq!(saved[2].parent_name.as_deref(), Some("frame"));
}

#[test]
fn unknown_parent_aborts_the_batch() {
    let (service, _clock) = widget_service(WidgetHooks);

    let err = service
        .save_all(&[widget("ok"), child("orphan", 404)])
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Resolution);
    assert!(service.table().is_empty());
}

#[test]
fn update_resolves_against_current_parent() {
    let (service, clock) = widget_service(WidgetHooks);
    let parent = service.save(&widget("frame")).unwrap();
    let wheel = service.save(&child("wheel", parent.id.unwrap())).unwrap();
    advance(&clock, 10);

    let mut renamed = parent.clone();
    renamed.name = "chassis".to_string();
    service.update(&renamed).unwrap();

    advance(&clock, 10);
    let mut touched = wheel.clone();
    touched.color = "black".to_string();
    let updated = service.update(&touched).unwrap();

    assert_eq!(updated.parent_name.as_deref(), Some("chassis"));
    assert_eq!(updated.metadata.version_lock, Some(2));
}
