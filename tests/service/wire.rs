//! JSON payloads in and out of the service

use crate::common::*;
use recordkit::prelude::*;
use recordkit::{ErrorKind, ErrorReport};
use serde_json::json;

#[test]
fn create_from_json_payload() {
    let (service, _clock) = widget_service(WidgetHooks);
    let payload: WidgetDto = serde_json::from_value(json!({"id": null, "name": "A"})).unwrap();

    let created = service.save(&payload).unwrap();
    let body = serde_json::to_value(&created).unwrap();

    assert_eq!(body["id"], 7);
    assert_eq!(body["name"], "A");
    assert_eq!(body["versionLock"], 1);
    assert_eq!(body["active"], true);
    assert_eq!(body["createdAt"], "2024-05-01T08:00:00Z");
    assert_eq!(body["createdAt"], body["modifiedAt"]);
    assert_eq!(body["modifiedBy"], 0);
    assert!(body.get("parentId").is_none());
}

#[test]
fn update_from_json_payload_ignores_client_audit_fields() {
    let (service, clock) = widget_service(WidgetHooks);
    service.save(&widget("A")).unwrap();
    advance(&clock, 60);

    let payload: WidgetDto = serde_json::from_value(json!({
        "id": 7,
        "versionLock": 1,
        "name": "B",
        "active": false,
        "createdAt": "2000-01-01T00:00:00Z",
        "modifiedBy": 42,
        "unknownField": "ignored"
    }))
    .unwrap();

    let body = serde_json::to_value(service.update(&payload).unwrap()).unwrap();

    assert_eq!(body["name"], "B");
    assert_eq!(body["versionLock"], 2);
    assert_eq!(body["active"], true);
    assert_eq!(body["createdAt"], "2024-05-01T08:00:00Z");
    assert_eq!(body["modifiedAt"], "2024-05-01T08:01:00Z");
    assert_eq!(body["modifiedBy"], 42);
}

#[test]
fn malformed_timestamp_is_an_assembly_error() {
    let (service, _clock) = widget_service(WidgetHooks);
    service.save(&widget("A")).unwrap();

    let mut payload = widget("B");
    payload.id = Some(FIRST_KEY);
    payload.metadata.version_lock = Some(1);
    payload.metadata.modified_at = Some("yesterday".to_string());

    let err = service.update(&payload).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Assembly);
    assert!(err.to_string().contains("modifiedAt"));
}

#[test]
fn error_report_for_failed_batch() {
    let (service, _clock) = widget_service(WidgetHooks);
    let err = service.save_all(&[widget("ok"), widget("")]).unwrap_err();

    let report = ErrorReport::from_error(&err, t0());
    let body = serde_json::to_value(&report).unwrap();

    assert_eq!(body["kind"], "validation");
    assert_eq!(body["entity"], "Widget");
    assert_eq!(body["validationErrors"], json!(["item 1: name must not be blank"]));
    assert!(body.get("message").is_none());
}

#[test]
fn minified_payload_shape() {
    let (service, _clock) = widget_service(WidgetHooks);
    let summary = service.save_minified(&widget("gear")).unwrap();

    let body = serde_json::to_value(&summary).unwrap();
    assert_eq!(body, json!({"id": 7, "name": "gear", "rank": 0}));
}
