use crate::utils::{StubResponse, StubServer, road_works_release, tender_release};
use serde_json::json;
use tender_sync::config::{AirtableConfig, FetchConfig};
use tender_sync::error::{FetchError, StoreError};
use tender_sync::schema::{FieldMap, FieldValue, RecordType};
use tender_sync::source::FetchWindow;
use tender_sync::store::FieldEquals;
use tender_sync::{
    AirtableClient, FindTenderClient, Reconciler, ReleaseSource, Table, TenderRecord,
    UpsertOutcome,
};

fn fetch_client(server: &StubServer) -> FindTenderClient {
    FindTenderClient::new(FetchConfig {
        api_url: format!("{}/api/1.0/ocdsReleasePackages", server.base_url),
        ..FetchConfig::default()
    })
    .unwrap()
}

fn airtable_client(server: &StubServer) -> AirtableClient {
    AirtableClient::new(&AirtableConfig {
        access_token: "patTest".to_string(),
        base_id: "appBase".to_string(),
        tender_table_id: "tblTenders".to_string(),
        api_url: format!("{}/v0", server.base_url),
        ..AirtableConfig::default()
    })
    .unwrap()
}

#[test]
fn test_fetch_sends_window_and_stage() {
    let server = StubServer::start(vec![StubResponse::json(
        200,
        &json!({"uri": "x", "releases": [road_works_release(), tender_release("ocds-2", "r2", "Resurfacing")]}),
    )]);
    let client = fetch_client(&server);

    let package = client.fetch(RecordType::Pipeline);
    let requests = server.finish();

    assert_eq!(package.map(|package| package.len()), Some(2));
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert!(requests[0].target.starts_with("/api/1.0/ocdsReleasePackages?"));
    assert!(requests[0].target.contains("updatedFrom="));
    assert!(requests[0].target.contains("updatedTo="));
    assert!(requests[0].target.contains("stages=planning"));
    assert!(requests[0].target.contains("limit=100"));
}

#[test]
fn test_fetch_error_status_is_absent() {
    let server = StubServer::start(vec![StubResponse::json(
        503,
        &json!({"message": "maintenance"}),
    )]);
    let client = fetch_client(&server);

    assert!(client.fetch(RecordType::Tender).is_none());
    let _ = server.finish();
}

#[test]
fn test_fetch_window_reports_status_and_decode_errors() {
    let server = StubServer::start(vec![
        StubResponse::json(500, &json!("boom")),
        StubResponse {
            status: 200,
            body: "<html>not json</html>".to_string(),
        },
    ]);
    let client = fetch_client(&server);
    let window = FetchWindow::last_24_hours(chrono::Local::now().naive_local());

    let status = client.fetch_window(RecordType::Tender, &window);
    let decode = client.fetch_window(RecordType::Tender, &window);
    let _ = server.finish();

    assert!(matches!(status, Err(FetchError::Status { status: 500, .. })));
    assert!(matches!(decode, Err(FetchError::Decode(_))));
}

#[test]
fn test_query_follows_offsets() {
    let server = StubServer::start(vec![
        StubResponse::json(
            200,
            &json!({"records": [{"id": "rec1", "fields": {"OCID": "ocds-1"}}], "offset": "itr2"}),
        ),
        StubResponse::json(
            200,
            &json!({"records": [{"id": "rec2", "fields": {"OCID": "ocds-1"}, "createdTime": "2025-06-13T09:00:00.000Z"}]}),
        ),
    ]);
    let client = airtable_client(&server);
    let table = client.table("appBase", "tblTenders");

    let rows = table.query(&FieldEquals::new("OCID", "ocds-1")).unwrap();
    let requests = server.finish();

    let ids: Vec<_> = rows.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids, vec!["rec1", "rec2"]);
    assert_eq!(requests.len(), 2);
    assert!(requests[0].target.starts_with("/v0/appBase/tblTenders?"));
    assert!(requests[0].target.contains("filterByFormula="));
    assert!(!requests[0].target.contains("offset="));
    assert!(requests[1].target.contains("offset=itr2"));
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer patTest"));
}

#[test]
fn test_create_and_update_bodies() {
    let server = StubServer::start(vec![
        StubResponse::json(200, &json!({"id": "recNew", "fields": {"OCID": "ocds-1"}})),
        StubResponse::json(200, &json!({"id": "recNew", "fields": {"OCID": "ocds-1"}})),
    ]);
    let client = airtable_client(&server);
    let table = client.table("appBase", "tblTenders");
    let mut fields = FieldMap::new();
    fields.insert("OCID", FieldValue::Text("ocds-1".to_string()));
    fields.insert("Tender End Date", FieldValue::Empty);

    let created = table.create(&fields).unwrap();
    let updated = table.update(&created.id, &fields).unwrap();
    let requests = server.finish();

    assert_eq!(updated.id, "recNew");
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].target, "/v0/appBase/tblTenders");
    assert_eq!(requests[1].method, "PATCH");
    assert_eq!(requests[1].target, "/v0/appBase/tblTenders/recNew");
    for request in &requests {
        assert_eq!(
            request.json_body(),
            json!({"fields": {"OCID": "ocds-1", "Tender End Date": null}, "typecast": true})
        );
    }
}

#[test]
fn test_api_error_becomes_failed_outcome() {
    let server = StubServer::start(vec![
        StubResponse::json(200, &json!({"records": []})),
        StubResponse::json(
            422,
            &json!({"error": {"type": "INVALID_VALUE_FOR_COLUMN", "message": "Cannot parse date"}}),
        ),
    ]);
    let client = airtable_client(&server);
    let table = client.table("appBase", "tblTenders");
    let reconciler = Reconciler::new(&table, None);
    let record = TenderRecord {
        ocid: Some("ocds-1".to_string()),
        title: "Road works".to_string(),
        ..TenderRecord::default()
    };

    let outcome = reconciler.upsert(&record);
    let _ = server.finish();

    let UpsertOutcome::Failed(StoreError::Api { status, message }) = outcome else {
        panic!("expected an API failure, got {outcome:?}");
    };
    assert_eq!(status, 422);
    assert_eq!(message, "INVALID_VALUE_FOR_COLUMN: Cannot parse date");
}
