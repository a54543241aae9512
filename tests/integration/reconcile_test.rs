use serde_json::json;
use tender_sync::error::StoreError;
use tender_sync::store::memory::column;
use tender_sync::{MemoryTable, PipelineRecord, Reconciler, TenderRecord, UpsertOutcome};

fn tender(ocid: &str, title: &str) -> TenderRecord {
    TenderRecord {
        ocid: Some(ocid.to_string()),
        release_id: format!("{ocid}-r"),
        title: title.to_string(),
        ..TenderRecord::default()
    }
}

#[test]
fn test_same_ocid_updates_single_row() {
    let table = MemoryTable::new("tenders");
    let reconciler = Reconciler::new(&table, None);

    let first = reconciler.upsert(&tender("ocds-1", "Road works"));
    let second = reconciler.upsert(&tender("ocds-1", "Road works (amended)"));

    let UpsertOutcome::Created { row_id: created } = first else {
        panic!("expected a created row, got {first:?}");
    };
    let UpsertOutcome::Updated { row_id: updated } = second else {
        panic!("expected an updated row, got {second:?}");
    };
    assert_eq!(created, updated);

    let rows = table.rows_where("OCID", "ocds-1");
    assert_eq!(rows.len(), 1);
    assert_eq!(column(&rows[0], "Title"), &json!("Road works (amended)"));
}

#[test]
fn test_batch_counts_failures_at_any_position() {
    let ocids = ["ocds-1", "ocds-2", "ocds-3", "ocds-4", "ocds-5", "ocds-6"];
    let failing_positions: [&[usize]; 4] = [&[0], &[5], &[1, 3], &[0, 2, 5]];

    for failing in failing_positions {
        let table = failing
            .iter()
            .fold(MemoryTable::new("tenders"), |table, &position| {
                table.fail_writes_where("OCID", ocids[position])
            });
        let reconciler = Reconciler::new(&table, None);
        let records: Vec<_> = ocids.iter().map(|ocid| tender(ocid, "Works")).collect();

        let counts = reconciler.batch_upsert(&records);

        assert_eq!(counts.failed, failing.len(), "failing at {failing:?}");
        assert_eq!(counts.success, ocids.len() - failing.len());
        assert_eq!(counts.total(), ocids.len());
        for (position, ocid) in ocids.iter().enumerate() {
            let stored = table.rows_where("OCID", ocid).len();
            let expected = usize::from(!failing.contains(&position));
            assert_eq!(stored, expected, "{ocid} with failures at {failing:?}");
        }
    }
}

#[test]
fn test_record_without_key_never_reaches_store() {
    let table = MemoryTable::new("tenders");
    let reconciler = Reconciler::new(&table, None);
    let keyless = TenderRecord {
        ocid: None,
        title: "Orphan".to_string(),
        ..TenderRecord::default()
    };
    let blank = tender("   ", "Blank key");

    assert!(matches!(reconciler.upsert(&keyless), UpsertOutcome::MissingKey));
    assert!(matches!(reconciler.upsert(&blank), UpsertOutcome::MissingKey));
    assert!(table.is_empty());
}

#[test]
fn test_query_failure_is_reported() {
    let table = MemoryTable::new("tenders");
    table.set_query_failure(true);
    let reconciler = Reconciler::new(&table, None);

    let outcome = reconciler.upsert(&tender("ocds-1", "Road works"));

    assert!(matches!(
        outcome,
        UpsertOutcome::Failed(StoreError::Api { status: 503, .. })
    ));
    assert!(table.is_empty());
}

#[test]
fn test_records_route_to_their_tables() {
    let tenders = MemoryTable::new("tenders");
    let pipeline = MemoryTable::new("pipeline");
    let reconciler = Reconciler::new(&tenders, Some(&pipeline));

    let planned = PipelineRecord {
        ocid: Some("ocds-p".to_string()),
        title: "New hospital wing".to_string(),
        status: "Pipeline".to_string(),
        ..PipelineRecord::default()
    };
    assert!(reconciler.upsert(&planned).is_success());
    assert!(reconciler.upsert(&tender("ocds-t", "Road works")).is_success());

    assert_eq!(tenders.len(), 1);
    assert_eq!(pipeline.len(), 1);
    assert_eq!(column(&pipeline.rows()[0], "Status"), &json!("Pipeline"));
}

#[test]
fn test_pipeline_without_table_fails() {
    let tenders = MemoryTable::new("tenders");
    let reconciler = Reconciler::new(&tenders, None);
    let planned = PipelineRecord {
        ocid: Some("ocds-p".to_string()),
        ..PipelineRecord::default()
    };

    let outcome = reconciler.upsert(&planned);

    assert!(matches!(
        outcome,
        UpsertOutcome::Failed(StoreError::TableNotConfigured(_))
    ));
    assert!(tenders.is_empty());
}
