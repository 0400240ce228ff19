use chrono::{TimeZone, Utc};

use drm_core::{ManifestSession, ScanOptions};
use drm_model::{Cell, ColumnLayout, ConsignmentCode, DepotId, ManifestTable, SalesOrder};
use drm_report::{
    CompletionReport, CompletionStatus, ReportError, build_report, report_csv_string,
    report_filename, report_headers,
};

fn cells(values: &[&str]) -> Vec<Cell> {
    values.iter().map(|value| Cell::from_raw(value)).collect()
}

fn depot() -> DepotId {
    DepotId::new("north").unwrap()
}

fn session_with(table: ManifestTable) -> ManifestSession {
    let mut session = ManifestSession::new(depot(), ColumnLayout::default(), ScanOptions::default());
    session.load_table(table, Vec::new());
    session
}

fn runsheet() -> ManifestTable {
    ManifestTable::new(
        cells(&["Run", "Drop", "Zone", "Date", "Sales Order"]),
        vec![
            cells(&[
                "R1", "D1", "Z1", "2024-05-01", "SO25210100", "Acme Pty", "1 Main St",
                "Springfield", "3000", "", "1", "0", "", "12kg", "Pallet",
            ]),
            cells(&["R1", "D2", "", "", "SO25210200", "Bob", "", "", "", "", "2"]),
        ],
    )
}

#[test]
fn csv_report_lists_every_row_with_status() {
    let mut session = session_with(runsheet());
    session.handle_scan("SO25210100001");
    session.set_note(1, "back door");
    let rows = build_report(&session).unwrap();
    assert_eq!(rows[0].status, CompletionStatus::Complete);
    assert_eq!(rows[1].status, CompletionStatus::NotComplete);

    let csv = report_csv_string(&rows).unwrap();
    insta::assert_snapshot!(csv.trim_end(), @r"
    Run,Drop,Zone,FP,Type,Sales Order,Name,Address,Suburb,Postcode,CH,FL,Weight,Date,Notes,Status
    R1,D1,Z1,1,Pallet,SO25210100,Acme Pty,1 Main St,Springfield,3000,0,-,12kg,2024-05-01,-,Complete
    R1,D2,-,2,-,SO25210200,Bob,-,-,-,-,-,-,-,back door,Not Complete
    ");
}

#[test]
fn codes_outside_the_manifest_do_not_complete_a_row() {
    let mut session = session_with(runsheet());
    let order = SalesOrder::new("SO25210200").unwrap();
    session.handle_scan("SO25210200001");
    session.apply_remote_scan(
        &order,
        &ConsignmentCode::new("SO25210200009").unwrap(),
        None,
        None,
        false,
    );
    let rows = build_report(&session).unwrap();
    assert_eq!(rows[1].status, CompletionStatus::NotComplete);
    assert_eq!(session.progress(&order).scanned, 1);
}

#[test]
fn headers_end_with_notes_and_status() {
    let headers = report_headers();
    assert_eq!(headers.len(), 16);
    assert_eq!(&headers[14..], &["Notes", "Status"]);
}

#[test]
fn empty_and_header_only_tables_are_rejected() {
    let empty = session_with(ManifestTable::default());
    assert!(matches!(
        build_report(&empty),
        Err(ReportError::NothingToReport)
    ));
    let header_only = session_with(ManifestTable::new(cells(&["Run"]), Vec::new()));
    assert!(matches!(
        build_report(&header_only),
        Err(ReportError::NoEntries)
    ));
}

#[test]
fn envelope_is_final_and_named_after_depot() {
    let session = session_with(runsheet());
    let created = Utc.with_ymd_and_hms(2024, 5, 1, 17, 30, 5).unwrap();
    let report = CompletionReport::new(depot(), "North Depot", build_report(&session).unwrap(), created);
    assert_eq!(report.filename, "final_north_20240501T173005Z.csv");
    assert_eq!(report.complete_rows(), 0);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["kind"], "final");
    assert_eq!(json["depotId"], "north");
    assert_eq!(json["rows"][1]["status"], "Not Complete");
}

#[test]
fn filenames_replace_unsafe_characters() {
    let created = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(
        report_filename(&DepotId::new("Depot 7/B").unwrap(), created),
        "final_Depot_7_B_20240102T030405Z.csv"
    );
}
