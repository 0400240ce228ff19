use std::time::{Duration, Instant};

use drm_core::{
    InputDecision, ManifestSession, MarkOutcome, RouteStatus, ScanOptions, ScanOutcome,
    SessionSnapshot, SoState, TileState,
};
use drm_model::{Cell, ColumnLayout, ConsignmentCode, DepotId, FileMeta, ManifestTable, SalesOrder};

fn row(run: &str, drop: &str, so: &str, fp: f64, ch: f64, fl: f64, weight: &str) -> Vec<Cell> {
    let mut cells = vec![Cell::Empty; 15];
    cells[0] = Cell::from(run);
    cells[1] = Cell::from(drop);
    cells[4] = Cell::from(so);
    cells[10] = Cell::Number(fp);
    cells[11] = Cell::Number(ch);
    cells[12] = Cell::Number(fl);
    cells[13] = Cell::from(weight);
    cells
}

fn header() -> Vec<Cell> {
    ["Run", "Drop", "Zone", "Date", "Sales Order"]
        .into_iter()
        .map(Cell::from)
        .collect()
}

fn session() -> ManifestSession {
    ManifestSession::new(
        DepotId::new("north").unwrap(),
        ColumnLayout::default(),
        ScanOptions::default(),
    )
}

fn so(value: &str) -> SalesOrder {
    SalesOrder::new(value).unwrap()
}

fn loaded(rows: Vec<Vec<Cell>>) -> ManifestSession {
    let mut session = session();
    session.load_table(ManifestTable::new(header(), rows), vec![FileMeta::new("runsheet.csv", 1)]);
    session
}

#[test]
fn scanning_walks_an_order_to_completion() {
    let mut session = loaded(vec![row("R1", "D1", "SO10000000", 2.0, 0.0, 0.0, "10kg")]);
    let order = so("SO10000000");
    assert_eq!(
        session.manifest().expected(&order).unwrap(),
        &[
            ConsignmentCode::new("SO10000000001").unwrap(),
            ConsignmentCode::new("SO10000000002").unwrap()
        ]
    );
    assert_eq!(session.manifest().rows_for(&order), &[0]);

    let first = session.handle_scan("so10000000001");
    assert_eq!(first.receipt().unwrap().to_string(), "1/2");
    assert_eq!(session.progress(&order).state, SoState::Partial);
    assert_eq!(
        session.route_status(),
        &RouteStatus::Routed {
            so: order.clone(),
            run: "R1".into(),
            drop: "D1".into(),
            scanned: 1,
            total: 2,
        }
    );

    let again = session.handle_scan("SO10000000001");
    assert!(matches!(again, ScanOutcome::Duplicate(ref r) if r.to_string() == "1/2"));

    let last = session.handle_scan("SO10000000002");
    assert!(last.receipt().unwrap().is_complete());
    assert_eq!(session.progress(&order).state, SoState::Complete);

    let missing = session.handle_scan("SO99900000001");
    assert!(matches!(missing, ScanOutcome::NotFound { .. }));
    assert_eq!(
        session.route_status(),
        &RouteStatus::NotFound {
            input: "SO99900000001".into()
        }
    );
}

#[test]
fn too_short_keeps_previous_status() {
    let mut session = loaded(vec![row("R1", "D1", "SO10000000", 1.0, 0.0, 0.0, "")]);
    session.handle_scan("SO10000000001");
    let before = session.route_status().clone();
    assert!(matches!(
        session.handle_scan("SO1"),
        ScanOutcome::TooShort { .. }
    ));
    assert_eq!(session.route_status(), &before);
}

#[test]
fn zero_piece_orders_are_not_scannable_or_complete() {
    let mut session = loaded(vec![row("R1", "D1", "SO10000000", 0.0, 0.0, 0.0, "")]);
    let order = so("SO10000000");
    assert!(session.manifest().expected(&order).is_none());
    assert_eq!(session.manifest().rows_for(&order), &[0]);
    assert_eq!(session.progress(&order).state, SoState::NotStarted);
    assert_eq!(
        session.mark_next_for_row(0),
        MarkOutcome::NothingExpected { so: order }
    );
}

#[test]
fn manual_mark_takes_next_code_in_sequence() {
    let mut session = loaded(vec![row("R1", "D1", "SO10000000", 1.0, 1.0, 0.0, "")]);
    session.handle_scan("SO10000000002");
    let MarkOutcome::Marked(receipt) = session.mark_next_for_row(0) else {
        panic!("expected a mark");
    };
    assert_eq!(receipt.code.as_str(), "SO10000000001");
    assert_eq!(receipt.scanned, 2);
    assert!(matches!(
        session.mark_next_for_row(0),
        MarkOutcome::AlreadyComplete(_)
    ));
    assert_eq!(session.mark_next_for_row(7), MarkOutcome::RowNotFound { row: 7 });
}

#[test]
fn merge_upload_concatenates_and_renumbers() {
    let mut session = loaded(vec![row("R1", "D1", "SO10000000", 2.0, 0.0, 0.0, "")]);
    let incoming = ManifestTable::new(
        vec![Cell::from("Other header")],
        vec![row("R2", "D9", "so10000000", 2.0, 0.0, 0.0, "")],
    );
    let summary = session.merge_upload(&incoming, &[FileMeta::new("second.csv", 1)]);
    assert_eq!(summary.added_rows, 1);
    assert_eq!(summary.total_rows, 2);
    let order = so("SO10000000");
    let codes: Vec<&str> = session
        .manifest()
        .expected(&order)
        .unwrap()
        .iter()
        .map(ConsignmentCode::as_str)
        .collect();
    assert_eq!(
        codes,
        vec!["SO10000000001", "SO10000000002", "SO10000000003", "SO10000000004"]
    );
    assert_eq!(session.table().header()[0], Cell::from("Run"));
    assert_eq!(session.files().len(), 2);
    assert_eq!(session.first_run_drop(&order).run, "R1");
}

#[test]
fn remote_scans_apply_idempotently() {
    let mut session = loaded(vec![row("R1", "D1", "SO10000000", 2.0, 0.0, 0.0, "")]);
    let order = so("SO10000000");
    let code = ConsignmentCode::new("SO10000000001").unwrap();
    let applied = session.apply_remote_scan(&order, &code, Some("R7"), None, true);
    assert!(applied.added);
    assert_eq!(applied.receipt.route.run, "R7");
    assert_eq!(applied.receipt.route.drop, "D1");
    let again = session.apply_remote_scan(&order, &code, None, None, false);
    assert!(!again.added);
    assert_eq!(session.progress(&order).scanned, 1);
    assert!(matches!(
        session.handle_scan("SO10000000001"),
        ScanOutcome::Duplicate(_)
    ));
}

#[test]
fn unexpected_remote_codes_leave_an_order_partial() {
    let mut session = loaded(vec![row("R1", "D1", "SO252101", 2.0, 0.0, 0.0, "")]);
    let order = so("SO252101");
    session.handle_scan("SO252101001");
    let applied = session.apply_remote_scan(
        &order,
        &ConsignmentCode::new("SO252101009").unwrap(),
        None,
        None,
        true,
    );
    assert!(applied.added);
    assert_eq!(applied.receipt.to_string(), "1/2");
    let progress = session.progress(&order);
    assert_eq!(progress.state, SoState::Partial);
    assert_eq!(session.summary().scanned, 1);
    assert_eq!(session.summary().complete, 0);
    assert_eq!(session.run_progress()[0].scanned, 1);
}

#[test]
fn oversized_orders_are_scannable_to_the_last_code() {
    let mut session = loaded(vec![row("R1", "D1", "SO11111111", 1000.0, 0.0, 0.0, "")]);
    let order = so("SO11111111");
    assert_eq!(session.manifest().expected_count(&order), 999);
    assert!(session.handle_scan("SO11111111999").is_accepted());
    assert!(matches!(
        session.handle_scan("SO111111111000"),
        ScanOutcome::NotFound { .. }
    ));
}

#[test]
fn notes_are_pruned_when_rows_disappear() {
    let mut session = loaded(vec![
        row("R1", "D1", "SO10000000", 1.0, 0.0, 0.0, ""),
        row("R1", "D2", "SO10000001", 1.0, 0.0, 0.0, ""),
    ]);
    assert!(session.set_note(1, "  left at door "));
    assert_eq!(session.note(1), Some("left at door"));
    assert!(!session.set_note(5, "nope"));
    session.load_table(
        ManifestTable::new(header(), vec![row("R1", "D1", "SO10000000", 1.0, 0.0, 0.0, "")]),
        Vec::new(),
    );
    assert_eq!(session.note(1), None);
}

#[test]
fn clear_resets_everything_but_the_schedule() {
    let mut session = loaded(vec![row("R1", "D1", "SO10000000", 1.0, 0.0, 0.0, "")]);
    session.handle_scan("SO10000000001");
    session.set_note(0, "fragile");
    session.clear();
    assert!(!session.has_local_work());
    assert!(session.manifest().is_empty());
    assert!(session.notes().is_empty());
    assert_eq!(session.route_status(), &RouteStatus::Idle);
    assert!(session.take_dirty());
    assert!(!session.take_dirty());
}

#[test]
fn run_progress_and_summary() {
    let mut session = loaded(vec![
        row("r10", "1", "SO10000000", 1.0, 0.0, 0.0, "12.5 kg"),
        row("R2", "1", "SO10000001", 2.0, 1.0, 0.0, "3kg"),
        row("R2", "2", "SO10000002", 1.0, 0.0, 0.0, "4"),
        row("R2", "2", "SO10000003", 0.0, 0.0, 0.0, ""),
    ]);
    session.handle_scan("SO10000001001");
    let runs = session.run_progress();
    let names: Vec<&str> = runs.iter().map(|run| run.run.as_str()).collect();
    assert_eq!(names, vec!["R2", "R10"]);
    assert_eq!((runs[0].total, runs[0].scanned), (4, 1));
    assert_eq!(runs[0].tile(), TileState::Partial);
    assert_eq!(runs[1].tile(), TileState::Idle);

    let summary = session.run_summary("r2");
    assert_eq!(summary.drops, 2);
    assert_eq!(summary.fp, 3);
    assert!((summary.weight - 7.0).abs() < f64::EPSILON);

    let totals = session.summary();
    assert_eq!(totals.rows, 4);
    assert_eq!(totals.orders, 4);
    assert_eq!(totals.expected, 5);
    assert_eq!(totals.scanned, 1);
    assert_eq!(totals.complete, 0);
}

#[test]
fn snapshot_restores_and_rederives() {
    let mut session = loaded(vec![row("R1", "D1", "SO10000000", 2.0, 0.0, 0.0, "")]);
    session.handle_scan("SO10000000001");
    session.set_note(0, "call ahead");
    let json = serde_json::to_string(&session.snapshot()).unwrap();
    let snapshot: SessionSnapshot = serde_json::from_str(&json).unwrap();
    let restored = ManifestSession::from_snapshot(
        DepotId::new("north").unwrap(),
        ColumnLayout::default(),
        ScanOptions::default(),
        snapshot,
    );
    assert_eq!(restored.manifest(), session.manifest());
    assert_eq!(restored.scanned(), session.scanned());
    assert_eq!(restored.note(0), Some("call ahead"));
}

#[test]
fn autoscan_submits_after_quiet_period() {
    let mut session = loaded(vec![row("R1", "D1", "SO10000000", 1.0, 0.0, 0.0, "")]);
    let start = Instant::now();
    assert_eq!(
        session.on_input("SO10000000001", start),
        InputDecision::Submit("SO10000000001".into())
    );
    assert!(matches!(
        session.on_input("SO100000000019", start),
        InputDecision::Scheduled(_)
    ));
    assert!(session.poll_autoscan(start).is_none());
    let fired = session
        .poll_autoscan(start + Duration::from_millis(500))
        .unwrap();
    assert!(matches!(fired, ScanOutcome::NotFound { .. }));
    assert!(session.autoscan_deadline().is_none());
}
