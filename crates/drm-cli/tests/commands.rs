//! End-to-end command tests against a temporary station directory.

use std::fs;
use std::path::{Path, PathBuf};

use drm_cli::cli::{
    ClearArgs, NoteArgs, PullArgs, PushArgs, ReportArgs, RowArgs, ScanArgs, SheetArgs,
    StatusArgs, UploadArgs,
};
use drm_cli::commands::{
    StationContext, run_clear, run_derive, run_mark, run_note, run_pull, run_push, run_report,
    run_scan, run_schedule, run_status, run_upload,
};
use drm_cli::config::StationConfig;
use drm_cli::types::StatusResult;
use drm_core::{MarkOutcome, SoState};
use drm_model::SalesOrder;
use drm_sync::HydrateOutcome;
use tempfile::{TempDir, tempdir};

const RUNSHEET: &str = "\
Run,Drop,Zone,Date,Sales Order,Name,Address,Suburb,Postcode,Ref,FP,CH,FL,Weight,Type
R1,D1,North,2024-05-01,SO20000001,Acme,1 Main St,Springfield,3000,,2,1,0,12.5kg,Std
R1,D2,North,2024-05-01,SO20000002,Beta,2 High St,Springfield,3000,,0,0,0,1kg,Std
,,,,,,,,,,,,,,
R2,D1,South,2024-05-02,so20000001,Acme,9 Dock Rd,Shelbyville,3001,,1,0,0,4,Std
";

fn write_sheet(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn context(dir: &Path, depot: &str, station: &str) -> StationContext {
    let config = StationConfig {
        depot_id: depot.to_string(),
        origin_id: Some(format!("{station}-origin")),
        state_path: dir.join(format!("{station}.json")),
        scan_log_path: dir.join("scans.jsonl"),
        manifest_store_path: dir.join("manifests"),
        reports_dir: dir.join("reports"),
        ..StationConfig::default()
    };
    StationContext::new(config).unwrap()
}

fn uploaded(station: &str) -> (TempDir, StationContext) {
    let dir = tempdir().unwrap();
    let sheet = write_sheet(dir.path(), "runsheet.csv", RUNSHEET);
    let ctx = context(dir.path(), "north", station);
    run_upload(&ctx, &UploadArgs { files: vec![sheet] }).unwrap();
    (dir, ctx)
}

fn scan_args(codes: &[&str]) -> ScanArgs {
    ScanArgs {
        codes: codes.iter().map(ToString::to_string).collect(),
        autoscan: false,
    }
}

#[test]
fn derive_lists_orders_without_touching_state() {
    let dir = tempdir().unwrap();
    let sheet = write_sheet(dir.path(), "runsheet.csv", RUNSHEET);
    let ctx = context(dir.path(), "north", "a");

    let result = run_derive(&ctx, &SheetArgs { file: sheet }).unwrap();

    assert_eq!(result.file, "runsheet.csv");
    assert!(result.sha256.is_some());
    assert_eq!(result.summary.rows, 3);
    assert_eq!(result.summary.expected, 4);
    let orders: Vec<&str> = result.orders.iter().map(|line| line.so.as_str()).collect();
    assert_eq!(orders, ["SO20000001", "SO20000002"]);
    assert_eq!(result.orders[0].rows, 2);
    assert_eq!(result.orders[0].route.drop, "D1");
    assert_eq!(result.orders[1].progress.expected, 0);
    assert!(!ctx.config.state_path.exists());
}

#[test]
fn upload_then_status_reports_runs() {
    let (_dir, ctx) = uploaded("a");

    let StatusResult::Runs { summary, runs } =
        run_status(&ctx, &StatusArgs { run: None }).unwrap()
    else {
        panic!("expected the run overview");
    };
    assert_eq!(summary.rows, 3);
    assert_eq!(summary.orders, 2);
    assert_eq!(summary.scanned, 0);
    let names: Vec<&str> = runs.iter().map(|run| run.run.as_str()).collect();
    assert_eq!(names, ["R1", "R2"]);

    let StatusResult::Run {
        run,
        summary,
        orders,
    } = run_status(
        &ctx,
        &StatusArgs {
            run: Some(" r1 ".to_string()),
        },
    )
    .unwrap()
    else {
        panic!("expected one run");
    };
    assert_eq!(run, "R1");
    assert_eq!(summary.drops, 2);
    assert_eq!(summary.fp, 2);
    assert_eq!(orders.len(), 2);

    assert!(
        run_status(
            &ctx,
            &StatusArgs {
                run: Some("R9".to_string())
            }
        )
        .is_err()
    );
}

#[test]
fn uploading_twice_appends_rows() {
    let (dir, ctx) = uploaded("a");
    let again = write_sheet(dir.path(), "again.csv", RUNSHEET);

    let results = run_upload(&ctx, &UploadArgs { files: vec![again] }).unwrap();

    assert_eq!(results[0].merge.added_rows, 3);
    assert_eq!(results[0].merge.total_rows, 6);
    let so = SalesOrder::new("SO20000001").unwrap();
    assert_eq!(ctx.load_session().manifest().expected_count(&so), 8);
}

#[tokio::test]
async fn scanning_publishes_and_persists() {
    let (dir, ctx) = uploaded("a");

    let tally = run_scan(
        &ctx,
        &scan_args(&[
            "so20000001001",
            "SO20000001001",
            "SO20000001999",
            "short",
        ]),
    )
    .await
    .unwrap();

    assert_eq!(tally.accepted, 1);
    assert_eq!(tally.duplicates, 1);
    assert_eq!(tally.rejected, 2);
    assert_eq!(tally.publish_failures, 0);
    assert_eq!(ctx.load_session().summary().scanned, 1);
    let log = fs::read_to_string(dir.path().join("scans.jsonl")).unwrap();
    assert_eq!(log.lines().count(), 1);
}

#[tokio::test]
async fn marking_catches_up_with_other_stations() {
    let (dir, first) = uploaded("a");
    run_scan(&first, &scan_args(&["SO20000001001"])).await.unwrap();

    let second = context(dir.path(), "north", "b");
    let sheet = dir.path().join("runsheet.csv");
    run_upload(&second, &UploadArgs { files: vec![sheet] }).unwrap();

    let outcome = run_mark(&second, &RowArgs { row: 1 }).await.unwrap();
    let MarkOutcome::Marked(receipt) = outcome else {
        panic!("expected a mark, got {outcome:?}");
    };
    assert_eq!(receipt.code.as_str(), "SO20000001002");
    assert_eq!(receipt.scanned, 2);

    let outcome = run_mark(&second, &RowArgs { row: 2 }).await.unwrap();
    assert!(matches!(outcome, MarkOutcome::NothingExpected { .. }));
    assert!(run_mark(&second, &RowArgs { row: 0 }).await.is_err());
}

#[test]
fn notes_land_in_the_report() {
    let (dir, ctx) = uploaded("a");
    let saved = run_note(
        &ctx,
        &NoteArgs {
            row: 1,
            text: "Leave at gate".to_string(),
        },
    )
    .unwrap();
    assert!(saved);
    assert!(
        run_note(
            &ctx,
            &NoteArgs {
                row: 9,
                text: "nowhere".to_string()
            }
        )
        .is_err()
    );

    let out = dir.path().join("out").join("final.csv");
    let result = run_report(&ctx, &ReportArgs { out: Some(out.clone()) }).unwrap();

    assert_eq!(result.rows, 3);
    assert_eq!(result.complete, 0);
    let csv = fs::read_to_string(&out).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().ends_with("Notes,Status"));
    assert!(lines.next().unwrap().ends_with("Leave at gate,Not Complete"));
    assert!(result.envelope.exists());
    let envelope = fs::read_to_string(&result.envelope).unwrap();
    assert!(envelope.contains("\"kind\": \"final\""));
}

#[test]
fn report_defaults_to_reports_dir() {
    let (_dir, ctx) = uploaded("a");
    let result = run_report(&ctx, &ReportArgs { out: None }).unwrap();
    assert!(result.csv.starts_with(&ctx.config.reports_dir));
    let name = result.csv.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("final_north_"));
}

#[tokio::test]
async fn push_then_pull_prefers_local_work() {
    let dir = tempdir().unwrap();
    let sheet = write_sheet(dir.path(), "runsheet.csv", RUNSHEET);
    let admin = context(dir.path(), "north", "admin");

    let reports = run_push(
        &admin,
        &PushArgs {
            file: sheet,
            depots: vec!["north".to_string(), "south".to_string()],
        },
    )
    .await
    .unwrap();
    assert_eq!(reports.len(), 2);
    assert!(reports.iter().all(|report| !report.merged));

    let station = context(dir.path(), "north", "a");
    let outcome = run_pull(&station, &PullArgs { force: false }).await.unwrap();
    assert_eq!(outcome, HydrateOutcome::Loaded { rows: 3 });
    let outcome = run_pull(&station, &PullArgs { force: false }).await.unwrap();
    assert_eq!(outcome, HydrateOutcome::KeptLocal);

    let elsewhere = context(dir.path(), "west", "c");
    let outcome = run_pull(&elsewhere, &PullArgs { force: true }).await.unwrap();
    assert_eq!(outcome, HydrateOutcome::NoRemote);
}

#[test]
fn schedule_falls_back_to_runsheet_orders() {
    let (dir, ctx) = uploaded("a");

    let lines = run_schedule(
        &ctx,
        &SheetArgs {
            file: dir.path().join("runsheet.csv"),
        },
    )
    .unwrap();
    assert_eq!(lines.len(), 3);

    let schedule = write_sheet(
        dir.path(),
        "schedule.csv",
        "Job,Created From\n1,from so20000002 (rush)\n2,SO20000002 again\n3,none\n",
    );
    let lines = run_schedule(&ctx, &SheetArgs { file: schedule }).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].order.so.as_str(), "SO20000002");
    assert_eq!(lines[0].order.progress.state, SoState::NotStarted);
    assert_eq!(ctx.load_session().schedule().len(), 1);
}

#[tokio::test]
async fn clear_needs_confirmation() {
    let (_dir, ctx) = uploaded("a");
    run_scan(&ctx, &scan_args(&["SO20000001001"])).await.unwrap();

    assert!(run_clear(&ctx, &ClearArgs { yes: false }).await.is_err());
    assert_eq!(ctx.load_session().table().len(), 3);

    let report = run_clear(&ctx, &ClearArgs { yes: true }).await.unwrap();
    assert_eq!(report.scans_removed, Some(1));
    let session = ctx.load_session();
    assert!(session.table().is_empty());
    assert_eq!(session.summary().scanned, 0);
}

#[test]
fn cache_of_another_depot_is_ignored() {
    let (dir, _north) = uploaded("a");
    let south = context(dir.path(), "south", "a");
    assert!(south.load_session().table().is_empty());
}
