use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use drm_core::{MarkOutcome, NoticeLevel, RunProgress, SessionSummary, SoState, TileState};
use drm_sync::{ClearReport, HydrateOutcome, PushReport, StationEvent};

use crate::types::{
    DeriveResult, OrderLine, ReportResult, ScanTally, ScheduleLine, StatusResult, UploadResult,
};

pub fn print_derive(result: &DeriveResult) {
    println!("File: {}", result.file);
    if let Some(digest) = &result.sha256 {
        println!("SHA-256: {digest}");
    }
    print_session_summary(&result.summary);
    println!("{}", order_table(&result.orders));
}

pub fn print_uploads(results: &[UploadResult]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Added rows"),
        header_cell("Total rows"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for result in results {
        table.add_row(vec![
            Cell::new(&result.file),
            Cell::new(result.merge.added_rows),
            Cell::new(result.merge.total_rows),
        ]);
    }
    println!("{table}");
}

pub fn print_pushes(reports: &[PushReport]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Depot"),
        header_cell("Merged"),
        header_cell("Rows"),
        header_cell("Expected"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Center);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for report in reports {
        table.add_row(vec![
            Cell::new(report.depot.as_str())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            if report.merged {
                Cell::new("✓").fg(Color::Green)
            } else {
                dim_cell("-")
            },
            Cell::new(report.total_rows),
            Cell::new(report.expected_codes),
        ]);
    }
    println!("{table}");
}

pub fn print_pull(outcome: HydrateOutcome) {
    match outcome {
        HydrateOutcome::KeptLocal => {
            println!("Kept the local manifest (it has rows or scans); use --force to replace it.");
        }
        HydrateOutcome::NoRemote => println!("No stored manifest for this depot."),
        HydrateOutcome::Loaded { rows } => println!("Loaded {rows} rows from the stored manifest."),
    }
}

pub fn print_station_event(event: &StationEvent) {
    match event {
        StationEvent::Scan(outcome) => {
            if let Some((level, message)) = outcome.notice() {
                print_notice(level, &message);
            }
        }
        StationEvent::Mark(outcome) => print_mark(outcome),
        StationEvent::Remote(applied) => {
            let receipt = &applied.receipt;
            println!(
                "remote: {} {} (run {}, drop {})",
                receipt.code, receipt, receipt.route.run, receipt.route.drop
            );
        }
        StationEvent::PublishFailed { code } => {
            eprintln!("warning: {code} was not shared with other stations");
        }
        StationEvent::SaveFailed { message } => eprintln!("warning: {message}"),
    }
}

pub fn print_scan_tally(tally: &ScanTally) {
    println!(
        "{} accepted, {} already scanned, {} rejected, {} from other stations",
        tally.accepted, tally.duplicates, tally.rejected, tally.remote
    );
    if tally.publish_failures > 0 {
        eprintln!(
            "warning: {} scans were recorded locally only",
            tally.publish_failures
        );
    }
}

pub fn print_mark(outcome: &MarkOutcome) {
    match outcome {
        MarkOutcome::RowNotFound { row } => eprintln!("Row {} does not exist.", row + 1),
        MarkOutcome::NoSalesOrder { row } => eprintln!("Row {} has no sales order.", row + 1),
        MarkOutcome::NothingExpected { so } => eprintln!("{so} has no items to scan."),
        MarkOutcome::AlreadyComplete(receipt) => {
            print_notice(
                NoticeLevel::Info,
                &format!("All items of {} are already scanned ({receipt}).", receipt.so),
            );
        }
        MarkOutcome::Marked(receipt) => print_notice(
            NoticeLevel::Success,
            &format!("Marked {} ({receipt}) for {}.", receipt.code, receipt.so),
        ),
    }
}

pub fn print_status(result: &StatusResult) {
    match result {
        StatusResult::Runs { summary, runs } => {
            print_session_summary(summary);
            println!("{}", run_table(runs));
        }
        StatusResult::Run {
            run,
            summary,
            orders,
        } => {
            println!(
                "Run {run}: {} drops, {} FP, {:.1} kg",
                summary.drops, summary.fp, summary.weight
            );
            println!("{}", order_table(orders));
        }
    }
}

pub fn print_schedule(lines: &[ScheduleLine]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Created From"),
        header_cell("Sales Order"),
        header_cell("Run"),
        header_cell("Drop"),
        header_cell("Scanned"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    for line in lines {
        table.add_row(vec![
            Cell::new(&line.entry.created_from),
            Cell::new(line.entry.so.as_str()),
            Cell::new(&line.order.route.run),
            Cell::new(&line.order.route.drop),
            progress_cell(&line.order),
        ]);
    }
    println!("{table}");
}

pub fn print_report(result: &ReportResult) {
    println!("Report: {}", result.csv.display());
    println!("Envelope: {}", result.envelope.display());
    println!("{} of {} rows complete", result.complete, result.rows);
}

pub fn print_clear(report: &ClearReport) {
    match report.scans_removed {
        Some(count) => println!("Removed {count} shared scans."),
        None => eprintln!("warning: shared scans could not be cleared"),
    }
    if !report.manifest_cleared {
        eprintln!("warning: stored manifest could not be cleared");
    }
    println!("Local manifest and scans cleared.");
}

fn print_session_summary(summary: &SessionSummary) {
    println!(
        "{} rows, {} orders, {}/{} items scanned, {} orders complete",
        summary.rows, summary.orders, summary.scanned, summary.expected, summary.complete
    );
}

fn print_notice(level: NoticeLevel, message: &str) {
    match level {
        NoticeLevel::Success => println!("✓ {message}"),
        NoticeLevel::Info => println!("• {message}"),
        NoticeLevel::Error => eprintln!("✗ {message}"),
    }
}

fn run_table(runs: &[RunProgress]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Run"),
        header_cell("Orders"),
        header_cell("Scanned"),
        header_cell("Total"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for run in runs {
        let color = match run.tile() {
            TileState::Complete => Color::Green,
            TileState::Partial => Color::Yellow,
            TileState::Idle => Color::DarkGrey,
        };
        table.add_row(vec![
            Cell::new(&run.run).fg(color).add_attribute(Attribute::Bold),
            Cell::new(run.orders),
            Cell::new(run.scanned).fg(color),
            Cell::new(run.total),
        ]);
    }
    table
}

fn order_table(orders: &[OrderLine]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Sales Order"),
        header_cell("Run"),
        header_cell("Drop"),
        header_cell("Rows"),
        header_cell("Scanned"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for order in orders {
        table.add_row(vec![
            Cell::new(order.so.as_str())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&order.route.run),
            Cell::new(&order.route.drop),
            Cell::new(order.rows),
            progress_cell(order),
        ]);
    }
    table
}

fn progress_cell(order: &OrderLine) -> Cell {
    let progress = &order.progress;
    if progress.expected == 0 {
        return dim_cell("no items");
    }
    let text = format!("{}/{}", progress.scanned, progress.expected);
    match progress.state {
        SoState::Complete => Cell::new(text)
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        SoState::Partial => Cell::new(text).fg(Color::Yellow),
        SoState::NotStarted => dim_cell(text),
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
