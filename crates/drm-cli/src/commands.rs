use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info, info_span, warn};

use drm_core::{ManifestSession, MarkOutcome, ScanOutcome, SessionSnapshot, orders_by_run, run_key};
use drm_ingest::{IngestError, parse_schedule, read_manifest_csv, schedule_from_runsheet};
use drm_model::{DepotId, SalesOrder};
use drm_persistence::{StationCache, load_cache, save_cache};
use drm_report::{CompletionReport, build_report, write_report_csv};
use drm_sync::{
    ClearReport, FileManifestStore, HydrateOutcome, JsonlScanLog, PushReport, ScanSync, Station,
    StationCommand, StationEvent, hydrate_session, push_manifest,
};

use crate::cli::{
    ClearArgs, NoteArgs, PullArgs, PushArgs, ReportArgs, RowArgs, ScanArgs, SheetArgs,
    StatusArgs, UploadArgs,
};
use crate::config::StationConfig;
use crate::summary::print_station_event;
use crate::types::{
    DeriveResult, OrderLine, ReportResult, ScanTally, ScheduleLine, StatusResult, UploadResult,
};

/// Depot-bound view of the configuration shared by every command.
#[derive(Debug, Clone)]
pub struct StationContext {
    pub config: StationConfig,
    pub depot_id: DepotId,
}

impl StationContext {
    pub fn new(config: StationConfig) -> Result<Self> {
        let depot_id = config.depot()?;
        Ok(Self { config, depot_id })
    }

    /// Restore the station's session; a cache written for another depot is ignored.
    pub fn load_session(&self) -> ManifestSession {
        let cache = load_cache(&self.config.state_path);
        let snapshot = match &cache.depot_id {
            Some(depot) if depot != &self.depot_id => {
                warn!(
                    cached = %depot,
                    depot_id = %self.depot_id,
                    "station cache belongs to another depot; starting empty"
                );
                SessionSnapshot::default()
            }
            _ => cache.session,
        };
        ManifestSession::from_snapshot(
            self.depot_id.clone(),
            self.config.layout,
            self.config.scan_options(),
            snapshot,
        )
    }

    pub fn save_session(&self, session: &ManifestSession) -> Result<()> {
        let path = &self.config.state_path;
        let mut cache = StationCache::new(self.depot_id.clone(), session.snapshot());
        save_cache(&mut cache, path)
            .with_context(|| format!("save station state to {}", path.display()))
    }

    pub fn scan_sync(&self) -> Result<ScanSync<JsonlScanLog>> {
        let log = JsonlScanLog::new(&self.config.scan_log_path);
        Ok(ScanSync::new(log, self.depot_id.clone(), self.config.origin()?)
            .with_backlog_limit(self.config.backlog_limit))
    }

    pub fn manifest_store(&self) -> FileManifestStore {
        FileManifestStore::new(&self.config.manifest_store_path)
    }
}

pub fn run_derive(ctx: &StationContext, args: &SheetArgs) -> Result<DeriveResult> {
    let sheet = read_manifest_csv(&args.file).context("read runsheet")?;
    let file = sheet.meta.name.clone();
    let sha256 = sheet.meta.sha256.clone();
    let mut session = ManifestSession::new(
        ctx.depot_id.clone(),
        ctx.config.layout,
        ctx.config.scan_options(),
    );
    session.load_table(sheet.table, vec![sheet.meta]);
    let manifest = session.manifest();
    let mut orders: Vec<&SalesOrder> = manifest.row_lookup.keys().collect();
    orders.sort_by_key(|so| manifest.first_row(so));
    let orders = orders
        .into_iter()
        .map(|so| OrderLine::of(&session, so))
        .collect();
    Ok(DeriveResult {
        file,
        sha256,
        summary: session.summary(),
        orders,
    })
}

pub fn run_upload(ctx: &StationContext, args: &UploadArgs) -> Result<Vec<UploadResult>> {
    let mut session = ctx.load_session();
    let mut results = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let sheet = read_manifest_csv(path)
            .with_context(|| format!("read runsheet {}", path.display()))?;
        let file = sheet.meta.name.clone();
        let merge = session.merge_upload(&sheet.table, &[sheet.meta]);
        info!(
            file = %file,
            added_rows = merge.added_rows,
            total_rows = merge.total_rows,
            "merged runsheet"
        );
        results.push(UploadResult { file, merge });
    }
    ctx.save_session(&session)?;
    Ok(results)
}

pub async fn run_push(ctx: &StationContext, args: &PushArgs) -> Result<Vec<PushReport>> {
    let sheet = read_manifest_csv(&args.file).context("read runsheet")?;
    let depots = args
        .depots
        .iter()
        .map(|depot| DepotId::new(depot).with_context(|| format!("invalid depot {depot:?}")))
        .collect::<Result<Vec<_>>>()?;
    let store = ctx.manifest_store();
    let reports = push_manifest(
        &store,
        &depots,
        &sheet.table,
        &[sheet.meta],
        &ctx.config.layout,
        ctx.config.pushed_by(),
    )
    .await
    .context("push manifest")?;
    Ok(reports)
}

pub async fn run_pull(ctx: &StationContext, args: &PullArgs) -> Result<HydrateOutcome> {
    let mut session = ctx.load_session();
    let store = ctx.manifest_store();
    let outcome = hydrate_session(&mut session, &store, !args.force)
        .await
        .context("load stored manifest")?;
    if matches!(outcome, HydrateOutcome::Loaded { .. }) {
        ctx.save_session(&session)?;
    }
    Ok(outcome)
}

/// Run a station over the given codes or stdin, printing each outcome.
pub async fn run_scan(ctx: &StationContext, args: &ScanArgs) -> Result<ScanTally> {
    let session = ctx.load_session();
    let sync = ctx.scan_sync()?;
    let span = info_span!("station", depot_id = %ctx.depot_id, origin_id = %sync.origin_id());
    let station = Station::new(session, sync).with_cache_path(&ctx.config.state_path);

    let (command_tx, command_rx) = mpsc::channel(64);
    let (event_tx, mut event_rx) = mpsc::channel(64);
    let handle = tokio::spawn(station.run(command_rx, event_tx).instrument(span));
    let feeder = tokio::spawn(feed_commands(
        command_tx,
        args.codes.clone(),
        args.autoscan,
        ctx.config.scan_options().autoscan_delay,
    ));

    let mut tally = ScanTally::default();
    while let Some(event) = event_rx.recv().await {
        tally.record(&event);
        print_station_event(&event);
    }
    if let Err(error) = feeder.await.context("input task failed")? {
        warn!(error = %error, "stopped reading input");
    }
    let session = handle.await.context("station task failed")?;
    debug!(scanned = session.summary().scanned, "station finished");
    Ok(tally)
}

async fn feed_commands(
    commands: mpsc::Sender<StationCommand>,
    codes: Vec<String>,
    autoscan: bool,
    delay: std::time::Duration,
) -> std::io::Result<()> {
    let wrap = |value: String| {
        if autoscan {
            StationCommand::Input(value)
        } else {
            StationCommand::Submit(value)
        }
    };
    if codes.is_empty() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if commands.send(wrap(line)).await.is_err() {
                return Ok(());
            }
        }
    } else {
        for code in codes {
            if commands.send(wrap(code)).await.is_err() {
                return Ok(());
            }
        }
    }
    if autoscan {
        // let a pending autoscan fire before stopping
        tokio::time::sleep(delay * 2).await;
    }
    let _ = commands.send(StationCommand::Shutdown).await;
    Ok(())
}

impl ScanTally {
    fn record(&mut self, event: &StationEvent) {
        match event {
            StationEvent::Scan(ScanOutcome::Accepted(_))
            | StationEvent::Mark(MarkOutcome::Marked(_)) => self.accepted += 1,
            StationEvent::Scan(ScanOutcome::Duplicate(_)) => self.duplicates += 1,
            StationEvent::Scan(ScanOutcome::TooShort { .. } | ScanOutcome::NotFound { .. }) => {
                self.rejected += 1;
            }
            StationEvent::Remote(_) => self.remote += 1,
            StationEvent::PublishFailed { .. } => self.publish_failures += 1,
            StationEvent::Scan(ScanOutcome::Ignored)
            | StationEvent::Mark(_)
            | StationEvent::SaveFailed { .. } => {}
        }
    }
}

/// Mark the next item of a 1-based row, after catching up with other stations.
pub async fn run_mark(ctx: &StationContext, args: &RowArgs) -> Result<MarkOutcome> {
    let row = data_row(args.row)?;
    let mut session = ctx.load_session();
    let sync = ctx.scan_sync()?;
    if let Err(error) = sync.hydrate_backlog(&mut session).await {
        warn!(error = %error, "could not replay scan backlog");
    }
    let outcome = session.mark_next_for_row(row);
    if let MarkOutcome::Marked(receipt) = &outcome
        && !sync.publish(receipt).await
    {
        warn!(code = %receipt.code, "marked locally only; other stations will not see it");
    }
    ctx.save_session(&session)?;
    Ok(outcome)
}

pub fn run_note(ctx: &StationContext, args: &NoteArgs) -> Result<bool> {
    let row = data_row(args.row)?;
    let mut session = ctx.load_session();
    if !session.set_note(row, &args.text) {
        bail!(
            "row {} does not exist (the manifest has {} rows)",
            args.row,
            session.table().len()
        );
    }
    ctx.save_session(&session)?;
    Ok(!args.text.trim().is_empty())
}

pub fn run_status(ctx: &StationContext, args: &StatusArgs) -> Result<StatusResult> {
    let session = ctx.load_session();
    let Some(run) = &args.run else {
        return Ok(StatusResult::Runs {
            summary: session.summary(),
            runs: session.run_progress(),
        });
    };
    let key = run_key(run);
    let runs = orders_by_run(session.table(), session.layout());
    let Some(orders) = runs.get(&key) else {
        bail!("run {key} is not on the manifest");
    };
    let mut orders: Vec<OrderLine> = orders
        .iter()
        .map(|so| OrderLine::of(&session, so))
        .collect();
    orders.sort_by_key(|line| session.manifest().first_row(&line.so));
    Ok(StatusResult::Run {
        summary: session.run_summary(&key),
        run: key,
        orders,
    })
}

/// Load a production schedule; a runsheet without "Created From" lists its own orders.
pub fn run_schedule(ctx: &StationContext, args: &SheetArgs) -> Result<Vec<ScheduleLine>> {
    let sheet = read_manifest_csv(&args.file).context("read schedule")?;
    let entries = match parse_schedule(&sheet.table) {
        Ok(entries) => entries,
        Err(IngestError::MissingColumn { column }) => {
            info!(column = %column, "no schedule column; listing runsheet orders");
            schedule_from_runsheet(&sheet.table, &ctx.config.layout)
        }
        Err(error) => return Err(error).context("parse schedule"),
    };
    let mut session = ctx.load_session();
    session.set_schedule(entries);
    ctx.save_session(&session)?;
    Ok(session
        .schedule()
        .iter()
        .map(|entry| ScheduleLine {
            entry: entry.clone(),
            order: OrderLine::of(&session, &entry.so),
        })
        .collect())
}

/// Write the report CSV and its JSON envelope.
pub fn run_report(ctx: &StationContext, args: &ReportArgs) -> Result<ReportResult> {
    let session = ctx.load_session();
    let rows = build_report(&session).context("build report")?;
    let report = CompletionReport::new(
        ctx.depot_id.clone(),
        ctx.config.depot_name(),
        rows,
        Utc::now(),
    );
    let csv = args
        .out
        .clone()
        .unwrap_or_else(|| ctx.config.reports_dir.join(&report.filename));
    let envelope = csv.with_extension("json");
    create_parent(&csv)?;
    let file = File::create(&csv).with_context(|| format!("create {}", csv.display()))?;
    write_report_csv(&report.rows, BufWriter::new(file)).context("write report")?;
    let json = serde_json::to_vec_pretty(&report).context("serialize report")?;
    fs::write(&envelope, json).with_context(|| format!("write {}", envelope.display()))?;
    info!(path = %csv.display(), rows = report.rows.len(), "wrote completion report");
    Ok(ReportResult {
        csv,
        envelope,
        rows: report.rows.len(),
        complete: report.complete_rows(),
    })
}

pub async fn run_clear(ctx: &StationContext, args: &ClearArgs) -> Result<ClearReport> {
    if !args.yes {
        bail!("clearing removes every scan of depot {}; pass --yes", ctx.depot_id);
    }
    let mut session = ctx.load_session();
    let sync = ctx.scan_sync()?;
    let store = ctx.manifest_store();
    let report = sync.clear_depot(&mut session, &store).await;
    ctx.save_session(&session)?;
    Ok(report)
}

fn data_row(row: usize) -> Result<usize> {
    match row.checked_sub(1) {
        Some(index) => Ok(index),
        None => bail!("rows are numbered from 1"),
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    Ok(())
}
