// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command implementations.
//!
//! Each command constructs its own service objects (store, engine, monitor)
//! from the resolved state directory and config; nothing lives in module
//! globals. The coordinator is optional everywhere.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};

use sq_core::store::QUEUE_SLOT;
use sq_core::{
    ClockSource, Connectivity, ConnectivityEvent, ConnectivityMonitor, ConnectivityProbe, Field,
    FixedProbe, SqliteSlot, SubmissionStore, SystemClock, TcpProbe,
};
use sq_ipc::{SyncBroadcast, WakeKind};

use crate::config::{queue_db_path, state_dir, Config};
use crate::daemon::{
    detect_coordinator, get_socket_path, spawn_coordinator, stop_coordinator_forcefully,
    CoordinatorClient,
};
use crate::error::{Error, Result};
use crate::notify::{self, Toast};
use crate::sync::{DrainObserver, DrainOutcome, DrainReport, HttpTransport, SyncEngine};

/// Probe refresh cadence inside `watch`.
const WATCH_PROBE_SECS: u64 = 10;

/// Path of the offline-confirmation page served by the coordinator.
const OFFLINE_PAGE_PATH: &str = "/offline-confirmation";

/// Resolved per-invocation context.
pub struct Ctx {
    pub state_dir: PathBuf,
    pub config: Config,
    pub assume_offline: bool,
}

impl Ctx {
    /// Resolve the state directory and load config.
    pub fn resolve(state_dir_flag: Option<String>, assume_offline: bool) -> Result<Self> {
        let dir = state_dir_flag.map(PathBuf::from).unwrap_or_else(state_dir);
        let config = Config::load(&dir)?;
        Ok(Ctx { state_dir: dir, config, assume_offline })
    }

    fn probe(&self) -> Box<dyn ConnectivityProbe> {
        if self.assume_offline {
            Box::new(FixedProbe(Connectivity::Offline))
        } else {
            Box::new(TcpProbe::new(self.config.probe_addr(), self.config.probe_timeout()))
        }
    }

    fn open_store(&self) -> Result<SubmissionStore<SqliteSlot>> {
        let slot = SqliteSlot::open(&queue_db_path(&self.state_dir), QUEUE_SLOT)?;
        Ok(SubmissionStore::new(slot))
    }

    fn build_engine(&self) -> Result<SyncEngine<HttpTransport, SqliteSlot>> {
        let transport = HttpTransport::new(self.config.server_url.clone())
            .map_err(crate::sync::SyncError::from)?;
        Ok(SyncEngine::new(transport, self.open_store()?, self.config.route_table()))
    }

    /// Connect to the coordinator if one is running.
    fn coordinator(&self) -> Option<CoordinatorClient> {
        let socket = get_socket_path(&self.state_dir);
        if !socket.exists() {
            return None;
        }
        CoordinatorClient::connect(&socket).ok()
    }
}

/// Parse `name=value` field arguments, preserving order.
pub fn parse_fields(args: &[String]) -> Result<Vec<Field>> {
    if args.is_empty() {
        return Err(Error::NoFields);
    }
    args.iter()
        .map(|arg| match arg.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok(Field::new(name.trim(), value))
            }
            _ => Err(Error::InvalidFieldArg(arg.clone())),
        })
        .collect()
}

/// `sendq init`
pub fn init(ctx: Ctx, server_url: Option<String>) -> Result<()> {
    let mut config = ctx.config;
    if let Some(url) = server_url {
        config.server_url = url;
    }
    config.save(&ctx.state_dir)?;
    println!("wrote {}", ctx.state_dir.join("config.toml").display());
    Ok(())
}

/// `sendq submit`
///
/// The submission intercept: online submissions go straight to the server
/// and never touch the queue; offline submissions are recorded for a later
/// drain and the confirmation view is shown.
pub fn submit(ctx: Ctx, target: String, field_args: Vec<String>) -> Result<()> {
    let fields = parse_fields(&field_args)?;
    let captured_at = SystemClock.now();
    let connectivity = ctx.probe().check();

    if connectivity.is_online() {
        submit_online(ctx, &target, fields, captured_at)
    } else {
        submit_offline(ctx, &target, fields, captured_at)
    }
}

fn submit_online(
    ctx: Ctx,
    target: &str,
    fields: Vec<Field>,
    captured_at: DateTime<Utc>,
) -> Result<()> {
    let mut engine = ctx.build_engine()?;
    let accepted = runtime()?.block_on(engine.submit_direct(target, fields, captured_at))?;

    if accepted {
        notify::toast(Toast::Success, &format!("submission delivered to {}", target));
    } else {
        notify::toast(Toast::Warning, "the server rejected the submission");
    }
    let pending = engine.pending_count()?;
    println!("{}", notify::badge(Connectivity::Online, pending));
    Ok(())
}

fn submit_offline(
    ctx: Ctx,
    target: &str,
    fields: Vec<Field>,
    captured_at: DateTime<Utc>,
) -> Result<()> {
    let mut store = ctx.open_store()?;
    let id = store.enqueue(target, fields, captured_at)?;
    tracing::info!("queued {} for {}", id, target);

    notify::toast(
        Toast::Info,
        "submission saved offline; it will sync when the connection is restored",
    );

    // The confirmation view, from the coordinator's cache when available
    if let Some(mut client) = ctx.coordinator() {
        if let Ok(Some(body)) = client.fetch_asset(OFFLINE_PAGE_PATH, true) {
            println!("{}", String::from_utf8_lossy(&body));
        }
        // Make sure a reconnect wakes someone to replay this record
        let _ = client.register_wake(WakeKind::Retry);
    }

    println!("{}", notify::badge(Connectivity::Offline, store.pending_count()?));
    Ok(())
}

/// `sendq status`
pub fn status(ctx: Ctx) -> Result<()> {
    let connectivity = ctx.probe().check();
    let store = ctx.open_store()?;
    println!("{}", notify::badge(connectivity, store.pending_count()?));

    match ctx.coordinator() {
        Some(mut client) => match client.status() {
            Ok(status) => {
                println!(
                    "coordinator: pid {}, up {}s, cache gen {} ({} asset(s)), {} watcher(s)",
                    status.pid,
                    status.uptime_secs,
                    status.cache_generation,
                    status.cached_assets,
                    status.subscribers
                );
            }
            Err(e) => println!("coordinator: unreachable ({})", e),
        },
        None => println!("coordinator: not running"),
    }
    Ok(())
}

/// `sendq sync`
pub fn sync(ctx: Ctx, broadcast: bool) -> Result<()> {
    if broadcast {
        let mut client = ctx.coordinator().ok_or(Error::CoordinatorNotRunning)?;
        let (success, error) = client.sync_now()?;
        if success {
            notify::toast(Toast::Success, "sync requested from all watchers");
        } else {
            notify::toast(
                Toast::Warning,
                &format!("sync request not delivered: {}", error.unwrap_or_default()),
            );
        }
        return Ok(());
    }

    let connectivity = ctx.probe().check();
    let mut engine = ctx.build_engine()?.with_observer(Box::new(ProgressPrinter));
    let outcome = runtime()?.block_on(engine.drain(connectivity))?;
    report_outcome(&outcome);

    register_retry_if_needed(&ctx, &outcome);
    Ok(())
}

/// `sendq compact`
pub fn compact(ctx: Ctx) -> Result<()> {
    let mut store = ctx.open_store()?;
    let before = store.list_all()?.len();
    store.compact()?;
    let after = store.list_all()?.len();
    println!("dropped {} synced record(s), {} pending kept", before - after, after);
    Ok(())
}

/// `sendq daemon start|stop|status`
pub fn daemon_start(ctx: Ctx) -> Result<()> {
    let info = spawn_coordinator(&ctx.state_dir, &ctx.config.server_url)?;
    println!("coordinator running (pid {})", info.pid);
    Ok(())
}

pub fn daemon_stop(ctx: Ctx) -> Result<()> {
    if detect_coordinator(&ctx.state_dir)?.is_none() {
        return Err(Error::CoordinatorNotRunning);
    }
    stop_coordinator_forcefully(&ctx.state_dir)?;
    println!("coordinator stopped");
    Ok(())
}

pub fn daemon_status(ctx: Ctx) -> Result<()> {
    match detect_coordinator(&ctx.state_dir)? {
        Some(info) => {
            println!("coordinator running (pid {})", info.pid);
            Ok(())
        }
        None => {
            println!("coordinator not running");
            Ok(())
        }
    }
}

/// Observer printing the drain progress line.
struct ProgressPrinter;

impl DrainObserver for ProgressPrinter {
    fn drain_started(&self, pending: usize) {
        notify::progress(pending);
    }
}

fn report_outcome(outcome: &DrainOutcome) {
    match outcome {
        DrainOutcome::Completed(report) => report_completed(report),
        DrainOutcome::NothingPending => println!("nothing to sync"),
        DrainOutcome::Skipped(_) => {
            notify::toast(Toast::Warning, "offline; queued submissions are kept for later");
        }
    }
}

/// After a partially-failed drain, ask the coordinator for a retry wake so
/// delivery does not depend on the foreground timer alone.
fn register_retry_if_needed(ctx: &Ctx, outcome: &DrainOutcome) {
    if let DrainOutcome::Completed(DrainReport { failed, .. }) = outcome {
        if *failed > 0 {
            if let Some(mut client) = ctx.coordinator() {
                if client.register_wake(WakeKind::Retry).is_ok() {
                    tracing::debug!("retry wake registered");
                }
            }
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(Error::from)
}

/// `sendq watch`
///
/// The foreground trigger loop. All triggers converge on the engine's
/// single-flight drain: startup (when online), connectivity restoration,
/// the periodic timer (gated on a nonzero pending count), and coordinator
/// broadcasts.
pub fn watch(ctx: Ctx, interval_override: Option<u64>) -> Result<()> {
    let interval = interval_override
        .map(Duration::from_secs)
        .unwrap_or_else(|| ctx.config.sync_interval());

    let mut engine = ctx.build_engine()?.with_observer(Box::new(ProgressPrinter));
    let probe = ctx.probe();
    let mut monitor = ConnectivityMonitor::new(probe);

    println!("{}", notify::badge(monitor.state(), engine.pending_count().unwrap_or(0)));

    // Subscribe to coordinator wakes, and keep the periodic wake registered
    // so the queue drains even when this watcher is the only context.
    let mut broadcast_rx = subscribe_to_coordinator(&ctx);

    runtime()?.block_on(async {
        let mut periodic = tokio::time::interval(interval);
        periodic.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        periodic.tick().await; // first tick fires immediately; consume it

        let mut probe_timer = tokio::time::interval(Duration::from_secs(WATCH_PROBE_SECS));
        probe_timer.tick().await;

        // Page-load trigger: drain at startup when online
        drain_and_report(&ctx, &mut engine, monitor.state()).await;

        loop {
            tokio::select! {
                _ = periodic.tick() => {
                    // Fixed-interval retry, only when something is pending
                    if engine.pending_count().unwrap_or(0) > 0 {
                        drain_and_report(&ctx, &mut engine, monitor.state()).await;
                    }
                }
                _ = probe_timer.tick() => {
                    match monitor.refresh() {
                        Some(ConnectivityEvent::CameOnline) => {
                            notify::toast(
                                Toast::Success,
                                "connection restored; syncing pending submissions",
                            );
                            drain_and_report(&ctx, &mut engine, monitor.state()).await;
                        }
                        Some(ConnectivityEvent::WentOffline) => {
                            notify::toast(
                                Toast::Warning,
                                "you are offline; submissions will be saved locally",
                            );
                            println!(
                                "{}",
                                notify::badge(monitor.state(), engine.pending_count().unwrap_or(0))
                            );
                        }
                        None => {}
                    }
                }
                broadcast = recv_broadcast(&mut broadcast_rx) => {
                    match broadcast {
                        Some(SyncBroadcast::SyncRequested { reason, .. }) => {
                            tracing::info!("coordinator requested sync ({})", reason);
                            drain_and_report(&ctx, &mut engine, monitor.state()).await;
                        }
                        None => {
                            // Coordinator went away; keep running on timers
                            broadcast_rx = None;
                        }
                    }
                }
            }
        }
    })
}

/// Drain once and surface the outcome, registering a retry wake on partial
/// failure.
async fn drain_and_report(
    ctx: &Ctx,
    engine: &mut SyncEngine<HttpTransport, SqliteSlot>,
    connectivity: Connectivity,
) {
    match engine.drain(connectivity).await {
        Ok(outcome) => {
            if let DrainOutcome::Completed(report) = &outcome {
                report_completed(report);
                register_retry_if_needed(ctx, &outcome);
                println!(
                    "{}",
                    notify::badge(connectivity, engine.pending_count().unwrap_or(0))
                );
            }
        }
        Err(e) => {
            // Storage trouble is surfaced immediately, but the loop lives on
            notify::toast(Toast::Warning, &format!("sync failed: {}", e));
        }
    }
}

fn report_completed(report: &DrainReport) {
    if report.succeeded > 0 {
        notify::toast(
            Toast::Success,
            &format!("successfully synced {} submission(s)", report.succeeded),
        );
    }
    if report.failed > 0 {
        notify::toast(
            Toast::Warning,
            &format!("failed to sync {} submission(s); will retry later", report.failed),
        );
    }
}

/// Subscribe to coordinator broadcasts, bridging the blocking socket reads
/// onto a channel the async loop can select on.
fn subscribe_to_coordinator(
    ctx: &Ctx,
) -> Option<tokio::sync::mpsc::UnboundedReceiver<SyncBroadcast>> {
    let mut client = ctx.coordinator()?;
    let _ = client.register_wake(WakeKind::Periodic);

    let subscription = match client.subscribe() {
        Ok(subscription) => subscription,
        Err(e) => {
            tracing::warn!("subscribe failed: {}", e);
            return None;
        }
    };

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let mut subscription = subscription;
        loop {
            match subscription.next() {
                Ok(broadcast) => {
                    if tx.send(broadcast).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!("broadcast stream closed: {}", e);
                    break;
                }
            }
        }
    });

    Some(rx)
}

/// Await the next broadcast, or pend forever when not subscribed.
async fn recv_broadcast(
    rx: &mut Option<tokio::sync::mpsc::UnboundedReceiver<SyncBroadcast>>,
) -> Option<SyncBroadcast> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
