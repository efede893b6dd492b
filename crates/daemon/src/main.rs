// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! sendqd - The sendq background coordinator.
//!
//! Runs independently of any foreground `sendq` process. Serves cached
//! static assets, tracks server reachability, and wakes subscribed
//! foreground contexts to retry synchronization. Listens on a Unix socket
//! for IPC from `sendq` CLI processes.
//!
//! Usage:
//!   sendqd --state-dir <path> [--server-url <url>]

use std::fs;
use std::io::Write;
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

mod cache;
mod env;
mod hub;

use cache::{cache_root, AssetCache, HttpOrigin};
use hub::Hub;
use sq_core::{ConnectivityProbe, TcpProbe};
use sq_ipc::{framing, CoordinatorRequest, CoordinatorResponse, CoordinatorStatus, SyncReason};

/// Socket filename within the state directory.
const SOCKET_NAME: &str = "coordinator.sock";
/// PID filename within the state directory.
const PID_NAME: &str = "coordinator.pid";
/// Lock filename for single instance guarantee.
const LOCK_NAME: &str = "coordinator.lock";

/// Default server base URL when not configured.
const DEFAULT_SERVER_URL: &str = "http://localhost:8000";
/// Reachability probe cadence for the wake thread.
const PROBE_INTERVAL: Duration = Duration::from_secs(15);
/// Probe connect timeout.
const PROBE_TIMEOUT: Duration = Duration::from_millis(1500);
/// Periodic wake cadence.
const PERIODIC_WAKE_INTERVAL: Duration = Duration::from_secs(300);

fn main() {
    // Parse args
    let args: Vec<String> = std::env::args().collect();
    let state_dir = parse_state_dir(&args);
    let server_url = parse_server_url(&args);

    if let Err(e) = fs::create_dir_all(&state_dir) {
        eprintln!("failed to create state dir {}: {}", state_dir.display(), e);
        std::process::exit(1);
    }

    // Set up logging
    let log_path = state_dir.join("coordinator.log");
    setup_logging(&log_path);

    tracing::info!(
        "sendqd starting, state_dir={}, server_url={}",
        state_dir.display(),
        server_url
    );

    // Acquire file lock for single instance
    let lock_path = state_dir.join(LOCK_NAME);
    let lock_file = match acquire_lock(&lock_path) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("failed to acquire lock: {}", e);
            std::process::exit(1);
        }
    };

    // Install and activate the asset cache before accepting traffic
    let origin = match HttpOrigin::new(server_url.clone()) {
        Ok(o) => o,
        Err(e) => {
            tracing::error!("failed to create asset origin: {}", e);
            std::process::exit(1);
        }
    };
    let mut cache = AssetCache::new(
        origin,
        cache_root(&state_dir),
        env!("CARGO_PKG_VERSION"),
    );

    tracing::info!("lifecycle: {}", cache.lifecycle().as_str());
    match cache.install() {
        Ok(count) => tracing::info!("precached {} asset(s)", count),
        Err(e) => tracing::warn!("cache install incomplete: {}", e),
    }
    tracing::info!("lifecycle: {}", cache.lifecycle().as_str());
    match cache.activate() {
        Ok(removed) if removed > 0 => {
            tracing::info!("discarded {} stale cache generation(s)", removed);
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("cache activation incomplete: {}", e),
    }
    tracing::info!("lifecycle: {}", cache.lifecycle().as_str());

    // Write PID file
    let pid_path = state_dir.join(PID_NAME);
    if let Err(e) = write_pid_file(&pid_path) {
        tracing::error!("failed to write PID file: {}", e);
        std::process::exit(1);
    }

    // Bind Unix socket, taking control from any stale instance
    let socket_path = state_dir.join(SOCKET_NAME);
    let _ = fs::remove_file(&socket_path);

    let listener = match UnixListener::bind(&socket_path) {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("failed to bind socket: {}", e);
            cleanup(&pid_path, &socket_path);
            std::process::exit(1);
        }
    };

    tracing::info!("listening on {}", socket_path.display());

    let probe = TcpProbe::new(probe_addr(&server_url), PROBE_TIMEOUT);
    let hub = Arc::new(Hub::new(probe.check(), PERIODIC_WAKE_INTERVAL));

    // Wake thread: re-probe reachability and fire due wakes. The thread is
    // detached; it dies with the process.
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let hub = Arc::clone(&hub);
        let shutdown = Arc::clone(&shutdown);
        std::thread::spawn(move || {
            while !shutdown.load(Ordering::SeqCst) {
                std::thread::sleep(PROBE_INTERVAL);
                if shutdown.load(Ordering::SeqCst) {
                    break;
                }
                hub.tick(probe.check());
            }
        });
    }

    // Signal readiness to parent process
    println!("READY");
    // Flush stdout so parent sees READY immediately
    let _ = std::io::stdout().flush();

    let start_time = Instant::now();

    // Accept connections
    'accept: for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
                let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));

                // A connection carries requests until the peer closes it, or
                // upgrades itself into a broadcast subscription.
                loop {
                    match framing::read_message::<_, CoordinatorRequest>(&mut stream) {
                        Ok(CoordinatorRequest::Subscribe) => {
                            let _ = framing::write_message(
                                &mut stream,
                                &CoordinatorResponse::Subscribed,
                            );
                            // Broadcast frames are pushed whenever a wake
                            // fires; no deadline on the retained stream.
                            let _ = stream.set_write_timeout(None);
                            hub.adopt(stream);
                            break;
                        }
                        Ok(request) => {
                            let response = handle_request(request, &start_time, &cache, &hub);
                            let should_shutdown =
                                matches!(response, CoordinatorResponse::ShuttingDown);
                            let _ = framing::write_message(&mut stream, &response);
                            if should_shutdown {
                                tracing::info!("shutting down");
                                break 'accept;
                            }
                        }
                        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                            // Peer closed the connection
                            break;
                        }
                        Err(e) => {
                            tracing::warn!("failed to read request: {}", e);
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                tracing::warn!("failed to accept connection: {}", e);
            }
        }
    }

    // Cleanup
    shutdown.store(true, Ordering::SeqCst);
    cleanup(&pid_path, &socket_path);
    drop(lock_file);
    tracing::info!("sendqd stopped");
}

fn handle_request(
    request: CoordinatorRequest,
    start_time: &Instant,
    cache: &AssetCache<HttpOrigin>,
    hub: &Hub,
) -> CoordinatorResponse {
    match request {
        CoordinatorRequest::Ping => CoordinatorResponse::Pong,
        CoordinatorRequest::Status => {
            let pid = std::process::id();
            let uptime_secs = start_time.elapsed().as_secs();
            CoordinatorResponse::Status(CoordinatorStatus::new(
                pid,
                uptime_secs,
                cache.generation().to_string(),
                cache.asset_count(),
                hub.subscriber_count(),
            ))
        }
        CoordinatorRequest::Shutdown => CoordinatorResponse::ShuttingDown,
        CoordinatorRequest::Hello { version: _ } => CoordinatorResponse::Hello {
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        CoordinatorRequest::SyncNow => {
            let reached = hub.broadcast(SyncReason::Requested);
            if reached > 0 {
                CoordinatorResponse::SyncResult { success: true, error: None }
            } else {
                CoordinatorResponse::SyncResult {
                    success: false,
                    error: Some("no subscribed foreground contexts".to_string()),
                }
            }
        }
        CoordinatorRequest::RegisterWake { kind } => {
            hub.register(kind);
            CoordinatorResponse::WakeRegistered { kind }
        }
        // Subscribe is handled in the accept loop; reaching it here means the
        // connection was not upgradable.
        CoordinatorRequest::Subscribe => CoordinatorResponse::Error {
            message: "subscribe must be the first request on a connection".to_string(),
        },
        CoordinatorRequest::FetchAsset { path, navigation } => {
            CoordinatorResponse::Asset { body: cache.fetch(&path, navigation) }
        }
    }
}

fn parse_state_dir(args: &[String]) -> PathBuf {
    for i in 0..args.len() {
        if args[i] == "--state-dir" {
            if let Some(dir) = args.get(i + 1) {
                return PathBuf::from(dir);
            }
        }
    }
    // Default to XDG state directory
    if let Some(dir) = env::state_dir() {
        return dir;
    }
    if let Some(dir) = env::xdg_state_home() {
        return dir.join("sendq");
    }
    dirs::home_dir()
        .map(|h| h.join(".local/state/sendq"))
        .unwrap_or_else(|| PathBuf::from(".local/state/sendq"))
}

fn parse_server_url(args: &[String]) -> String {
    for i in 0..args.len() {
        if args[i] == "--server-url" {
            if let Some(url) = args.get(i + 1) {
                return url.clone();
            }
        }
    }
    env::server_url().unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
}

/// Extract `host:port` from the server URL for the TCP probe.
fn probe_addr(server_url: &str) -> String {
    let stripped = server_url
        .trim_start_matches("http://")
        .trim_start_matches("https://");
    let host = stripped.split('/').next().unwrap_or(stripped);
    if host.contains(':') {
        host.to_string()
    } else if server_url.starts_with("https://") {
        format!("{}:443", host)
    } else {
        format!("{}:80", host)
    }
}

fn setup_logging(log_path: &Path) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Try to open log file, fall back to stderr
    if let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn acquire_lock(lock_path: &Path) -> std::io::Result<fs::File> {
    use fs2::FileExt;

    let file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(lock_path)?;
    file.try_lock_exclusive()
        .map_err(|_| std::io::Error::other("another coordinator instance is already running"))?;
    Ok(file)
}

fn write_pid_file(pid_path: &Path) -> std::io::Result<()> {
    fs::write(pid_path, format!("{}", std::process::id()))
}

fn cleanup(pid_path: &Path, socket_path: &Path) {
    let _ = fs::remove_file(pid_path);
    let _ = fs::remove_file(socket_path);
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
