// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Coordinator lifecycle management: spawn, detect, cleanup.
//!
//! The coordinator (sendqd) is spawned as a background process and
//! communicates via Unix socket. PID and socket files are stored in the
//! state directory.

use std::fs;
use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::error::{Error, Result};

use sq_ipc::{framing, CoordinatorRequest, CoordinatorResponse};

/// Socket filename within the state directory.
const SOCKET_NAME: &str = "coordinator.sock";
/// PID filename within the state directory.
const PID_NAME: &str = "coordinator.pid";

/// Information about a running coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorInfo {
    /// Process ID of the coordinator.
    pub pid: u32,
}

/// Get the socket path for the given state directory.
pub fn get_socket_path(state_dir: &Path) -> PathBuf {
    state_dir.join(SOCKET_NAME)
}

/// Get the PID file path for the given state directory.
pub fn get_pid_path(state_dir: &Path) -> PathBuf {
    state_dir.join(PID_NAME)
}

/// Detect if a coordinator is running for the given state directory.
///
/// Returns Some(CoordinatorInfo) if a coordinator is running and responding,
/// None otherwise. Cleans up stale PID/socket files if found.
pub fn detect_coordinator(state_dir: &Path) -> Result<Option<CoordinatorInfo>> {
    let socket_path = get_socket_path(state_dir);
    let pid_path = get_pid_path(state_dir);

    // Check if socket exists
    if !socket_path.exists() {
        // No socket, clean up stale PID file if it exists
        if pid_path.exists() {
            let _ = fs::remove_file(&pid_path);
        }
        return Ok(None);
    }

    // Try to connect and ping
    match UnixStream::connect(&socket_path) {
        Ok(mut stream) => {
            // Set a short timeout for the ping
            let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
            let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

            // Send ping request
            if framing::write_message(&mut stream, &CoordinatorRequest::Ping).is_err() {
                // Failed to write, coordinator is dead
                cleanup_stale_files(state_dir);
                return Ok(None);
            }

            // Read response
            match framing::read_message::<_, CoordinatorResponse>(&mut stream) {
                Ok(CoordinatorResponse::Pong) => {
                    // Coordinator is alive, read PID
                    match read_pid_file(&pid_path) {
                        Some(pid) if pid > 0 => Ok(Some(CoordinatorInfo { pid })),
                        _ => {
                            // PID file missing or invalid - may be starting up
                            Ok(None)
                        }
                    }
                }
                _ => {
                    // Unexpected response or error
                    cleanup_stale_files(state_dir);
                    Ok(None)
                }
            }
        }
        Err(_) => {
            // Cannot connect, clean up stale files
            cleanup_stale_files(state_dir);
            Ok(None)
        }
    }
}

/// Find the sendqd binary.
fn find_coordinator_binary() -> Result<PathBuf> {
    // 1. Check SENDQ_DAEMON_BINARY env var
    if let Ok(path) = std::env::var("SENDQ_DAEMON_BINARY") {
        return Ok(PathBuf::from(path));
    }

    // 2. Look next to the current executable
    if let Ok(exe) = std::env::current_exe() {
        let sendqd = exe.with_file_name("sendqd");
        if sendqd.exists() {
            return Ok(sendqd);
        }
    }

    // 3. Fall back to PATH
    Ok(PathBuf::from("sendqd"))
}

/// Spawn a new coordinator process for the given state directory.
///
/// Returns the CoordinatorInfo for the spawned coordinator. The
/// coordinator's flock ensures only one instance per state directory.
pub fn spawn_coordinator(state_dir: &Path, server_url: &str) -> Result<CoordinatorInfo> {
    // Check if a coordinator is already running
    if let Some(info) = detect_coordinator(state_dir)? {
        return Ok(info);
    }

    // Ensure the state directory exists
    fs::create_dir_all(state_dir)?;

    // Find sendqd binary
    let sendqd_path = find_coordinator_binary()?;

    // Spawn coordinator process
    let mut child = Command::new(&sendqd_path)
        .arg("--state-dir")
        .arg(state_dir)
        .arg("--server-url")
        .arg(server_url)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            Error::Coordinator(format!(
                "failed to start sendqd ({}): {}",
                sendqd_path.display(),
                e
            ))
        })?;

    // Wait for the coordinator to signal it's ready (writes "READY" to stdout)
    if let Some(stdout) = child.stdout.take() {
        let reader = BufReader::new(stdout);
        for line in reader.lines() {
            match line {
                Ok(line) if line == "READY" => break,
                Ok(_) => continue,
                Err(_) => break,
            }
        }
    }

    // Verify the coordinator is running with short polling
    for _ in 0..150 {
        // Check if the process has exited (indicates failure)
        if let Ok(Some(status)) = child.try_wait() {
            let stderr_output = if let Some(mut stderr) = child.stderr.take() {
                use std::io::Read;
                let mut output = String::new();
                let _ = stderr.read_to_string(&mut output);
                output
            } else {
                String::new()
            };
            return Err(Error::Coordinator(format!(
                "coordinator process exited with status: {}\n{}",
                status,
                stderr_output.trim()
            )));
        }

        if let Some(info) = detect_coordinator(state_dir)? {
            return Ok(info);
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    Err(Error::Coordinator(
        "coordinator failed to start: could not connect after multiple attempts".to_string(),
    ))
}

/// Send a shutdown request to the coordinator.
fn stop_coordinator(state_dir: &Path) -> Result<()> {
    let socket_path = get_socket_path(state_dir);

    if !socket_path.exists() {
        return Err(Error::CoordinatorNotRunning);
    }

    let mut stream = UnixStream::connect(&socket_path)?;
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

    framing::write_message(&mut stream, &CoordinatorRequest::Shutdown)?;

    match framing::read_message::<_, CoordinatorResponse>(&mut stream)? {
        CoordinatorResponse::ShuttingDown => Ok(()),
        CoordinatorResponse::Error { message } => Err(Error::Coordinator(message)),
        _ => Err(Error::Coordinator("unexpected response".to_string())),
    }
}

/// Stop the coordinator forcefully if graceful shutdown fails.
///
/// Tries graceful shutdown first, then sends SIGKILL if needed.
pub fn stop_coordinator_forcefully(state_dir: &Path) -> Result<()> {
    let pid_path = get_pid_path(state_dir);

    // Read PID before attempting shutdown
    let pid = read_pid_file(&pid_path);

    // Try graceful shutdown first
    match stop_coordinator(state_dir) {
        Ok(()) => {
            // Wait for the coordinator to actually exit
            if let Some(pid) = pid {
                wait_for_process_exit(pid, Duration::from_secs(1));
            }
            cleanup_stale_files(state_dir);
            return Ok(());
        }
        Err(_) => {
            // Graceful shutdown failed, try SIGKILL
        }
    }

    // If we have a PID, send SIGKILL
    if let Some(pid) = pid {
        let _ = Command::new("kill").arg("-9").arg(pid.to_string()).output();
        std::thread::sleep(Duration::from_millis(100));
    }

    // Clean up stale files
    cleanup_stale_files(state_dir);

    Ok(())
}

/// Clean up stale socket and PID files.
fn cleanup_stale_files(state_dir: &Path) {
    let socket_path = get_socket_path(state_dir);
    let pid_path = get_pid_path(state_dir);

    let _ = fs::remove_file(&socket_path);
    let _ = fs::remove_file(&pid_path);
}

/// Read PID from the PID file.
fn read_pid_file(pid_path: &Path) -> Option<u32> {
    fs::read_to_string(pid_path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Wait for a process to exit, with timeout.
fn wait_for_process_exit(pid: u32, timeout: Duration) {
    let start = std::time::Instant::now();

    while start.elapsed() < timeout {
        let result = Command::new("kill").arg("-0").arg(pid.to_string()).output();

        match result {
            Ok(output) if !output.status.success() => return,
            Err(_) => return,
            _ => {}
        }
        std::thread::sleep(Duration::from_millis(50));
    }
}
