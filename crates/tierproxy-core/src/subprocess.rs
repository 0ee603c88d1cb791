use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tokio::time::Instant;

const CANDIDATE_BINARY_NAMES: [&str; 2] = ["gemini-bridge", "gemini-bridge.exe"];
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(1);
const HEALTH_POLL_DEADLINE: Duration = Duration::from_secs(15);
const HEALTH_PROBE_TIMEOUT: Duration = Duration::from_secs(2);
const TERMINATE_GRACE: Duration = Duration::from_secs(5);

/// Owns the optional local "gemini-bridge" helper process: locates it on
/// `PATH`, spawns it detached with `PORT` set, polls its health endpoint,
/// and tears it down on shutdown. Module-level state is held behind a
/// single-writer lock, matching the rest of this crate's concurrency model.
pub struct GeminiBridgeSupervisor {
    child: Mutex<Option<Child>>,
    port: u16,
}

impl GeminiBridgeSupervisor {
    /// Spawns the helper and waits (bounded) for it to become healthy.
    /// Returns `None` if the binary cannot be located or fails to spawn;
    /// the supervisor is optional and failure-tolerant (§4.7, §9).
    pub async fn spawn(port: u16, config_dir: Option<&Path>) -> Option<Self> {
        let binary = locate_binary()?;
        let mut command = Command::new(&binary);
        command.env("PORT", port.to_string()).stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
        if let Some(dir) = config_dir {
            command.env("ANTIGRAVITY_CONFIG_DIR", dir);
        }

        let child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                tracing::warn!(%err, binary = %binary.display(), "failed to spawn gemini bridge helper");
                return None;
            }
        };

        let supervisor = Self { child: Mutex::new(Some(child)), port };
        supervisor.wait_for_health().await;
        Some(supervisor)
    }

    async fn wait_for_health(&self) {
        let Ok(client) = wreq::Client::builder().timeout(HEALTH_PROBE_TIMEOUT).build() else {
            return;
        };
        let url = format!("http://127.0.0.1:{}/health", self.port);
        let deadline = Instant::now() + HEALTH_POLL_DEADLINE;

        while Instant::now() < deadline {
            if let Ok(response) = client.get(&url).send().await {
                if response.status().is_success() {
                    tracing::info!(port = self.port, "gemini bridge helper is healthy");
                    return;
                }
            }
            tokio::time::sleep(HEALTH_POLL_INTERVAL).await;
        }
        tracing::warn!(port = self.port, "gemini bridge helper did not respond to health checks in time");
    }

    /// Graceful terminate, 5s grace period, then force kill.
    pub async fn shutdown(&self) {
        let mut guard = self.child.lock().await;
        let Some(mut child) = guard.take() else {
            return;
        };

        send_terminate(&child);

        if tokio::time::timeout(TERMINATE_GRACE, child.wait()).await.is_err() {
            let _ = child.kill().await;
        }
    }
}

#[cfg(unix)]
fn send_terminate(child: &Child) {
    let Some(pid) = child.id() else { return };
    let pid = nix::unistd::Pid::from_raw(pid as i32);
    let _ = nix::sys::signal::kill(pid, nix::sys::signal::Signal::SIGTERM);
}

#[cfg(not(unix))]
fn send_terminate(_child: &Child) {}

fn locate_binary() -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    CANDIDATE_BINARY_NAMES.into_iter().find_map(|name| {
        std::env::split_paths(&path_var).map(|dir| dir.join(name)).find(|candidate| candidate.is_file())
    })
}
