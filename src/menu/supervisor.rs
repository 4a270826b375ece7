//! Single-worker supervision for menu sessions.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;

use super::{run_session, MenuHost};
use crate::router::MenuLauncher;

/// Owns the (at most one) menu worker thread.
pub struct MenuSupervisor<H: MenuHost> {
    host: Arc<H>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<H: MenuHost> MenuSupervisor<H> {
    pub fn new(host: H) -> Self {
        Self {
            host: Arc::new(host),
            worker: Mutex::new(None),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Whether a session is currently running.
    pub fn is_active(&self) -> bool {
        self.worker
            .lock()
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Start a session unless one is already running.
    pub fn trigger(&self) -> bool {
        let mut worker = self.worker.lock();

        if let Some(handle) = worker.as_ref() {
            if !handle.is_finished() {
                return false;
            }
        }
        // Reap the finished worker before starting another
        if let Some(handle) = worker.take() {
            let _ = handle.join();
        }

        let host = Arc::clone(&self.host);
        let spawned = thread::Builder::new()
            .name("menu-session".to_string())
            .spawn(move || {
                run_session(host.as_ref());
            });

        match spawned {
            Ok(handle) => {
                *worker = Some(handle);
                true
            },
            Err(e) => {
                log::error!("[menu] Failed to spawn menu worker: {}", e);
                false
            },
        }
    }

    /// Wait for the running session, if any. No timeout.
    pub fn shutdown(&self) {
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            log::debug!("[menu] Waiting for menu worker");
            if handle.join().is_err() {
                log::error!("[menu] Menu worker panicked");
            }
        }
    }
}

impl<H: MenuHost> MenuLauncher for MenuSupervisor<H> {
    fn launch(&self) -> bool {
        self.trigger()
    }
}

impl<H: MenuHost> Drop for MenuSupervisor<H> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
