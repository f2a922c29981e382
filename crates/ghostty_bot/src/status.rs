//! Build metadata and login bookkeeping.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// Status the bot reports about itself.
///
/// Populated by [`initialize`](Self::initialize) during bootstrap, before any
/// extension loads, so extensions may read it from their setup routines.
#[derive(Debug, Default)]
pub struct BotStatus {
    commit: Mutex<Option<String>>,
    commit_date: Mutex<Option<String>>,
    initialized: AtomicBool,
    last_login_time: Mutex<Option<DateTime<Utc>>>,
}

impl BotStatus {
    /// Create an empty status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read git metadata of the working tree.
    ///
    /// A missing git binary or repository leaves the commit unknown; it
    /// never fails bootstrap.
    #[instrument(skip(self))]
    pub async fn initialize(&self) {
        let commit = git(&["rev-parse", "--short", "HEAD"]).await;
        let commit_date = git(&["log", "-1", "--format=%cI"]).await;
        *self.commit.lock() = commit;
        *self.commit_date.lock() = commit_date;
        self.initialized.store(true, Ordering::Release);
        debug!(commit = ?self.commit(), "Status initialized");
    }

    /// Whether [`initialize`](Self::initialize) has completed.
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Short hash of the running commit, if known.
    pub fn commit(&self) -> Option<String> {
        self.commit.lock().clone()
    }

    /// Committer date of the running commit, if known.
    pub fn commit_date(&self) -> Option<String> {
        self.commit_date.lock().clone()
    }

    /// When the gateway last became ready.
    pub fn last_login_time(&self) -> Option<DateTime<Utc>> {
        *self.last_login_time.lock()
    }

    /// Record a gateway login.
    pub fn set_last_login_time(&self, time: DateTime<Utc>) {
        *self.last_login_time.lock() = Some(time);
    }
}

async fn git(args: &[&str]) -> Option<String> {
    let output = match Command::new("git").args(args).output().await {
        Ok(output) => output,
        Err(e) => {
            warn!(error = %e, "Failed to run git");
            return None;
        }
    };
    if !output.status.success() {
        warn!(
            args = ?args,
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "git exited with an error"
        );
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!stdout.is_empty()).then_some(stdout)
}
