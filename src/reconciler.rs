//! Debounced reconciliation of local selections with the remote
//! configuration endpoint.
//!
//! A selection change only reaches the network when the session is
//! initialized, the selection validates, it is non-empty, and it differs from
//! the server's last confirmed default. Rapid changes re-arm one debounce
//! window instead of queuing calls, and a window that fires with the same
//! canonical selection already sent is skipped. At most one call is in flight
//! per product instance; a change arriving mid-flight waits its own window
//! and then queues behind the in-flight call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::api::{self, ApiSelections};
use crate::error::Result;
use crate::products::ConfiguredBundle;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// The one remote mutation this core triggers.
#[async_trait]
pub trait ConfigureBundle: Send + Sync + 'static {
    async fn configure(&self, selections: &ApiSelections) -> Result<ConfiguredBundle>;
}

#[derive(Debug, Clone, Default)]
pub struct ReconcilerStatus {
    pub is_configuring: bool,
    /// Canonical form of the last selection actually sent.
    pub last_configured: String,
    /// Last remote failure, cleared by the next successful call. Failures
    /// never corrupt the selection state; another selection change re-arms
    /// the window and retries.
    pub last_error: Option<String>,
}

#[derive(Default)]
struct Shared {
    /// Bumped on every selection-change event; a pending window with a stale
    /// generation died superseded.
    generation: u64,
    is_configuring: bool,
    last_configured: String,
    last_error: Option<String>,
    /// Server-confirmed default configuration; replaced by each successful
    /// configure response.
    confirmed: Option<ApiSelections>,
    /// Last successful configure response, kept for price display.
    configured: Option<ConfiguredBundle>,
}

pub struct Reconciler<C> {
    configurer: Arc<C>,
    delay: Duration,
    shared: Arc<Mutex<Shared>>,
    /// Serializes network calls so at most one is in flight.
    call_lock: Arc<tokio::sync::Mutex<()>>,
    /// Cleared at teardown; pending windows check it before firing and an
    /// in-flight completion checks it before writing.
    live: Arc<AtomicBool>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<C: ConfigureBundle> Reconciler<C> {
    pub fn new(configurer: C, delay: Duration, server_default: Option<ApiSelections>) -> Self {
        Self {
            configurer: Arc::new(configurer),
            delay,
            shared: Arc::new(Mutex::new(Shared {
                confirmed: server_default,
                ..Shared::default()
            })),
            call_lock: Arc::new(tokio::sync::Mutex::new(())),
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Feeds one selection-change event into the state machine. Must run
    /// inside a Tokio runtime: passing the trigger checks arms (or re-arms)
    /// the debounce window on a spawned task.
    ///
    /// Every event supersedes a pending window, including events that end up
    /// suppressed.
    pub fn submit(&self, selections: ApiSelections, initialized: bool, is_valid: bool) {
        let generation = {
            let mut shared = lock(&self.shared);
            shared.generation += 1;

            let triggered = initialized
                && is_valid
                && !selections.is_empty()
                && !api::matches_default(&selections, shared.confirmed.as_ref());
            if !triggered {
                tracing::debug!(initialized, is_valid, "selection change suppressed");
                return;
            }
            shared.generation
        };

        let shared = Arc::clone(&self.shared);
        let configurer = Arc::clone(&self.configurer);
        let call_lock = Arc::clone(&self.call_lock);
        let live = Arc::clone(&self.live);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _in_flight = call_lock.lock().await;
            if !live.load(Ordering::Acquire) {
                return;
            }

            let canonical = api::canonical_form(&selections);
            {
                let mut guard = lock(&shared);
                if guard.generation != generation {
                    return;
                }
                // Fire-time read of "last configured": skip a call for a
                // selection already sent.
                if guard.last_configured == canonical {
                    return;
                }
                guard.is_configuring = true;
            }

            let result = configurer.configure(&selections).await;

            let mut guard = lock(&shared);
            guard.is_configuring = false;
            if !live.load(Ordering::Acquire) {
                return;
            }
            match result {
                Ok(configured) => {
                    tracing::debug!(bundle = %configured.id, "bundle configuration confirmed");
                    guard.last_configured = canonical;
                    guard.last_error = None;
                    guard.confirmed = Some(configured.selected_options.clone());
                    guard.configured = Some(configured);
                }
                Err(err) => {
                    tracing::error!(error = %err, "failed to process bundle configuration");
                    guard.last_error = Some(err.to_string());
                }
            }
        });
    }

    pub fn status(&self) -> ReconcilerStatus {
        let shared = lock(&self.shared);
        ReconcilerStatus {
            is_configuring: shared.is_configuring,
            last_configured: shared.last_configured.clone(),
            last_error: shared.last_error.clone(),
        }
    }

    /// The current last-known default: the latest successful configure echo,
    /// or the server default the reconciler started with.
    pub fn confirmed(&self) -> Option<ApiSelections> {
        lock(&self.shared).confirmed.clone()
    }

    /// Last successful configure response, if any.
    pub fn configured(&self) -> Option<ConfiguredBundle> {
        lock(&self.shared).configured.clone()
    }

    /// Cancels any pending debounce window and makes an in-flight completion
    /// ignore its result.
    pub fn shutdown(&self) {
        self.live.store(false, Ordering::Release);
    }
}

impl<C> Drop for Reconciler<C> {
    fn drop(&mut self) {
        self.live.store(false, Ordering::Release);
    }
}
