//! The state machine itself.
//!
//! State is published through a `watch` channel. A `tokio::sync::Mutex`
//! acts as the fetch gate: `refresh()` and `initialize()` only `try_lock` it,
//! so a second call while a fetch is in flight returns immediately.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use tribute_rules::DashboardAccess;
use tribute_rules::identity::dashboard_access;
use tribute_use_cases::{CreatorUseCases, DashboardFetch, UseCaseError};

use crate::types::{AppState, AppStatus, RefreshOutcome};

/// Owns the application state. Nothing else writes it.
pub struct AppStateMachine {
    use_cases: CreatorUseCases,
    state_tx: watch::Sender<AppState>,
    fetch_gate: Mutex<()>,
    /// Set once a fetch has completed; cleared by `refresh()`.
    completed: AtomicBool,
}

impl AppStateMachine {
    /// Creates the machine in `Loading` with no dashboard.
    pub fn new(use_cases: CreatorUseCases) -> Self {
        let (state_tx, _) = watch::channel(AppState::default());
        Self {
            use_cases,
            state_tx,
            fetch_gate: Mutex::new(()),
            completed: AtomicBool::new(false),
        }
    }

    /// Runs the first dashboard fetch.
    ///
    /// No-op when a fetch is in flight or one already completed since the
    /// last `refresh()`.
    pub async fn initialize(&self) -> RefreshOutcome {
        if self.completed.load(Ordering::Acquire) {
            debug!("dashboard already fetched, skipping initialize");
            return RefreshOutcome::Skipped;
        }
        let Ok(_guard) = self.fetch_gate.try_lock() else {
            debug!("dashboard fetch in flight, skipping initialize");
            return RefreshOutcome::Skipped;
        };
        if self.completed.load(Ordering::Acquire) {
            return RefreshOutcome::Skipped;
        }
        RefreshOutcome::Completed(self.fetch_and_classify().await)
    }

    /// Fetches the dashboard again.
    ///
    /// Single-flight: while a fetch is running, further calls return
    /// [`RefreshOutcome::Skipped`] without touching the network.
    pub async fn refresh(&self) -> RefreshOutcome {
        let Ok(_guard) = self.fetch_gate.try_lock() else {
            debug!("dashboard fetch in flight, skipping refresh");
            return RefreshOutcome::Skipped;
        };
        self.completed.store(false, Ordering::Release);
        RefreshOutcome::Completed(self.fetch_and_classify().await)
    }

    /// Refreshes and returns the resulting state.
    ///
    /// When another fetch is already in flight, waits for it to finish
    /// instead of starting a second one.
    pub async fn refresh_settled(&self) -> AppState {
        if self.refresh().await == RefreshOutcome::Skipped {
            drop(self.fetch_gate.lock().await);
        }
        self.state()
    }

    /// Creates the backend user, then fetches the dashboard.
    ///
    /// On creation failure the state becomes `Errored` and no fetch runs.
    /// On success it waits for any in-flight fetch before running its own,
    /// so the returned status reflects the newly created user.
    pub async fn onboard(&self) -> Result<AppStatus, UseCaseError> {
        self.publish_loading();

        if let Err(e) = self.use_cases.onboard().await {
            warn!(error = %e, "user creation failed");
            self.publish(AppState::Errored(e.user_message()));
            return Err(e);
        }

        let _guard = self.fetch_gate.lock().await;
        self.completed.store(false, Ordering::Release);
        Ok(self.fetch_and_classify().await)
    }

    /// A copy of the current state.
    pub fn state(&self) -> AppState {
        self.state_tx.borrow().clone()
    }

    pub fn status(&self) -> AppStatus {
        self.state_tx.borrow().status()
    }

    /// Receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state_tx.subscribe()
    }

    /// Access rules for the current dashboard.
    pub fn access(&self) -> DashboardAccess {
        let state = self.state_tx.borrow();
        dashboard_access(state.dashboard())
    }

    pub fn use_cases(&self) -> &CreatorUseCases {
        &self.use_cases
    }

    /// Caller must hold the fetch gate.
    async fn fetch_and_classify(&self) -> AppStatus {
        self.publish_loading();

        let next = match self.use_cases.get_dashboard().await {
            DashboardFetch::Ready(snapshot) => {
                info!(
                    verified = snapshot.is_verified,
                    channels = snapshot.channels.len(),
                    "dashboard loaded"
                );
                AppState::Onboarded(snapshot)
            }
            DashboardFetch::NotFound => {
                info!("identity is not onboarded");
                AppState::NotOnboarded
            }
            DashboardFetch::Failed(e) => AppState::Errored(e.user_message()),
        };

        let status = next.status();
        self.publish(next);
        self.completed.store(true, Ordering::Release);
        status
    }

    fn publish_loading(&self) {
        let stale = self.state_tx.borrow().last_known_dashboard().cloned();
        self.publish(AppState::Loading { stale });
    }

    fn publish(&self, state: AppState) {
        debug!(status = ?state.status(), "app state changed");
        self.state_tx.send_replace(state);
    }
}
