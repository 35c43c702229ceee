//! State values published by the state machine.

use tribute_protocol::DashboardSnapshot;

/// Coarse status of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppStatus {
    Loading,
    Onboarded,
    NotOnboarded,
    Errored,
}

/// Current application state.
///
/// Each variant carries exactly the data valid for it: only `Onboarded`
/// has a dashboard, only `Errored` has an error detail.
#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    /// A fetch is running. `stale` keeps the previous dashboard, if any, so
    /// screens can keep showing it.
    Loading { stale: Option<DashboardSnapshot> },
    Onboarded(DashboardSnapshot),
    NotOnboarded,
    Errored(String),
}

impl Default for AppState {
    fn default() -> Self {
        AppState::Loading { stale: None }
    }
}

impl AppState {
    pub fn status(&self) -> AppStatus {
        match self {
            AppState::Loading { .. } => AppStatus::Loading,
            AppState::Onboarded(_) => AppStatus::Onboarded,
            AppState::NotOnboarded => AppStatus::NotOnboarded,
            AppState::Errored(_) => AppStatus::Errored,
        }
    }

    /// The dashboard, present only when onboarded.
    pub fn dashboard(&self) -> Option<&DashboardSnapshot> {
        match self {
            AppState::Onboarded(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    /// The most recent dashboard, including a stale one kept while loading.
    pub fn last_known_dashboard(&self) -> Option<&DashboardSnapshot> {
        match self {
            AppState::Onboarded(snapshot) => Some(snapshot),
            AppState::Loading { stale } => stale.as_ref(),
            _ => None,
        }
    }

    pub fn error_detail(&self) -> Option<&str> {
        match self {
            AppState::Errored(detail) => Some(detail),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AppState::Loading { .. })
    }
}

/// Result of a `refresh()` or `initialize()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A fetch ran and its result was published.
    Completed(AppStatus),
    /// Another fetch was in flight, or `initialize()` found a completed one.
    Skipped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_loading_without_dashboard() {
        let state = AppState::default();
        assert_eq!(state.status(), AppStatus::Loading);
        assert!(state.dashboard().is_none());
        assert!(state.error_detail().is_none());
    }

    #[test]
    fn only_onboarded_exposes_dashboard() {
        let snap = DashboardSnapshot::default();
        let loading = AppState::Loading {
            stale: Some(snap.clone()),
        };
        assert!(loading.dashboard().is_none());
        assert_eq!(loading.last_known_dashboard(), Some(&snap));
        assert_eq!(AppState::Onboarded(snap.clone()).dashboard(), Some(&snap));
    }

    #[test]
    fn errored_carries_detail() {
        let state = AppState::Errored("boom".into());
        assert_eq!(state.status(), AppStatus::Errored);
        assert_eq!(state.error_detail(), Some("boom"));
        assert!(state.last_known_dashboard().is_none());
    }
}
