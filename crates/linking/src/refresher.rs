//! Narrow callback into the application state machine.

use std::future::Future;
use std::pin::Pin;

use tribute_app_state::AppStateMachine;

/// Requests a dashboard refresh after a channel was verified.
pub trait DashboardRefresher: Send + Sync {
    fn refresh_dashboard(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

impl DashboardRefresher for AppStateMachine {
    fn refresh_dashboard(&self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            self.refresh().await;
        })
    }
}
